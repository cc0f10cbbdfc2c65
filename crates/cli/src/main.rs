mod commands;
mod logging;
mod utils;

use clap::{Parser, Subcommand};
use console::style;
use logging::LoggingConfig;
use sqlparam_core::TemplateError;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sqlparam")]
#[command(about = "Detect, check and fill parameters in SQL templates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Engine configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "sqlparam_core=trace"
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the parameters a template references
    Scan {
        /// Template file, or - for stdin
        template: PathBuf,
    },

    /// Show the inferred SQL context and input type of each parameter
    Analyze {
        /// Template file, or - for stdin
        template: PathBuf,
    },

    /// Verify that a values file covers the template and is safe
    Check {
        /// Template file, or - for stdin
        template: PathBuf,

        /// JSON object of parameter values
        #[arg(long)]
        values: Option<PathBuf>,
    },

    /// Substitute values into the template and print the final SQL
    Render {
        /// Template file, or - for stdin
        template: PathBuf,

        /// JSON object of parameter values typed by the user
        #[arg(long)]
        values: Option<PathBuf>,

        /// JSON object of default values used where no value was typed
        #[arg(long)]
        defaults: Option<PathBuf>,
    },
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let engine = utils::load_engine(cli.config.as_deref())?;

    match &cli.command {
        Commands::Scan { template } => {
            let template = utils::read_template(template)?;
            commands::scan::run(&engine, &template, cli.json)
        }
        Commands::Analyze { template } => {
            let template = utils::read_template(template)?;
            commands::analyze::run(&engine, &template, cli.json)
        }
        Commands::Check { template, values } => {
            let template = utils::read_template(template)?;
            let values = utils::read_values(values.as_deref())?;
            commands::check::run(&engine, &template, &values, cli.json)
        }
        Commands::Render {
            template,
            values,
            defaults,
        } => {
            let template = utils::read_template(template)?;
            let values = utils::read_values(values.as_deref())?;
            let defaults = utils::read_values(defaults.as_deref())?;
            commands::render::run(&engine, &template, &values, &defaults, cli.json)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = LoggingConfig::default()
        .with_level(&cli.log_level)
        .with_json_format(cli.json_logs);
    if let Err(e) = logging::init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            match err.downcast_ref::<TemplateError>() {
                Some(template_err) if cli.json => println!("{}", template_err.to_json()),
                _ => eprintln!("{} {:#}", style("error:").red().bold(), err),
            }
            ExitCode::FAILURE
        }
    }
}
