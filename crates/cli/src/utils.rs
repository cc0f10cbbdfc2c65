use anyhow::{Context, Result};
use sqlparam_core::{EngineConfig, ParameterValues, TemplateEngine};
use std::io::Read;
use std::path::Path;

/// Read a template from `path`, or from stdin when `path` is `-`
pub fn read_template(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut template = String::new();
        std::io::stdin()
            .read_to_string(&mut template)
            .context("Failed to read template from stdin")?;
        return Ok(template);
    }

    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template {}", path.display()))
}

/// Parse a JSON object of parameter values; no file means no values
pub fn read_values(path: Option<&Path>) -> Result<ParameterValues> {
    let Some(path) = path else {
        return Ok(ParameterValues::new());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read values {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} must be a JSON object of parameter values", path.display()))
}

/// Build the engine from a YAML file when given, otherwise from the environment
pub fn load_engine(config: Option<&Path>) -> Result<TemplateEngine> {
    let config = match config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::from_env()?,
    };

    for (setting, source) in config.config_sources() {
        tracing::debug!(setting = %setting, source = %source, "Resolved engine setting");
    }

    Ok(TemplateEngine::new(config)?)
}
