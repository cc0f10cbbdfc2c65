use anyhow::Result;
use console::style;
use sqlparam_core::{ContextHint, TemplateEngine};

/// Describe every parameter the way an editor would present it
pub fn run(engine: &TemplateEngine, template: &str, json: bool) -> Result<String> {
    let analysis = engine.analyze(template);

    if json {
        return Ok(serde_json::to_string_pretty(&analysis)?);
    }

    if analysis.is_empty() {
        return Ok("No parameters found".to_string());
    }

    let width = analysis
        .parameters
        .iter()
        .map(|p| p.name.len())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for param in &analysis.parameters {
        let context = &param.context;
        output.push_str(&format!(
            "{:width$}  {:<10}  {:<10}  e.g. {}\n",
            style(&param.name).bold(),
            context.sql_context.as_str(),
            context.value_type.as_str(),
            context.example_value,
            width = width,
        ));
        output.push_str(&format!("{:width$}  {}\n", "", context.format_hint, width = width));

        for hint in &param.hints {
            output.push_str(&format!(
                "{:width$}  {} {}\n",
                "",
                style("hint:").yellow(),
                describe_hint(hint),
                width = width,
            ));
        }
    }
    Ok(output.trim_end().to_string())
}

fn describe_hint(hint: &ContextHint) -> String {
    match hint {
        ContextHint::NoStructuralContext => {
            "no SQL keyword found nearby, type guessed from the name".to_string()
        }
        ContextHint::ConflictingContexts { contexts } => format!(
            "used as {}; the first one applies",
            contexts
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(" and ")
        ),
        ContextHint::MixedSyntax { syntaxes } => format!(
            "written as {}",
            syntaxes
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}
