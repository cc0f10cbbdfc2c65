use anyhow::Result;
use console::style;
use sqlparam_core::TemplateEngine;

/// List the parameters of `template` in order of first appearance
pub fn run(engine: &TemplateEngine, template: &str, json: bool) -> Result<String> {
    let names = engine.scan(template);

    if json {
        return Ok(serde_json::to_string_pretty(&names)?);
    }

    if names.is_empty() {
        return Ok("No parameters found".to_string());
    }

    let escaped = engine
        .occurrences(template)
        .iter()
        .filter(|p| p.escaped)
        .count();

    let mut output = format!("{} parameter(s):\n", style(names.len()).bold());
    for name in &names {
        output.push_str(&format!("  {}\n", name));
    }
    if escaped > 0 {
        output.push_str(&format!("{} escaped placeholder(s) left as text\n", escaped));
    }
    Ok(output.trim_end().to_string())
}
