use anyhow::Result;
use serde_json::json;
use sqlparam_core::{ParameterValues, TemplateEngine};

/// Merge defaults under the given values and print the final SQL
pub fn run(
    engine: &TemplateEngine,
    template: &str,
    values: &ParameterValues,
    defaults: &ParameterValues,
    json: bool,
) -> Result<String> {
    let (sql, merged) = engine.render(template, defaults, values)?;
    let auto_populated = merged.auto_populated();

    tracing::info!(
        parameters = merged.len(),
        auto_populated = auto_populated.len(),
        "Rendered template"
    );

    if json {
        let output = json!({
            "sql": sql,
            "auto_populated": auto_populated,
            "values": merged,
        });
        return Ok(serde_json::to_string_pretty(&output)?);
    }

    Ok(sql)
}
