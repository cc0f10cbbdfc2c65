use anyhow::Result;
use serde::Serialize;
use sqlparam_core::{ParameterValues, TemplateEngine, TemplateError};

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    parameters: Vec<String>,
    provided: usize,
    unused: Vec<&'a str>,
}

/// Verify that `values` covers the template and passes the injection guard
///
/// Fails with the same error `render` would produce, without printing SQL.
pub fn run(
    engine: &TemplateEngine,
    template: &str,
    values: &ParameterValues,
    json: bool,
) -> Result<String> {
    let missing = engine.missing_parameters(template, values);
    if !missing.is_empty() {
        return Err(TemplateError::missing_parameter(missing).into());
    }

    engine.substitute(template, values)?;

    let parameters = engine.scan(template);
    let mut unused: Vec<&str> = values
        .keys()
        .filter(|name| !parameters.contains(*name))
        .map(String::as_str)
        .collect();
    unused.sort_unstable();

    let report = CheckReport {
        provided: values.len(),
        parameters,
        unused,
    };

    if json {
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    let mut output = format!(
        "✓ All {} parameter(s) have safe values",
        report.parameters.len()
    );
    if !report.unused.is_empty() {
        output.push_str(&format!("\n  ignored: {}", report.unused.join(", ")));
    }
    Ok(output)
}
