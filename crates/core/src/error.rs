//! Error types for template analysis and substitution
//!
//! Classification and formatting never fail; they fall back to heuristics.
//! Only a missing parameter, a rejected value or a bad configuration stops a
//! substitution, and in that case no SQL is returned at all.

use crate::config::ConfigError;
use serde_json::json;
use thiserror::Error;

/// Result type alias for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Fatal errors raised by the engine
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template references parameters that have no supplied value
    #[error("Missing value for parameter(s): {}", .names.join(", "))]
    MissingParameter { names: Vec<String> },

    /// An escaped string value contains a denylisted SQL keyword
    #[error("Value for parameter '{parameter}' rejected: contains dangerous keyword '{keyword}'")]
    DangerousInputRejected { keyword: String, parameter: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl TemplateError {
    /// Create a missing parameter error
    pub fn missing_parameter(names: Vec<String>) -> Self {
        Self::MissingParameter { names }
    }

    /// Create a dangerous input error
    pub fn dangerous_input(keyword: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::DangerousInputRejected {
            keyword: keyword.into(),
            parameter: parameter.into(),
        }
    }

    /// Stable error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingParameter { .. } => "missing_parameter",
            Self::DangerousInputRejected { .. } => "dangerous_input_rejected",
            Self::Config(_) => "invalid_configuration",
        }
    }

    /// Parameter names involved in the error
    pub fn parameters(&self) -> Vec<&str> {
        match self {
            Self::MissingParameter { names } => names.iter().map(String::as_str).collect(),
            Self::DangerousInputRejected { parameter, .. } => vec![parameter.as_str()],
            Self::Config(_) => Vec::new(),
        }
    }

    pub fn is_missing_parameter(&self) -> bool {
        matches!(self, Self::MissingParameter { .. })
    }

    pub fn is_dangerous_input(&self) -> bool {
        matches!(self, Self::DangerousInputRejected { .. })
    }

    /// Convert to a JSON payload the editor can surface verbatim
    pub fn to_json(&self) -> serde_json::Value {
        let mut body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "parameters": self.parameters(),
            }
        });
        if let Self::DangerousInputRejected { keyword, .. } = self {
            body["error"]["keyword"] = json!(keyword);
        }
        body
    }
}
