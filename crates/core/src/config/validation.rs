//! Configuration errors
//!
//! Raised while reading or validating [`EngineConfig`](super::EngineConfig);
//! the engine refuses to start with an invalid configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {field} '{value}': expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Invalid engine configuration: {message}")]
    ValidationFailed { message: String },

    #[error("Cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Config field the error is about, if it names one
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }

    /// The file could not be read or parsed, as opposed to holding bad values
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Yaml(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_message() {
        let error = ConfigError::invalid_value("context_window", "0", "a positive integer");
        assert_eq!(error.field(), Some("context_window"));
        assert_eq!(
            error.to_string(),
            "Invalid context_window '0': expected a positive integer"
        );
        assert!(!error.is_file_error());
    }

    #[test]
    fn test_validation_failed_has_no_field() {
        let error = ConfigError::validation_failed("extra_denylist entries must not be blank");
        assert!(error.field().is_none());
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let error: ConfigError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "sqlparam.yaml").into();
        assert!(error.is_file_error());
    }
}
