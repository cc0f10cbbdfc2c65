use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Where an engine setting was resolved from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "from", content = "detail", rename_all = "snake_case")]
pub enum ConfigSource {
    /// Built-in value, shown as it would be written in YAML
    Default(String),
    /// YAML configuration file
    File(PathBuf),
    /// `SQLPARAM_*` environment variable
    EnvVar(&'static str),
}

impl ConfigSource {
    pub fn is_env_var(&self) -> bool {
        matches!(self, ConfigSource::EnvVar(_))
    }

    pub fn is_default(&self) -> bool {
        matches!(self, ConfigSource::Default(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, ConfigSource::File(_))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Default(value) => write!(f, "default ({})", value),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::EnvVar(var) => write!(f, "${}", var),
        }
    }
}
