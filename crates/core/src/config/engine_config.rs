use crate::classifier::DEFAULT_CONTEXT_WINDOW;
use crate::config::{ConfigError, ConfigSource};
use crate::formatter::NullLiteral;
use crate::scanner::DEFAULT_ESCAPE_CHAR;
use crate::security::KeywordMatch;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

pub const ENV_CONTEXT_WINDOW: &str = "SQLPARAM_CONTEXT_WINDOW";
pub const ENV_ESCAPE_CHAR: &str = "SQLPARAM_ESCAPE_CHAR";
pub const ENV_NULL_LITERAL: &str = "SQLPARAM_NULL_LITERAL";
pub const ENV_EXTRA_DENYLIST: &str = "SQLPARAM_EXTRA_DENYLIST";
pub const ENV_KEYWORD_MATCH: &str = "SQLPARAM_KEYWORD_MATCH";

/// Characters that would collide with placeholder syntax or quoting
const RESERVED_ESCAPE_CHARS: &[char] = &['{', '}', ':', '$', '\'', '"', '%'];

/// Engine configuration
///
/// Resolution order is defaults, then an optional YAML file, then
/// `SQLPARAM_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Characters inspected on each side of a placeholder during classification
    pub context_window: usize,
    /// Marker that suppresses detection of the placeholder right after it
    pub escape_char: char,
    /// Literal emitted for null or empty values
    pub null_literal: NullLiteral,
    /// Keywords rejected in addition to the built-in denylist
    pub extra_denylist: Vec<String>,
    /// How denylisted keywords are matched against escaped input
    pub keyword_match: KeywordMatch,
    #[serde(skip)]
    loaded_from: Option<PathBuf>,
    /// Top-level keys present in the loaded file
    #[serde(skip)]
    file_keys: Vec<String>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            context_window: DEFAULT_CONTEXT_WINDOW,
            escape_char: DEFAULT_ESCAPE_CHAR,
            null_literal: NullLiteral::Null,
            extra_denylist: Vec::new(),
            keyword_match: KeywordMatch::Substring,
            loaded_from: None,
            file_keys: Vec::new(),
        }
    }

    /// Set the classification window
    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context_window = window;
        self
    }

    /// Set the escape marker
    pub fn with_escape_char(mut self, escape_char: char) -> Self {
        self.escape_char = escape_char;
        self
    }

    /// Set the null literal convention
    pub fn with_null_literal(mut self, null_literal: NullLiteral) -> Self {
        self.null_literal = null_literal;
        self
    }

    /// Add a keyword to the injection denylist
    pub fn with_denied_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.extra_denylist.push(keyword.into());
        self
    }

    /// Set the keyword matching mode
    pub fn with_keyword_match(mut self, keyword_match: KeywordMatch) -> Self {
        self.keyword_match = keyword_match;
        self
    }

    /// Load configuration from defaults and environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, with environment overrides on top
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::new();
        if !content.trim().is_empty() {
            let document: serde_yaml::Value = serde_yaml::from_str(&content)?;
            let file_keys = match &document {
                serde_yaml::Value::Mapping(mapping) => mapping
                    .keys()
                    .filter_map(|key| key.as_str().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            };
            config = serde_yaml::from_value(document)?;
            config.file_keys = file_keys;
        }
        config.loaded_from = Some(path.to_path_buf());
        config.apply_env()?;
        config.validate()?;

        tracing::debug!(path = %path.display(), "Loaded engine configuration");
        Ok(config)
    }

    /// Path of the file this configuration was loaded from
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(window) = env::var(ENV_CONTEXT_WINDOW) {
            self.context_window = window.trim().parse().map_err(|_| {
                ConfigError::invalid_value("context_window", &window, "a positive integer")
            })?;
        }

        if let Ok(escape) = env::var(ENV_ESCAPE_CHAR) {
            let mut chars = escape.chars();
            self.escape_char = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(ConfigError::invalid_value(
                        "escape_char",
                        escape,
                        "exactly one character",
                    ))
                }
            };
        }

        if let Ok(null_literal) = env::var(ENV_NULL_LITERAL) {
            self.null_literal = null_literal.parse()?;
        }

        if let Ok(denylist) = env::var(ENV_EXTRA_DENYLIST) {
            self.extra_denylist = denylist
                .split(',')
                .map(str::trim)
                .filter(|keyword| !keyword.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Ok(keyword_match) = env::var(ENV_KEYWORD_MATCH) {
            self.keyword_match = keyword_match.parse()?;
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.context_window == 0 {
            return Err(ConfigError::invalid_value(
                "context_window",
                "0",
                "a positive integer",
            ));
        }

        let escape = self.escape_char;
        if escape.is_alphanumeric()
            || escape == '_'
            || escape.is_whitespace()
            || RESERVED_ESCAPE_CHARS.contains(&escape)
        {
            return Err(ConfigError::invalid_value(
                "escape_char",
                escape.to_string(),
                "a punctuation character that is not part of placeholder syntax",
            ));
        }

        if self.extra_denylist.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::validation_failed(
                "extra_denylist entries must not be blank",
            ));
        }

        Ok(())
    }

    /// Where each setting was resolved from
    pub fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let source = |field: &str, var: &'static str, default: &str| {
            let in_file = self.file_keys.iter().any(|key| key == field);
            match &self.loaded_from {
                _ if env::var(var).is_ok() => ConfigSource::EnvVar(var),
                Some(path) if in_file => ConfigSource::File(path.clone()),
                _ => ConfigSource::Default(default.to_string()),
            }
        };

        [
            ("context_window", ENV_CONTEXT_WINDOW, "50"),
            ("escape_char", ENV_ESCAPE_CHAR, "\\"),
            ("null_literal", ENV_NULL_LITERAL, "null"),
            ("extra_denylist", ENV_EXTRA_DENYLIST, "none"),
            ("keyword_match", ENV_KEYWORD_MATCH, "substring"),
        ]
        .into_iter()
        .map(|(field, var, default)| (field.to_string(), source(field, var, default)))
        .collect()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        for var in [
            ENV_CONTEXT_WINDOW,
            ENV_ESCAPE_CHAR,
            ENV_NULL_LITERAL,
            ENV_EXTRA_DENYLIST,
            ENV_KEYWORD_MATCH,
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.context_window, 50);
        assert_eq!(config.escape_char, '\\');
        assert_eq!(config.null_literal, NullLiteral::Null);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = EngineConfig::new().with_context_window(0);
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), Some("context_window"));
    }

    #[test]
    fn test_placeholder_chars_rejected_as_escape() {
        for c in ['{', ':', '$', 'a', '_', ' '] {
            let config = EngineConfig::new().with_escape_char(c);
            assert!(config.validate().is_err(), "escape char {:?} should be rejected", c);
        }
        assert!(EngineConfig::new().with_escape_char('!').validate().is_ok());
    }

    #[test]
    fn test_blank_denylist_entry_rejected() {
        let config = EngineConfig::new().with_denied_keyword("  ");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        env::set_var(ENV_CONTEXT_WINDOW, "80");
        env::set_var(ENV_NULL_LITERAL, "empty");
        env::set_var(ENV_EXTRA_DENYLIST, "MERGE, CALL ,");
        env::set_var(ENV_KEYWORD_MATCH, "whole_word");

        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.context_window, 80);
        assert_eq!(config.null_literal, NullLiteral::EmptyString);
        assert_eq!(config.extra_denylist, vec!["MERGE", "CALL"]);
        assert_eq!(config.keyword_match, KeywordMatch::WholeWord);

        let sources = config.config_sources();
        assert!(sources["context_window"].is_env_var());
        assert!(sources["escape_char"].is_default());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_window() {
        clear_env();
        env::set_var(ENV_CONTEXT_WINDOW, "wide");
        let err = EngineConfig::from_env().unwrap_err();
        assert_eq!(err.field(), Some("context_window"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_multi_char_escape() {
        clear_env();
        env::set_var(ENV_ESCAPE_CHAR, "\\\\");
        assert!(EngineConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_from_yaml_file() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "context_window: 30").unwrap();
        writeln!(file, "escape_char: '!'").unwrap();
        writeln!(file, "extra_denylist: [MERGE]").unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.context_window, 30);
        assert_eq!(config.escape_char, '!');
        assert_eq!(config.extra_denylist, vec!["MERGE"]);
        assert_eq!(config.null_literal, NullLiteral::Null);
        assert_eq!(config.loaded_from(), Some(file.path()));
        let sources = config.config_sources();
        assert!(sources["context_window"].is_file());
        assert!(sources["extra_denylist"].is_file());
        assert!(sources["null_literal"].is_default());
        assert!(sources["keyword_match"].is_default());
    }

    #[test]
    #[serial]
    fn test_env_beats_file_in_sources() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "context_window: 30").unwrap();
        env::set_var(ENV_CONTEXT_WINDOW, "70");

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.context_window, 70);
        assert!(config.config_sources()["context_window"].is_env_var());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_empty_file_uses_defaults() {
        clear_env();
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.context_window, 50);
    }

    #[test]
    #[serial]
    fn test_load_invalid_yaml_file() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "context_window: [not, a, number]").unwrap();
        assert!(matches!(
            EngineConfig::load(file.path()),
            Err(ConfigError::Yaml(_))
        ));
    }
}
