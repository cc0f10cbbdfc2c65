//! SQL template parameter engine
//!
//! Finds `{{name}}`, `:name` and `$name` placeholders in SQL text, infers how
//! each one is used (`LIKE`, `IN`, `VALUES`, `BETWEEN`, comparison), formats
//! supplied values into escaped SQL literals for that usage and rewrites the
//! template. Everything here is synchronous and free of I/O apart from
//! loading an optional configuration file.

pub mod analysis;
pub mod autopopulate;
pub mod classifier;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod scanner;
pub mod security;
pub mod substitution;
pub mod value;

pub use analysis::{analyze, AnalyzedParameter, ContextHint, TemplateAnalysis};
pub use autopopulate::{merge, MergedValue, MergedValues, ValueSource};
pub use classifier::{classify, infer_from_name, ContextClassifier, DEFAULT_CONTEXT_WINDOW};
pub use config::{ConfigError, ConfigSource, EngineConfig};
pub use context::{ContextSource, InputWidget, ParameterContext, SqlContext, ValueType};
pub use engine::TemplateEngine;
pub use error::{TemplateError, TemplateResult};
pub use formatter::{format_value, NullLiteral, ValueFormatter};
pub use scanner::{scan, scan_occurrences, Placeholder, PlaceholderScanner, PlaceholderSyntax};
pub use security::{escape_and_guard, escape_literal, DangerousKeyword, InjectionGuard, KeywordMatch};
pub use substitution::{substitute, ParameterValues, SubstitutionEngine};
pub use value::{ParameterValue, ValueRange};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version() -> &'static str {
    VERSION
}
