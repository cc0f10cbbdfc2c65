//! Configured entry point tying the components together

use crate::analysis::{analyze_with, TemplateAnalysis};
use crate::autopopulate::{merge, MergedValues};
use crate::classifier::ContextClassifier;
use crate::config::EngineConfig;
use crate::context::ParameterContext;
use crate::error::TemplateResult;
use crate::formatter::ValueFormatter;
use crate::scanner::{Placeholder, PlaceholderScanner};
use crate::security::InjectionGuard;
use crate::substitution::{ParameterValues, SubstitutionEngine};
use crate::value::ParameterValue;

/// Template engine built from an [`EngineConfig`]
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    config: EngineConfig,
    substitution: SubstitutionEngine,
}

impl TemplateEngine {
    /// Validate `config` and build the components it describes
    pub fn new(config: EngineConfig) -> TemplateResult<Self> {
        config.validate()?;

        let scanner = PlaceholderScanner::new(config.escape_char);
        let classifier = ContextClassifier::new(scanner, config.context_window);
        let guard = InjectionGuard::new()
            .with_extra_keywords(&config.extra_denylist)
            .with_mode(config.keyword_match);
        let formatter = ValueFormatter::new(config.null_literal, guard);

        tracing::debug!(
            context_window = config.context_window,
            escape_char = %config.escape_char,
            null_literal = config.null_literal.as_sql(),
            extra_keywords = config.extra_denylist.len(),
            "Template engine configured"
        );

        Ok(Self {
            config,
            substitution: SubstitutionEngine::new(scanner, classifier, formatter),
        })
    }

    /// Engine configured from `SQLPARAM_*` environment variables
    pub fn from_env() -> TemplateResult<Self> {
        Self::new(EngineConfig::from_env()?)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn guard(&self) -> &InjectionGuard {
        self.substitution.formatter().guard()
    }

    /// Unique parameter names in order of first appearance
    pub fn scan(&self, template: &str) -> Vec<String> {
        self.substitution.scanner().names(template)
    }

    /// Every placeholder occurrence, escaped ones included
    pub fn occurrences(&self, template: &str) -> Vec<Placeholder> {
        self.substitution.scanner().occurrences(template)
    }

    pub fn classify(&self, template: &str, name: &str) -> ParameterContext {
        self.substitution.classifier().classify(template, name)
    }

    pub fn analyze(&self, template: &str) -> TemplateAnalysis {
        analyze_with(
            self.substitution.scanner(),
            self.substitution.classifier(),
            template,
        )
    }

    pub fn format(
        &self,
        name: &str,
        value: &ParameterValue,
        context: &ParameterContext,
    ) -> TemplateResult<String> {
        self.substitution.formatter().format(name, value, context)
    }

    pub fn escape_and_guard(&self, raw: &str, parameter: &str) -> TemplateResult<String> {
        self.guard().escape_and_guard(raw, parameter)
    }

    pub fn missing_parameters(&self, template: &str, values: &ParameterValues) -> Vec<String> {
        self.substitution.missing_parameters(template, values)
    }

    pub fn substitute(&self, template: &str, values: &ParameterValues) -> TemplateResult<String> {
        self.substitution.substitute(template, values)
    }

    /// Merge `defaults` under `manual` and substitute the result
    pub fn render(
        &self,
        template: &str,
        defaults: &ParameterValues,
        manual: &ParameterValues,
    ) -> TemplateResult<(String, MergedValues)> {
        let merged = merge(defaults, manual);
        let sql = self.substitute(template, &merged.clone().into_values())?;
        Ok((sql, merged))
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            substitution: SubstitutionEngine::default(),
        }
    }
}
