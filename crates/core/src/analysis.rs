//! Editor-facing analysis of a whole template
//!
//! Ambiguities are reported as hints and never stop analysis.

use crate::classifier::{infer_from_name, ContextClassifier};
use crate::context::{InputWidget, ParameterContext, SqlContext};
use crate::scanner::{unique_names, PlaceholderScanner, PlaceholderSyntax};
use serde::Serialize;

/// Soft warning about how a parameter was classified
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextHint {
    /// No SQL context matched, the name decided
    NoStructuralContext,
    /// Occurrences disagree; the first one was used
    ConflictingContexts { contexts: Vec<SqlContext> },
    /// The same name is written in more than one placeholder syntax
    MixedSyntax { syntaxes: Vec<PlaceholderSyntax> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzedParameter {
    pub name: String,
    pub context: ParameterContext,
    pub widget: InputWidget,
    pub occurrences: usize,
    pub syntaxes: Vec<PlaceholderSyntax>,
    pub hints: Vec<ContextHint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateAnalysis {
    pub parameters: Vec<AnalyzedParameter>,
}

impl TemplateAnalysis {
    pub fn names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&AnalyzedParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn has_hints(&self) -> bool {
        self.parameters.iter().any(|p| !p.hints.is_empty())
    }
}

/// Scan and classify every parameter of `template`
pub fn analyze_with(
    scanner: &PlaceholderScanner,
    classifier: &ContextClassifier,
    template: &str,
) -> TemplateAnalysis {
    let occurrences = scanner.occurrences(template);

    let parameters = unique_names(&occurrences)
        .into_iter()
        .map(|name| {
            let own: Vec<_> = occurrences
                .iter()
                .filter(|p| !p.escaped && p.name == name)
                .collect();

            let mut syntaxes: Vec<PlaceholderSyntax> = own.iter().map(|p| p.syntax).collect();
            syntaxes.sort();
            syntaxes.dedup();

            let structural: Vec<ParameterContext> = classifier
                .occurrence_contexts(template, &name, &occurrences)
                .into_iter()
                .flatten()
                .collect();

            let mut contexts: Vec<SqlContext> = Vec::new();
            for context in &structural {
                if !contexts.contains(&context.sql_context) {
                    contexts.push(context.sql_context);
                }
            }

            let context = match structural.first() {
                Some(context) => context.clone(),
                None => ParameterContext::from_name(infer_from_name(&name)),
            };

            let mut hints = Vec::new();
            if structural.is_empty() {
                hints.push(ContextHint::NoStructuralContext);
            }
            if contexts.len() > 1 {
                hints.push(ContextHint::ConflictingContexts { contexts });
            }
            if syntaxes.len() > 1 {
                hints.push(ContextHint::MixedSyntax {
                    syntaxes: syntaxes.clone(),
                });
            }
            if !hints.is_empty() {
                tracing::debug!(parameter = %name, hints = ?hints, "Ambiguous parameter context");
            }

            AnalyzedParameter {
                widget: context.widget(),
                occurrences: own.len(),
                name,
                context,
                syntaxes,
                hints,
            }
        })
        .collect();

    TemplateAnalysis { parameters }
}

/// Analyze with the default scanner and classifier
pub fn analyze(template: &str) -> TemplateAnalysis {
    let classifier = ContextClassifier::default();
    analyze_with(&PlaceholderScanner::default(), &classifier, template)
}
