//! Template substitution
//!
//! All or nothing: every referenced parameter must have a value, each value is
//! classified against the unmodified template, and the output is produced in a
//! single left-to-right pass so substituted text is never rescanned.

use crate::classifier::ContextClassifier;
use crate::error::{TemplateError, TemplateResult};
use crate::formatter::ValueFormatter;
use crate::scanner::{unique_names, Placeholder, PlaceholderScanner};
use crate::value::ParameterValue;
use std::collections::HashMap;

/// Values keyed by parameter name
pub type ParameterValues = HashMap<String, ParameterValue>;

/// Rewrites templates into final SQL
#[derive(Debug, Clone, Default)]
pub struct SubstitutionEngine {
    scanner: PlaceholderScanner,
    classifier: ContextClassifier,
    formatter: ValueFormatter,
}

impl SubstitutionEngine {
    pub fn new(
        scanner: PlaceholderScanner,
        classifier: ContextClassifier,
        formatter: ValueFormatter,
    ) -> Self {
        Self {
            scanner,
            classifier,
            formatter,
        }
    }

    pub fn scanner(&self) -> &PlaceholderScanner {
        &self.scanner
    }

    pub fn classifier(&self) -> &ContextClassifier {
        &self.classifier
    }

    pub fn formatter(&self) -> &ValueFormatter {
        &self.formatter
    }

    /// Referenced names that have no entry in `values`, in template order
    pub fn missing_parameters(&self, template: &str, values: &ParameterValues) -> Vec<String> {
        self.scanner
            .names(template)
            .into_iter()
            .filter(|name| !values.contains_key(name))
            .collect()
    }

    /// Replace every placeholder in `template` with its formatted value
    pub fn substitute(&self, template: &str, values: &ParameterValues) -> TemplateResult<String> {
        let occurrences = self.scanner.occurrences(template);
        let names = unique_names(&occurrences);

        let missing: Vec<String> = names
            .iter()
            .filter(|name| !values.contains_key(*name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            tracing::debug!(missing = ?missing, "Substitution blocked by missing parameters");
            return Err(TemplateError::missing_parameter(missing));
        }

        for name in values.keys().filter(|name| !names.contains(*name)) {
            tracing::trace!(parameter = %name, "Ignoring value for unreferenced parameter");
        }

        let mut literals = HashMap::with_capacity(names.len());
        for name in &names {
            let context = self.classifier.classify_among(template, name, &occurrences);
            let literal = self.formatter.format(name, &values[name], &context)?;
            tracing::trace!(
                parameter = %name,
                sql_context = %context.sql_context,
                literal = %literal,
                "Formatted parameter"
            );
            literals.insert(name.as_str(), literal);
        }

        Ok(self.rewrite(template, &occurrences, &literals))
    }

    fn rewrite(
        &self,
        template: &str,
        occurrences: &[Placeholder],
        literals: &HashMap<&str, String>,
    ) -> String {
        let escape_len = self.scanner.escape_char().len_utf8();
        let mut output = String::with_capacity(template.len());
        let mut cursor = 0;

        for placeholder in occurrences {
            if placeholder.escaped {
                output.push_str(&template[cursor..placeholder.span.start - escape_len]);
                output.push_str(&template[placeholder.span.clone()]);
            } else {
                output.push_str(&template[cursor..placeholder.span.start]);
                if let Some(literal) = literals.get(placeholder.name.as_str()) {
                    output.push_str(literal);
                }
            }
            cursor = placeholder.span.end;
        }

        output.push_str(&template[cursor..]);
        output
    }
}

/// Substitute with the default engine settings
pub fn substitute(template: &str, values: &ParameterValues) -> TemplateResult<String> {
    SubstitutionEngine::default().substitute(template, values)
}
