//! Inferred usage of a parameter and the input widget it maps to

use serde::Serialize;
use std::fmt;

/// SQL construct that consumes a placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SqlContext {
    Like,
    In,
    Values,
    Between,
    Comparison,
    Equals,
}

impl SqlContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlContext::Like => "LIKE",
            SqlContext::In => "IN",
            SqlContext::Values => "VALUES",
            SqlContext::Between => "BETWEEN",
            SqlContext::Comparison => "COMPARISON",
            SqlContext::Equals => "EQUALS",
        }
    }
}

impl fmt::Display for SqlContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of value a parameter expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Text,
    Number,
    Date,
    DateRange,
    List,
    Pattern,
    Boolean,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Text => "text",
            ValueType::Number => "number",
            ValueType::Date => "date",
            ValueType::DateRange => "date_range",
            ValueType::List => "list",
            ValueType::Pattern => "pattern",
            ValueType::Boolean => "boolean",
        }
    }

    /// Input widget an editor should render for this type
    pub fn widget(&self) -> InputWidget {
        match self {
            ValueType::Text => InputWidget::TextInput,
            ValueType::Number => InputWidget::NumberInput,
            ValueType::Date => InputWidget::DatePicker,
            ValueType::DateRange => InputWidget::DateRangePicker,
            ValueType::List => InputWidget::MultiValue,
            ValueType::Pattern => InputWidget::PatternInput,
            ValueType::Boolean => InputWidget::Toggle,
        }
    }

    fn format_hint(&self) -> &'static str {
        match self {
            ValueType::Text => "Plain text, quoted automatically",
            ValueType::Number => "Numeric value, inserted without quotes",
            ValueType::Date => "Date as YYYY-MM-DD",
            ValueType::DateRange => "Start and end date",
            ValueType::List => "Comma-separated values",
            ValueType::Pattern => "Search text, wrapped in % wildcards",
            ValueType::Boolean => "true or false",
        }
    }

    fn example_value(&self) -> &'static str {
        match self {
            ValueType::Text => "Supergoop",
            ValueType::Number => "100",
            ValueType::Date => "2024-01-31",
            ValueType::DateRange => "2024-01-01 to 2024-01-31",
            ValueType::List => "B001, B002, B003",
            ValueType::Pattern => "Supergoop",
            ValueType::Boolean => "true",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editor widget for a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputWidget {
    TextInput,
    NumberInput,
    DatePicker,
    DateRangePicker,
    MultiValue,
    PatternInput,
    Toggle,
}

/// How a context was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    /// Matched SQL text around the placeholder
    Structural,
    /// Guessed from the parameter name
    NameHeuristic,
}

/// Inferred usage of one parameter in one analysis pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterContext {
    pub sql_context: SqlContext,
    pub value_type: ValueType,
    pub source: ContextSource,
    /// The template already puts parentheses around the placeholder, or for
    /// `BETWEEN` already writes the `AND` and upper bound after it
    pub wrapped: bool,
    pub format_hint: &'static str,
    pub example_value: &'static str,
}

impl ParameterContext {
    pub fn new(sql_context: SqlContext, value_type: ValueType, source: ContextSource) -> Self {
        let (format_hint, example_value) = match sql_context {
            SqlContext::Values => ("One value per row", "B001, B002"),
            _ => (value_type.format_hint(), value_type.example_value()),
        };

        Self {
            sql_context,
            value_type,
            source,
            wrapped: false,
            format_hint,
            example_value,
        }
    }

    pub fn structural(sql_context: SqlContext, value_type: ValueType) -> Self {
        Self::new(sql_context, value_type, ContextSource::Structural)
    }

    pub fn from_name(value_type: ValueType) -> Self {
        Self::new(SqlContext::Equals, value_type, ContextSource::NameHeuristic)
    }

    pub fn wrapped(mut self, wrapped: bool) -> Self {
        self.wrapped = wrapped;
        self
    }

    pub fn widget(&self) -> InputWidget {
        self.value_type.widget()
    }

    pub fn is_structural(&self) -> bool {
        self.source == ContextSource::Structural
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_mapping() {
        assert_eq!(ValueType::Pattern.widget(), InputWidget::PatternInput);
        assert_eq!(ValueType::DateRange.widget(), InputWidget::DateRangePicker);
        assert_eq!(ValueType::List.widget(), InputWidget::MultiValue);
        assert_eq!(ValueType::Boolean.widget(), InputWidget::Toggle);
    }

    #[test]
    fn test_context_serialization() {
        let ctx = ParameterContext::structural(SqlContext::Like, ValueType::Pattern);
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["sql_context"], "LIKE");
        assert_eq!(json["value_type"], "pattern");
        assert_eq!(json["source"], "structural");
        assert_eq!(json["wrapped"], false);
    }

    #[test]
    fn test_name_fallback_uses_equals() {
        let ctx = ParameterContext::from_name(ValueType::Number);
        assert_eq!(ctx.sql_context, SqlContext::Equals);
        assert!(!ctx.is_structural());
        assert_eq!(ctx.example_value, "100");
    }
}
