//! Value formatting
//!
//! Turns a [`ParameterValue`] into the SQL literal fragment substituted for a
//! placeholder in a given [`ParameterContext`]. Every string that ends up
//! quoted passes through the [`InjectionGuard`] first.

use crate::config::ConfigError;
use crate::context::{ParameterContext, SqlContext, ValueType};
use crate::error::TemplateResult;
use crate::security::InjectionGuard;
use crate::value::ParameterValue;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Literal emitted for null and empty values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullLiteral {
    /// `NULL`
    #[default]
    Null,
    /// `''`, for forms that explicitly want an empty string
    EmptyString,
}

impl NullLiteral {
    pub fn as_sql(&self) -> &'static str {
        match self {
            NullLiteral::Null => "NULL",
            NullLiteral::EmptyString => "''",
        }
    }
}

impl FromStr for NullLiteral {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "null" => Ok(NullLiteral::Null),
            "empty" | "empty_string" | "''" => Ok(NullLiteral::EmptyString),
            _ => Err(ConfigError::invalid_value(
                "null_literal",
                s,
                "null or empty_string",
            )),
        }
    }
}

/// Renders parameter values as SQL literals
#[derive(Debug, Clone, Default)]
pub struct ValueFormatter {
    null_literal: NullLiteral,
    guard: InjectionGuard,
}

impl ValueFormatter {
    pub fn new(null_literal: NullLiteral, guard: InjectionGuard) -> Self {
        Self {
            null_literal,
            guard,
        }
    }

    pub fn guard(&self) -> &InjectionGuard {
        &self.guard
    }

    pub fn null_literal(&self) -> NullLiteral {
        self.null_literal
    }

    /// Format `value` for parameter `name` used in `context`
    pub fn format(
        &self,
        name: &str,
        value: &ParameterValue,
        context: &ParameterContext,
    ) -> TemplateResult<String> {
        let list_context = matches!(context.sql_context, SqlContext::In | SqlContext::Values);

        if value.is_absent() {
            if value.is_list() && list_context {
                return Ok(self.empty_list(context.wrapped));
            }
            return Ok(self.null_literal.as_sql().to_string());
        }

        match context.sql_context {
            SqlContext::Like => self.format_like(name, value, context),
            SqlContext::In => self.format_list(name, value, context.wrapped),
            SqlContext::Values => self.format_rows(name, value, context.wrapped),
            SqlContext::Between if context.wrapped => self.format_lower_bound(name, value),
            SqlContext::Between => self.format_between(name, value),
            SqlContext::Comparison | SqlContext::Equals => {
                self.format_scalar_slot(name, value, context)
            }
        }
    }

    fn format_like(
        &self,
        name: &str,
        value: &ParameterValue,
        context: &ParameterContext,
    ) -> TemplateResult<String> {
        match value {
            ParameterValue::List(_) => self.format_list(name, value, context.wrapped),
            _ => {
                let text = value.to_plain_string();
                let core = text.trim_matches(|c: char| c == '\'' || c == '%');
                let escaped = self.guard.escape_and_guard(core, name)?;
                Ok(format!("'%{}%'", escaped))
            }
        }
    }

    fn format_list(&self, name: &str, value: &ParameterValue, wrapped: bool) -> TemplateResult<String> {
        let items = list_items(value);
        if items.is_empty() {
            return Ok(self.empty_list(wrapped));
        }

        let rendered = items
            .iter()
            .map(|item| self.item_literal(name, item))
            .collect::<TemplateResult<Vec<_>>>()?
            .join(", ");

        Ok(if wrapped {
            rendered
        } else {
            format!("({})", rendered)
        })
    }

    fn format_rows(&self, name: &str, value: &ParameterValue, wrapped: bool) -> TemplateResult<String> {
        let items = list_items(value);
        if items.is_empty() {
            return Ok(self.empty_list(wrapped));
        }

        let rows = items
            .iter()
            .map(|item| self.item_literal(name, item))
            .collect::<TemplateResult<Vec<_>>>()?;

        Ok(if wrapped {
            rows.join("),\n(")
        } else {
            rows.iter()
                .map(|row| format!("({})", row))
                .collect::<Vec<_>>()
                .join(",\n")
        })
    }

    fn format_between(&self, name: &str, value: &ParameterValue) -> TemplateResult<String> {
        let (start, end) = match value {
            ParameterValue::Range(range) => (&range.start, &range.end),
            ParameterValue::List(items) if items.len() == 2 => (&items[0], &items[1]),
            ParameterValue::List(_) => return self.format_list(name, value, false),
            scalar => (scalar, scalar),
        };

        Ok(format!(
            "{} AND {}",
            self.item_literal(name, start)?,
            self.item_literal(name, end)?
        ))
    }

    /// Only the first bound; the template writes `AND <upper>` itself
    fn format_lower_bound(&self, name: &str, value: &ParameterValue) -> TemplateResult<String> {
        match value {
            ParameterValue::Range(range) => self.item_literal(name, &range.start),
            ParameterValue::List(items) => match items.first() {
                Some(first) => self.item_literal(name, first),
                None => Ok(self.null_literal.as_sql().to_string()),
            },
            scalar => self.item_literal(name, scalar),
        }
    }

    fn format_scalar_slot(
        &self,
        name: &str,
        value: &ParameterValue,
        context: &ParameterContext,
    ) -> TemplateResult<String> {
        match value {
            ParameterValue::List(_) => self.format_list(name, value, context.wrapped),
            ParameterValue::Range(_) => self.format_between(name, value),
            ParameterValue::Text(text) => match context.value_type {
                ValueType::Number if is_numeric(text) => Ok(text.trim().to_string()),
                ValueType::Boolean if text.trim().eq_ignore_ascii_case("true") => {
                    Ok("TRUE".to_string())
                }
                ValueType::Boolean if text.trim().eq_ignore_ascii_case("false") => {
                    Ok("FALSE".to_string())
                }
                _ => self.guard.quote(text, name),
            },
            other => self.item_literal(name, other),
        }
    }

    /// Literal for a single list item or range bound
    fn item_literal(&self, name: &str, item: &ParameterValue) -> TemplateResult<String> {
        match item {
            ParameterValue::Null => Ok(self.null_literal.as_sql().to_string()),
            ParameterValue::Number(n) => Ok(n.to_string()),
            ParameterValue::Bool(true) => Ok("TRUE".to_string()),
            ParameterValue::Bool(false) => Ok("FALSE".to_string()),
            ParameterValue::Text(text) => self.guard.quote(text, name),
            nested => self.guard.quote(&nested.to_plain_string(), name),
        }
    }

    fn empty_list(&self, wrapped: bool) -> String {
        if wrapped {
            "NULL".to_string()
        } else {
            "(NULL)".to_string()
        }
    }
}

/// Items of a list value; a single string is read as comma-separated
fn list_items(value: &ParameterValue) -> Vec<ParameterValue> {
    match value {
        ParameterValue::List(items) => items.clone(),
        ParameterValue::Text(text) => text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ParameterValue::text)
            .collect(),
        ParameterValue::Range(range) => vec![range.start.clone(), range.end.clone()],
        ParameterValue::Null => Vec::new(),
        scalar => vec![scalar.clone()],
    }
}

fn is_numeric(text: &str) -> bool {
    text.trim().parse::<f64>().is_ok_and(f64::is_finite)
}

/// Format with the default null literal and denylist
pub fn format_value(
    name: &str,
    value: &ParameterValue,
    context: &ParameterContext,
) -> TemplateResult<String> {
    ValueFormatter::default().format(name, value, context)
}
