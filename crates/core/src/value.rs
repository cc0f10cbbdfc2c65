//! Values bound to template parameters by the caller

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// A value supplied for a parameter, either typed by the user or auto-populated
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Null,
    Text(String),
    Number(Number),
    Bool(bool),
    List(Vec<ParameterValue>),
    Range(Box<ValueRange>),
}

/// Bounds for `BETWEEN` parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueRange {
    pub start: ParameterValue,
    pub end: ParameterValue,
}

impl ParameterValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn range(start: impl Into<ParameterValue>, end: impl Into<ParameterValue>) -> Self {
        Self::Range(Box::new(ValueRange {
            start: start.into(),
            end: end.into(),
        }))
    }

    pub fn list<T: Into<ParameterValue>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Null, empty strings and empty lists count as "no value"
    pub fn is_absent(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Plain, unquoted text form of the value
    pub fn to_plain_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::List(items) => items
                .iter()
                .map(ParameterValue::to_plain_string)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Range(range) => format!(
                "{} - {}",
                range.start.to_plain_string(),
                range.end.to_plain_string()
            ),
        }
    }
}

impl From<Value> for ParameterValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(mut map) => {
                if map.contains_key("start") || map.contains_key("end") {
                    let start = map.remove("start").map(Self::from).unwrap_or(Self::Null);
                    let end = map.remove("end").map(Self::from).unwrap_or(Self::Null);
                    Self::range(start, end)
                } else {
                    // Unknown objects still go through quoting and the guard
                    Self::Text(Value::Object(map).to_string())
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for ParameterValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map(Self::Number).unwrap_or(Self::Null)
    }
}

impl<T: Into<ParameterValue>> From<Option<T>> for ParameterValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

impl<T: Into<ParameterValue>> From<Vec<T>> for ParameterValue {
    fn from(value: Vec<T>) -> Self {
        Self::list(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_values() {
        assert!(ParameterValue::Null.is_absent());
        assert!(ParameterValue::text("").is_absent());
        assert!(ParameterValue::List(vec![]).is_absent());
        assert!(!ParameterValue::text(" ").is_absent());
        assert!(!ParameterValue::from(0).is_absent());
        assert!(!ParameterValue::from(false).is_absent());
    }

    #[test]
    fn test_from_json_shapes() {
        let value: ParameterValue = json!(["B001", 2, true, null]).into();
        assert_eq!(
            value,
            ParameterValue::List(vec![
                ParameterValue::text("B001"),
                ParameterValue::from(2),
                ParameterValue::Bool(true),
                ParameterValue::Null,
            ])
        );

        let range: ParameterValue = json!({"start": "2024-01-01", "end": "2024-01-31"}).into();
        assert_eq!(range, ParameterValue::range("2024-01-01", "2024-01-31"));
    }

    #[test]
    fn test_half_open_range_and_plain_object() {
        let range: ParameterValue = json!({"start": "2024-01-01"}).into();
        assert_eq!(range, ParameterValue::range("2024-01-01", ParameterValue::Null));

        let object: ParameterValue = json!({"brand": "Supergoop"}).into();
        assert_eq!(object, ParameterValue::text(r#"{"brand":"Supergoop"}"#));
    }

    #[test]
    fn test_deserialize_map_of_values() {
        let values: std::collections::HashMap<String, ParameterValue> =
            serde_json::from_str(r#"{"min_price": 100, "asins": ["B1", "B2"]}"#).unwrap();
        assert_eq!(values["min_price"], ParameterValue::from(100));
        assert!(values["asins"].is_list());
    }

    #[test]
    fn test_serialize_is_untagged() {
        let value = ParameterValue::range("a", 3);
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({"start": "a", "end": 3})
        );
        assert_eq!(serde_json::to_value(ParameterValue::Null).unwrap(), json!(null));
    }

    #[test]
    fn test_non_finite_float_becomes_null() {
        assert_eq!(ParameterValue::from(f64::NAN), ParameterValue::Null);
        assert_eq!(ParameterValue::from(1.5).to_plain_string(), "1.5");
    }
}
