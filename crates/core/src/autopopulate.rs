//! Merging externally supplied defaults with values the user typed
//!
//! A manual value always wins unless it is absent (`null`, `""` or `[]`).
//! Fetching the defaults is the caller's job.

use crate::substitution::ParameterValues;
use crate::value::ParameterValue;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Where a merged value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    Manual,
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedValue {
    pub value: ParameterValue,
    pub source: ValueSource,
}

impl MergedValue {
    pub fn manual(value: ParameterValue) -> Self {
        Self {
            value,
            source: ValueSource::Manual,
        }
    }

    pub fn auto(value: ParameterValue) -> Self {
        Self {
            value: flatten_default(value),
            source: ValueSource::Auto,
        }
    }

    pub fn is_auto_populated(&self) -> bool {
        self.source == ValueSource::Auto
    }
}

/// Merge result keyed by parameter name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MergedValues(BTreeMap<String, MergedValue>);

impl MergedValues {
    pub fn get(&self, name: &str) -> Option<&MergedValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MergedValue)> {
        self.0.iter()
    }

    /// Names whose value came from the defaults
    pub fn auto_populated(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, merged)| merged.is_auto_populated())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Plain values ready for substitution
    pub fn into_values(self) -> ParameterValues {
        self.0
            .into_iter()
            .map(|(name, merged)| (name, merged.value))
            .collect()
    }
}

/// Pick between a default and a manual value for one name
fn resolve(default: Option<&ParameterValue>, manual: Option<&ParameterValue>) -> Option<MergedValue> {
    match (manual, default) {
        (Some(manual), _) if !manual.is_absent() => Some(MergedValue::manual(manual.clone())),
        (_, Some(default)) => Some(MergedValue::auto(default.clone())),
        _ => None,
    }
}

/// Lists of lists become one list without duplicates, first seen order kept
fn flatten_default(value: ParameterValue) -> ParameterValue {
    let ParameterValue::List(items) = value else {
        return value;
    };

    let mut flat: Vec<ParameterValue> = Vec::with_capacity(items.len());
    for item in items {
        let nested = match item {
            ParameterValue::List(inner) => inner,
            other => vec![other],
        };
        for value in nested {
            if !flat.contains(&value) {
                flat.push(value);
            }
        }
    }
    ParameterValue::List(flat)
}

/// Merge `defaults` with `manual`, preferring non-absent manual values
pub fn merge(
    defaults: &HashMap<String, ParameterValue>,
    manual: &HashMap<String, ParameterValue>,
) -> MergedValues {
    let mut merged = BTreeMap::new();

    for name in defaults.keys().chain(manual.keys()) {
        if merged.contains_key(name) {
            continue;
        }
        if let Some(value) = resolve(defaults.get(name), manual.get(name)) {
            if value.is_auto_populated() {
                tracing::trace!(parameter = %name, "Auto-populated from defaults");
            }
            merged.insert(name.clone(), value);
        }
    }

    MergedValues(merged)
}
