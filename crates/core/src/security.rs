//! Injection guard for string values
//!
//! String values are escaped by doubling single quotes, then the upper-cased
//! result is checked against a keyword denylist. A hit rejects the whole
//! substitution. The check is heuristic and does not replace parameter
//! binding in the database driver.

use crate::config::ConfigError;
use crate::error::{TemplateError, TemplateResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Statement keywords that are never allowed inside a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DangerousKeyword {
    Drop,
    DeleteFrom,
    InsertInto,
    Update,
    Alter,
    Create,
    Exec,
    Execute,
    Truncate,
    Grant,
    Revoke,
}

impl DangerousKeyword {
    pub const ALL: [DangerousKeyword; 11] = [
        DangerousKeyword::Drop,
        DangerousKeyword::DeleteFrom,
        DangerousKeyword::InsertInto,
        DangerousKeyword::Update,
        DangerousKeyword::Alter,
        DangerousKeyword::Create,
        DangerousKeyword::Exec,
        DangerousKeyword::Execute,
        DangerousKeyword::Truncate,
        DangerousKeyword::Grant,
        DangerousKeyword::Revoke,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DangerousKeyword::Drop => "DROP",
            DangerousKeyword::DeleteFrom => "DELETE FROM",
            DangerousKeyword::InsertInto => "INSERT INTO",
            DangerousKeyword::Update => "UPDATE",
            DangerousKeyword::Alter => "ALTER",
            DangerousKeyword::Create => "CREATE",
            DangerousKeyword::Exec => "EXEC",
            DangerousKeyword::Execute => "EXECUTE",
            DangerousKeyword::Truncate => "TRUNCATE",
            DangerousKeyword::Grant => "GRANT",
            DangerousKeyword::Revoke => "REVOKE",
        }
    }
}

/// How denylisted keywords are matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordMatch {
    /// Anywhere in the value, so `UPDATED` also trips `UPDATE`
    #[default]
    Substring,
    /// Only where the keyword is not part of a longer word
    WholeWord,
}

impl FromStr for KeywordMatch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "substring" => Ok(KeywordMatch::Substring),
            "whole_word" | "word" => Ok(KeywordMatch::WholeWord),
            _ => Err(ConfigError::invalid_value(
                "keyword_match",
                s,
                "substring or whole_word",
            )),
        }
    }
}

/// Double single quotes so the text can sit inside a SQL string literal
pub fn escape_literal(raw: &str) -> String {
    raw.replace('\'', "''")
}

/// Escapes string values and rejects denylisted keywords
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionGuard {
    keywords: Vec<String>,
    mode: KeywordMatch,
}

impl InjectionGuard {
    /// Guard with the built-in denylist
    pub fn new() -> Self {
        Self {
            keywords: DangerousKeyword::ALL
                .iter()
                .map(|k| k.as_str().to_string())
                .collect(),
            mode: KeywordMatch::Substring,
        }
    }

    /// Extend the denylist
    pub fn with_extra_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_uppercase();
            if !keyword.is_empty() && !self.keywords.contains(&keyword) {
                self.keywords.push(keyword);
            }
        }
        self
    }

    pub fn with_mode(mut self, mode: KeywordMatch) -> Self {
        self.mode = mode;
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// First denylisted keyword found in `text`, case-insensitively
    pub fn find_keyword(&self, text: &str) -> Option<&str> {
        let upper = text.to_uppercase();
        self.keywords
            .iter()
            .find(|keyword| match self.mode {
                KeywordMatch::Substring => upper.contains(keyword.as_str()),
                KeywordMatch::WholeWord => contains_word(&upper, keyword),
            })
            .map(String::as_str)
    }

    /// Fail if an already escaped value contains a denylisted keyword
    pub fn check(&self, escaped: &str, parameter: &str) -> TemplateResult<()> {
        match self.find_keyword(escaped) {
            Some(keyword) => {
                tracing::warn!(
                    parameter,
                    keyword,
                    "Rejected parameter value containing a denylisted keyword"
                );
                Err(TemplateError::dangerous_input(keyword, parameter))
            }
            None => Ok(()),
        }
    }

    /// Escape `raw` and check the result
    pub fn escape_and_guard(&self, raw: &str, parameter: &str) -> TemplateResult<String> {
        let escaped = escape_literal(raw);
        self.check(&escaped, parameter)?;
        Ok(escaped)
    }

    /// Escape, check and wrap in single quotes
    pub fn quote(&self, raw: &str, parameter: &str) -> TemplateResult<String> {
        self.escape_and_guard(raw, parameter)
            .map(|escaped| format!("'{}'", escaped))
    }
}

impl Default for InjectionGuard {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_word(haystack: &str, word: &str) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    haystack.match_indices(word).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(is_word) && !after.is_some_and(is_word)
    })
}

/// Escape and guard with the built-in denylist
pub fn escape_and_guard(raw: &str, parameter: &str) -> TemplateResult<String> {
    InjectionGuard::default().escape_and_guard(raw, parameter)
}
