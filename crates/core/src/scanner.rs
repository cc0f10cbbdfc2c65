//! Placeholder detection
//!
//! Three syntaxes are recognized: `{{name}}`, `:name` and `$name`. Names are
//! identifiers (`[A-Za-z_]\w*`), so positional `$1` markers and clock values
//! such as `10:30` are left alone, as are PostgreSQL `::type` casts. A
//! placeholder preceded by the escape marker is reported as escaped and is not
//! a parameter.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

/// Default escape marker
pub const DEFAULT_ESCAPE_CHAR: char = '\\';

/// Placeholder syntax an occurrence was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderSyntax {
    /// `{{name}}`
    Brace,
    /// `:name`
    Colon,
    /// `$name`
    Dollar,
}

impl PlaceholderSyntax {
    /// Render a placeholder for `name` in this syntax
    pub fn render(&self, name: &str) -> String {
        match self {
            PlaceholderSyntax::Brace => format!("{{{{{}}}}}", name),
            PlaceholderSyntax::Colon => format!(":{}", name),
            PlaceholderSyntax::Dollar => format!("${}", name),
        }
    }
}

impl fmt::Display for PlaceholderSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render("name"))
    }
}

/// One textual occurrence of a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub syntax: PlaceholderSyntax,
    /// Byte range of the placeholder text, excluding any escape marker
    pub span: Range<usize>,
    /// Preceded by the escape marker
    pub escaped: bool,
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_]\w*)\s*\}\}|:([A-Za-z_]\w*)|\$([A-Za-z_]\w*)")
            .expect("placeholder pattern is valid")
    })
}

/// Finds placeholders in template text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderScanner {
    escape_char: char,
}

impl PlaceholderScanner {
    pub fn new(escape_char: char) -> Self {
        Self { escape_char }
    }

    pub fn escape_char(&self) -> char {
        self.escape_char
    }

    /// Every placeholder occurrence, escaped ones included, in text order
    pub fn occurrences(&self, template: &str) -> Vec<Placeholder> {
        let mut found = Vec::new();

        for caps in placeholder_regex().captures_iter(template) {
            let (syntax, name) = if let Some(m) = caps.get(1) {
                (PlaceholderSyntax::Brace, m)
            } else if let Some(m) = caps.get(2) {
                (PlaceholderSyntax::Colon, m)
            } else if let Some(m) = caps.get(3) {
                (PlaceholderSyntax::Dollar, m)
            } else {
                continue;
            };
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(name.range());
            let preceding = template[..whole.start].chars().next_back();

            if syntax == PlaceholderSyntax::Colon && preceding == Some(':') {
                continue;
            }

            found.push(Placeholder {
                name: name.as_str().to_string(),
                syntax,
                span: whole,
                escaped: preceding == Some(self.escape_char),
            });
        }

        found
    }

    /// Unique parameter names in order of first appearance
    pub fn names(&self, template: &str) -> Vec<String> {
        unique_names(&self.occurrences(template))
    }
}

impl Default for PlaceholderScanner {
    fn default() -> Self {
        Self::new(DEFAULT_ESCAPE_CHAR)
    }
}

/// Unique names of the non-escaped occurrences, first appearance wins
pub fn unique_names(occurrences: &[Placeholder]) -> Vec<String> {
    let mut seen = HashSet::new();
    occurrences
        .iter()
        .filter(|p| !p.escaped)
        .filter(|p| seen.insert(p.name.as_str()))
        .map(|p| p.name.clone())
        .collect()
}

/// Scan a template for parameter names with the default escape marker
pub fn scan(template: &str) -> Vec<String> {
    PlaceholderScanner::default().names(template)
}

/// Every occurrence, escaped ones included, using `escape_char` as the marker
pub fn scan_occurrences(template: &str, escape_char: char) -> Vec<Placeholder> {
    PlaceholderScanner::new(escape_char).occurrences(template)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_three_syntaxes() {
        let template = "SELECT * FROM t WHERE a = {{alpha}} AND b = :beta AND c = $gamma";
        assert_eq!(scan(template), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_no_placeholders() {
        assert!(scan("SELECT 1").is_empty());
        assert!(scan("").is_empty());
    }

    #[test]
    fn test_duplicates_reported_once_in_first_appearance_order() {
        let template = "WHERE b = :b OR a = {{a}} OR b2 = {{b}} OR a2 = $a";
        assert_eq!(scan(template), vec!["b", "a"]);
    }

    #[test]
    fn test_escaped_occurrence_is_skipped() {
        let template = r"SELECT '\{{literal}}', \:cast, \$money FROM t WHERE x = {{real}}";
        assert_eq!(scan(template), vec!["real"]);

        let occurrences = PlaceholderScanner::default().occurrences(template);
        assert_eq!(occurrences.iter().filter(|p| p.escaped).count(), 3);
    }

    #[test]
    fn test_escape_applies_to_single_occurrence() {
        let template = r"\{{x}} and {{x}}";
        assert_eq!(scan(template), vec!["x"]);
    }

    #[test]
    fn test_custom_escape_char() {
        let scanner = PlaceholderScanner::new('!');
        assert!(scanner.names("!{{x}}").is_empty());
        assert_eq!(scanner.names(r"\{{x}}"), vec!["x"]);
    }

    #[test]
    fn test_casts_positional_and_times_ignored() {
        let template = "SELECT created_at::date, '10:30:00', $1 FROM t WHERE id = :id";
        assert_eq!(scan(template), vec!["id"]);
    }

    #[test]
    fn test_brace_whitespace_and_spans() {
        let template = "x = {{ name }}";
        let occurrences = PlaceholderScanner::default().occurrences(template);
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].name, "name");
        assert_eq!(occurrences[0].syntax, PlaceholderSyntax::Brace);
        assert_eq!(&template[occurrences[0].span.clone()], "{{ name }}");
    }

    #[test]
    fn test_scan_is_repeatable() {
        let template = "SELECT * FROM t WHERE a IN {{ids}} AND b LIKE :pattern";
        assert_eq!(scan(template), scan(template));
    }

    #[test]
    fn test_render_syntax() {
        assert_eq!(PlaceholderSyntax::Brace.render("x"), "{{x}}");
        assert_eq!(PlaceholderSyntax::Colon.render("x"), ":x");
        assert_eq!(PlaceholderSyntax::Dollar.render("x"), "$x");
        assert_eq!(PlaceholderSyntax::Dollar.to_string(), "$name");
    }
}
