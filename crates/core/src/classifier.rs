//! Context classification
//!
//! This is a windowed keyword scan, not a SQL parser. For each occurrence of a
//! placeholder the text on either side is cut down to the predicate the
//! placeholder belongs to, then tested against a fixed priority list:
//! `LIKE`, `IN`, `VALUES`, `BETWEEN`, comparison operator. When nothing
//! matches, the parameter name decides.

use crate::context::{ParameterContext, SqlContext, ValueType};
use crate::scanner::{Placeholder, PlaceholderScanner};
use regex::Regex;
use std::sync::OnceLock;

/// Characters inspected on each side of a placeholder
pub const DEFAULT_CONTEXT_WINDOW: usize = 50;

struct Patterns {
    /// Tokens that end the predicate a placeholder belongs to
    boundary: Regex,
    like: Regex,
    in_list: Regex,
    values: Regex,
    between: Regex,
    /// Conjunction that opens the upper bound of an explicit `BETWEEN a AND b`
    upper_bound: Regex,
    /// Optional column token, operator, then nothing but whitespace
    comparison: Regex,
}

impl Patterns {
    fn compile() -> Self {
        let re = |pattern: &str| Regex::new(pattern).expect("classifier pattern is valid");
        Self {
            boundary: re(
                r"(?i);|\b(?:AND|OR|WHERE|SELECT|FROM|HAVING|ON|SET|WHEN|THEN|ELSE|LIMIT|OFFSET|UNION|RETURNING|JOIN)\b|\b(?:ORDER|GROUP)\s+BY\b",
            ),
            like: re(r"(?i)\bI?LIKE\b"),
            in_list: re(r"(?i)\bIN\b"),
            values: re(r"(?i)\bVALUES\b"),
            between: re(r"(?i)\bBETWEEN\b"),
            upper_bound: re(r"(?i)^\s*AND\b"),
            comparison: re(r"(?:(\w+)\s*)?(>=|<=|<>|!=|=|>|<)\s*$"),
        }
    }
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(Patterns::compile)
}

/// Text around one occurrence, already clipped to its predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surroundings<'a> {
    pub before: &'a str,
    pub after: &'a str,
}

/// Decides which SQL construct consumes a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextClassifier {
    scanner: PlaceholderScanner,
    window: usize,
}

impl ContextClassifier {
    pub fn new(scanner: PlaceholderScanner, window: usize) -> Self {
        Self { scanner, window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Classify `name` as used in `template`
    pub fn classify(&self, template: &str, name: &str) -> ParameterContext {
        let occurrences = self.scanner.occurrences(template);
        self.classify_among(template, name, &occurrences)
    }

    /// Classify using occurrences the caller already scanned from `template`
    pub fn classify_among(
        &self,
        template: &str,
        name: &str,
        occurrences: &[Placeholder],
    ) -> ParameterContext {
        let structural = self
            .occurrence_contexts(template, name, occurrences)
            .into_iter()
            .flatten()
            .next();

        match structural {
            Some(context) => context,
            None => {
                let value_type = infer_from_name(name);
                tracing::debug!(
                    parameter = name,
                    value_type = %value_type,
                    "No structural context, using name heuristic"
                );
                ParameterContext::from_name(value_type)
            }
        }
    }

    /// Structural context of every non-escaped occurrence of `name`, in text order
    pub fn occurrence_contexts(
        &self,
        template: &str,
        name: &str,
        occurrences: &[Placeholder],
    ) -> Vec<Option<ParameterContext>> {
        occurrences
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.escaped && p.name == name)
            .map(|(index, placeholder)| {
                let surroundings = self.surroundings(template, occurrences, index);
                let context = classify_surroundings(name, &surroundings);
                tracing::trace!(
                    parameter = name,
                    offset = placeholder.span.start,
                    before = surroundings.before,
                    after = surroundings.after,
                    context = ?context.as_ref().map(|c| c.sql_context),
                    "Classified occurrence"
                );
                context
            })
            .collect()
    }

    /// Window around `occurrences[index]`, cut at neighbouring placeholders,
    /// statement separators and predicate boundaries
    pub fn surroundings<'a>(
        &self,
        template: &'a str,
        occurrences: &[Placeholder],
        index: usize,
    ) -> Surroundings<'a> {
        let current = &occurrences[index];
        let previous_end = occurrences[..index]
            .iter()
            .rev()
            .find(|p| !p.escaped)
            .map(|p| p.span.end)
            .unwrap_or(0);
        let next_start = occurrences[index + 1..]
            .iter()
            .find(|p| !p.escaped)
            .map(|p| p.span.start)
            .unwrap_or(template.len());

        let start = window_start(template, current.span.start, self.window).max(previous_end);
        let end = window_end(template, current.span.end, self.window).min(next_start);

        let mut before = &template[start..current.span.start];
        if let Some(boundary) = patterns().boundary.find_iter(before).last() {
            before = &before[boundary.end()..];
        }

        let mut after = &template[current.span.end..end];
        if let Some(pos) = after.find(';') {
            after = &after[..pos];
        }

        Surroundings { before, after }
    }
}

impl Default for ContextClassifier {
    fn default() -> Self {
        Self::new(PlaceholderScanner::default(), DEFAULT_CONTEXT_WINDOW)
    }
}

fn window_start(text: &str, pos: usize, chars: usize) -> usize {
    text[..pos]
        .char_indices()
        .rev()
        .nth(chars.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn window_end(text: &str, pos: usize, chars: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(chars)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

/// Apply the structural rules in priority order
pub fn classify_surroundings(name: &str, surroundings: &Surroundings<'_>) -> Option<ParameterContext> {
    let p = patterns();
    let Surroundings { before, after } = *surroundings;
    let wrapped = before.trim_end().ends_with('(') && after.trim_start().starts_with(')');

    if p.like.is_match(before) {
        return Some(ParameterContext::structural(SqlContext::Like, ValueType::Pattern));
    }

    if p.in_list.is_match(before) {
        return Some(
            ParameterContext::structural(SqlContext::In, ValueType::List).wrapped(wrapped),
        );
    }

    if p.values.is_match(before) || p.values.is_match(after) {
        return Some(
            ParameterContext::structural(SqlContext::Values, ValueType::List).wrapped(wrapped),
        );
    }

    if p.between.is_match(before) {
        // `BETWEEN {{from}} AND {{to}}` supplies the AND itself
        let lower_bound_only = p.upper_bound.is_match(after);
        return Some(
            ParameterContext::structural(SqlContext::Between, ValueType::DateRange)
                .wrapped(lower_bound_only),
        );
    }

    let caps = p.comparison.captures(before)?;
    let sql_context = if &caps[2] == "=" {
        SqlContext::Equals
    } else {
        SqlContext::Comparison
    };
    let value_type = caps
        .get(1)
        .and_then(|column| type_from_column(column.as_str()))
        .unwrap_or_else(|| match infer_from_name(name) {
            t @ (ValueType::Date | ValueType::Number | ValueType::Boolean) => t,
            _ => ValueType::Text,
        });

    Some(ParameterContext::structural(sql_context, value_type))
}

fn type_from_column(column: &str) -> Option<ValueType> {
    let column = column.to_lowercase();
    if column.contains("date") || column.contains("time") {
        Some(ValueType::Date)
    } else if ["count", "amount", "price", "quantity"]
        .iter()
        .any(|hint| column.contains(hint))
    {
        Some(ValueType::Number)
    } else {
        None
    }
}

/// Guess a value type from the parameter name alone
pub fn infer_from_name(name: &str) -> ValueType {
    let name = name.to_lowercase();
    let has = |hints: &[&str]| hints.iter().any(|hint| name.contains(hint));

    if has(&["date", "time"]) {
        ValueType::Date
    } else if has(&["start"]) && has(&["end"]) {
        ValueType::DateRange
    } else if has(&["count", "number", "limit", "amount", "price"]) {
        ValueType::Number
    } else if has(&["pattern", "like", "search"]) {
        ValueType::Pattern
    } else if name.starts_with("is_") || name.starts_with("has_") {
        ValueType::Boolean
    } else if has(&["list", "ids"]) || name.ends_with('s') {
        ValueType::List
    } else {
        ValueType::Text
    }
}

/// Classify with the default window and escape marker
pub fn classify(template: &str, name: &str) -> ParameterContext {
    ContextClassifier::default().classify(template, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextSource;

    fn kinds(template: &str, name: &str) -> (SqlContext, ValueType) {
        let ctx = classify(template, name);
        (ctx.sql_context, ctx.value_type)
    }

    #[test]
    fn test_like_context() {
        let template =
            "SELECT * FROM campaigns WHERE campaign_name LIKE {{campaign_pattern}}";
        assert_eq!(
            kinds(template, "campaign_pattern"),
            (SqlContext::Like, ValueType::Pattern)
        );
        assert_eq!(
            kinds("WHERE name ILIKE :q", "q"),
            (SqlContext::Like, ValueType::Pattern)
        );
        assert_eq!(
            kinds("WHERE name NOT LIKE $q", "q"),
            (SqlContext::Like, ValueType::Pattern)
        );
    }

    #[test]
    fn test_in_context() {
        let template = "SELECT * FROM products WHERE asin IN {{asins}}";
        let ctx = classify(template, "asins");
        assert_eq!(ctx.sql_context, SqlContext::In);
        assert_eq!(ctx.value_type, ValueType::List);
        assert!(!ctx.wrapped);

        let wrapped = classify("SELECT * FROM products WHERE asin IN ({{asins}})", "asins");
        assert_eq!(wrapped.sql_context, SqlContext::In);
        assert!(wrapped.wrapped);
    }

    #[test]
    fn test_values_context() {
        assert_eq!(
            kinds("INSERT INTO tracked (asin) VALUES {{rows}}", "rows"),
            (SqlContext::Values, ValueType::List)
        );
        assert_eq!(
            kinds("SELECT * FROM (VALUES {{asin}}) AS v(asin)", "asin"),
            (SqlContext::Values, ValueType::List)
        );
    }

    #[test]
    fn test_values_keyword_after_placeholder() {
        let template = "INSERT INTO {{target_table}} VALUES ('B001', 'Acme')";
        let ctx = classify(template, "target_table");
        assert_eq!(ctx.sql_context, SqlContext::Values);
        assert_eq!(ctx.source, ContextSource::Structural);
    }

    #[test]
    fn test_between_context() {
        let template = "SELECT * FROM orders WHERE order_date BETWEEN {{date_range}}";
        assert_eq!(
            kinds(template, "date_range"),
            (SqlContext::Between, ValueType::DateRange)
        );
    }

    #[test]
    fn test_comparison_with_column_refinement() {
        assert_eq!(
            kinds("SELECT * FROM products WHERE price >= {{min_price}}", "min_price"),
            (SqlContext::Comparison, ValueType::Number)
        );
        assert_eq!(
            kinds("WHERE o.order_date < :cutoff", "cutoff"),
            (SqlContext::Comparison, ValueType::Date)
        );
        assert_eq!(
            kinds("WHERE units_count <> $n", "n"),
            (SqlContext::Comparison, ValueType::Number)
        );
    }

    #[test]
    fn test_equals_context() {
        assert_eq!(
            kinds("WHERE brand = {{brand}}", "brand"),
            (SqlContext::Equals, ValueType::Text)
        );
        assert_eq!(
            kinds("WHERE created = {{created_date}}", "created_date"),
            (SqlContext::Equals, ValueType::Date)
        );
        assert_eq!(
            kinds("WHERE status = {{statuses}}", "statuses"),
            (SqlContext::Equals, ValueType::Text)
        );
    }

    #[test]
    fn test_neighbouring_predicate_does_not_leak() {
        let template = "WHERE name LIKE {{pattern}} AND price >= {{min_price}}";
        assert_eq!(
            kinds(template, "min_price"),
            (SqlContext::Comparison, ValueType::Number)
        );

        let template = "WHERE asin IN {{asins}} ORDER BY {{sort_column}}";
        let ctx = classify(template, "sort_column");
        assert_eq!(ctx.source, ContextSource::NameHeuristic);
    }

    #[test]
    fn test_clause_keywords_end_previous_predicate() {
        let cases = [
            ("SELECT * FROM t WHERE name LIKE 'abc%' LIMIT {{row_limit}}", "row_limit"),
            ("SELECT * FROM t WHERE name LIKE 'abc%' LIMIT 10 OFFSET {{skip}}", "skip"),
            ("SELECT * FROM t WHERE status IN ('a', 'b') ORDER BY {{sort_column}}", "sort_column"),
            ("SELECT * FROM t WHERE status IN ('a', 'b') GROUP  BY {{group_column}}", "group_column"),
            ("SELECT a FROM t WHERE a IN (1, 2) UNION SELECT {{other}}", "other"),
            ("UPDATE t SET a = 1 WHERE b LIKE 'x%' RETURNING {{returned}}", "returned"),
            ("SELECT * FROM t WHERE t.a IN (1) JOIN u USING {{join_key}}", "join_key"),
        ];
        for (template, name) in cases {
            let ctx = classify(template, name);
            assert_eq!(ctx.source, ContextSource::NameHeuristic, "{}", template);
            assert_eq!(ctx.sql_context, SqlContext::Equals, "{}", template);
        }
    }

    #[test]
    fn test_explicit_between_bounds() {
        let template = "WHERE order_date BETWEEN {{start_date}} AND {{end_date}}";
        let lower = classify(template, "start_date");
        assert_eq!(lower.sql_context, SqlContext::Between);
        assert!(lower.wrapped);

        let upper = classify(template, "end_date");
        assert_eq!(upper.sql_context, SqlContext::Equals);
        assert_eq!(upper.value_type, ValueType::Date);

        let range = classify("WHERE order_date BETWEEN {{date_range}}", "date_range");
        assert!(!range.wrapped);
    }

    #[test]
    fn test_name_heuristic_fallback() {
        assert_eq!(infer_from_name("report_date"), ValueType::Date);
        assert_eq!(infer_from_name("start_end"), ValueType::DateRange);
        assert_eq!(infer_from_name("row_limit"), ValueType::Number);
        assert_eq!(infer_from_name("search_term"), ValueType::Pattern);
        assert_eq!(infer_from_name("is_active"), ValueType::Boolean);
        assert_eq!(infer_from_name("asins"), ValueType::List);
        assert_eq!(infer_from_name("campaign_ids"), ValueType::List);
        assert_eq!(infer_from_name("brand"), ValueType::Text);

        let ctx = classify("SELECT * FROM t LIMIT {{row_limit}}", "row_limit");
        assert_eq!(ctx.sql_context, SqlContext::Equals);
        assert_eq!(ctx.value_type, ValueType::Number);
        assert_eq!(ctx.source, ContextSource::NameHeuristic);
    }

    #[test]
    fn test_first_structural_occurrence_wins() {
        let template = "SELECT {{x}} FROM t WHERE a LIKE {{x}} OR b IN {{x}}";
        assert_eq!(kinds(template, "x"), (SqlContext::Like, ValueType::Pattern));

        let classifier = ContextClassifier::default();
        let occurrences = PlaceholderScanner::default().occurrences(template);
        let contexts = classifier.occurrence_contexts(template, "x", &occurrences);
        assert_eq!(contexts.len(), 3);
        assert!(contexts[0].is_none());
    }

    #[test]
    fn test_keyword_outside_window_is_ignored() {
        let padding = " ".repeat(60);
        let template = format!("WHERE name LIKE{}{{{{term}}}}", padding);
        let ctx = classify(&template, "term");
        assert_eq!(ctx.source, ContextSource::NameHeuristic);

        let wide = ContextClassifier::new(PlaceholderScanner::default(), 100);
        assert_eq!(wide.classify(&template, "term").sql_context, SqlContext::Like);
    }

    #[test]
    fn test_escaped_occurrence_not_classified() {
        let template = r"WHERE a LIKE \{{x}} AND b >= {{x}}";
        assert_eq!(kinds(template, "x").0, SqlContext::Comparison);
    }

    #[test]
    fn test_multibyte_text_is_safe() {
        let template = "WHERE naïve_câlcul = 'éééééééééééééééééééééééééééééééééééééééééééééééé' AND prix_été >= {{montant}}";
        let ctx = classify(template, "montant");
        assert_eq!(ctx.sql_context, SqlContext::Comparison);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let template = "WHERE a BETWEEN :range AND x IN :ids";
        assert_eq!(classify(template, "range"), classify(template, "range"));
        assert_eq!(classify(template, "ids"), classify(template, "ids"));
    }
}
