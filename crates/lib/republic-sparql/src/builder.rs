//! Query assembly: prefix blocks, solution modifiers and string helpers.

use crate::pattern::{Filter, Op, QuoteStyle, Term, WhereClause};

/// A `PREFIX` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefix {
    pub name: &'static str,
    pub iri: &'static str,
}

impl Prefix {
    #[must_use]
    pub const fn new(name: &'static str, iri: &'static str) -> Self {
        Self { name, iri }
    }

    #[must_use]
    pub fn declaration(&self) -> String {
        format!("PREFIX {}: <{}>", self.name, self.iri)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Solution modifiers for SELECT and CONSTRUCT queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub distinct: bool,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// One variable is wrapped in `ASC(..)`/`DESC(..)`; several are emitted verbatim.
    pub order_by: Option<&'static str>,
    pub order_direction: OrderDirection,
    pub group_by: Option<&'static str>,
}

impl QueryOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            distinct: true,
            limit: None,
            offset: None,
            order_by: None,
            order_direction: OrderDirection::Asc,
            group_by: None,
        }
    }

    #[must_use]
    pub const fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub const fn with_order_by(mut self, order_by: &'static str) -> Self {
        self.order_by = Some(order_by);
        self
    }

    #[must_use]
    pub const fn with_order_direction(mut self, direction: OrderDirection) -> Self {
        self.order_direction = direction;
        self
    }

    #[must_use]
    pub const fn descending(self) -> Self {
        self.with_order_direction(OrderDirection::Desc)
    }

    #[must_use]
    pub const fn with_group_by(mut self, group_by: &'static str) -> Self {
        self.group_by = Some(group_by);
        self
    }

    fn order_clause(&self) -> Option<String> {
        let order_by = self.order_by?.trim();
        if order_by.is_empty() {
            return None;
        }
        if order_by.split_whitespace().count() > 1 {
            Some(format!("ORDER BY {order_by}"))
        } else {
            Some(format!(
                "ORDER BY {}({order_by})",
                self.order_direction.as_str()
            ))
        }
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders complete queries for one prefix set and literal quote style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryBuilder {
    prefixes: &'static [Prefix],
    quote: QuoteStyle,
}

impl QueryBuilder {
    #[must_use]
    pub const fn new(prefixes: &'static [Prefix]) -> Self {
        Self {
            prefixes,
            quote: QuoteStyle::Double,
        }
    }

    #[must_use]
    pub const fn with_quote_style(mut self, quote: QuoteStyle) -> Self {
        self.quote = quote;
        self
    }

    #[must_use]
    pub const fn quote_style(&self) -> QuoteStyle {
        self.quote
    }

    /// Newline-joined `PREFIX` declarations.
    #[must_use]
    pub fn prefixes(&self) -> String {
        self.prefixes
            .iter()
            .map(Prefix::declaration)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn header(&self) -> Vec<String> {
        if self.prefixes.is_empty() {
            Vec::new()
        } else {
            vec![self.prefixes(), String::new()]
        }
    }

    #[must_use]
    pub fn build_select(&self, select: &str, where_body: &str, options: &QueryOptions) -> String {
        let mut parts = self.header();
        let distinct = if options.distinct { "DISTINCT " } else { "" };
        parts.push(format!("SELECT {distinct}{}", select.trim()));
        parts.push("WHERE {".to_string());
        parts.push(indent(where_body.trim(), 2));
        parts.push("}".to_string());
        if let Some(group_by) = options.group_by {
            parts.push(format!("GROUP BY {group_by}"));
        }
        if let Some(order) = options.order_clause() {
            parts.push(order);
        }
        push_slice(&mut parts, options);
        parts.join("\n")
    }

    #[must_use]
    pub fn build_ask(&self, where_body: &str) -> String {
        let mut parts = self.header();
        parts.push("ASK {".to_string());
        parts.push(indent(where_body.trim(), 2));
        parts.push("}".to_string());
        parts.join("\n")
    }

    #[must_use]
    pub fn build_construct(
        &self,
        template: &str,
        where_body: &str,
        options: &QueryOptions,
    ) -> String {
        let mut parts = self.header();
        parts.push("CONSTRUCT {".to_string());
        parts.push(indent(template.trim(), 2));
        parts.push("} WHERE {".to_string());
        parts.push(indent(where_body.trim(), 2));
        parts.push("}".to_string());
        push_slice(&mut parts, options);
        parts.join("\n")
    }

    #[must_use]
    pub fn select(&self, select: &str, body: &WhereClause, options: &QueryOptions) -> String {
        self.build_select(select, &body.render(self.quote), options)
    }

    #[must_use]
    pub fn ask(&self, body: &WhereClause) -> String {
        self.build_ask(&body.render(self.quote))
    }

    #[must_use]
    pub fn construct(&self, template: &str, body: &WhereClause, options: &QueryOptions) -> String {
        self.build_construct(template, &body.render(self.quote), options)
    }
}

fn push_slice(parts: &mut Vec<String>, options: &QueryOptions) {
    if let Some(limit) = options.limit {
        parts.push(format!("LIMIT {limit}"));
    }
    if let Some(offset) = options.offset {
        parts.push(format!("OFFSET {offset}"));
    }
}

/// Escapes a value for a double-quoted SPARQL literal.
///
/// Only backslash, double quote, newline, carriage return and tab change.
#[must_use]
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Prefixes every non-empty line with `spaces` spaces.
#[must_use]
pub fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[must_use]
pub fn regex_filter(var: &'static str, value: &str, case_insensitive: bool) -> String {
    let filter = Filter::regex(var, value);
    let filter = if case_insensitive {
        filter
    } else {
        filter.case_sensitive()
    };
    filter.render(QuoteStyle::Double)
}

/// `xsd:date` range over `var`; either bound may be omitted.
#[must_use]
pub fn date_range_filter(var: &'static str, from: Option<&str>, to: Option<&str>) -> String {
    let bound = |op, date: &str| {
        Filter::compare(Term::var(var).str().date(), op, Term::literal(date).date())
            .render(QuoteStyle::Double)
    };
    from.map(|date| bound(Op::Ge, date))
        .into_iter()
        .chain(to.map(|date| bound(Op::Le, date)))
        .collect::<Vec<_>>()
        .join("\n  ")
}

/// `OPTIONAL` lookup of `end_property` plus a `!bound` check on it.
#[must_use]
pub fn active_filter(var: &'static str, end_property: &'static str) -> String {
    WhereClause::new()
        .active(var, end_property)
        .render(QuoteStyle::Double)
}

#[must_use]
pub fn union(patterns: &[String]) -> String {
    patterns
        .iter()
        .map(|pattern| format!("{{\n{}\n}}", indent(pattern, 2)))
        .collect::<Vec<_>>()
        .join("\nUNION\n")
}

#[must_use]
pub fn values(var: &str, values: &[String]) -> String {
    format!("VALUES {var} {{ {} }}", values.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIXES: &[Prefix] = &[
        Prefix::new("ocd", "http://dati.camera.it/ocd/"),
        Prefix::new("dc", "http://purl.org/dc/elements/1.1/"),
    ];

    fn builder() -> QueryBuilder {
        QueryBuilder::new(PREFIXES)
    }

    #[test]
    fn single_order_variable_is_wrapped_in_direction() {
        let asc = builder().build_select("?a", "?a ?p ?o .", &QueryOptions::new().with_order_by("?a"));
        assert!(asc.contains("ORDER BY ASC(?a)"));

        let desc = builder().build_select(
            "?a",
            "?a ?p ?o .",
            &QueryOptions::new().with_order_by("?a").descending(),
        );
        assert!(desc.contains("ORDER BY DESC(?a)"));
    }

    #[test]
    fn multiple_order_variables_are_emitted_verbatim() {
        let query = builder().build_select(
            "?a ?b",
            "?a ?p ?b .",
            &QueryOptions::new().with_order_by("?a ?b").descending(),
        );
        assert!(query.contains("\nORDER BY ?a ?b\n") || query.ends_with("ORDER BY ?a ?b"));
        assert!(!query.contains("DESC("));
    }

    #[test]
    fn select_layout_is_prefixes_where_then_modifiers() {
        let query = builder().build_select(
            "?s (COUNT(?o) AS ?n)",
            "?s ?p ?o .",
            &QueryOptions::new()
                .with_distinct(false)
                .with_group_by("?s")
                .with_order_by("?s")
                .with_limit(5)
                .with_offset(10),
        );
        assert_eq!(
            query,
            "PREFIX ocd: <http://dati.camera.it/ocd/>\n\
             PREFIX dc: <http://purl.org/dc/elements/1.1/>\n\
             \n\
             SELECT ?s (COUNT(?o) AS ?n)\n\
             WHERE {\n  ?s ?p ?o .\n}\n\
             GROUP BY ?s\n\
             ORDER BY ASC(?s)\n\
             LIMIT 5\n\
             OFFSET 10"
        );
    }

    #[test]
    fn distinct_is_the_default() {
        let query = builder().build_select("?s", "?s ?p ?o .", &QueryOptions::default());
        assert!(query.contains("SELECT DISTINCT ?s"));
        assert_eq!(query.matches("WHERE {").count(), 1);
        assert!(query.starts_with(&builder().prefixes()));
    }

    #[test]
    fn limit_is_last_line_without_offset() {
        let query = builder().build_select(
            "?s",
            "?s ?p ?o .",
            &QueryOptions::new().with_order_by("?s").with_limit(20),
        );
        assert_eq!(query.lines().last(), Some("LIMIT 20"));
    }

    #[test]
    fn ask_and_construct_wrap_bodies() {
        let ask = builder().build_ask("?s a ocd:deputato .");
        assert!(ask.ends_with("ASK {\n  ?s a ocd:deputato .\n}"));

        let construct = builder().build_construct(
            "?s dc:title ?t .",
            "?s dc:title ?t .",
            &QueryOptions::new().with_limit(3).with_order_by("?t"),
        );
        assert!(construct.contains("CONSTRUCT {\n  ?s dc:title ?t .\n} WHERE {\n  ?s dc:title ?t .\n}"));
        assert!(construct.ends_with("LIMIT 3"));
        assert!(!construct.contains("ORDER BY"));
    }

    #[test]
    fn escape_transforms_exactly_five_characters() {
        assert_eq!(
            escape_literal("a\\b\"c\nd\re\tf"),
            "a\\\\b\\\"c\\nd\\re\\tf"
        );
        let untouched = "l'atto è <ok> {x} $y 100%";
        assert_eq!(escape_literal(untouched), untouched);
    }

    #[test]
    fn string_helpers_render_filters() {
        assert_eq!(
            regex_filter("?cognome", "rossi", true),
            "FILTER(REGEX(?cognome, \"rossi\", \"i\"))"
        );
        assert_eq!(
            regex_filter("?numero", "12", false),
            "FILTER(REGEX(?numero, \"12\"))"
        );
        assert_eq!(
            date_range_filter("?data", Some("2024-01-01"), Some("2024-12-31")),
            "FILTER(xsd:date(STR(?data)) >= xsd:date(\"2024-01-01\"))\n  \
             FILTER(xsd:date(STR(?data)) <= xsd:date(\"2024-12-31\"))"
        );
        assert_eq!(date_range_filter("?data", None, None), "");
        assert_eq!(
            active_filter("?adesione", "osr:fine"),
            "OPTIONAL { ?adesione osr:fine ?adesione_end . }\nFILTER(!bound(?adesione_end))"
        );
    }

    #[test]
    fn union_and_values_render_blocks() {
        let rendered = union(&["?a ?b ?c .".to_string(), "?d ?e ?f .".to_string()]);
        assert_eq!(rendered, "{\n  ?a ?b ?c .\n}\nUNION\n{\n  ?d ?e ?f .\n}");
        assert_eq!(
            values("?leg", &["18".to_string(), "19".to_string()]),
            "VALUES ?leg { 18 19 }"
        );
    }

    #[test]
    fn indent_keeps_blank_lines_empty() {
        assert_eq!(indent("a\n\n  b", 2), "  a\n\n    b");
    }
}
