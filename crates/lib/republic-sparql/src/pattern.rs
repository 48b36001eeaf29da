//! Clause representation for SPARQL `WHERE` bodies.
//!
//! Graph patterns are `'static` templates holding ontology text; every value
//! that originates from a caller enters as a [`Term`] bound to a `$name`
//! placeholder and is escaped when the clause list is rendered.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

use crate::builder::{escape_literal, indent, union, values};

/// Errors raised while turning parameters into query text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid IRI: {0}")]
    InvalidIri(String),
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("invalid {name} value: {value}")]
    InvalidParameter { name: &'static str, value: String },
}

/// Quote character used for plain literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteStyle {
    #[default]
    Double,
    Single,
}

impl QuoteStyle {
    /// Escapes and quotes a plain literal.
    #[must_use]
    pub fn quote(self, value: &str) -> String {
        let escaped = escape_literal(value);
        match self {
            Self::Double => format!("\"{escaped}\""),
            Self::Single => format!("'{}'", escaped.replace('\'', "\\'")),
        }
    }
}

/// An absolute IRI checked for characters that would break out of `<...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iri(String);

impl Iri {
    /// Parses an IRI, accepting an optional surrounding `<...>`.
    ///
    /// # Errors
    /// Returns [`QueryError::InvalidIri`] for empty, relative, or unsafe input.
    pub fn parse(value: impl Into<String>) -> Result<Self, QueryError> {
        let value = value.into();
        let trimmed = value.trim();
        let bare = trimmed
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .unwrap_or(trimmed);
        let unsafe_char = bare.chars().any(|c| {
            c.is_whitespace()
                || c.is_control()
                || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
        });
        if bare.is_empty() || !bare.contains(':') || unsafe_char {
            return Err(QueryError::InvalidIri(value));
        }
        Ok(Self(bare.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// A value position inside a pattern or filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A query variable such as `?cognome`.
    Var(Cow<'static, str>),
    /// A trusted ontology name such as `ocd:deputato`.
    Name(&'static str),
    Iri(Iri),
    Literal(String),
    Typed { value: String, datatype: &'static str },
    Integer(i64),
    Boolean(bool),
    /// `STR(term)`
    Str(Box<Self>),
    /// `xsd:date(term)`
    Date(Box<Self>),
}

impl Term {
    #[must_use]
    pub fn var(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Var(name.into())
    }

    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    #[must_use]
    pub fn typed(value: impl Into<String>, datatype: &'static str) -> Self {
        Self::Typed {
            value: value.into(),
            datatype,
        }
    }

    /// Parses a caller-supplied IRI into a term.
    ///
    /// # Errors
    /// Returns [`QueryError::InvalidIri`] when the IRI is unsafe to embed.
    pub fn iri(value: impl Into<String>) -> Result<Self, QueryError> {
        Iri::parse(value).map(Self::Iri)
    }

    #[must_use]
    pub fn str(self) -> Self {
        Self::Str(Box::new(self))
    }

    #[must_use]
    pub fn date(self) -> Self {
        Self::Date(Box::new(self))
    }

    #[must_use]
    pub fn render(&self, quote: QuoteStyle) -> String {
        match self {
            Self::Var(name) => name.to_string(),
            Self::Name(name) => (*name).to_string(),
            Self::Iri(iri) => iri.to_string(),
            Self::Literal(value) => quote.quote(value),
            Self::Typed { value, datatype } => {
                format!("\"{}\"^^{datatype}", escape_literal(value))
            }
            Self::Integer(value) => value.to_string(),
            Self::Boolean(value) => value.to_string(),
            Self::Str(inner) => format!("STR({})", inner.render(quote)),
            Self::Date(inner) => format!("xsd:date({})", inner.render(quote)),
        }
    }
}

/// Comparison operators usable in `FILTER` expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// A `FILTER` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Regex {
        target: Term,
        pattern: String,
        case_insensitive: bool,
    },
    Compare {
        left: Term,
        op: Op,
        right: Term,
    },
    Bound(Term),
    Unbound(Term),
    /// Disjunction of the inner expressions.
    Any(Vec<Self>),
}

impl Filter {
    /// Case-insensitive `REGEX` over a variable.
    #[must_use]
    pub fn regex(var: &'static str, pattern: impl Into<String>) -> Self {
        Self::regex_on(Term::var(var), pattern)
    }

    #[must_use]
    pub fn regex_on(target: Term, pattern: impl Into<String>) -> Self {
        Self::Regex {
            target,
            pattern: pattern.into(),
            case_insensitive: true,
        }
    }

    /// Drops the `'i'` flag from a regex filter.
    #[must_use]
    pub fn case_sensitive(self) -> Self {
        match self {
            Self::Regex { target, pattern, .. } => Self::Regex {
                target,
                pattern,
                case_insensitive: false,
            },
            other => other,
        }
    }

    #[must_use]
    pub const fn compare(left: Term, op: Op, right: Term) -> Self {
        Self::Compare { left, op, right }
    }

    #[must_use]
    pub fn equals(var: &'static str, right: Term) -> Self {
        Self::compare(Term::var(var), Op::Eq, right)
    }

    #[must_use]
    pub fn bound(var: impl Into<Cow<'static, str>>) -> Self {
        Self::Bound(Term::var(var))
    }

    #[must_use]
    pub fn unbound(var: impl Into<Cow<'static, str>>) -> Self {
        Self::Unbound(Term::var(var))
    }

    #[must_use]
    pub const fn any(filters: Vec<Self>) -> Self {
        Self::Any(filters)
    }

    /// Renders the expression without the surrounding `FILTER(...)`.
    #[must_use]
    pub fn expression(&self, quote: QuoteStyle) -> String {
        match self {
            Self::Regex {
                target,
                pattern,
                case_insensitive,
            } => {
                let target = target.render(quote);
                let pattern = quote.quote(pattern);
                if *case_insensitive {
                    format!("REGEX({target}, {pattern}, {})", quote.quote("i"))
                } else {
                    format!("REGEX({target}, {pattern})")
                }
            }
            Self::Compare { left, op, right } => format!(
                "{} {} {}",
                left.render(quote),
                op.as_str(),
                right.render(quote)
            ),
            Self::Bound(term) => format!("bound({})", term.render(quote)),
            Self::Unbound(term) => format!("!bound({})", term.render(quote)),
            Self::Any(filters) => filters
                .iter()
                .map(|filter| filter.expression(quote))
                .collect::<Vec<_>>()
                .join(" || "),
        }
    }

    #[must_use]
    pub fn render(&self, quote: QuoteStyle) -> String {
        format!("FILTER({})", self.expression(quote))
    }
}

/// A trusted graph-pattern template with `$name` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    template: &'static str,
    bindings: Vec<(&'static str, Term)>,
}

impl Pattern {
    #[must_use]
    pub const fn new(template: &'static str) -> Self {
        Self {
            template,
            bindings: Vec::new(),
        }
    }

    /// Binds a placeholder; the term is escaped at render time.
    #[must_use]
    pub fn bind(mut self, name: &'static str, term: Term) -> Self {
        self.bindings.push((name, term));
        self
    }

    #[must_use]
    pub fn render(&self, quote: QuoteStyle) -> String {
        let template = self.template.trim();
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos + 1..];
            let len = tail
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(tail.len());
            let name = &tail[..len];
            match self.bindings.iter().find(|(key, _)| *key == name) {
                Some((_, term)) if !name.is_empty() => out.push_str(&term.render(quote)),
                _ => {
                    out.push('$');
                    out.push_str(name);
                }
            }
            rest = &tail[len..];
        }
        out.push_str(rest);
        out
    }
}

/// One element of a `WHERE` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Pattern(Pattern),
    Filter(Filter),
    Optional(WhereClause),
    Minus(WhereClause),
    Union(Vec<WhereClause>),
    Bind { value: Term, var: &'static str },
    Values { var: &'static str, values: Vec<Term> },
}

impl Clause {
    #[must_use]
    pub fn render(&self, quote: QuoteStyle) -> String {
        match self {
            Self::Pattern(pattern) => pattern.render(quote),
            Self::Filter(filter) => filter.render(quote),
            Self::Optional(body) => block("OPTIONAL", &body.render(quote)),
            Self::Minus(body) => block("MINUS", &body.render(quote)),
            Self::Union(branches) => {
                let rendered: Vec<String> =
                    branches.iter().map(|branch| branch.render(quote)).collect();
                union(&rendered)
            }
            Self::Bind { value, var } => format!("BIND({} AS {var})", value.render(quote)),
            Self::Values { var, values: terms } => {
                let rendered: Vec<String> = terms.iter().map(|term| term.render(quote)).collect();
                values(var, &rendered)
            }
        }
    }
}

fn block(keyword: &str, body: &str) -> String {
    if body.contains('\n') {
        format!("{keyword} {{\n{}\n}}", indent(body, 2))
    } else {
        format!("{keyword} {{ {body} }}")
    }
}

/// Ordered list of clauses making up a `WHERE` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhereClause {
    clauses: Vec<Clause>,
}

impl WhereClause {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }

    /// Appends a template without placeholders.
    #[must_use]
    pub fn triples(self, template: &'static str) -> Self {
        self.pattern(Pattern::new(template))
    }

    #[must_use]
    pub fn pattern(self, pattern: Pattern) -> Self {
        self.clause(Clause::Pattern(pattern))
    }

    #[must_use]
    pub fn filter(self, filter: Filter) -> Self {
        self.clause(Clause::Filter(filter))
    }

    /// Appends every filter yielded; accepts `Option<Filter>` as well.
    #[must_use]
    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.clauses.extend(filters.into_iter().map(Clause::Filter));
        self
    }

    #[must_use]
    pub fn optional(self, body: Self) -> Self {
        self.clause(Clause::Optional(body))
    }

    #[must_use]
    pub fn minus(self, body: Self) -> Self {
        self.clause(Clause::Minus(body))
    }

    #[must_use]
    pub fn union(self, branches: Vec<Self>) -> Self {
        self.clause(Clause::Union(branches))
    }

    #[must_use]
    pub fn bind(self, value: Term, var: &'static str) -> Self {
        self.clause(Clause::Bind { value, var })
    }

    #[must_use]
    pub fn values(self, var: &'static str, values: Vec<Term>) -> Self {
        self.clause(Clause::Values { var, values })
    }

    /// Keeps only solutions where `subject` has no `end_property`.
    ///
    /// The end value is bound to `?<subject>_end`.
    #[must_use]
    pub fn active(self, subject: &'static str, end_property: &'static str) -> Self {
        let end = format!("?{}_end", subject.trim_start_matches('?'));
        let lookup = Pattern::new("$subject $property $end .")
            .bind("subject", Term::var(subject))
            .bind("property", Term::Name(end_property))
            .bind("end", Term::var(end.clone()));
        self.optional(Self::new().pattern(lookup))
            .filter(Filter::unbound(end))
    }

    /// Appends all clauses of `other`.
    #[must_use]
    pub fn append(mut self, other: Self) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    #[must_use]
    pub fn clause(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub fn render(&self, quote: QuoteStyle) -> String {
        self.clauses
            .iter()
            .map(|clause| clause.render(quote))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
