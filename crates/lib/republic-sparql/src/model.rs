//! SPARQL 1.1 JSON result shapes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind of an RDF term in a result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermKind {
    Uri,
    /// Virtuoso still emits `typed-literal`; it is folded into `literal`.
    #[serde(alias = "typed-literal")]
    Literal,
    Bnode,
}

/// A bound value: `{type, value, datatype?, xml:lang?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdfTerm {
    #[serde(rename = "type")]
    pub kind: TermKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl RdfTerm {
    #[must_use]
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Uri,
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }
}

/// One result row keyed by variable name.
pub type Binding = BTreeMap<String, RdfTerm>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// Normalized SELECT result: `{head: {vars}, results: {bindings}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub head: Head,
    pub results: Results,
}

impl QueryResult {
    /// Builds a result whose `vars` are the keys of the first row.
    ///
    /// Keys follow the endpoint's `head.vars` order; keys the endpoint did not
    /// announce are appended. With no rows the variable list is empty.
    #[must_use]
    pub fn from_rows(announced: &[String], bindings: Vec<Binding>) -> Self {
        let vars = bindings.first().map_or_else(Vec::new, |first| {
            let mut vars: Vec<String> = announced
                .iter()
                .filter(|var| first.contains_key(var.as_str()))
                .cloned()
                .collect();
            for key in first.keys() {
                if !vars.contains(key) {
                    vars.push(key.clone());
                }
            }
            vars
        });
        Self {
            head: Head { vars },
            results: Results { bindings },
        }
    }

    #[must_use]
    pub fn vars(&self) -> &[String] {
        &self.head.vars
    }

    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.results.bindings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.bindings.is_empty()
    }
}

/// Wire shape of `application/sparql-results+json` for SELECT and ASK.
#[derive(Debug, Deserialize)]
pub(crate) struct ResultsDocument {
    #[serde(default)]
    pub head: Head,
    pub results: Option<Results>,
    pub boolean: Option<bool>,
}

/// A flattened CONSTRUCT statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

/// `application/rdf+json`: subject -> predicate -> objects.
pub(crate) type RdfJsonDocument = BTreeMap<String, BTreeMap<String, Vec<RdfTerm>>>;

pub(crate) fn flatten_rdf_json(document: RdfJsonDocument) -> Vec<Triple> {
    document
        .into_iter()
        .flat_map(|(subject, predicates)| {
            predicates.into_iter().flat_map(move |(predicate, objects)| {
                let subject = subject.clone();
                objects.into_iter().map(move |object| Triple {
                    subject: subject.clone(),
                    predicate: predicate.clone(),
                    object: object.value,
                })
            })
        })
        .collect()
}
