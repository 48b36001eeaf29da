//! SPARQL plumbing for republic-mcp.
//!
//! This crate renders SELECT/ASK/CONSTRUCT text from a small clause
//! representation that escapes every caller-supplied value, and executes the
//! rendered text against a remote SPARQL 1.1 endpoint over HTTP.

pub mod builder;
pub mod client;
pub mod model;
pub mod pattern;

pub use builder::{OrderDirection, Prefix, QueryBuilder, QueryOptions};
pub use client::{SparqlClient, SparqlClientConfig, SparqlError, SparqlExecutor, SparqlFuture};
pub use model::{Binding, QueryResult, RdfTerm, TermKind, Triple};
pub use pattern::{Clause, Filter, Iri, Op, Pattern, QueryError, QuoteStyle, Term, WhereClause};
