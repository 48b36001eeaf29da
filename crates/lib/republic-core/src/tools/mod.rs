//! The Camera and Senato tool sets.
//!
//! Every catalog tool follows the same path: decode typed parameters, render
//! the query, run it as a SELECT and return the normalized result as pretty
//! JSON text.

use std::sync::Arc;

use republic_sparql::{QueryError, SparqlExecutor};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

use crate::institution::Institution;
use crate::registry::{RegistryError, ToolRegistry};
use crate::tool::{Affiliation, InputSchema, ToolDefinition, ToolError, ToolResult};

pub mod camera;
pub mod senato;

/// Parameters of tools that take none.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct NoParams {}

/// Raw query text for the `execute_sparql` tools.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuery {
    pub query: String,
}

/// Top-level form of a SPARQL query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryForm {
    Select,
    Ask,
    Construct,
    Describe,
}

/// Skips whitespace and `#` comments.
fn skip_trivia(mut text: &str) -> &str {
    loop {
        text = text.trim_start();
        match text.strip_prefix('#') {
            Some(comment) => text = comment.split_once('\n').map_or("", |(_, rest)| rest),
            None => return text,
        }
    }
}

/// Skips one `<...>` IRI reference, which may contain `#`.
fn skip_iri(text: &str) -> &str {
    let text = skip_trivia(text);
    text.strip_prefix('<')
        .map_or(text, |iri| iri.split_once('>').map_or("", |(_, rest)| rest))
}

/// Detects the query form after the prologue (`PREFIX`/`BASE`) and comments.
///
/// Keywords are read as alphabetic runs, so `ASK{` and `PREFIX p:<...>` need
/// no surrounding whitespace. Unrecognized text is treated as SELECT and left
/// for the endpoint to reject.
#[must_use]
pub fn query_form(query: &str) -> QueryForm {
    let mut rest = query;
    loop {
        rest = skip_trivia(rest);
        let end = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let (keyword, after) = rest.split_at(end);
        match keyword.to_ascii_uppercase().as_str() {
            "PREFIX" => {
                let prefixed = skip_trivia(after);
                rest = skip_iri(prefixed.split_once(':').map_or("", |(_, iri)| iri));
            }
            "BASE" => rest = skip_iri(after),
            "ASK" => return QueryForm::Ask,
            "CONSTRUCT" => return QueryForm::Construct,
            "DESCRIBE" => return QueryForm::Describe,
            _ => return QueryForm::Select,
        }
    }
}

/// Runs caller-supplied SPARQL with the executor method matching its form.
///
/// # Errors
/// Propagates endpoint failures and result encoding failures.
pub async fn run_raw(executor: &dyn SparqlExecutor, query: &str) -> Result<ToolResult, ToolError> {
    let form = query_form(query);
    debug!(endpoint = executor.endpoint(), ?form, "running caller query");
    match form {
        QueryForm::Ask => {
            let answer = executor.ask(query).await?;
            ToolResult::json(&json!({ "boolean": answer }))
        }
        QueryForm::Construct | QueryForm::Describe => {
            ToolResult::json(&executor.construct(query).await?)
        }
        QueryForm::Select => ToolResult::json(&executor.select(query).await?),
    }
}

/// A tool that renders a catalog query and returns its SELECT result.
pub(crate) fn select_tool<P, B>(
    name: &'static str,
    description: &'static str,
    institution: Institution,
    schema: InputSchema,
    executor: &Arc<dyn SparqlExecutor>,
    build: B,
) -> ToolDefinition
where
    P: DeserializeOwned + Send + 'static,
    B: Fn(&P) -> Result<String, QueryError> + Send + Sync + 'static,
{
    let executor = Arc::clone(executor);
    ToolDefinition::typed(
        name,
        description,
        Affiliation::from(institution),
        schema,
        move |params: P| {
            let query = build(&params);
            let executor = Arc::clone(&executor);
            async move {
                let query = query?;
                debug!(tool = name, %query, "rendered catalog query");
                let result = executor.select(&query).await?;
                ToolResult::json(&result)
            }
        },
    )
}

/// A tool forwarding raw SPARQL to one chamber's endpoint.
pub(crate) fn raw_query_tool(
    name: &'static str,
    description: &'static str,
    institution: Institution,
    executor: &Arc<dyn SparqlExecutor>,
) -> ToolDefinition {
    let executor = Arc::clone(executor);
    ToolDefinition::typed(
        name,
        description,
        Affiliation::from(institution),
        InputSchema::object()
            .string("query", "Query SPARQL da eseguire")
            .require(&["query"]),
        move |params: RawQuery| {
            let executor = Arc::clone(&executor);
            async move { run_raw(executor.as_ref(), &params.query).await }
        },
    )
}

/// Registry holding both chambers' tool sets.
///
/// # Errors
/// Fails only if the built-in tool sets are malformed or overlap.
pub fn default_registry(
    camera: Arc<dyn SparqlExecutor>,
    senato: Arc<dyn SparqlExecutor>,
) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register_many(camera::tools(&camera))?;
    registry.register_many(senato::tools(&senato))?;
    let stats = registry.statistics();
    info!(
        total = stats.total,
        camera = stats.by_institution.camera,
        senato = stats.by_institution.senato,
        camera_endpoint = camera.endpoint(),
        senato_endpoint = senato.endpoint(),
        "tool registry ready"
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_form_skips_the_prologue() {
        let query = "PREFIX ocd: <http://dati.camera.it/ocd/>\nPREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>\n# comment\nask { ?s ?p ?o }";
        assert_eq!(query_form(query), QueryForm::Ask);
        assert_eq!(
            query_form("BASE <http://example.org/> CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }"),
            QueryForm::Construct
        );
        assert_eq!(query_form("SELECT * WHERE { ?s ?p ?o }"), QueryForm::Select);
        assert_eq!(query_form("DESCRIBE <http://x>"), QueryForm::Describe);
        assert_eq!(query_form(""), QueryForm::Select);
    }

    #[test]
    fn query_form_needs_no_whitespace_around_keywords() {
        assert_eq!(
            query_form("PREFIX osr:<http://dati.senato.it/osr/>\nASK { ?s a osr:Senatore }"),
            QueryForm::Ask
        );
        assert_eq!(query_form("ASK{ ?s ?p ?o }"), QueryForm::Ask);
        assert_eq!(
            query_form("CONSTRUCT{ ?s ?p ?o } WHERE { ?s ?p ?o }"),
            QueryForm::Construct
        );
        assert_eq!(
            query_form("PREFIX : <http://dati.camera.it/ocd/> # default prefix\nDESCRIBE :x"),
            QueryForm::Describe
        );
        assert_eq!(
            query_form("PREFIX rdfs:<http://www.w3.org/2000/01/rdf-schema#> SELECT ?s WHERE { ?s rdfs:label ?l }"),
            QueryForm::Select
        );
        assert_eq!(query_form("PREFIX broken"), QueryForm::Select);
    }
}
