use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use republic_core::tools::{camera, senato};
use republic_core::{
    Affiliation,
    Arguments,
    InputSchema,
    Institution,
    ToolDefinition,
    ToolRegistry,
    ToolResult,
    default_registry,
};
use republic_sparql::{QueryResult, SparqlError, SparqlExecutor, SparqlFuture, Triple};
use serde_json::json;

/// Records every query and answers with an empty result, or fails.
#[derive(Default)]
struct RecordingExecutor {
    queries: Mutex<Vec<String>>,
    failure: Option<String>,
}

impl RecordingExecutor {
    fn failing(reason: &str) -> Self {
        Self {
            queries: Mutex::default(),
            failure: Some(reason.to_string()),
        }
    }

    fn last_query(&self) -> String {
        self.queries
            .lock()
            .expect("query log lock")
            .last()
            .cloned()
            .expect("a query was executed")
    }

    fn record<T: Default + Send + 'static>(&self, query: &str) -> SparqlFuture<'_, T> {
        self.queries
            .lock()
            .expect("query log lock")
            .push(query.to_string());
        let outcome = self.failure.as_ref().map_or_else(
            || Ok(T::default()),
            |reason| {
                Err(SparqlError::Status {
                    endpoint: self.endpoint().to_string(),
                    status: 500,
                    body: reason.clone(),
                })
            },
        );
        async move { outcome }.boxed()
    }
}

impl SparqlExecutor for RecordingExecutor {
    fn endpoint(&self) -> &str {
        "http://sparql.test/endpoint"
    }

    fn select<'a>(&'a self, query: &'a str) -> SparqlFuture<'a, QueryResult> {
        self.record(query)
    }

    fn ask<'a>(&'a self, query: &'a str) -> SparqlFuture<'a, bool> {
        self.record(query)
    }

    fn construct<'a>(&'a self, query: &'a str) -> SparqlFuture<'a, Vec<Triple>> {
        self.record(query)
    }
}

fn args(value: serde_json::Value) -> Arguments {
    value.as_object().cloned().expect("arguments must be an object")
}

fn executor() -> (Arc<RecordingExecutor>, Arc<dyn SparqlExecutor>) {
    let recording = Arc::new(RecordingExecutor::default());
    let shared: Arc<dyn SparqlExecutor> = recording.clone();
    (recording, shared)
}

#[tokio::test]
async fn ping_tool_round_trips_through_the_registry() {
    let mut registry = ToolRegistry::new();
    registry
        .register(ToolDefinition::new(
            "ping",
            "Replies with pong",
            Affiliation::Both,
            InputSchema::object(),
            |_args| async { Ok(ToolResult::text("pong")) },
        ))
        .expect("ping registers");

    let result = registry.call("ping", Arguments::new()).await.expect("ping succeeds");
    assert_eq!(result.text_content(), "pong");
    assert!(!result.is_error);

    let missing = registry.dispatch("pong", Arguments::new()).await;
    assert!(missing.is_error);
    assert_eq!(missing.text_content(), "Error: Unknown tool: pong");
}

#[tokio::test]
async fn search_atti_sends_an_escaped_regex_with_the_limit() {
    let (recording, shared) = executor();
    let registry = default_registry(Arc::clone(&shared), shared).expect("default registry");

    let result = registry
        .dispatch("search_atti", args(json!({ "titolo": "bilancio", "limit": 5 })))
        .await;
    assert!(!result.is_error, "{}", result.text_content());

    let query = recording.last_query();
    assert!(query.contains("REGEX(?titolo, 'bilancio', 'i')"));
    assert!(query.trim_end().ends_with("LIMIT 5"));
}

#[tokio::test]
async fn endpoint_failures_become_error_results() {
    let failing: Arc<dyn SparqlExecutor> =
        Arc::new(RecordingExecutor::failing("Virtuoso 42000 Error"));
    let (_, healthy) = executor();
    let registry = default_registry(healthy, failing).expect("default registry");

    let result = registry
        .dispatch("senato_get_senatori_correnti", Arguments::new())
        .await;
    assert!(result.is_error);
    let text = result.text_content();
    assert!(text.starts_with("Error: "), "{text}");
    assert!(text.contains("Virtuoso 42000 Error"), "{text}");
}

#[tokio::test]
async fn missing_required_arguments_never_reach_the_endpoint() {
    let (recording, shared) = executor();
    let registry = default_registry(Arc::clone(&shared), shared).expect("default registry");

    let result = registry
        .dispatch("senato_get_ddl_iter", args(json!({ "id_ddl": "dodici" })))
        .await;
    assert!(result.is_error);
    assert!(result.text_content().contains("must be of type number"));
    assert!(recording.queries.lock().expect("query log lock").is_empty());
}

#[tokio::test]
async fn ask_queries_are_answered_with_a_boolean() {
    let (recording, shared) = executor();
    let registry = default_registry(Arc::clone(&shared), shared).expect("default registry");

    let result = registry
        .dispatch(
            "senato_execute_sparql",
            args(json!({ "query": "PREFIX osr: <http://dati.senato.it/osr/>\nASK { ?s a osr:Senatore }" })),
        )
        .await;
    assert!(!result.is_error);
    let body: serde_json::Value =
        serde_json::from_str(&result.text_content()).expect("result is JSON");
    assert_eq!(body, json!({ "boolean": false }));
    assert!(recording.last_query().contains("ASK"));
}

#[test]
fn statistics_split_by_institution() {
    let mut registry = ToolRegistry::new();
    for (name, affiliation) in [
        ("a", Affiliation::Camera),
        ("b", Affiliation::Camera),
        ("c", Affiliation::Senato),
    ] {
        registry
            .register(ToolDefinition::new(
                name,
                "test tool",
                affiliation,
                InputSchema::object(),
                |_args| async { Ok(ToolResult::text("ok")) },
            ))
            .expect("tool registers");
    }

    let stats = registry.statistics();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_institution.camera, 2);
    assert_eq!(stats.by_institution.senato, 1);
    assert_eq!(stats.by_institution.both, 0);
    assert_eq!(stats.tool_names, vec!["a", "b", "c"]);
}

#[test]
fn default_registry_holds_both_catalogs() {
    let (_, shared) = executor();
    let camera_count = camera::tools(&shared).len();
    let senato_count = senato::tools(&shared).len();
    let registry = default_registry(Arc::clone(&shared), shared).expect("default registry");

    assert_eq!(registry.count(), camera_count + senato_count);
    assert_eq!(registry.count_by_institution(Institution::Camera), camera_count);
    assert_eq!(registry.count_by_institution(Institution::Senato), senato_count);
    assert!(camera_count >= 20);
    assert!(senato_count >= 27);

    let names: HashSet<_> = registry.all().iter().map(|tool| tool.name.as_str()).collect();
    assert_eq!(names.len(), registry.count());
    assert!(
        registry
            .by_institution(Institution::Senato)
            .iter()
            .all(|tool| tool.name.starts_with("senato_"))
    );
    assert!(
        registry
            .by_institution(Institution::Camera)
            .iter()
            .all(|tool| !tool.name.starts_with("senato_"))
    );
}

#[test]
fn every_catalog_schema_is_well_formed() {
    let (_, shared) = executor();
    let registry = default_registry(Arc::clone(&shared), shared).expect("default registry");
    for tool in registry.all() {
        assert!(tool.input_schema.validate().is_ok(), "{}", tool.name);
        assert!(!tool.description.trim().is_empty(), "{}", tool.name);
    }
}
