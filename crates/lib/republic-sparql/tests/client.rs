use std::collections::HashMap;
use std::time::Duration;

use axum::extract::Form;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use republic_sparql::{
    QueryBuilder,
    QueryOptions,
    SparqlClient,
    SparqlClientConfig,
    SparqlError,
    SparqlExecutor,
    TermKind,
    WhereClause,
};

const SELECT_BODY: &str = r#"{
  "head": {"vars": ["deputato", "cognome", "nome"]},
  "results": {"bindings": [
    {
      "deputato": {"type": "uri", "value": "http://dati.camera.it/ocd/deputato.rdf/d1_19"},
      "cognome": {"type": "literal", "value": "Rossi", "xml:lang": "it"},
      "nome": {"type": "typed-literal", "value": "Mario", "datatype": "http://www.w3.org/2001/XMLSchema#string"}
    }
  ]}
}"#;

const CONSTRUCT_BODY: &str = r#"{
  "http://dati.senato.it/senatore/1": {
    "http://xmlns.com/foaf/0.1/lastName": [{"type": "literal", "value": "Bianchi"}]
  }
}"#;

async fn endpoint(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
    let query = form.get("query").cloned().unwrap_or_default();
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if query.contains("BROKEN") {
        return (StatusCode::BAD_REQUEST, "Virtuoso 37000 Error SP030: SPARQL compiler").into_response();
    }
    if query.contains("GARBAGE") {
        return (StatusCode::OK, "<html>not json</html>").into_response();
    }
    if query.trim_start().starts_with("ASK") || query.contains("\nASK {") {
        return ([(header::CONTENT_TYPE, "application/sparql-results+json")], r#"{"head":{},"boolean":true}"#)
            .into_response();
    }
    if accept == "application/rdf+json" {
        return ([(header::CONTENT_TYPE, "application/rdf+json")], CONSTRUCT_BODY).into_response();
    }
    ([(header::CONTENT_TYPE, "application/sparql-results+json")], SELECT_BODY).into_response()
}

async fn spawn_endpoint() -> String {
    let app = Router::new().route("/sparql", post(endpoint));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake endpoint");
    let addr = listener.local_addr().expect("fake endpoint address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake endpoint should serve");
    });
    format!("http://{addr}/sparql")
}

fn client_for(endpoint: &str) -> SparqlClient {
    SparqlClient::new(SparqlClientConfig::new(endpoint).with_timeout(Duration::from_secs(5)))
        .expect("client should build")
}

#[tokio::test]
async fn select_normalizes_bindings() {
    let endpoint = spawn_endpoint().await;
    let client = client_for(&endpoint);

    let query = QueryBuilder::new(&[]).select(
        "?deputato ?cognome ?nome",
        &WhereClause::new().triples("?deputato foaf:surname ?cognome ; foaf:firstName ?nome ."),
        &QueryOptions::new().with_limit(1),
    );
    let result = client.select(&query).await.expect("select should succeed");

    assert_eq!(result.vars(), ["deputato", "cognome", "nome"]);
    let row = &result.bindings()[0];
    assert_eq!(row["deputato"].kind, TermKind::Uri);
    assert_eq!(row["cognome"].lang.as_deref(), Some("it"));
    assert_eq!(row["nome"].kind, TermKind::Literal);
    assert!(row["nome"].datatype.is_some());
}

#[tokio::test]
async fn ask_reads_boolean() {
    let endpoint = spawn_endpoint().await;
    let client = client_for(&endpoint);

    let query = QueryBuilder::new(&[]).ask(&WhereClause::new().triples("?s a ?o ."));
    assert!(client.ask(&query).await.expect("ask should succeed"));
}

#[tokio::test]
async fn construct_flattens_triples() {
    let endpoint = spawn_endpoint().await;
    let client = client_for(&endpoint);

    let triples = client
        .construct("CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o } LIMIT 1")
        .await
        .expect("construct should succeed");

    assert_eq!(triples.len(), 1);
    assert_eq!(triples[0].predicate, "http://xmlns.com/foaf/0.1/lastName");
    assert_eq!(triples[0].object, "Bianchi");
}

#[tokio::test]
async fn endpoint_errors_are_wrapped_with_the_url() {
    let endpoint = spawn_endpoint().await;
    let client = client_for(&endpoint);

    let err = client
        .select("SELECT * WHERE { BROKEN }")
        .await
        .expect_err("select should fail");
    assert!(matches!(err, SparqlError::Status { status: 400, .. }));
    assert_eq!(err.endpoint(), endpoint);
    assert!(err.to_string().contains("SP030"));

    let err = client
        .select("SELECT * WHERE { GARBAGE }")
        .await
        .expect_err("decode should fail");
    assert!(matches!(err, SparqlError::Decode { .. }));
}

#[tokio::test]
async fn unreachable_endpoints_surface_transport_errors() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("reserve port");
    let addr = listener.local_addr().expect("reserved address");
    drop(listener);

    let client = client_for(&format!("http://{addr}/sparql"));
    let err = client.select("SELECT * WHERE { ?s ?p ?o }").await.expect_err("should fail");
    assert!(matches!(err, SparqlError::Transport { .. }));
    assert!(err.to_string().starts_with("SPARQL query failed for http://"));
}
