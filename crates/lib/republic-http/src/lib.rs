//! REST front-end for republic-mcp.
//!
//! Lists the registered tools and runs them over plain JSON, for clients that
//! do not speak MCP.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Json, Path, State};
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use republic_core::{
    Arguments,
    RegistryStatistics,
    ToolDefinition,
    ToolError,
    ToolInfo,
    ToolRegistry,
    ToolResult,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

pub const SERVICE_NAME: &str = "republic-mcp";
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Configuration for the REST server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub addr: SocketAddr,
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
}

impl HttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            max_body_bytes: 1024 * 1024,
            request_timeout: Duration::from_secs(60),
        }
    }

    #[must_use]
    pub const fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_HTTP_PORT)))
    }
}

/// REST server wrapper.
pub struct HttpServer {
    config: HttpServerConfig,
    state: AppState,
}

impl HttpServer {
    #[must_use]
    pub const fn new(registry: Arc<ToolRegistry>, config: HttpServerConfig) -> Self {
        let state = AppState {
            registry,
            request_timeout: config.request_timeout,
        };
        Self { config, state }
    }

    /// The routes this server answers, without binding a socket.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.config.max_body_bytes)
    }

    /// Runs the HTTP server until Ctrl-C or SIGTERM.
    ///
    /// # Errors
    /// Returns any listener or server error.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = self.config.addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let app = self.router();

        info!(
            tools = self.state.registry.count(),
            "republic-http listening on {addr}"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("republic-http stopped");
        Ok(())
    }
}

#[derive(Clone)]
struct AppState {
    registry: Arc<ToolRegistry>,
    request_timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn timeout() -> Self {
        Self {
            status: StatusCode::REQUEST_TIMEOUT,
            message: "tool call timed out".to_string(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::UnknownTool(_) => Self::not_found(err.to_string()),
            err if err.is_client_error() => Self::bad_request(err.to_string()),
            err => Self::internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = Json(ErrorResponse { error: self.message });
        (self.status, payload).into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    tools: usize,
}

#[derive(Debug, Serialize)]
struct ToolsResponse {
    tools: Vec<ToolInfo>,
}

fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/api/tools", get(list_tools))
        .route("/api/tools/:name", get(tool_info))
        .route("/api/call", post(call_tool))
        .route("/api/stats", get(stats))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        tools: state.registry.count(),
    })
}

async fn list_tools(State(state): State<AppState>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: state.registry.all().iter().map(ToolDefinition::info).collect(),
    })
}

async fn tool_info(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ToolInfo>, ApiError> {
    state
        .registry
        .get(&name)
        .map(|tool| Json(tool.info()))
        .ok_or_else(|| ApiError::not_found(format!("Tool not found: {name}")))
}

async fn stats(State(state): State<AppState>) -> Json<RegistryStatistics> {
    Json(state.registry.statistics())
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

/// Splits a `{tool, params}` body into the tool name and its arguments.
fn parse_call(body: &[u8]) -> Result<(String, Arguments), ApiError> {
    let payload: Value =
        serde_json::from_slice(body).map_err(|_| ApiError::bad_request("Invalid JSON"))?;
    let tool = payload
        .get("tool")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing tool name"))?;
    let params = match payload.get("params") {
        None | Some(Value::Null) => Arguments::new(),
        Some(Value::Object(params)) => params.clone(),
        Some(_) => return Err(ApiError::bad_request("params must be a JSON object")),
    };
    Ok((tool.to_string(), params))
}

async fn call_tool(State(state): State<AppState>, body: Bytes) -> Result<Json<ToolResult>, ApiError> {
    let (name, params) = parse_call(&body)?;
    let result = tokio::time::timeout(state.request_timeout, state.registry.call(&name, params))
        .await
        .map_err(|_| {
            warn!(tool = %name, "tool call timed out");
            ApiError::timeout()
        })??;

    Ok(Json(result))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl-C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use republic_core::{Affiliation, InputSchema};
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;

    fn registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry
            .register_many([
                ToolDefinition::new(
                    "ping",
                    "Replies with pong",
                    Affiliation::Both,
                    InputSchema::object(),
                    |_args| async { Ok(ToolResult::text("pong")) },
                ),
                ToolDefinition::new(
                    "search_atti",
                    "Cerca atti",
                    Affiliation::Camera,
                    InputSchema::object()
                        .string("titolo", "Titolo")
                        .require(&["titolo"]),
                    |args| async move {
                        let titolo = args.get("titolo").cloned().unwrap_or_default();
                        ToolResult::json(&json!({ "titolo": titolo }))
                    },
                ),
                ToolDefinition::new(
                    "senato_get_ddl_iter",
                    "Iter DDL",
                    Affiliation::Senato,
                    InputSchema::object(),
                    |_args| async {
                        Err(ToolError::Serialization(
                            serde_json::from_str::<Value>("{").expect_err("truncated JSON"),
                        ))
                    },
                ),
                ToolDefinition::new(
                    "slow",
                    "Never answers in time",
                    Affiliation::Both,
                    InputSchema::object(),
                    |_args| async {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        Ok(ToolResult::text("late"))
                    },
                ),
            ])
            .expect("test tools register");
        Arc::new(registry)
    }

    fn app() -> Router {
        HttpServer::new(
            registry(),
            HttpServerConfig::default().with_request_timeout(Duration::from_millis(50)),
        )
        .router()
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.expect("router answers");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        send(Request::get(uri).body(Body::empty()).expect("request builds")).await
    }

    async fn post_call(body: impl Into<Body>) -> (StatusCode, Value) {
        send(
            Request::post("/api/call")
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
                .expect("request builds"),
        )
        .await
    }

    #[tokio::test]
    async fn health_reports_tool_count() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], SERVICE_NAME);
        assert_eq!(body["tools"], 4);
    }

    #[tokio::test]
    async fn tools_are_listed_with_institution() {
        let (status, body) = get_json("/api/tools").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tools"][1]["name"], "search_atti");
        assert_eq!(body["tools"][1]["institution"], "camera");
        assert_eq!(body["tools"][1]["inputSchema"]["required"], json!(["titolo"]));

        let (status, body) = get_json("/api/tools/senato_get_ddl_iter").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["institution"], "senato");

        let (status, body) = get_json("/api/tools/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Tool not found: missing");
    }

    #[tokio::test]
    async fn call_returns_the_tool_result() {
        let (status, body) =
            post_call(json!({ "tool": "search_atti", "params": { "titolo": "bilancio" } }).to_string())
                .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"][0]["type"], "text");
        assert!(body["content"][0]["text"].as_str().is_some_and(|text| text.contains("bilancio")));
        assert!(body.get("isError").is_none());
    }

    #[tokio::test]
    async fn call_errors_map_to_statuses() {
        let (status, body) = post_call("{not json").await;
        assert_eq!((status, body["error"].clone()), (StatusCode::BAD_REQUEST, json!("Invalid JSON")));

        let (status, body) = post_call(json!({ "params": {} }).to_string()).await;
        assert_eq!((status, body["error"].clone()), (StatusCode::BAD_REQUEST, json!("Missing tool name")));

        let (status, body) = post_call(json!({ "tool": "search_atti" }).to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some_and(|text| text.contains("titolo")));

        let (status, body) = post_call(json!({ "tool": "nope" }).to_string()).await;
        assert_eq!((status, body["error"].clone()), (StatusCode::NOT_FOUND, json!("Unknown tool: nope")));

        let (status, _) = post_call(json!({ "tool": "senato_get_ddl_iter" }).to_string()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = post_call(json!({ "tool": "slow" }).to_string()).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn stats_and_fallback() {
        let (status, body) = get_json("/api/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 4);
        assert_eq!(body["byInstitution"]["both"], 2);
        assert_eq!(body["toolNames"][0], "ping");

        let (status, body) = get_json("/api/unknown").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");
    }
}
