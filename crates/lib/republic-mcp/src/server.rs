//! MCP server runners for republic-mcp.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use republic_core::ToolRegistry;
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig,
    StreamableHttpService,
    session::local::LocalSessionManager,
};
use tracing::info;

use crate::RepublicMcp;

pub const DEFAULT_MCP_HTTP_PORT: u16 = 4020;

/// Configuration for the MCP streamable HTTP server.
#[derive(Debug, Clone)]
pub struct McpHttpServerConfig {
    pub addr: SocketAddr,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
    pub sse_retry: Option<Duration>,
}

impl McpHttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            stateful_mode: true,
            sse_keep_alive: Some(Duration::from_secs(15)),
            sse_retry: Some(Duration::from_secs(3)),
        }
    }

    #[must_use]
    pub const fn with_stateful_mode(mut self, stateful_mode: bool) -> Self {
        self.stateful_mode = stateful_mode;
        self
    }

    #[must_use]
    pub const fn with_sse_keep_alive(mut self, sse_keep_alive: Option<Duration>) -> Self {
        self.sse_keep_alive = sse_keep_alive;
        self
    }
}

impl Default for McpHttpServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_MCP_HTTP_PORT)))
    }
}

/// Serves the MCP server over stdio.
///
/// # Errors
/// Returns any transport or server error.
pub async fn serve_stdio(
    registry: Arc<ToolRegistry>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let service = RepublicMcp::with_registry(registry);
    let (stdin, stdout) = stdio();
    info!("mcp stdio transport ready");
    let running = serve_server(service, (stdin, stdout)).await?;
    let quit = running.waiting().await?;
    info!(reason = ?quit, "mcp stdio transport closed");
    Ok(())
}

/// Routes for the streamable HTTP transport: `/mcp` plus a `/health` probe.
#[must_use]
pub fn mcp_router(registry: Arc<ToolRegistry>, config: &McpHttpServerConfig) -> Router {
    let service: StreamableHttpService<RepublicMcp, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(RepublicMcp::with_registry(Arc::clone(&registry))),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                sse_keep_alive: config.sse_keep_alive,
                sse_retry: config.sse_retry,
                stateful_mode: config.stateful_mode,
                ..Default::default()
            },
        );

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", service)
}

/// Serves the MCP server using streamable HTTP transport.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve_streamable_http(
    registry: Arc<ToolRegistry>,
    config: McpHttpServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = mcp_router(registry, &config);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("mcp streamable http listening on {}/mcp", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}
