//! Daemon entry point for the republic MCP server.
//!
//! Loads configuration from flags and the environment, builds the tool
//! registry against the Camera and Senato endpoints, and serves it over MCP
//! stdio, MCP streamable HTTP and REST as configured.

mod config;
mod registry;

use std::sync::Arc;

use republic_http::{HttpServer, HttpServerConfig};
use republic_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};
use tokio::task::JoinSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::RepublicConfig;
use crate::registry::build_registry;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    init_tracing();
    let config = RepublicConfig::from_args()?;
    let registry = Arc::new(build_registry(&config.sparql)?);

    let mut servers: JoinSet<Result<(), BoxError>> = JoinSet::new();
    if config.http_serve {
        let server = HttpServer::new(
            Arc::clone(&registry),
            HttpServerConfig::new(config.http_addr).with_request_timeout(config.http_timeout),
        );
        servers.spawn(server.serve());
    }
    if config.mcp_serve {
        servers.spawn(serve_streamable_http(
            Arc::clone(&registry),
            McpHttpServerConfig::new(config.mcp_http_addr),
        ));
    }
    if config.enable_stdio {
        servers.spawn(serve_stdio(Arc::clone(&registry)));
    }

    while let Some(finished) = servers.join_next().await {
        finished??;
    }
    info!("republic-mcpd stopped");
    Ok(())
}
