//! MCP server implementation for republic-mcp.
//!
//! This crate exposes the shared [`ToolRegistry`] through rmcp: every
//! registered tool is listed with its input schema and every call is
//! dispatched through the registry, so tool failures reach the client as
//! `isError` results rather than protocol errors.

mod helpers;
pub mod server;

use std::sync::Arc;

use republic_core::{Arguments, ToolContent, ToolDefinition, ToolRegistry, ToolResult};
use rmcp::model::{
    CallToolRequestParams,
    CallToolResult,
    Content,
    ErrorCode,
    Implementation,
    ListToolsResult,
    PaginatedRequestParams,
    ServerCapabilities,
    ServerInfo,
    Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData, ServerHandler};
use tracing::debug;

pub const SERVER_NAME: &str = "republic-mcp";

const SERVER_INSTRUCTIONS: &str = r"republic-mcp exposes the open data of the Italian Parliament (Camera dei Deputati and Senato della Repubblica) as SPARQL-backed tools.

Tool families:
- Camera tools have no prefix: deputies (`search_deputati`, `get_deputato_info`), acts (`search_atti`, `get_atto_info`, `get_atti_con_fasi`), votes (`get_votazioni`, `get_espressioni_voto`), organs and governments, speeches (`search_interventi`).
- Senato tools start with `senato_`: senators, bills (DDL), votes, commissions and parliamentary groups.
- `execute_sparql` and `senato_execute_sparql` run raw SELECT, ASK, CONSTRUCT or DESCRIBE queries against each endpoint.

Notes:
- Results are SPARQL JSON (`head.vars`, `results.bindings`) rendered as text.
- The current legislature is the XIX; most tools default to it.
- Camera dates are `YYYYMMDD`, Senato dates are `YYYY-MM-DD`.
- Name filters are case-insensitive regular expressions.
- Limits are capped at 1000 rows.";

/// MCP server wrapper around the tool registry.
#[derive(Debug, Clone)]
pub struct RepublicMcp {
    registry: Arc<ToolRegistry>,
}

impl RepublicMcp {
    /// Creates a new server using a registry by value.
    #[must_use]
    pub fn new(registry: ToolRegistry) -> Self {
        Self::with_registry(Arc::new(registry))
    }

    /// Creates a new server using a shared registry handle.
    #[must_use]
    pub const fn with_registry(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Registered tools as MCP tool descriptors, in registration order.
    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        self.registry.all().iter().map(to_mcp_tool).collect()
    }

    /// Runs a tool; unknown tools and failures come back as error results.
    pub async fn call(&self, name: &str, arguments: Option<Arguments>) -> CallToolResult {
        let result = self
            .registry
            .dispatch(name, arguments.unwrap_or_default())
            .await;
        debug!(tool = name, is_error = result.is_error, "mcp tool call");
        to_call_result(result)
    }
}

fn to_mcp_tool(tool: &ToolDefinition) -> Tool {
    Tool::new(
        tool.name.clone(),
        tool.description.clone(),
        Arc::new(tool.input_schema.to_json_object()),
    )
}

fn to_content(item: ToolContent) -> Content {
    match item {
        ToolContent::Text { text } => Content::text(text),
        ToolContent::Image { data, mime_type } => Content::image(data, mime_type),
        ToolContent::Resource { resource } => {
            Content::embedded_text(resource.uri, resource.text.unwrap_or_default())
        }
    }
}

fn to_call_result(result: ToolResult) -> CallToolResult {
    let content = result.content.into_iter().map(to_content).collect();
    if result.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

impl ServerHandler for RepublicMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        if request.and_then(|params| params.cursor).is_some() {
            return Err(helpers::mcp_err(
                ErrorCode::INVALID_PARAMS,
                "tool listing is not paginated",
            ));
        }
        Ok(ListToolsResult {
            tools: self.tools(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.call(&request.name, request.arguments).await)
    }
}

#[cfg(test)]
mod tests {
    use republic_core::{Affiliation, InputSchema, ToolError};
    use rmcp::model::RawContent;
    use serde_json::json;

    use super::*;

    fn server() -> RepublicMcp {
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
                    "get_votazioni",
                    "Votazioni",
                    Affiliation::Camera,
                    InputSchema::object()
                        .string("data_da", "Data inizio")
                        .require(&["data_da"]),
                    |_args| async {
                        Err(ToolError::InvalidArguments {
                            tool: "get_votazioni".to_string(),
                            message: "unreachable".to_string(),
                        })
                    },
                ),
            ])
            .expect("test tools register");
        RepublicMcp::new(registry)
    }

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|item| match &item.raw {
                RawContent::Text(text) => Some(text.text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn info_advertises_tools_and_identity() {
        let info = server().get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
        assert!(
            info.instructions
                .as_deref()
                .is_some_and(|text| text.contains("senato_"))
        );
    }

    #[test]
    fn tools_carry_their_input_schema() {
        let tools = server().tools();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "ping");
        let schema = &tools[1].input_schema;
        assert_eq!(schema.get("type"), Some(&json!("object")));
        assert_eq!(schema.get("required"), Some(&json!(["data_da"])));
        assert!(!schema.contains_key("institution"));
    }

    #[tokio::test]
    async fn calls_default_to_empty_arguments() {
        let result = server().call("ping", None).await;
        assert_eq!(result.is_error, Some(false));
        assert_eq!(text_of(&result), "pong");
    }

    #[tokio::test]
    async fn failures_are_error_results() {
        let server = server();

        let unknown = server.call("nope", None).await;
        assert_eq!(unknown.is_error, Some(true));
        assert_eq!(text_of(&unknown), "Error: Unknown tool: nope");

        let invalid = server.call("get_votazioni", Some(Arguments::new())).await;
        assert_eq!(invalid.is_error, Some(true));
        assert!(text_of(&invalid).contains("missing required argument \"data_da\""));
    }

    #[test]
    fn every_content_kind_converts() {
        let result = to_call_result(ToolResult {
            content: vec![
                ToolContent::text("riepilogo"),
                ToolContent::Image {
                    data: "aGVsbG8=".to_string(),
                    mime_type: "image/png".to_string(),
                },
            ],
            is_error: false,
        });
        assert_eq!(result.content.len(), 2);
        assert!(matches!(result.content[1].raw, RawContent::Image(_)));
    }
}
