//! Core catalog for republic-mcp.
//!
//! This crate maps the Camera and Senato ontologies onto SPARQL query
//! builders, wraps each query as a schema-checked tool and keeps the tools in
//! a [`ToolRegistry`] that both the MCP and HTTP front-ends dispatch through.

pub mod institution;
pub mod queries;
pub mod registry;
pub mod tool;
pub mod tools;

pub use institution::{CAMERA, CURRENT_LEGISLATURE, Institution, InstitutionConfig, SENATO};
pub use registry::{ByAffiliation, RegistryError, RegistryStatistics, ToolRegistry};
pub use tool::{
    Affiliation,
    Arguments,
    InputSchema,
    ToolContent,
    ToolDefinition,
    ToolError,
    ToolInfo,
    ToolResult,
};
pub use tools::default_registry;
