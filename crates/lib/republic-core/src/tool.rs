//! Tool definitions: schema, affiliation, handler and result shapes.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use republic_sparql::{QueryError, SparqlError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::institution::Institution;

/// Arguments of a tool call.
pub type Arguments = Map<String, Value>;

pub type ToolFuture = BoxFuture<'static, Result<ToolResult, ToolError>>;

/// Single-argument async handler; every [`ToolDefinition`] owns one.
pub type ToolHandler = Arc<dyn Fn(Arguments) -> ToolFuture + Send + Sync>;

/// Which chamber a tool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Affiliation {
    Camera,
    Senato,
    Both,
}

impl Affiliation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Senato => "senato",
            Self::Both => "both",
        }
    }

    /// True when a tool with this affiliation serves `institution`.
    #[must_use]
    pub fn serves(self, institution: Institution) -> bool {
        self == Self::Both || self == Self::from(institution)
    }
}

impl From<Institution> for Affiliation {
    fn from(institution: Institution) -> Self {
        match institution {
            Institution::Camera => Self::Camera,
            Institution::Senato => Self::Senato,
        }
    }
}

impl fmt::Display for Affiliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

impl PropertyType {
    fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (Self::String, Value::String(_))
            | (Self::Number, Value::Number(_))
            | (Self::Boolean, Value::Bool(_))
            | (Self::Object, Value::Object(_))
            | (Self::Array, Value::Array(_)) => true,
            (Self::Integer, Value::Number(number)) => number.is_i64() || number.is_u64(),
            _ => false,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: PropertyType,
    pub description: String,
}

/// JSON-schema subset accepted by the registry:
/// `{type: "object", properties: {name: {type, description}}, required}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl Default for InputSchema {
    fn default() -> Self {
        Self::object()
    }
}

impl InputSchema {
    /// An object schema without properties.
    #[must_use]
    pub fn object() -> Self {
        Self {
            kind: "object".to_string(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    #[must_use]
    pub fn property(mut self, name: &str, kind: PropertyType, description: &str) -> Self {
        self.properties.insert(
            name.to_string(),
            PropertySchema {
                kind,
                description: description.to_string(),
            },
        );
        self
    }

    #[must_use]
    pub fn string(self, name: &str, description: &str) -> Self {
        self.property(name, PropertyType::String, description)
    }

    #[must_use]
    pub fn number(self, name: &str, description: &str) -> Self {
        self.property(name, PropertyType::Number, description)
    }

    #[must_use]
    pub fn boolean(self, name: &str, description: &str) -> Self {
        self.property(name, PropertyType::Boolean, description)
    }

    #[must_use]
    pub fn require(mut self, names: &[&str]) -> Self {
        self.required.extend(names.iter().map(|name| (*name).to_string()));
        self
    }

    /// Structural checks done once at registration.
    ///
    /// # Errors
    /// Describes the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.kind != "object" {
            return Err(format!("type must be \"object\", found \"{}\"", self.kind));
        }
        if let Some(missing) = self
            .required
            .iter()
            .find(|name| !self.properties.contains_key(name.as_str()))
        {
            return Err(format!("required property \"{missing}\" is not declared"));
        }
        Ok(())
    }

    /// Checks call arguments: required keys present and declared types honoured.
    ///
    /// Undeclared keys pass through untouched.
    ///
    /// # Errors
    /// Describes the first offending argument.
    pub fn check(&self, args: &Arguments) -> Result<(), String> {
        for name in &self.required {
            if args.get(name).is_none_or(Value::is_null) {
                return Err(format!("missing required argument \"{name}\""));
            }
        }
        for (name, value) in args {
            let Some(property) = self.properties.get(name) else {
                continue;
            };
            if !value.is_null() && !property.kind.accepts(value) {
                return Err(format!(
                    "argument \"{name}\" must be of type {}",
                    property.kind.as_str()
                ));
            }
        }
        Ok(())
    }

    /// The schema as a JSON object, as MCP `inputSchema` expects it.
    #[must_use]
    pub fn to_json_object(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// `resource` content payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBody {
    pub uri: String,
    #[serde(rename = "mimeType", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text {
        text: String,
    },
    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    Resource {
        resource: ResourceBody,
    },
}

impl ToolContent {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Ordered content items plus the error flag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(text)],
            is_error: false,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(message)],
            is_error: true,
        }
    }

    /// Pretty-printed JSON as a single text item.
    ///
    /// # Errors
    /// Returns [`ToolError::Serialization`] if `value` cannot be encoded.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ToolError> {
        Ok(Self::text(serde_json::to_string_pretty(value)?))
    }

    /// Concatenated text of every text item.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|item| match item {
                ToolContent::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Sparql(#[from] SparqlError),
    #[error("failed to serialize tool result: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// True for failures caused by the caller rather than the backend.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidArguments { .. } | Self::Query(_))
    }
}

/// Serializable view of a tool, without its handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: InputSchema,
    pub institution: Affiliation,
}

/// A named, schema-described operation and its handler.
#[derive(Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub affiliation: Affiliation,
    pub input_schema: InputSchema,
    handler: ToolHandler,
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("affiliation", &self.affiliation)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

impl ToolDefinition {
    /// Wraps a handler that receives the raw argument map.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        affiliation: Affiliation,
        input_schema: InputSchema,
        handler: F,
    ) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolResult, ToolError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            affiliation,
            input_schema,
            handler: Arc::new(move |args| handler(args).boxed()),
        }
    }

    /// Wraps a handler taking typed parameters decoded from the argument map.
    ///
    /// Decoding failures surface as [`ToolError::InvalidArguments`].
    pub fn typed<P, F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        affiliation: Affiliation,
        input_schema: InputSchema,
        handler: F,
    ) -> Self
    where
        P: DeserializeOwned + Send + 'static,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolResult, ToolError>> + Send + 'static,
    {
        let name = name.into();
        let tool = name.clone();
        let handler = Arc::new(handler);
        Self::new(name, description, affiliation, input_schema, move |args| {
            let decoded = serde_json::from_value::<P>(Value::Object(args)).map_err(|err| {
                ToolError::InvalidArguments {
                    tool: tool.clone(),
                    message: err.to_string(),
                }
            });
            let handler = Arc::clone(&handler);
            async move { handler(decoded?).await }
        })
    }

    /// Checks arguments against the schema, then runs the handler.
    ///
    /// # Errors
    /// Returns [`ToolError::InvalidArguments`] for schema violations and
    /// whatever the handler fails with.
    pub async fn invoke(&self, args: Arguments) -> Result<ToolResult, ToolError> {
        self.input_schema
            .check(&args)
            .map_err(|message| ToolError::InvalidArguments {
                tool: self.name.clone(),
                message,
            })?;
        (self.handler)(args).await
    }

    #[must_use]
    pub fn info(&self) -> ToolInfo {
        ToolInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
            institution: self.affiliation,
        }
    }
}
