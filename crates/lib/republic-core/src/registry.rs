//! In-memory catalog of tool definitions.
//!
//! A registry is built once at startup and shared behind an `Arc`; the
//! mutating methods exist for assembly and tests.

use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::institution::Institution;
use crate::tool::{Affiliation, Arguments, ToolDefinition, ToolError, ToolResult};

const MAX_NAME_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Tool with name \"{0}\" is already registered")]
    Duplicate(String),
    #[error("Tool must have a valid name, got \"{0}\"")]
    InvalidName(String),
    #[error("Tool \"{0}\" must have a description")]
    MissingDescription(String),
    #[error("Tool \"{name}\" has an invalid input schema: {reason}")]
    InvalidSchema { name: String, reason: String },
    #[error("{} tool(s) rejected: {}", .failures.len(), summarize(.failures))]
    Batch { failures: Vec<RegistryError> },
}

fn summarize(failures: &[RegistryError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One counter (or list) per affiliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ByAffiliation<T> {
    pub camera: T,
    pub senato: T,
    pub both: T,
}

impl<T> ByAffiliation<T> {
    const fn slot_mut(&mut self, affiliation: Affiliation) -> &mut T {
        match affiliation {
            Affiliation::Camera => &mut self.camera,
            Affiliation::Senato => &mut self.senato,
            Affiliation::Both => &mut self.both,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStatistics {
    pub total: usize,
    pub by_institution: ByAffiliation<usize>,
    pub tool_names: Vec<String>,
}

/// Tools keyed by unique name, kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn validate(tool: &ToolDefinition) -> Result<(), RegistryError> {
    if !valid_name(&tool.name) {
        return Err(RegistryError::InvalidName(tool.name.clone()));
    }
    if tool.description.trim().is_empty() {
        return Err(RegistryError::MissingDescription(tool.name.clone()));
    }
    tool.input_schema
        .validate()
        .map_err(|reason| RegistryError::InvalidSchema {
            name: tool.name.clone(),
            reason,
        })
}

impl ToolRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Adds a tool.
    ///
    /// # Errors
    /// Fails on a duplicate name or a malformed definition; the registry is
    /// left unchanged.
    pub fn register(&mut self, tool: ToolDefinition) -> Result<(), RegistryError> {
        if self.has(&tool.name) {
            return Err(RegistryError::Duplicate(tool.name));
        }
        validate(&tool)?;
        debug!(tool = %tool.name, institution = %tool.affiliation, "registered tool");
        self.tools.push(tool);
        Ok(())
    }

    /// Adds every tool or none of them.
    ///
    /// # Errors
    /// Returns [`RegistryError::Batch`] listing each rejected tool, including
    /// names repeated within the batch.
    pub fn register_many(
        &mut self,
        tools: impl IntoIterator<Item = ToolDefinition>,
    ) -> Result<(), RegistryError> {
        let tools: Vec<ToolDefinition> = tools.into_iter().collect();
        let mut failures = Vec::new();
        for (index, tool) in tools.iter().enumerate() {
            let repeated = tools[..index].iter().any(|earlier| earlier.name == tool.name);
            if self.has(&tool.name) || repeated {
                failures.push(RegistryError::Duplicate(tool.name.clone()));
            } else if let Err(err) = validate(tool) {
                failures.push(err);
            }
        }
        if !failures.is_empty() {
            return Err(RegistryError::Batch { failures });
        }
        self.tools.extend(tools);
        Ok(())
    }

    /// Removes a tool; returns whether it was present.
    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.tools.len();
        self.tools.retain(|tool| tool.name != name);
        self.tools.len() != before
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    #[must_use]
    pub fn all(&self) -> &[ToolDefinition] {
        &self.tools
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub const fn count(&self) -> usize {
        self.tools.len()
    }

    /// Tools serving `institution`, shared ones included.
    #[must_use]
    pub fn by_institution(&self, institution: Institution) -> Vec<&ToolDefinition> {
        self.tools
            .iter()
            .filter(|tool| tool.affiliation.serves(institution))
            .collect()
    }

    #[must_use]
    pub fn count_by_institution(&self, institution: Institution) -> usize {
        self.tools
            .iter()
            .filter(|tool| tool.affiliation.serves(institution))
            .count()
    }

    /// Tool names bucketed by declared affiliation.
    #[must_use]
    pub fn names_by_institution(&self) -> ByAffiliation<Vec<String>> {
        let mut names: ByAffiliation<Vec<String>> = ByAffiliation::default();
        for tool in &self.tools {
            names.slot_mut(tool.affiliation).push(tool.name.clone());
        }
        names
    }

    pub fn clear(&mut self) {
        self.tools.clear();
    }

    #[must_use]
    pub fn statistics(&self) -> RegistryStatistics {
        let mut by_institution: ByAffiliation<usize> = ByAffiliation::default();
        for tool in &self.tools {
            *by_institution.slot_mut(tool.affiliation) += 1;
        }
        RegistryStatistics {
            total: self.tools.len(),
            by_institution,
            tool_names: self.tools.iter().map(|tool| tool.name.clone()).collect(),
        }
    }

    /// Resolves, validates and runs a tool.
    ///
    /// # Errors
    /// [`ToolError::UnknownTool`] for unregistered names, otherwise whatever
    /// [`ToolDefinition::invoke`] returns.
    pub async fn call(&self, name: &str, args: Arguments) -> Result<ToolResult, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let started = Instant::now();
        let outcome = tool.invoke(args).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &outcome {
            Ok(_) => debug!(tool = name, elapsed_ms, "tool call finished"),
            Err(err) => warn!(tool = name, elapsed_ms, error = %err, "tool call failed"),
        }
        outcome
    }

    /// Like [`ToolRegistry::call`] but folds every failure into an error result.
    pub async fn dispatch(&self, name: &str, args: Arguments) -> ToolResult {
        match self.call(name, args).await {
            Ok(result) => result,
            Err(err) => ToolResult::error(format!("Error: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::InputSchema;

    fn tool(name: &str, affiliation: Affiliation) -> ToolDefinition {
        ToolDefinition::new(
            name,
            "test tool",
            affiliation,
            InputSchema::object(),
            |_args| async { Ok(ToolResult::text("ok")) },
        )
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(tool("a", Affiliation::Camera)).expect("first registration");
        assert_eq!(
            registry.register(tool("a", Affiliation::Senato)),
            Err(RegistryError::Duplicate("a".to_string()))
        );
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.get("a").map(|t| t.affiliation), Some(Affiliation::Camera));
    }

    #[test]
    fn malformed_definitions_are_rejected() {
        let mut registry = ToolRegistry::new();
        assert!(matches!(
            registry.register(tool("", Affiliation::Both)),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(matches!(
            registry.register(tool("with space", Affiliation::Both)),
            Err(RegistryError::InvalidName(_))
        ));
        let mut blank = tool("blank", Affiliation::Both);
        blank.description = "  ".to_string();
        assert_eq!(
            registry.register(blank),
            Err(RegistryError::MissingDescription("blank".to_string()))
        );
        let mut schema = tool("schema", Affiliation::Both);
        schema.input_schema = InputSchema::object().require(&["ghost"]);
        assert!(matches!(
            registry.register(schema),
            Err(RegistryError::InvalidSchema { .. })
        ));
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn batches_are_all_or_nothing() {
        let mut registry = ToolRegistry::new();
        registry.register(tool("existing", Affiliation::Camera)).expect("seed");
        let err = registry
            .register_many([
                tool("fresh", Affiliation::Camera),
                tool("existing", Affiliation::Camera),
                tool("twice", Affiliation::Senato),
                tool("twice", Affiliation::Senato),
            ])
            .expect_err("batch has duplicates");
        let RegistryError::Batch { failures } = err else {
            panic!("expected a batch error");
        };
        assert_eq!(failures.len(), 2);
        assert!(!registry.has("fresh"));
        assert_eq!(registry.count(), 1);

        registry
            .register_many([tool("x", Affiliation::Camera), tool("y", Affiliation::Senato)])
            .expect("clean batch");
        assert_eq!(registry.count(), 3);
    }

    #[test]
    fn insertion_order_and_removal() {
        let mut registry = ToolRegistry::new();
        for name in ["c", "a", "b"] {
            registry.register(tool(name, Affiliation::Both)).expect("registration");
        }
        let names: Vec<&str> = registry.all().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["c", "a", "b"]);
        assert!(registry.unregister("a"));
        assert!(!registry.unregister("a"));
        assert_eq!(registry.statistics().tool_names, ["c", "b"]);
        registry.clear();
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn names_are_bucketed_by_declared_affiliation() {
        let mut registry = ToolRegistry::new();
        registry
            .register_many([
                tool("cam", Affiliation::Camera),
                tool("sen", Affiliation::Senato),
                tool("any", Affiliation::Both),
            ])
            .expect("batch");
        let names = registry.names_by_institution();
        assert_eq!(names.camera, ["cam"]);
        assert_eq!(names.senato, ["sen"]);
        assert_eq!(names.both, ["any"]);
        assert_eq!(registry.count_by_institution(Institution::Senato), 2);
    }

    #[test]
    fn institution_filter_includes_shared_tools() {
        let mut registry = ToolRegistry::new();
        registry
            .register_many([
                tool("cam", Affiliation::Camera),
                tool("sen", Affiliation::Senato),
                tool("any", Affiliation::Both),
            ])
            .expect("batch");
        let camera: Vec<&str> = registry
            .by_institution(Institution::Camera)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(camera, ["cam", "any"]);
        let senato: Vec<&str> = registry
            .by_institution(Institution::Senato)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(senato, ["sen", "any"]);
    }

    #[tokio::test]
    async fn dispatch_reports_unknown_tools() {
        let registry = ToolRegistry::new();
        let result = registry.dispatch("missing", Arguments::new()).await;
        assert!(result.is_error);
        assert_eq!(result.text_content(), "Error: Unknown tool: missing");
    }
}
