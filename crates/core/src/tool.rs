//! Tool Trait and Registry
//!
//! Defines the core-layer tool abstraction:
//!
//! - `Tool` - Identity, schema, approval capability, execution
//! - `ToolContext` - Per-invocation execution context
//! - `ToolRegistry` - O(1) lookup registry with ordered iteration
//!
//! Whether a tool needs human approval is a static capability declared here
//! (`requires_approval`), decided at composition time. The orchestrator
//! consults it before dispatch; tools themselves never ask.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};

/// Execution context passed to every tool invocation.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Session that owns this invocation
    pub session_id: String,
    /// Unique id of the tool call being executed
    pub tool_call_id: String,
}

impl ToolContext {
    pub fn new(session_id: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            tool_call_id: tool_call_id.into(),
        }
    }
}

/// A tool the model may invoke during a run.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name of this tool (e.g., "readFile", "pageHumanOnCall").
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON schema describing input parameters (JSON Schema draft-07).
    fn parameters_schema(&self) -> Value;

    /// Whether this tool must be gated behind human approval.
    ///
    /// Approval-gated tools have external side effects (sending a
    /// notification, rerouting traffic); the orchestrator suspends before
    /// executing them and resumes only on an explicit human decision.
    fn requires_approval(&self) -> bool {
        false
    }

    /// Execute the tool with the given context and arguments.
    ///
    /// # Returns
    /// - `Ok(Value)` - The tool's output as a JSON value
    /// - `Err(CoreError)` - If the tool execution failed
    async fn execute(&self, ctx: &ToolContext, args: Value) -> CoreResult<Value>;
}

/// Registry for `Tool` implementations.
///
/// Provides O(1) lookup by name and ordered iteration, so tool definitions
/// are presented to the model in a stable order.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    /// Insertion order for deterministic iteration.
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(name, tool);
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check if a tool is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get all tool names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Whether the named tool requires human approval before executing.
    ///
    /// Unknown tools report `false`; dispatch fails on lookup instead.
    pub fn requires_approval(&self, name: &str) -> bool {
        self.tools
            .get(name)
            .map(|t| t.requires_approval())
            .unwrap_or(false)
    }

    /// Get tool definitions as JSON values in registration order.
    ///
    /// Suitable for sending to LLM providers.
    pub fn definitions(&self) -> Vec<Value> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters_schema(),
                })
            })
            .collect()
    }

    /// Execute a tool by name.
    ///
    /// Returns `Err(CoreError::NotFound)` if the tool is not registered.
    pub async fn execute(&self, name: &str, ctx: &ToolContext, args: Value) -> CoreResult<Value> {
        match self.tools.get(name) {
            Some(tool) => tool.execute(ctx, args).await,
            None => Err(CoreError::not_found(format!("Tool not found: {}", name))),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
