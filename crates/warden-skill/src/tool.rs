// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait and registry.
//!
//! The [`Tool`] trait is the interface an agent runtime calls with parsed
//! JSON input. The [`ToolRegistry`] indexes tools by name, produces tool
//! definitions for the runtime, and executes raw JSON input strings.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use warden_core::WardenError;

/// Output from a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The text returned to the agent.
    pub content: String,
    /// Whether the invocation failed.
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    /// An `Error: <message>` output.
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            content: format!("Error: {message}"),
            is_error: true,
        }
    }
}

/// A tool callable by the agent runtime.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used for lookup.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Invokes the tool with parsed JSON input.
    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, WardenError>;
}

/// Registry of available tools, indexed by name.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registers a tool under its `name()`, replacing any previous tool of that name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// (name, description) pairs sorted by name.
    pub fn list(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .tools
            .values()
            .map(|t| (t.name(), t.description()))
            .collect();
        entries.sort_by_key(|(name, _)| *name);
        entries
    }

    /// Tool definitions in the `{name, description, input_schema}` shape
    /// agent runtimes expect, sorted by name.
    pub fn tool_definitions(&self) -> Vec<serde_json::Value> {
        let mut tools: Vec<&Arc<dyn Tool>> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name(),
                    "description": t.description(),
                    "input_schema": t.parameters_schema(),
                })
            })
            .collect()
    }

    /// Execute `name` with a raw JSON input string.
    ///
    /// Failures never escape as `Err`: unknown tools, unparseable input and
    /// tool errors are all rendered as `Error: ...` outputs.
    pub async fn execute_json(&self, name: &str, input_json: &str) -> ToolOutput {
        let Some(tool) = self.get(name) else {
            return ToolOutput::error(format!("Unknown tool '{name}'"));
        };
        let input: serde_json::Value = match serde_json::from_str(input_json) {
            Ok(value) => value,
            Err(e) => {
                debug!(tool = name, error = %e, "tool input is not valid JSON");
                return ToolOutput::error("Invalid input JSON");
            }
        };
        match tool.invoke(input).await {
            Ok(output) => output,
            Err(e) => ToolOutput::error(e),
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
