//! Tools the agents may call while answering.
//!
//! Every tool returns a string and never fails past its own boundary: each
//! one has its own literal error vocabulary, and the pipeline treats those
//! strings as ordinary text.

mod code_exec;
mod profile;
mod search;

pub use code_exec::CodeExecutionTool;
pub use profile::{InvalidAction, ProfileAction, UserProfileTool};
pub use search::GoogleSearchTool;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// A function the agent runtime can expose to a model.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema of the call arguments.
    fn parameters(&self) -> Value;

    async fn call(&self, args: &Value) -> String;
}

/// Tools shared by every agent, looked up by name.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Call the named tool. Unknown names produce an error string.
    pub async fn dispatch(&self, name: &str, args: &Value) -> String {
        match self.get(name) {
            Some(tool) => {
                tracing::debug!(tool = name, "dispatching tool call");
                tool.call(args).await
            }
            None => format!("Error: unknown tool '{}'", name),
        }
    }
}

/// Read a trimmed string argument, treating absent or non-string values as empty.
pub(crate) fn str_arg<'a>(args: &'a Value, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or_default().trim()
}
