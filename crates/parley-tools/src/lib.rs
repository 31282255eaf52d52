//! Tools an agent can call while answering.
//!
//! - [`Tool`] — Trait for implementing tools
//! - [`ToolSet`] — The tools bound to one agent run
//! - [`WebSearchTool`] — Tavily web search
//! - [`make_tools`] — Builds the per-request tool set
//!
//! # Implementing a Custom Tool
//!
//! ```rust,ignore
//! use parley_tools::{Tool, ToolError};
//! use async_trait::async_trait;
//!
//! struct ClockTool;
//!
//! #[async_trait]
//! impl Tool for ClockTool {
//!     fn name(&self) -> &str { "clock" }
//!     fn description(&self) -> &str { "Returns the current UTC time" }
//!     fn parameters(&self) -> serde_json::Value {
//!         serde_json::json!({ "type": "object", "properties": {} })
//!     }
//!     async fn execute(&self, _args: serde_json::Value) -> Result<String, ToolError> {
//!         Ok("12:00".to_string())
//!     }
//! }
//! ```

mod web_search;

pub use web_search::{SearchOptions, WebSearchTool};

use std::sync::Arc;

use async_trait::async_trait;
use parley_config::SearchSettings;
use thiserror::Error;
use tracing::{error, info, warn};

pub use parley_core::{ToolCall, ToolResult, ToolSchema};

/// Errors that can occur while building or executing a tool.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool could not be set up (missing key, client build failure).
    #[error("Tool configuration failed: {0}")]
    Configuration(String),

    /// Tool execution failed with a message.
    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    /// Invalid arguments were passed to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Network request failed.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Requested tool is not part of the tool set.
    #[error("Tool not found: {0}")]
    NotFound(String),
}

/// Trait for implementing tools that can be called by LLMs.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the unique name of this tool.
    fn name(&self) -> &str;

    /// Returns a description of what this tool does.
    fn description(&self) -> &str;

    /// Returns the JSON Schema for this tool's parameters.
    fn parameters(&self) -> serde_json::Value;

    /// Executes the tool with the given JSON arguments.
    async fn execute(&self, args: serde_json::Value) -> Result<String, ToolError>;

    /// Generates the schema for this tool.
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// The tools available to a single agent run, in registration order.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSet {
    /// Creates an empty tool set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tool, replacing any tool with the same name.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(Arc::new(tool));
    }

    /// Gets a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Returns schemas for all tools, for the LLM request.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    /// Returns the names of all tools.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Runs one tool call and returns the result to feed back to the LLM.
    ///
    /// Failures are reported in the result content instead of aborting the
    /// run, so the model can recover or answer without the tool.
    pub async fn run(&self, call: &ToolCall) -> ToolResult {
        let outcome = match self.get(&call.name) {
            Some(tool) => tool.execute(call.arguments.clone()).await,
            None => Err(ToolError::NotFound(call.name.clone())),
        };

        let content = match outcome {
            Ok(output) => {
                info!("Tool {} returned {} chars", call.name, output.len());
                output
            }
            Err(e) => {
                warn!("Tool {} failed: {}", call.name, e);
                format!("Error: {}", e)
            }
        };

        ToolResult {
            tool_call_id: call.id.clone(),
            content,
        }
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Builds the tool set for one request.
///
/// Without `allow_search` the set is empty. With it, the set holds a single
/// web search tool; if that tool cannot be built the error is logged and the
/// set stays empty, so the request continues without search.
pub fn make_tools(allow_search: bool, settings: &SearchSettings) -> ToolSet {
    let mut tools = ToolSet::new();
    if !allow_search {
        return tools;
    }

    match WebSearchTool::new(settings, SearchOptions::default()) {
        Ok(tool) => tools.register(tool),
        Err(e) => error!("Failed to init web search tool: {}", e),
    }

    tools
}
