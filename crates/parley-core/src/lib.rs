//! Core domain types and error definitions for parley.
//!
//! This crate provides the types shared across the parley workspace:
//!
//! - [`AgentError`] — Error type for agent and LLM operations
//! - [`Message`] and [`MessageRole`] — Role-tagged conversation messages
//! - [`ConversationState`] — The running message history an agent works on
//! - [`MessageInput`] — Incoming user messages, as one string or many
//! - [`ToolCall`], [`ToolResult`], [`ToolSchema`] — Tool interaction types
//!
//! # Example
//!
//! ```rust
//! use parley_core::{Message, MessageInput};
//!
//! let mut state = MessageInput::from("What is Rust?").into_state();
//! state.push(Message::assistant("A systems programming language."));
//!
//! assert_eq!(state.reply(), "A systems programming language.");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building or running an agent.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Required configuration (e.g. a provider credential) is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM API request failed.
    #[error("LLM request failed: {0}")]
    LlmError(String),

    /// Failed to parse a provider response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The reasoning loop did not produce a final answer in time.
    #[error("Agent stopped after {0} iterations without a final answer")]
    MaxIterations(usize),
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::ParseError(err.to_string())
    }
}

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions rendered from the prompt template.
    System,
    /// Message from the user.
    User,
    /// Message from the assistant/LLM.
    Assistant,
    /// Output of a tool call, fed back to the LLM.
    Tool,
}

/// A single message in a conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The text content of the message. Empty for pure tool-call turns.
    pub content: String,
    /// Tool calls requested by the assistant in this turn.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For tool messages, the id of the call this message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Creates a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Creates a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Creates an assistant message that requests tool calls.
    pub fn assistant_tool_calls(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::new(MessageRole::Assistant, content)
        }
    }

    /// Creates a tool result message answering the given call.
    pub fn tool(result: ToolResult) -> Self {
        Self {
            tool_call_id: Some(result.tool_call_id),
            ..Self::new(MessageRole::Tool, result.content)
        }
    }

    /// Returns true if this is an assistant turn that asks for tools.
    pub fn has_tool_calls(&self) -> bool {
        self.role == MessageRole::Assistant && !self.tool_calls.is_empty()
    }
}

/// The ordered message history passed into and returned from an agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub messages: Vec<Message>,
}

impl ConversationState {
    /// Creates an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to the end of the conversation.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Returns the number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the conversation has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the final reply of the conversation.
    ///
    /// This is the content of the last assistant message. When no assistant
    /// message exists it falls back to the last message of any role, and to
    /// an empty string for an empty conversation.
    pub fn reply(&self) -> String {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
            .or_else(|| self.messages.last())
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

impl From<Vec<Message>> for ConversationState {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

/// User messages as they arrive on the wire: a bare string or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageInput {
    Single(String),
    Many(Vec<String>),
}

impl MessageInput {
    /// Number of user messages this input expands to.
    pub fn len(&self) -> usize {
        match self {
            MessageInput::Single(_) => 1,
            MessageInput::Many(items) => items.len(),
        }
    }

    /// Returns true if the input expands to no messages.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wraps every input string as a user message, preserving order.
    pub fn into_state(self) -> ConversationState {
        let messages = match self {
            MessageInput::Single(text) => vec![Message::user(text)],
            MessageInput::Many(items) => items.into_iter().map(Message::user).collect(),
        };
        ConversationState::from(messages)
    }
}

impl From<&str> for MessageInput {
    fn from(text: &str) -> Self {
        MessageInput::Single(text.to_string())
    }
}

impl From<Vec<String>> for MessageInput {
    fn from(items: Vec<String>) -> Self {
        MessageInput::Many(items)
    }
}

// ============================================================================
// Tool Types
// ============================================================================

/// A tool call requested by the LLM.
///
/// When an LLM decides to use a tool, it returns one or more `ToolCall`
/// instances with the tool name and arguments to execute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call (used to match results).
    pub id: String,
    /// Name of the tool to execute.
    pub name: String,
    /// Arguments to pass to the tool (JSON object).
    pub arguments: serde_json::Value,
}

/// Result of a tool execution to be sent back to the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID from the original tool call request.
    pub tool_call_id: String,
    /// Output content from the tool execution.
    pub content: String,
}

/// JSON schema describing a tool for LLM function calling.
///
/// Follows the OpenAI function calling format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique name of the tool (e.g., "web_search").
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: serde_json::Value,
}
