//! Chat model access for parley.
//!
//! - [`ChatModel`] — The capability an agent needs from an LLM
//! - [`LlmClient`] — OpenAI-compatible implementation (Groq by default)
//!
//! # Tool Calling
//!
//! ```rust,ignore
//! use parley_core::{Message, ToolSchema};
//! use parley_llm::{ChatModel, LlmClient};
//!
//! let client = LlmClient::new("llama-3.3-70b-versatile", &settings.llm)?;
//! let reply = client.complete(&[Message::user("Hi")], &tools).await?;
//!
//! for call in &reply.tool_calls {
//!     println!("Call {}: {}({})", call.id, call.name, call.arguments);
//! }
//! ```

mod client;

use async_trait::async_trait;
use parley_core::{AgentError, Message, ToolSchema};

pub use client::LlmClient;

/// A chat model that can answer a conversation, optionally requesting tools.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Identifier of the model requests are sent to.
    fn model_id(&self) -> &str;

    /// Sends the full prompt and returns the next assistant message.
    ///
    /// The returned message carries tool calls when the model wants tools run
    /// before it answers.
    async fn complete(&self, messages: &[Message], tools: &[ToolSchema]) -> Result<Message, AgentError>;
}
