//! Agent runtime for parley.
//!
//! - [`PromptTemplate`] — System instructions followed by the running history
//! - [`Agent`] / [`ReactAgent`] — Reason-and-act loop over a model and tools
//! - [`AgentInvoker`] / [`ReactAgentInvoker`] — One chat request in, one reply out
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use parley_agent::{AgentInvoker, AgentRequest, ReactAgentInvoker};
//!
//! let invoker = ReactAgentInvoker::from_settings(&settings);
//! let reply = invoker
//!     .respond(AgentRequest {
//!         model_id: "llama-3.3-70b-versatile".into(),
//!         system_prompt: "Answer briefly.".into(),
//!         messages: vec!["What's new in Rust?".to_string()].into(),
//!         allow_search: true,
//!     })
//!     .await?;
//! ```
//!
//! # Reasoning Loop
//!
//! 1. Render the prompt and send it with the tool schemas to the model
//! 2. If the model requests tools, run them and append their results
//! 3. Repeat until the model answers without tool calls (max 10 iterations)

mod invoker;
mod prompt;
mod react;

pub use invoker::{AgentInvoker, AgentRequest, ReactAgentInvoker};
pub use prompt::{PromptSegment, PromptTemplate};
pub use react::{Agent, ReactAgent, MAX_TOOL_ITERATIONS};
