//! Data transfer objects for HTTP message serialization.

use parley_core::MessageInput;
use serde::{Deserialize, Serialize};

/// Request body for the chat endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub model_name: String,
    pub system_prompt: String,
    pub messages: MessageInput,
    #[serde(default)]
    pub allow_search: bool,
}

/// Successful chat reply.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Models callers may request.
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}
