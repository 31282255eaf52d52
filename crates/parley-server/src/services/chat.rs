//! Chat service: model validation and agent invocation.

use parley_agent::AgentRequest;
use tracing::{error, info, warn};

use crate::dto::ChatRequest;
use crate::error::AppError;
use crate::ServerState;

pub const INVALID_MODEL_DETAIL: &str = "Invalid model name provided.";
const AGENT_FAILURE_PREFIX: &str = "Failed to get AI response";

/// Validates the requested model and returns the agent's reply.
///
/// Unknown models are rejected before any agent is built. Agent failures are
/// wrapped into a descriptive internal error.
pub async fn respond(state: &ServerState, req: ChatRequest) -> Result<String, AppError> {
    if !state.allowed_models.contains(&req.model_name) {
        warn!("Model {} is invalid.", req.model_name);
        return Err(AppError::BadRequest(INVALID_MODEL_DETAIL.to_string()));
    }

    let model_name = req.model_name.clone();
    let request = AgentRequest {
        model_id: req.model_name,
        system_prompt: req.system_prompt,
        messages: req.messages,
        allow_search: req.allow_search,
    };

    let reply = state.invoker.respond(request).await.map_err(|e| {
        error!("Agent error ({}): {}", model_name, e);
        AppError::Internal(format!("{}: {}", AGENT_FAILURE_PREFIX, e))
    })?;

    info!("Successfully got response from AI agent {}", model_name);
    Ok(reply)
}
