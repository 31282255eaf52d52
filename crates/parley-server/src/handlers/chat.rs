//! Chat handler: one request, one agent reply.

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::info;

use crate::dto::{ChatRequest, ChatResponse};
use crate::error::AppError;
use crate::services;
use crate::ServerState;

/// Runs the agent for the request and returns its final reply.
pub async fn chat(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    info!(
        "Received chat request with model: {} ({} messages, search: {})",
        req.model_name,
        req.messages.len(),
        req.allow_search
    );

    let response = services::chat::respond(&state, req).await?;
    Ok(Json(ChatResponse { response }))
}
