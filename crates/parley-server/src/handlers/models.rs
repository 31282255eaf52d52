use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::ModelsResponse;
use crate::ServerState;

/// Lists the models the chat endpoint accepts.
pub async fn list(State(state): State<Arc<ServerState>>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.allowed_models.names().to_vec(),
    })
}
