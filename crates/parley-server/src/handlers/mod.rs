//! HTTP route handlers for the chat server.

pub mod chat;
pub mod models;

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}
