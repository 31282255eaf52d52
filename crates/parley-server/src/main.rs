//! HTTP server entry point and Axum router setup.
//!
//! Loads settings from the environment, builds the shared state, and serves
//! the chat endpoint.

mod dto;
mod error;
mod handlers;
mod services;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use parley_agent::{AgentInvoker, ReactAgentInvoker};
use parley_config::{ModelAllowList, Settings};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

/// Shared server state accessible from all handlers. Read-only after startup.
pub struct ServerState {
    pub allowed_models: ModelAllowList,
    pub invoker: Arc<dyn AgentInvoker>,
}

impl ServerState {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            allowed_models: settings.allowed_models.clone(),
            invoker: Arc::new(ReactAgentInvoker::from_settings(settings)),
        }
    }
}

/// Builds the application router.
pub fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                id = %Uuid::new_v4(),
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        .route("/chat", post(handlers::chat::chat))
        .route("/models", get(handlers::models::list))
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let settings = Settings::from_env()?;
    info!("Allowed models: {:?}", settings.allowed_models.names());

    let addr = settings.server.bind_addr()?;
    let app = router(Arc::new(ServerState::from_settings(&settings)));

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
