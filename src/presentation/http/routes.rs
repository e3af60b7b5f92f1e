//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{delete, get},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::auth_middleware;
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        // WebSocket hub endpoint; authenticates via query token at upgrade
        .route("/hub/message", get(ws_handler))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API routes (all require authentication)
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/messages",
            get(handlers::message::get_messages).post(handlers::message::create_message),
        )
        .route(
            "/messages/thread/{username}",
            get(handlers::message::get_thread),
        )
        .route("/messages/{id}", delete(handlers::message::delete_message))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
