//! HTTP adapters - REST API implementations.
//!
//! `router` assembles the chat routes with the cross-cutting layers:
//! request tracing, CORS for the chat UI, and a request deadline.

pub mod chat;

pub use chat::ChatAppState;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Builds the full application router.
///
/// Requests past `server.request_timeout_secs` are answered with 408 and the
/// in-flight turn is dropped.
pub fn router(state: ChatAppState, server: &ServerConfig) -> Router {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    chat::routes()
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
