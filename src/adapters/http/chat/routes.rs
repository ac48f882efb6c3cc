//! Route definitions for the chat endpoints

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{ask, get_metrics, health, reload_corpus, reset_metrics, ChatAppState};

/// Create chat router with all endpoints
///
/// # Endpoints
///
/// - `POST /ask` - Answer one conversation turn
/// - `GET /health` - Liveness probe
/// - `GET /metrics` - Metrics snapshot
/// - `GET|POST /metrics/reset` - Zero all metrics
/// - `POST /corpus/reload` - Re-read the corpus file and swap it in
pub fn routes() -> Router<ChatAppState> {
    Router::new()
        .route("/ask", post(ask))
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .route("/metrics/reset", get(reset_metrics).post(reset_metrics))
        .route("/corpus/reload", post(reload_corpus))
}
