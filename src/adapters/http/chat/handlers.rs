//! HTTP handlers for the chat endpoints
//!
//! These handlers connect Axum routes to the orchestrator and metrics.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{SecondsFormat, Utc};

use super::dto::{
    AskRequest, AskResponse, ErrorResponse, HealthResponse, MetricsResponse, ReloadResponse,
    StatusResponse,
};
use crate::application::{PhaseOrchestrator, TurnError};
use crate::domain::metrics::MetricsAggregator;
use crate::domain::retrieval::SharedEmbeddingStore;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct ChatAppState {
    pub orchestrator: Arc<PhaseOrchestrator>,
    pub metrics: Arc<MetricsAggregator>,
    /// The store the orchestrator retrieves from.
    pub store: Arc<SharedEmbeddingStore>,
    /// File re-read by `POST /corpus/reload`.
    pub corpus_file: PathBuf,
}

impl ChatAppState {
    pub fn new(
        orchestrator: Arc<PhaseOrchestrator>,
        store: Arc<SharedEmbeddingStore>,
        corpus_file: impl Into<PathBuf>,
    ) -> Self {
        let metrics = orchestrator.metrics().clone();
        Self {
            orchestrator,
            metrics,
            store,
            corpus_file: corpus_file.into(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// Answer one conversation turn
///
/// POST /ask
pub async fn ask(
    State(app_state): State<ChatAppState>,
    Json(req): Json<AskRequest>,
) -> Result<impl IntoResponse, impl IntoResponse> {
    if req.question.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("question must not be empty")),
        ));
    }

    let started = Instant::now();
    let phase = req.phase;

    match app_state.orchestrator.handle_turn(req.into()).await {
        Ok(outcome) => {
            tracing::info!(
                duration_ms = started.elapsed().as_millis() as u64,
                %phase,
                "Request processed successfully"
            );
            Ok((StatusCode::OK, Json(AskResponse::from(outcome))))
        }
        Err(err) => {
            tracing::error!(
                error_kind = error_kind(&err),
                error = %err,
                duration_ms = started.elapsed().as_millis() as u64,
                %phase,
                "Request processing failed"
            );
            Err(turn_error_response(&err))
        }
    }
}

fn error_kind(err: &TurnError) -> &'static str {
    match err {
        TurnError::Retrieval(_) => "retrieval",
        TurnError::Completion(_) => "completion",
        TurnError::Transition(_) => "transition",
    }
}

fn turn_error_response(err: &TurnError) -> (StatusCode, Json<ErrorResponse>) {
    if matches!(err, TurnError::Transition(_)) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal(err.to_string())),
        )
    } else if err.is_timeout() {
        (
            StatusCode::GATEWAY_TIMEOUT,
            Json(ErrorResponse::upstream_timeout(err.to_string())),
        )
    } else {
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::upstream(err.to_string())),
        )
    }
}

/// Liveness probe
///
/// GET /health
pub async fn health() -> impl IntoResponse {
    tracing::info!(status = "healthy", "Health check performed");
    Json(HealthResponse { status: "healthy" })
}

/// Current metrics snapshot
///
/// GET /metrics
pub async fn get_metrics(State(app_state): State<ChatAppState>) -> impl IntoResponse {
    Json(MetricsResponse {
        metrics: app_state.metrics.snapshot(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Zero all metrics
///
/// GET or POST /metrics/reset
pub async fn reset_metrics(State(app_state): State<ChatAppState>) -> impl IntoResponse {
    app_state.metrics.reset();
    tracing::info!("Metrics reset");
    Json(StatusResponse {
        status: "Metrics reset successfully",
    })
}

/// Re-read the corpus file and swap it in
///
/// POST /corpus/reload
pub async fn reload_corpus(
    State(app_state): State<ChatAppState>,
) -> Result<Json<ReloadResponse>, (StatusCode, Json<ErrorResponse>)> {
    let store = app_state.store.clone();
    let path = app_state.corpus_file.clone();
    let loaded = tokio::task::spawn_blocking(move || store.reload(&path)).await;

    match loaded {
        Ok(Ok(passages)) => Ok(Json(ReloadResponse {
            status: "Corpus reloaded successfully",
            passages,
        })),
        Ok(Err(err)) => {
            tracing::error!(
                error = %err,
                file = %app_state.corpus_file.display(),
                "Corpus reload failed, keeping previous corpus"
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal(err.to_string())),
            ))
        }
        Err(err) => {
            tracing::error!(error = %err, "Corpus reload task failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("corpus reload did not complete")),
            ))
        }
    }
}
