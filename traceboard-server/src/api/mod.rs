//! HTTP API routes for the Traceboard backend.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

pub mod stream;
pub mod traces;

use crate::storage::TraceStore;
use stream::StreamSessions;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<TraceStore>,
    pub sessions: StreamSessions,
    pub default_page_size: usize,
}

impl ApiState {
    pub fn new(default_page_size: usize) -> Self {
        Self {
            store: Arc::new(TraceStore::new()),
            sessions: StreamSessions::default(),
            default_page_size,
        }
    }
}

/// Configure all API routes
pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/api/traces",
            get(traces::list_traces).post(traces::create_trace),
        )
        .route("/api/traces/{trace_id}", get(traces::get_trace))
        .route("/api/traces/{trace_id}/steps", post(traces::update_step))
        .route("/ws/{trace_id}", get(stream::trace_stream))
}

/// Health check endpoint
pub async fn health_check(State(state): State<ApiState>) -> impl IntoResponse {
    let traces_count = state.store.count().await;
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "traces_count": traces_count,
        })),
    )
}
