//! Trace ingestion and retrieval endpoints.
//!
//! The wire contract is shared with the SDK: producers POST whole
//! traces and individual step updates, the dashboard GETs listings
//! and single traces. Both POST endpoints fan the update out to
//! WebSocket subscribers of the touched trace.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use traceboard_core::{Step, TraceData};

use super::stream::{broadcast_to_trace, StreamMessage};
use super::ApiState;

#[derive(Debug, Deserialize)]
pub struct TraceListQuery {
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

/// Body of `POST /api/traces/{trace_id}/steps`.
#[derive(Debug, Deserialize)]
pub struct StepUpdate {
    pub trace_id: String,
    pub step: Step,
}

/// GET /api/traces - paginated listing, newest first
pub async fn list_traces(
    Query(query): Query<TraceListQuery>,
    State(state): State<ApiState>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(state.default_page_size);
    let list = state.store.list(limit, query.offset).await;
    (StatusCode::OK, Json(list))
}

/// GET /api/traces/{trace_id} - single trace with steps
pub async fn get_trace(
    Path(trace_id): Path<String>,
    State(state): State<ApiState>,
) -> impl IntoResponse {
    match state.store.get(&trace_id).await {
        Some(detail) => (StatusCode::OK, Json(detail)).into_response(),
        None => {
            let known = state.store.sample_ids(5).await;
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "detail": format!("Trace not found. Available traces: {known:?}"),
                })),
            )
                .into_response()
        }
    }
}

/// POST /api/traces - insert or replace a whole trace
pub async fn create_trace(
    State(state): State<ApiState>,
    Json(data): Json<TraceData>,
) -> impl IntoResponse {
    let trace_id = data.trace_id.clone();
    tracing::debug!(trace_id = %trace_id, steps = data.steps.len(), "trace received");

    let detail = state.store.upsert_trace(data).await;

    let steps = detail.steps.clone();
    broadcast_to_trace(
        &state.sessions,
        &trace_id,
        &StreamMessage::TraceUpdated {
            trace: detail,
            steps,
        },
    )
    .await;

    (
        StatusCode::OK,
        Json(json!({ "trace_id": trace_id, "status": "created" })),
    )
}

/// POST /api/traces/{trace_id}/steps - insert or replace one step
pub async fn update_step(
    Path(trace_id): Path<String>,
    State(state): State<ApiState>,
    Json(update): Json<StepUpdate>,
) -> impl IntoResponse {
    if update.trace_id != trace_id {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "detail": "Trace ID in URL does not match trace ID in request body",
            })),
        )
            .into_response();
    }

    let stored = state.store.upsert_step(&trace_id, update.step).await;
    tracing::debug!(trace_id = %trace_id, step = %stored.name, "step received");

    broadcast_to_trace(
        &state.sessions,
        &trace_id,
        &StreamMessage::StepUpdated {
            trace_id: trace_id.clone(),
            step: stored.clone(),
        },
    )
    .await;

    (
        StatusCode::OK,
        Json(json!({
            "trace_id": trace_id,
            "step_name": stored.name,
            "status": "updated",
        })),
    )
        .into_response()
}
