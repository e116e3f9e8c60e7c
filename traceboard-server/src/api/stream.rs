//! Live trace updates over WebSocket.
//!
//! Each dashboard view opens `/ws/{trace_id}`. Connecting is the
//! subscription: there is no subscribe message, and the server pushes
//! the current trace as `initial_state` right away when it already
//! knows the trace. REST handlers call [`broadcast_to_trace`] after
//! every mutation.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};

use traceboard_core::{Step, TraceDetail};

use super::ApiState;

/// Subscriber write handles, keyed by trace id.
pub type StreamSessions =
    Arc<Mutex<HashMap<String, Vec<mpsc::UnboundedSender<Message>>>>>;

/// Messages pushed to trace stream subscribers.
///
/// `trace` always carries its steps; the separate `steps` field is
/// kept so consumers can read the step list without digging into the
/// trace object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StreamMessage {
    #[serde(rename = "initial_state")]
    InitialState {
        trace: TraceDetail,
        steps: Vec<Step>,
    },
    #[serde(rename = "trace_updated")]
    TraceUpdated {
        trace: TraceDetail,
        steps: Vec<Step>,
    },
    #[serde(rename = "step_updated")]
    StepUpdated { trace_id: String, step: Step },
    #[serde(rename = "pong")]
    Pong { data: String },
}

/// GET /ws/{trace_id} - upgrade and stream updates for one trace
pub async fn trace_stream(
    ws: WebSocketUpgrade,
    Path(trace_id): Path<String>,
    State(state): State<ApiState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_trace_socket(socket, trace_id, state))
}

async fn handle_trace_socket(socket: WebSocket, trace_id: String, state: ApiState) {
    let (mut sender, mut receiver) = socket.split();

    // Writer task owns the sink; everything else talks to it through
    // the channel so broadcasts and pong replies cannot interleave.
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    state
        .sessions
        .lock()
        .await
        .entry(trace_id.clone())
        .or_default()
        .push(tx.clone());
    tracing::debug!(trace_id = %trace_id, "trace stream subscribed");

    if let Some(detail) = state.store.get(&trace_id).await {
        let steps = detail.steps.clone();
        let initial = StreamMessage::InitialState {
            trace: detail,
            steps,
        };
        send_message(&tx, &initial);
    }

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                // Keepalive: echo whatever the client sent.
                let pong = StreamMessage::Pong {
                    data: text.to_string(),
                };
                send_message(&tx, &pong);
            }
            Ok(Message::Ping(data)) => {
                let _ = tx.send(Message::Pong(data));
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(trace_id = %trace_id, error = %e, "trace stream read error");
                break;
            }
        }
    }

    // Deregister this subscriber and drop empty subscriber lists.
    {
        let mut sessions = state.sessions.lock().await;
        if let Some(subscribers) = sessions.get_mut(&trace_id) {
            subscribers.retain(|s| !s.same_channel(&tx));
            if subscribers.is_empty() {
                sessions.remove(&trace_id);
            }
        }
    }
    writer.abort();
    tracing::debug!(trace_id = %trace_id, "trace stream closed");
}

fn send_message(tx: &mpsc::UnboundedSender<Message>, message: &StreamMessage) {
    match serde_json::to_string(message) {
        Ok(json) => {
            let _ = tx.send(Message::Text(json.into()));
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize stream message");
        }
    }
}

/// Push one message to every live subscriber of `trace_id`, pruning
/// subscribers whose connection has gone away.
pub async fn broadcast_to_trace(
    sessions: &StreamSessions,
    trace_id: &str,
    message: &StreamMessage,
) {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize stream message");
            return;
        }
    };

    let mut sessions = sessions.lock().await;
    if let Some(subscribers) = sessions.get_mut(trace_id) {
        subscribers.retain(|tx| tx.send(Message::Text(json.clone().into())).is_ok());
        if subscribers.is_empty() {
            sessions.remove(trace_id);
        }
    }
}
