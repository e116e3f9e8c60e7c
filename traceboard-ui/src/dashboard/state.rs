//! State transitions applied when stream events arrive.

use dioxus::prelude::*;

use traceboard_core::{Step, StepStatus, TraceDetail, TraceSummary};

use crate::dashboard::ws::StreamEvent;

/// Sorted trace ids for a listing snapshot. Two fetches with the same
/// signature carry the same set of traces, which is what the poll
/// cadence watches for.
pub fn trace_id_signature(traces: &[TraceSummary]) -> Vec<String> {
    let mut ids: Vec<String> = traces.iter().map(|t| t.trace_id.clone()).collect();
    ids.sort();
    ids
}

/// Apply one stream event from the socket watching `watched_id`.
///
/// Connection events always land. Data events are dropped unless the
/// watched trace is still the selected one, which retires sockets left
/// over from an earlier selection.
pub fn apply_stream_event(
    watched_id: &str,
    event: StreamEvent,
    selected_trace: &mut Signal<Option<TraceDetail>>,
    stream_connected: &mut Signal<bool>,
) {
    match &event {
        StreamEvent::Connected => {
            stream_connected.set(true);
            return;
        }
        StreamEvent::Disconnected => {
            stream_connected.set(false);
            return;
        }
        StreamEvent::Pong => return,
        _ => {}
    }

    let still_selected = selected_trace
        .peek()
        .as_ref()
        .is_some_and(|t| t.trace_id == watched_id);
    if !still_selected {
        return;
    }

    match event {
        StreamEvent::InitialState(detail) | StreamEvent::TraceUpdated(detail) => {
            if detail.trace_id == watched_id {
                selected_trace.set(Some(detail));
            }
        }
        StreamEvent::StepUpdated { trace_id, step } => {
            if trace_id != watched_id {
                return;
            }
            let mut current = selected_trace.write();
            if let Some(detail) = current.as_mut() {
                merge_step(detail, step);
            }
        }
        _ => {}
    }
}

/// Mirror the backend's step upsert: replace the step with the same
/// name or append, keep the count in sync, and let an error step flip
/// the trace status.
pub fn merge_step(detail: &mut TraceDetail, step: Step) {
    if step.status.is_error() {
        detail.status = StepStatus::Error;
    }
    match detail.steps.iter_mut().find(|s| s.name == step.name) {
        Some(existing) => *existing = step,
        None => detail.steps.push(step),
    }
    detail.step_count = detail.steps.len();
}
