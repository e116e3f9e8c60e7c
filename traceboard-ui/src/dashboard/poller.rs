//! Adaptive polling loop for the trace listing.
//!
//! One loop per generation: toggling auto refresh bumps the generation
//! signal, and a loop that wakes up under a newer generation returns
//! without touching state. Running fetch and sleep in a single task
//! also means at most one listing request is ever in flight.

use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;

use traceboard_core::{PollCadence, TraceSummary};

use crate::api::fetch_traces;
use crate::dashboard::state::trace_id_signature;

/// How many traces one listing fetch asks for.
pub const TRACE_LIST_LIMIT: usize = 50;

pub async fn run_trace_list_poll(
    generation: u32,
    poll_generation: Signal<u32>,
    mut traces: Signal<Vec<TraceSummary>>,
    mut poll_interval_ms: Signal<u64>,
    mut list_error: Signal<Option<String>>,
) {
    let mut cadence: PollCadence<Vec<String>> = PollCadence::new();

    loop {
        if *poll_generation.peek() != generation {
            return;
        }

        let fetched = fetch_traces(TRACE_LIST_LIMIT).await;

        // The toggle may have flipped while the request was in flight;
        // a retired loop must not write anything.
        if *poll_generation.peek() != generation {
            return;
        }

        match fetched {
            Ok(list) => {
                traces.set(list.traces);
                list_error.set(None);
            }
            Err(e) => {
                // Keep showing the last good listing and keep polling.
                dioxus_logger::tracing::warn!("Trace list refresh failed: {}", e);
                list_error.set(Some(e));
            }
        }

        let signature = trace_id_signature(&traces.peek());
        let interval = cadence.observe(signature);
        poll_interval_ms.set(interval.as_millis() as u64);

        TimeoutFuture::new(interval.as_millis() as u32).await;
    }
}
