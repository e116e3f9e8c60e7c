//! Dashboard shell: trace listing, flow graph, and step inspector.

pub mod poller;
pub mod state;
pub mod ws;

use dioxus::prelude::*;

use traceboard_core::{TraceDetail, TraceSummary, FAST_POLL_INTERVAL};

use crate::api::fetch_trace;
use crate::components::{
    FlowGraphView, StepInspector, TraceListPanel, TraceOverview, COMPONENT_STYLES,
};
use crate::dashboard::poller::run_trace_list_poll;
use crate::dashboard::state::apply_stream_event;
use crate::dashboard::ws::connect_trace_stream;

#[component]
pub fn Dashboard() -> Element {
    let traces = use_signal(Vec::<TraceSummary>::new);
    let mut selected_trace = use_signal(|| None::<TraceDetail>);
    let mut selected_step = use_signal(|| None::<usize>);
    let mut stream_connected = use_signal(|| false);
    let mut auto_refresh = use_signal(|| true);
    let mut poll_generation = use_signal(|| 0u32);
    let poll_interval_ms = use_signal(|| FAST_POLL_INTERVAL.as_millis() as u64);
    let list_error = use_signal(|| None::<String>);
    let mut detail_error = use_signal(|| None::<String>);

    // One poll loop per generation. Flipping the toggle bumps the
    // generation, which retires the old loop before its next fetch,
    // and enabling spawns a fresh loop that fetches right away.
    use_effect(move || {
        let enabled = auto_refresh();
        let generation = {
            let mut slot = poll_generation.write();
            *slot += 1;
            *slot
        };
        if enabled {
            spawn(run_trace_list_poll(
                generation,
                poll_generation,
                traces,
                poll_interval_ms,
                list_error,
            ));
        }
    });

    let select_trace = use_callback(move |trace_id: String| {
        selected_step.set(None);
        detail_error.set(None);
        spawn(async move {
            match fetch_trace(&trace_id).await {
                Ok(detail) => selected_trace.set(Some(detail)),
                Err(e) => {
                    dioxus_logger::tracing::error!("Failed to load trace {}: {}", trace_id, e);
                    detail_error.set(Some(e));
                    return;
                }
            }

            let watched = trace_id.clone();
            connect_trace_stream(&trace_id, move |event| {
                apply_stream_event(&watched, event, &mut selected_trace, &mut stream_connected);
            })
            .await;
        });
    });

    let trace_list = traces();
    let detail = selected_trace();
    let selected_id = detail.as_ref().map(|d| d.trace_id.clone());
    let inspected_step = detail
        .as_ref()
        .zip(selected_step())
        .and_then(|(d, i)| d.steps.get(i).cloned());
    let interval_secs = poll_interval_ms() / 1000;

    rsx! {
        style { {DASHBOARD_STYLES} }
        style { {COMPONENT_STYLES} }
        div { class: "dashboard-root",
            header { class: "dashboard-header",
                div { class: "dashboard-title-block",
                    h1 { class: "dashboard-title", "Traceboard" }
                    span { class: "dashboard-subtitle", "decision traces" }
                }
                div { class: "dashboard-header-status",
                    if list_error().is_some() {
                        span { class: "refresh-warning", title: "The last listing refresh failed", "listing stale" }
                    }
                    span {
                        class: if stream_connected() { "stream-dot live" } else { "stream-dot" },
                        title: if stream_connected() { "Live updates connected" } else { "Live updates off" },
                    }
                    button {
                        class: if auto_refresh() { "refresh-toggle on" } else { "refresh-toggle" },
                        onclick: move |_| {
                            let enabled = !*auto_refresh.peek();
                            auto_refresh.set(enabled);
                        },
                        if auto_refresh() {
                            "refresh every {interval_secs}s"
                        } else {
                            "auto refresh off"
                        }
                    }
                }
            }
            main { class: "dashboard-main",
                aside { class: "trace-list-panel",
                    div { class: "trace-list-header",
                        h2 { "Traces" }
                        span { class: "trace-count", "{trace_list.len()}" }
                    }
                    TraceListPanel {
                        traces: trace_list.clone(),
                        selected_id,
                        on_select: move |id: String| select_trace.call(id),
                    }
                }
                section { class: "flow-panel",
                    if let Some(detail) = &detail {
                        div { class: "flow-panel-header",
                            h2 { class: "flow-panel-title", "{detail.name}" }
                            span { class: "flow-panel-id", "{detail.trace_id}" }
                        }
                        FlowGraphView {
                            steps: detail.steps.clone(),
                            selected: selected_step(),
                            on_select_step: move |i: usize| selected_step.set(Some(i)),
                        }
                    } else if let Some(error) = detail_error() {
                        div { class: "empty-state", "Failed to load trace: {error}" }
                    } else {
                        div { class: "empty-state", "Select a trace to inspect its decision flow" }
                    }
                }
                aside { class: "inspector-panel",
                    if let Some(step) = &inspected_step {
                        StepInspector { step: step.clone() }
                    } else if let Some(detail) = &detail {
                        TraceOverview { detail: detail.clone() }
                    } else {
                        div { class: "inspector-hint", "Nothing selected" }
                    }
                }
            }
        }
    }
}

const DASHBOARD_STYLES: &str = r#"
.dashboard-root {
    display: flex;
    flex-direction: column;
    height: 100vh;
    background: #0f1117;
    color: #e5e7eb;
    font-family: -apple-system, 'Segoe UI', Roboto, sans-serif;
}

.dashboard-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    padding: 10px 18px;
    background: #131722;
    border-bottom: 1px solid #232a36;
}

.dashboard-title-block {
    display: flex;
    align-items: baseline;
    gap: 10px;
}

.dashboard-title {
    margin: 0;
    font-size: 16px;
    font-weight: 700;
}

.dashboard-subtitle {
    color: #8b93a3;
    font-size: 12px;
}

.dashboard-header-status {
    display: flex;
    align-items: center;
    gap: 12px;
}

.refresh-warning {
    color: #f59e0b;
    font-size: 11px;
}

.stream-dot {
    width: 9px;
    height: 9px;
    border-radius: 50%;
    background: #3a4356;
}

.stream-dot.live {
    background: #10b981;
}

.refresh-toggle {
    background: #1a2030;
    color: #8b93a3;
    border: 1px solid #2a3242;
    border-radius: 6px;
    padding: 4px 10px;
    font-size: 12px;
    cursor: pointer;
}

.refresh-toggle.on {
    color: #e5e7eb;
    border-color: #3b82f6;
}

.dashboard-main {
    display: grid;
    grid-template-columns: 280px 1fr 360px;
    flex: 1;
    min-height: 0;
}

.trace-list-panel {
    background: #131722;
    border-right: 1px solid #232a36;
    display: flex;
    flex-direction: column;
    min-height: 0;
}

.trace-list-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    padding: 12px 14px;
    border-bottom: 1px solid #232a36;
}

.trace-list-header h2 {
    margin: 0;
    font-size: 13px;
    text-transform: uppercase;
    letter-spacing: 0.06em;
    color: #aab2c0;
}

.trace-count {
    color: #8b93a3;
    font-size: 12px;
}

.flow-panel {
    overflow: auto;
    padding: 16px;
}

.flow-panel-header {
    display: flex;
    align-items: baseline;
    gap: 10px;
    margin-bottom: 10px;
}

.flow-panel-title {
    margin: 0;
    font-size: 15px;
}

.flow-panel-id {
    color: #8b93a3;
    font-size: 11px;
    font-family: monospace;
}

.inspector-panel {
    background: #131722;
    border-left: 1px solid #232a36;
    overflow-y: auto;
    min-height: 0;
}

.empty-state {
    color: #8b93a3;
    font-size: 13px;
    padding: 40px 0;
    text-align: center;
}
"#;
