//! View components for the dashboard.

use dioxus::prelude::*;
use serde_json::Value;

use traceboard_core::{
    build_flow_graph, Evaluation, FlowEdge, StatusColor, Step, TraceDetail, TraceSummary,
    NODE_VERTICAL_SPACING, NODE_X, NODE_Y_OFFSET,
};

/// Rendered card size. The layout from `traceboard-core` fixes each
/// card's top-left corner; the card itself is sized here.
const NODE_WIDTH: f64 = 180.0;
const NODE_HEIGHT: f64 = 56.0;

// ============================================================================
// Flow graph
// ============================================================================

struct EdgeLine {
    x: f64,
    y1: f64,
    y2: f64,
    arrow: String,
    color: &'static str,
    stroke_width: f64,
}

/// Project an edge onto canvas coordinates: a vertical line from the
/// bottom of the source card to the arrowhead base, then a triangle
/// whose tip touches the top of the target card.
fn edge_line(edge: &FlowEdge, source_y: f64, target_y: f64) -> EdgeLine {
    let x = NODE_X + NODE_WIDTH / 2.0;
    let base_y = target_y - edge.arrow_size;
    let half = edge.arrow_size / 2.0;
    EdgeLine {
        x,
        y1: source_y + NODE_HEIGHT,
        y2: base_y,
        arrow: format!(
            "M{},{} L{},{} L{},{} Z",
            x - half,
            base_y,
            x + half,
            base_y,
            x,
            target_y
        ),
        color: edge.color.hex(),
        stroke_width: edge.stroke_width,
    }
}

#[component]
pub fn FlowGraphView(
    steps: Vec<Step>,
    selected: Option<usize>,
    on_select_step: EventHandler<usize>,
) -> Element {
    let graph = build_flow_graph(&steps, selected);

    if graph.is_empty() {
        return rsx! {
            div { class: "flow-empty", "No steps recorded yet" }
        };
    }

    let canvas_height = graph.nodes.len() as f64 * NODE_VERTICAL_SPACING + NODE_Y_OFFSET;
    let canvas_width = NODE_X + NODE_WIDTH + 50.0;
    let edges: Vec<EdgeLine> = graph
        .edges
        .iter()
        .enumerate()
        .map(|(j, edge)| edge_line(edge, graph.nodes[j].y, graph.nodes[j + 1].y))
        .collect();

    rsx! {
        div {
            class: "flow-canvas",
            style: "width: {canvas_width}px; height: {canvas_height}px;",
            svg {
                class: "flow-edges",
                width: "{canvas_width}",
                height: "{canvas_height}",
                for edge in &edges {
                    line {
                        x1: "{edge.x}",
                        y1: "{edge.y1}",
                        x2: "{edge.x}",
                        y2: "{edge.y2}",
                        stroke: edge.color,
                        stroke_width: "{edge.stroke_width}",
                    }
                    path { d: "{edge.arrow}", fill: edge.color }
                }
            }
            for (i, node) in graph.nodes.iter().enumerate() {
                div {
                    key: "{node.id}",
                    class: if node.selected { "flow-node selected" } else { "flow-node" },
                    style: "left: {node.x}px; top: {node.y}px; width: {NODE_WIDTH}px; height: {NODE_HEIGHT}px; background: {node.background}; border: {node.border}; box-shadow: {node.box_shadow};",
                    onclick: move |_| on_select_step.call(i),
                    div { class: "flow-node-label", "{node.label}" }
                    div { class: "flow-node-sublabel", "{node.sublabel}" }
                }
            }
        }
    }
}

// ============================================================================
// Trace list
// ============================================================================

#[component]
pub fn TraceListPanel(
    traces: Vec<TraceSummary>,
    selected_id: Option<String>,
    on_select: EventHandler<String>,
) -> Element {
    if traces.is_empty() {
        return rsx! {
            div { class: "trace-list-empty",
                "No traces yet. Run a pipeline with the SDK to see it here."
            }
        };
    }

    rsx! {
        ul { class: "trace-list",
            for trace in traces.iter() {
                TraceListEntry {
                    key: "{trace.trace_id}",
                    trace: trace.clone(),
                    selected: selected_id.as_deref() == Some(trace.trace_id.as_str()),
                    on_select: move |id: String| on_select.call(id),
                }
            }
        }
    }
}

#[component]
fn TraceListEntry(trace: TraceSummary, selected: bool, on_select: EventHandler<String>) -> Element {
    let color = StatusColor::for_status(trace.status).hex();
    let time = trace.created_at.format("%H:%M:%S").to_string();
    let trace_id = trace.trace_id.clone();

    rsx! {
        li {
            class: if selected { "trace-entry selected" } else { "trace-entry" },
            onclick: move |_| on_select.call(trace_id.clone()),
            span { class: "trace-entry-dot", style: "background: {color};" }
            div { class: "trace-entry-body",
                div { class: "trace-entry-name", "{trace.name}" }
                div { class: "trace-entry-meta", "{time} · {trace.step_count} steps · {trace.status}" }
            }
        }
    }
}

// ============================================================================
// Inspector
// ============================================================================

#[component]
pub fn StepInspector(step: Step) -> Element {
    let color = StatusColor::for_status(step.status).hex();
    let duration = step.duration.map(format_duration);

    rsx! {
        div { class: "inspector",
            div { class: "inspector-header",
                h2 { class: "inspector-title", "{step.name}" }
                span { class: "inspector-pill", "{step.step_type}" }
                span {
                    class: "inspector-pill",
                    style: "color: {color}; border-color: {color};",
                    "{step.status}"
                }
            }
            if let Some(duration) = &duration {
                div { class: "inspector-meta", "took {duration}" }
            }
            if let Some(reasoning) = &step.reasoning {
                section { class: "inspector-section",
                    h3 { "Reasoning" }
                    p { class: "inspector-reasoning", "{reasoning}" }
                }
            }
            if let Some(input) = &step.input {
                section { class: "inspector-section",
                    h3 { "Input" }
                    pre { class: "inspector-json", "{format_json(input)}" }
                }
            }
            if let Some(output) = &step.output {
                section { class: "inspector-section",
                    h3 { "Output" }
                    pre { class: "inspector-json", "{format_json(output)}" }
                }
            }
            if let Some(evaluations) = &step.evaluations {
                if !evaluations.is_empty() {
                    section { class: "inspector-section",
                        h3 { "Evaluations" }
                        for eval in evaluations.iter() {
                            EvaluationCard { key: "{eval.item_id}", evaluation: eval.clone() }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn EvaluationCard(evaluation: Evaluation) -> Element {
    rsx! {
        div { class: "eval-card",
            div { class: "eval-card-header",
                span { class: "eval-label", "{evaluation.label}" }
                span {
                    class: if evaluation.passed() { "eval-verdict pass" } else { "eval-verdict fail" },
                    "{evaluation.status}"
                }
            }
            div { class: "eval-item-id", "{evaluation.item_id}" }
            for check in evaluation.checks.iter() {
                div { class: "eval-check",
                    span {
                        class: if check.passed { "eval-check-mark pass" } else { "eval-check-mark fail" },
                        if check.passed { "✓" } else { "✗" }
                    }
                    span { class: "eval-check-name", "{check.name}" }
                    span { class: "eval-check-detail", "{check.detail}" }
                }
            }
        }
    }
}

/// Trace-level summary shown while no step is selected.
#[component]
pub fn TraceOverview(detail: TraceDetail) -> Element {
    let color = StatusColor::for_status(detail.status).hex();
    let created = detail.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let outcome = detail.final_outcome.as_ref().map(format_json);
    let metadata: Vec<(String, String)> = detail
        .metadata
        .iter()
        .map(|(k, v)| (k.clone(), display_value(v)))
        .collect();

    rsx! {
        div { class: "inspector",
            div { class: "inspector-header",
                h2 { class: "inspector-title", "{detail.name}" }
                span {
                    class: "inspector-pill",
                    style: "color: {color}; border-color: {color};",
                    "{detail.status}"
                }
            }
            div { class: "inspector-meta", "{created} · {detail.step_count} steps" }
            if !metadata.is_empty() {
                section { class: "inspector-section",
                    h3 { "Metadata" }
                    for (key, value) in &metadata {
                        div { class: "metadata-row",
                            span { class: "metadata-key", "{key}" }
                            span { class: "metadata-value", "{value}" }
                        }
                    }
                }
            }
            if let Some(outcome) = &outcome {
                section { class: "inspector-section",
                    h3 { "Final outcome" }
                    pre { class: "inspector-json", "{outcome}" }
                }
            } else {
                div { class: "inspector-hint", "Run in progress. Click a step card to inspect it." }
            }
        }
    }
}

fn format_duration(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{:.0} ms", seconds * 1000.0)
    } else {
        format!("{seconds:.2} s")
    }
}

fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub const COMPONENT_STYLES: &str = r#"
.flow-empty, .trace-list-empty {
    padding: 24px;
    color: #8b93a3;
    font-size: 13px;
}

.flow-canvas {
    position: relative;
    margin: 0 auto;
}

.flow-edges {
    position: absolute;
    top: 0;
    left: 0;
    pointer-events: none;
}

.flow-node {
    position: absolute;
    border-radius: 8px;
    padding: 8px 12px;
    box-sizing: border-box;
    cursor: pointer;
    transition: box-shadow 0.15s ease;
    overflow: hidden;
}

.flow-node-label {
    color: #e5e7eb;
    font-size: 13px;
    font-weight: 600;
    white-space: nowrap;
}

.flow-node-sublabel {
    color: #8b93a3;
    font-size: 11px;
    margin-top: 2px;
}

.trace-list {
    list-style: none;
    margin: 0;
    padding: 0;
    overflow-y: auto;
}

.trace-entry {
    display: flex;
    align-items: center;
    gap: 10px;
    padding: 10px 14px;
    cursor: pointer;
    border-bottom: 1px solid #1c222e;
}

.trace-entry:hover {
    background: #1a2030;
}

.trace-entry.selected {
    background: #1e2638;
}

.trace-entry-dot {
    width: 8px;
    height: 8px;
    border-radius: 50%;
    flex-shrink: 0;
}

.trace-entry-body {
    min-width: 0;
}

.trace-entry-name {
    color: #e5e7eb;
    font-size: 13px;
    white-space: nowrap;
    overflow: hidden;
    text-overflow: ellipsis;
}

.trace-entry-meta {
    color: #8b93a3;
    font-size: 11px;
    margin-top: 2px;
}

.inspector {
    padding: 16px;
    overflow-y: auto;
}

.inspector-header {
    display: flex;
    align-items: center;
    gap: 8px;
    flex-wrap: wrap;
}

.inspector-title {
    margin: 0;
    color: #e5e7eb;
    font-size: 15px;
    word-break: break-word;
}

.inspector-pill {
    color: #8b93a3;
    border: 1px solid #2a3242;
    border-radius: 10px;
    padding: 1px 8px;
    font-size: 11px;
}

.inspector-meta {
    color: #8b93a3;
    font-size: 12px;
    margin-top: 6px;
}

.inspector-section {
    margin-top: 16px;
}

.inspector-section h3 {
    margin: 0 0 6px 0;
    color: #aab2c0;
    font-size: 11px;
    text-transform: uppercase;
    letter-spacing: 0.06em;
}

.inspector-reasoning {
    margin: 0;
    color: #c7cdd8;
    font-size: 13px;
    line-height: 1.5;
}

.inspector-json {
    margin: 0;
    padding: 10px;
    background: #10141d;
    border: 1px solid #1c222e;
    border-radius: 6px;
    color: #c7cdd8;
    font-size: 12px;
    overflow-x: auto;
    white-space: pre;
}

.inspector-hint {
    margin-top: 16px;
    color: #8b93a3;
    font-size: 12px;
}

.metadata-row {
    display: flex;
    gap: 8px;
    font-size: 12px;
    padding: 2px 0;
}

.metadata-key {
    color: #8b93a3;
}

.metadata-value {
    color: #c7cdd8;
    word-break: break-word;
}

.eval-card {
    background: #10141d;
    border: 1px solid #1c222e;
    border-radius: 6px;
    padding: 10px;
    margin-bottom: 8px;
}

.eval-card-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    gap: 8px;
}

.eval-label {
    color: #e5e7eb;
    font-size: 12px;
    font-weight: 600;
}

.eval-verdict {
    font-size: 11px;
    border-radius: 10px;
    padding: 1px 8px;
}

.eval-verdict.pass {
    color: #10b981;
    border: 1px solid #10b98166;
}

.eval-verdict.fail {
    color: #ef4444;
    border: 1px solid #ef444466;
}

.eval-item-id {
    color: #8b93a3;
    font-size: 11px;
    margin-top: 2px;
}

.eval-check {
    display: flex;
    gap: 6px;
    align-items: baseline;
    font-size: 12px;
    margin-top: 6px;
}

.eval-check-mark.pass {
    color: #10b981;
}

.eval-check-mark.fail {
    color: #ef4444;
}

.eval-check-name {
    color: #c7cdd8;
}

.eval-check-detail {
    color: #8b93a3;
    font-size: 11px;
}
"#;
