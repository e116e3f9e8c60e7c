//! Render model for the step flow graph.
//!
//! [`build_flow_graph`] turns a trace's step list into positioned
//! nodes and connector edges. It is pure so the dashboard can rebuild
//! it on every render without touching what is on screen for an
//! unchanged trace, and so it can be tested without a DOM.

use serde::{Deserialize, Serialize};

use crate::model::{Step, StepStatus};

/// Fixed column x for every node; the flow is a single vertical lane.
pub const NODE_X: f64 = 250.0;
/// Vertical distance between consecutive node origins.
pub const NODE_VERTICAL_SPACING: f64 = 100.0;
/// Offset of the first node from the top of the canvas.
pub const NODE_Y_OFFSET: f64 = 50.0;
/// Longest label rendered before truncation.
pub const LABEL_WIDTH: usize = 24;
/// Stroke width for connector edges.
pub const EDGE_STROKE_WIDTH: f64 = 2.0;
/// Arrowhead edge length at the connector tip.
pub const EDGE_ARROW_SIZE: f64 = 16.0;

/// Render color bucket for a step status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Red,
    Amber,
    Blue,
    Green,
}

impl StatusColor {
    /// Errors are red, warnings amber, partial results blue, and
    /// everything else, including statuses this build does not know,
    /// reads as healthy green.
    pub fn for_status(status: StepStatus) -> Self {
        match status {
            StepStatus::Error => StatusColor::Red,
            StepStatus::Warning => StatusColor::Amber,
            StepStatus::Partial => StatusColor::Blue,
            _ => StatusColor::Green,
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            StatusColor::Red => "#ef4444",
            StatusColor::Amber => "#f59e0b",
            StatusColor::Blue => "#3b82f6",
            StatusColor::Green => "#10b981",
        }
    }
}

/// One positioned step card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub sublabel: String,
    pub color: StatusColor,
    pub selected: bool,
    pub background: String,
    pub border: String,
    pub box_shadow: String,
}

/// Connector between two consecutive step cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub color: StatusColor,
    pub stroke_width: f64,
    pub arrow_size: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Build the render model for a trace's step chain.
///
/// Node `i` gets id `step-{i}` and sits at `(NODE_X, i * 100 + 50)`.
/// Edge `i` gets id `edge-{i}` and connects `step-{i-1}` to
/// `step-{i}`, so a chain of `n` steps always has `n - 1` edges and
/// an empty step list produces an empty graph. `selected` only
/// affects the highlight styling of the matching node, never
/// positions or colors.
pub fn build_flow_graph(steps: &[Step], selected: Option<usize>) -> FlowGraph {
    let mut graph = FlowGraph {
        nodes: Vec::with_capacity(steps.len()),
        edges: Vec::with_capacity(steps.len().saturating_sub(1)),
    };

    for (i, step) in steps.iter().enumerate() {
        let color = StatusColor::for_status(step.status);
        let is_selected = selected == Some(i);

        graph.nodes.push(FlowNode {
            id: format!("step-{i}"),
            x: NODE_X,
            y: i as f64 * NODE_VERTICAL_SPACING + NODE_Y_OFFSET,
            label: truncate_label(&step.name, LABEL_WIDTH),
            sublabel: truncate_label(&step.step_type, LABEL_WIDTH),
            color,
            selected: is_selected,
            background: format!("{}22", color.hex()),
            border: if is_selected {
                format!("2px solid {}", color.hex())
            } else {
                format!("1px solid {}66", color.hex())
            },
            box_shadow: if is_selected {
                format!("0 0 0 2px {}55", color.hex())
            } else {
                "none".to_string()
            },
        });

        if i > 0 {
            // Edge tint follows the downstream step so a failing step
            // colors the arrow pointing into it.
            graph.edges.push(FlowEdge {
                id: format!("edge-{i}"),
                source: format!("step-{}", i - 1),
                target: format!("step-{i}"),
                color,
                stroke_width: EDGE_STROKE_WIDTH,
                arrow_size: EDGE_ARROW_SIZE,
            });
        }
    }

    graph
}

fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(name: &str, status: &str) -> Step {
        serde_json::from_value(json!({
            "name": name,
            "step_type": "logic",
            "status": status,
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_steps_build_empty_graph() {
        let graph = build_flow_graph(&[], None);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert!(graph.is_empty());
    }

    #[test]
    fn test_single_step_has_no_edges() {
        let graph = build_flow_graph(&[step("only", "success")], Some(0));
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
        assert_eq!(graph.nodes[0].id, "step-0");
        assert!(graph.nodes[0].selected);
    }

    #[test]
    fn test_chain_connects_consecutive_steps() {
        let steps: Vec<Step> = (0..5).map(|i| step(&format!("s{i}"), "success")).collect();
        let graph = build_flow_graph(&steps, None);

        assert_eq!(graph.nodes.len(), 5);
        assert_eq!(graph.edges.len(), 4);
        for (j, edge) in graph.edges.iter().enumerate() {
            let i = j + 1;
            assert_eq!(edge.id, format!("edge-{i}"));
            assert_eq!(edge.source, format!("step-{}", i - 1));
            assert_eq!(edge.target, format!("step-{i}"));
            assert_eq!(edge.stroke_width, EDGE_STROKE_WIDTH);
            assert_eq!(edge.arrow_size, EDGE_ARROW_SIZE);
        }
    }

    #[test]
    fn test_node_positions_follow_index() {
        let steps = vec![step("a", "success"), step("b", "success"), step("c", "success")];
        let graph = build_flow_graph(&steps, None);

        for (i, node) in graph.nodes.iter().enumerate() {
            assert_eq!(node.x, NODE_X);
            assert_eq!(node.y, i as f64 * NODE_VERTICAL_SPACING + NODE_Y_OFFSET);
        }
        assert_eq!(graph.nodes[0].y, 50.0);
        assert_eq!(graph.nodes[1].y, 150.0);
        assert_eq!(graph.nodes[2].y, 250.0);
    }

    #[test]
    fn test_status_color_mapping() {
        let cases = [
            ("error", StatusColor::Red),
            ("warning", StatusColor::Amber),
            ("partial", StatusColor::Blue),
            ("success", StatusColor::Green),
            ("completed", StatusColor::Green),
            ("unknown-garbage", StatusColor::Green),
            // Matching is case sensitive.
            ("Error", StatusColor::Green),
        ];
        for (status, expected) in cases {
            let graph = build_flow_graph(&[step("s", status)], None);
            assert_eq!(graph.nodes[0].color, expected, "status {status:?}");
        }

        // A step with no status at all reads as success.
        let absent: Step = serde_json::from_value(json!({ "name": "bare" })).unwrap();
        let graph = build_flow_graph(&[absent], None);
        assert_eq!(graph.nodes[0].color, StatusColor::Green);
    }

    #[test]
    fn test_edge_color_follows_target_step() {
        let steps = vec![step("ok", "success"), step("boom", "error"), step("after", "success")];
        let graph = build_flow_graph(&steps, None);

        // The edge into the failing step is red, the edge out of it is not.
        assert_eq!(graph.edges[0].target, "step-1");
        assert_eq!(graph.edges[0].color, StatusColor::Red);
        assert_eq!(graph.edges[1].source, "step-1");
        assert_eq!(graph.edges[1].color, StatusColor::Green);
    }

    #[test]
    fn test_selection_touches_only_highlight_styling() {
        let steps = vec![step("a", "success"), step("b", "warning"), step("c", "success")];
        let plain = build_flow_graph(&steps, None);
        let selected = build_flow_graph(&steps, Some(1));

        assert_eq!(plain.edges, selected.edges);
        for (p, s) in plain.nodes.iter().zip(&selected.nodes) {
            assert_eq!(p.id, s.id);
            assert_eq!(p.x, s.x);
            assert_eq!(p.y, s.y);
            assert_eq!(p.label, s.label);
            assert_eq!(p.color, s.color);
            assert_eq!(p.background, s.background);
        }
        assert!(!plain.nodes[1].selected);
        assert!(selected.nodes[1].selected);
        assert_ne!(plain.nodes[1].border, selected.nodes[1].border);
        assert_ne!(plain.nodes[1].box_shadow, selected.nodes[1].box_shadow);
        assert_eq!(plain.nodes[0].border, selected.nodes[0].border);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let steps = vec![step("a", "success"), step("b", "partial")];
        let first = build_flow_graph(&steps, Some(0));
        let second = build_flow_graph(&steps, Some(0));
        assert_eq!(first, second);
    }

    #[test]
    fn test_three_step_chain_with_middle_selected() {
        let steps = vec![step("A", "success"), step("B", "success"), step("C", "success")];
        let graph = build_flow_graph(&steps, Some(1));

        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["step-0", "step-1", "step-2"]);
        let edge_ids: Vec<&str> = graph.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edge_ids, ["edge-1", "edge-2"]);
        let selected: Vec<bool> = graph.nodes.iter().map(|n| n.selected).collect();
        assert_eq!(selected, [false, true, false]);
        let ys: Vec<f64> = graph.nodes.iter().map(|n| n.y).collect();
        assert_eq!(ys, [50.0, 150.0, 250.0]);
    }

    #[test]
    fn test_long_labels_truncated() {
        let graph = build_flow_graph(
            &[step("a_step_name_well_beyond_the_card_width", "success")],
            None,
        );
        let label = &graph.nodes[0].label;
        assert_eq!(label.chars().count(), LABEL_WIDTH);
        assert!(label.ends_with('…'));
    }
}
