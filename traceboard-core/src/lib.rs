//! Shared building blocks for the Traceboard dashboard.
//!
//! Everything in this crate is used from at least two of:
//! - the axum backend (native)
//! - the recording SDK (native)
//! - the Dioxus dashboard (wasm32)
//!
//! so it stays free of runtime and I/O dependencies. All wire types
//! serialize with serde as JSON over HTTP and WebSocket.

pub mod flow;
pub mod model;
pub mod poll;

pub use flow::{
    build_flow_graph, FlowEdge, FlowGraph, FlowNode, StatusColor, EDGE_ARROW_SIZE,
    EDGE_STROKE_WIDTH, LABEL_WIDTH, NODE_VERTICAL_SPACING, NODE_X, NODE_Y_OFFSET,
};
pub use model::{
    Check, Evaluation, Step, StepStatus, TraceData, TraceDetail, TraceList, TraceSummary,
};
pub use poll::{PollCadence, FAST_POLL_INTERVAL, MAX_POLL_INTERVAL, STABLE_CYCLE_THRESHOLD};
