//! Traceboard dashboard UI.
//!
//! Compiled to WASM and served by `traceboard-server`. The dashboard
//! polls the trace listing, renders a vertical flow graph for the
//! selected trace, and follows live updates over a WebSocket stream.

pub mod api;
pub mod components;
pub mod dashboard;

pub use components::*;
pub use dashboard::*;
