//! Recording SDK for Traceboard.
//!
//! Instrument a decision pipeline with a [`TraceRecorder`], record
//! each step through a [`StepGuard`], then ship the trace to a
//! running backend with [`BackendClient`] and keep a JSON copy with
//! [`JsonFileStorage`]. Delivery is fire-and-forget: an unreachable
//! backend never fails the instrumented program.
//!
//! ```no_run
//! use serde_json::json;
//! use traceboard_sdk::TraceRecorder;
//!
//! let mut trail = TraceRecorder::start("competitor selection");
//! {
//!     let mut step = trail.step("keyword_generation", "llm_call");
//!     step.log_input(json!({ "product_title": "Wireless Mouse" }));
//!     step.log_output(json!({ "keywords": ["mouse", "wireless"] }));
//!     step.set_reasoning("Extracted from the title");
//! }
//! trail.complete(json!({ "selected": "B0AAAA" }));
//! let data = trail.export();
//! ```

pub mod client;
pub mod recorder;
pub mod storage;

pub use client::{BackendClient, ClientError};
pub use recorder::{StepGuard, TraceRecorder};
pub use storage::{JsonFileStorage, StorageError};

pub use traceboard_core::{Check, Evaluation, Step, StepStatus, TraceData};
