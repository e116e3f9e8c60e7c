//! Traceboard backend library.
//!
//! Exposed as a library so integration tests can assemble the same
//! router the binary serves.

pub mod api;
pub mod config;
pub mod storage;
