//! HTTP client for the Traceboard backend API.

use std::sync::OnceLock;

use gloo_net::http::Request;
use traceboard_core::{TraceDetail, TraceList};

/// Determine the backend base URL from the current window location.
///
/// During development the dashboard is served by `dx serve` on one port
/// while the backend listens on another, so localhost gets an explicit
/// base. In production the backend serves the dashboard itself and
/// relative URLs are enough.
fn get_api_base() -> String {
    let hostname = web_sys::window()
        .and_then(|w| w.location().hostname().ok())
        .unwrap_or_default();

    if hostname == "localhost" || hostname == "127.0.0.1" {
        "http://localhost:8090".to_string()
    } else {
        String::new()
    }
}

static API_BASE_CACHE: OnceLock<String> = OnceLock::new();

pub fn api_base() -> &'static str {
    API_BASE_CACHE.get_or_init(get_api_base)
}

/// Fetch the most recent traces, newest first.
pub async fn fetch_traces(limit: usize) -> Result<TraceList, String> {
    let url = format!("{}/api/traces?limit={limit}", api_base());
    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;

    if !response.ok() {
        return Err(format!("HTTP error: {}", response.status()));
    }

    response
        .json::<TraceList>()
        .await
        .map_err(|e| format!("Failed to parse JSON: {e}"))
}

/// Fetch one trace with its full step list.
pub async fn fetch_trace(trace_id: &str) -> Result<TraceDetail, String> {
    let url = format!("{}/api/traces/{trace_id}", api_base());
    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;

    if !response.ok() {
        return Err(format!("HTTP error: {}", response.status()));
    }

    response
        .json::<TraceDetail>()
        .await
        .map_err(|e| format!("Failed to parse JSON: {e}"))
}
