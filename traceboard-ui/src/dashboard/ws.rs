//! WebSocket client for the per-trace update stream.
//!
//! The backend exposes one stream per trace at `/ws/{trace_id}`;
//! opening the socket is the subscription, no handshake message is
//! required. Incoming frames are parsed into [`StreamEvent`]s and
//! handed to the caller's callback.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{MessageEvent, WebSocket};

use traceboard_core::{Step, TraceDetail};

/// Events delivered to the dashboard from a trace stream.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Connected,
    Disconnected,
    InitialState(TraceDetail),
    TraceUpdated(TraceDetail),
    StepUpdated { trace_id: String, step: Step },
    Pong,
}

/// Convert an HTTP base URL to a WebSocket one. An empty base means the
/// dashboard is served by the backend itself, so the scheme and host
/// come from the page location.
pub fn http_to_ws_url(http_url: &str) -> String {
    if let Some(rest) = http_url.strip_prefix("https://") {
        return format!("wss://{rest}");
    }
    if let Some(rest) = http_url.strip_prefix("http://") {
        return format!("ws://{rest}");
    }

    let location = web_sys::window().map(|w| w.location());
    let protocol = location
        .as_ref()
        .and_then(|l| l.protocol().ok())
        .unwrap_or_else(|| "http:".to_string());
    let host = location.and_then(|l| l.host().ok()).unwrap_or_default();
    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    format!("{scheme}://{host}")
}

/// Parse one text frame from the stream. Unknown or malformed frames
/// yield `None` and are ignored by the dashboard.
pub fn parse_stream_message(payload: &str) -> Option<StreamEvent> {
    let json = serde_json::from_str::<serde_json::Value>(payload).ok()?;
    let msg_type = json.get("type")?.as_str()?;

    match msg_type {
        "pong" => Some(StreamEvent::Pong),
        "initial_state" => {
            serde_json::from_value::<TraceDetail>(json.get("trace").cloned().unwrap_or_default())
                .ok()
                .map(StreamEvent::InitialState)
        }
        "trace_updated" => {
            serde_json::from_value::<TraceDetail>(json.get("trace").cloned().unwrap_or_default())
                .ok()
                .map(StreamEvent::TraceUpdated)
        }
        "step_updated" => {
            let trace_id = json.get("trace_id")?.as_str()?.to_string();
            serde_json::from_value::<Step>(json.get("step").cloned().unwrap_or_default())
                .ok()
                .map(|step| StreamEvent::StepUpdated { trace_id, step })
        }
        _ => None,
    }
}

/// Open the stream for `trace_id` and forward events to `on_event`.
///
/// The socket and its callbacks are leaked into the JS runtime; the
/// dashboard guards against stale sockets by checking the event's
/// trace id against the current selection.
pub async fn connect_trace_stream<F>(trace_id: &str, mut on_event: F)
where
    F: FnMut(StreamEvent) + 'static,
{
    let ws_base = http_to_ws_url(crate::api::api_base());
    let ws_url = format!("{ws_base}/ws/{trace_id}");

    dioxus_logger::tracing::info!("Connecting to trace stream: {}", ws_url);

    let ws = match WebSocket::new(&ws_url) {
        Ok(ws) => ws,
        Err(e) => {
            dioxus_logger::tracing::error!("Failed to create WebSocket: {:?}", e);
            on_event(StreamEvent::Disconnected);
            return;
        }
    };

    let on_event = Rc::new(RefCell::new(on_event));

    {
        let on_event = on_event.clone();
        let cb = Closure::wrap(Box::new(move |_e: wasm_bindgen::JsValue| {
            dioxus_logger::tracing::info!("Trace stream connected");
            (on_event.borrow_mut())(StreamEvent::Connected);
        }) as Box<dyn FnMut(wasm_bindgen::JsValue)>);
        ws.set_onopen(Some(cb.as_ref().unchecked_ref()));
        cb.forget();
    }

    {
        let on_event = on_event.clone();
        let cb = Closure::wrap(Box::new(move |e: MessageEvent| {
            if let Ok(text) = e.data().dyn_into::<js_sys::JsString>() {
                let text: String = text.into();
                match parse_stream_message(&text) {
                    Some(event) => (on_event.borrow_mut())(event),
                    None => {
                        dioxus_logger::tracing::debug!("Ignoring stream frame: {}", text);
                    }
                }
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(cb.as_ref().unchecked_ref()));
        cb.forget();
    }

    {
        let on_event = on_event.clone();
        let cb = Closure::wrap(Box::new(move |_e: wasm_bindgen::JsValue| {
            dioxus_logger::tracing::info!("Trace stream closed");
            (on_event.borrow_mut())(StreamEvent::Disconnected);
        }) as Box<dyn FnMut(wasm_bindgen::JsValue)>);
        ws.set_onclose(Some(cb.as_ref().unchecked_ref()));
        cb.forget();
    }

    {
        let cb = Closure::wrap(Box::new(move |_e: wasm_bindgen::JsValue| {
            dioxus_logger::tracing::error!("Trace stream error");
        }) as Box<dyn FnMut(wasm_bindgen::JsValue)>);
        ws.set_onerror(Some(cb.as_ref().unchecked_ref()));
        cb.forget();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_url_swaps_scheme() {
        assert_eq!(http_to_ws_url("http://localhost:8090"), "ws://localhost:8090");
        assert_eq!(http_to_ws_url("https://traces.example.com"), "wss://traces.example.com");
    }

    #[test]
    fn parses_pong() {
        let event = parse_stream_message(r#"{"type": "pong", "data": "ping"}"#);
        assert!(matches!(event, Some(StreamEvent::Pong)));
    }

    #[test]
    fn parses_step_updated() {
        let payload = r#"{
            "type": "step_updated",
            "trace_id": "t-1",
            "step": {"name": "filter", "step_type": "logic", "status": "warning"}
        }"#;
        match parse_stream_message(payload) {
            Some(StreamEvent::StepUpdated { trace_id, step }) => {
                assert_eq!(trace_id, "t-1");
                assert_eq!(step.name, "filter");
            }
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_and_malformed_frames() {
        assert!(parse_stream_message(r#"{"type": "telemetry"}"#).is_none());
        // step_updated without a trace id cannot be routed
        assert!(parse_stream_message(r#"{"type": "step_updated", "step": {"name": "x"}}"#).is_none());
        assert!(parse_stream_message("not json").is_none());
    }
}
