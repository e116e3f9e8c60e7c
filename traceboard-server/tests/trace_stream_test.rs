//! Trace Stream WebSocket Integration Tests

use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use traceboard_server::api;

fn test_trace_id() -> String {
    format!("test-trace-{}", uuid::Uuid::new_v4())
}

struct TestServer {
    addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn start_test_server() -> TestServer {
    let app: Router = api::router().with_state(api::ApiState::new(50));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to get addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .await
            .expect("Server failed");
    });

    TestServer { addr, handle }
}

fn ws_url(addr: SocketAddr, path: &str) -> String {
    format!("ws://{addr}{path}")
}

async fn recv_json(
    ws: &mut (impl StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin),
) -> Value {
    let timeout_duration = Duration::from_secs(5);

    loop {
        match timeout(timeout_duration, ws.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => {
                let value: Value = serde_json::from_str(&text).expect("Invalid JSON");
                return value;
            }
            Ok(Some(Ok(Message::Close(_)))) => panic!("Connection closed"),
            Ok(Some(Ok(_))) => continue,
            Ok(Some(Err(e))) => panic!("Frame error: {e:?}"),
            Ok(None) => panic!("Stream ended"),
            Err(_) => panic!("Timeout waiting for frame"),
        }
    }
}

async fn wait_for_type(
    ws: &mut (impl StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin),
    expected_type: &str,
) -> Value {
    for _ in 0..10 {
        let msg = recv_json(ws).await;
        if msg["type"] == expected_type {
            return msg;
        }
    }

    panic!("did not receive message type {expected_type}");
}

async fn send_text(
    ws: &mut (impl SinkExt<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin),
    text: &str,
) {
    ws.send(Message::Text(text.to_string()))
        .await
        .expect("Send error");
}

async fn post_json(
    client: &reqwest::Client,
    addr: SocketAddr,
    path: &str,
    payload: Value,
) -> reqwest::Response {
    client
        .post(format!("http://{addr}{path}"))
        .json(&payload)
        .send()
        .await
        .expect("request failed")
}

fn trace_payload(trace_id: &str, name: &str) -> Value {
    json!({
        "trace_id": trace_id,
        "name": name,
        "created_at": "2025-03-04T10:30:00Z",
        "steps": [
            { "name": "first_step", "step_type": "logic", "status": "success" }
        ],
    })
}

#[tokio::test]
async fn test_stream_sends_initial_state_for_known_trace() {
    let server = start_test_server().await;
    let trace_id = test_trace_id();
    let client = reqwest::Client::new();

    post_json(
        &client,
        server.addr,
        "/api/traces",
        trace_payload(&trace_id, "streamed run"),
    )
    .await;

    let (mut ws, _) = connect_async(ws_url(server.addr, &format!("/ws/{trace_id}")))
        .await
        .expect("ws connect failed");

    let initial = wait_for_type(&mut ws, "initial_state").await;
    assert_eq!(initial["trace"]["trace_id"], json!(trace_id));
    assert_eq!(initial["trace"]["name"], "streamed run");
    assert_eq!(initial["steps"][0]["name"], "first_step");
}

#[tokio::test]
async fn test_stream_echoes_pong_for_keepalive() {
    let server = start_test_server().await;
    let trace_id = test_trace_id();

    // No trace exists yet, so the first frame back is the pong.
    let (mut ws, _) = connect_async(ws_url(server.addr, &format!("/ws/{trace_id}")))
        .await
        .expect("ws connect failed");

    send_text(&mut ws, "ping").await;
    let pong = recv_json(&mut ws).await;
    assert_eq!(pong["type"], "pong");
    assert_eq!(pong["data"], "ping");
}

#[tokio::test]
async fn test_stream_broadcasts_step_updates() {
    let server = start_test_server().await;
    let trace_id = test_trace_id();
    let client = reqwest::Client::new();

    post_json(
        &client,
        server.addr,
        "/api/traces",
        trace_payload(&trace_id, "live run"),
    )
    .await;

    let (mut ws, _) = connect_async(ws_url(server.addr, &format!("/ws/{trace_id}")))
        .await
        .expect("ws connect failed");
    let _ = wait_for_type(&mut ws, "initial_state").await;

    post_json(
        &client,
        server.addr,
        &format!("/api/traces/{trace_id}/steps"),
        json!({
            "trace_id": trace_id,
            "step": { "name": "second_step", "step_type": "api_call", "status": "success" }
        }),
    )
    .await;

    let update = wait_for_type(&mut ws, "step_updated").await;
    assert_eq!(update["trace_id"], json!(trace_id));
    assert_eq!(update["step"]["name"], "second_step");
}

#[tokio::test]
async fn test_stream_broadcasts_full_trace_replacements() {
    let server = start_test_server().await;
    let trace_id = test_trace_id();
    let client = reqwest::Client::new();

    let (mut ws, _) = connect_async(ws_url(server.addr, &format!("/ws/{trace_id}")))
        .await
        .expect("ws connect failed");

    // Subscribing to a trace the server has not seen sends nothing, so
    // the broadcast below is the first frame.
    post_json(
        &client,
        server.addr,
        "/api/traces",
        trace_payload(&trace_id, "late arrival"),
    )
    .await;

    let update = wait_for_type(&mut ws, "trace_updated").await;
    assert_eq!(update["trace"]["name"], "late arrival");
    assert_eq!(update["steps"][0]["name"], "first_step");
}

#[tokio::test]
async fn test_stream_is_scoped_to_its_trace() {
    let server = start_test_server().await;
    let watched = test_trace_id();
    let other = test_trace_id();
    let client = reqwest::Client::new();

    let (mut ws, _) = connect_async(ws_url(server.addr, &format!("/ws/{watched}")))
        .await
        .expect("ws connect failed");

    // A mutation on an unrelated trace must not reach this stream.
    post_json(
        &client,
        server.addr,
        "/api/traces",
        trace_payload(&other, "unrelated"),
    )
    .await;
    post_json(
        &client,
        server.addr,
        "/api/traces",
        trace_payload(&watched, "watched"),
    )
    .await;

    let update = wait_for_type(&mut ws, "trace_updated").await;
    assert_eq!(update["trace"]["trace_id"], json!(watched));
    assert_eq!(update["trace"]["name"], "watched");
}
