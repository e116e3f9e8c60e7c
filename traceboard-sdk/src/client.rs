//! HTTP delivery to a running Traceboard backend.

use std::time::Duration;

use traceboard_core::{Step, TraceData};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Thin client for the trace ingestion endpoints.
///
/// The `spawn_*` variants deliver in the background and swallow
/// failures after logging them. Instrumentation must never take the
/// instrumented program down, so an unreachable backend is a warning,
/// not an error.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { base_url, client })
    }

    /// Read the backend address from `TRACEBOARD_BACKEND_URL`,
    /// defaulting to a local backend.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("TRACEBOARD_BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:8090".to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a whole trace, replacing whatever the backend has for its id.
    pub async fn send_trace(&self, trace: &TraceData) -> Result<(), ClientError> {
        let url = format!("{}/api/traces", self.base_url);
        self.client
            .post(&url)
            .json(trace)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// POST one step update for a live trace.
    pub async fn send_step(&self, trace_id: &str, step: &Step) -> Result<(), ClientError> {
        let url = format!("{}/api/traces/{trace_id}/steps", self.base_url);
        self.client
            .post(&url)
            .json(&serde_json::json!({ "trace_id": trace_id, "step": step }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Deliver a trace in the background. Requires a tokio runtime.
    pub fn spawn_send_trace(&self, trace: TraceData) {
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(e) = client.send_trace(&trace).await {
                tracing::warn!(error = %e, trace_id = %trace.trace_id, "failed to deliver trace");
            }
        });
    }

    /// Deliver a step update in the background. Requires a tokio
    /// runtime. Step updates are routine churn, so failures are
    /// logged at debug rather than warn.
    pub fn spawn_send_step(&self, trace_id: impl Into<String>, step: Step) {
        let client = self.clone();
        let trace_id = trace_id.into();
        tokio::spawn(async move {
            if let Err(e) = client.send_step(&trace_id, &step).await {
                tracing::debug!(error = %e, trace_id = %trace_id, step = %step.name, "failed to deliver step update");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = BackendClient::new("http://localhost:8090/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8090");
    }
}
