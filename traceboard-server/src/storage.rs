//! In-memory trace store.
//!
//! The dashboard shows live runs; producers keep their own JSON
//! exports for anything durable. So the store is a plain map behind
//! an async lock, rebuilt empty on every server start.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use traceboard_core::{Step, StepStatus, TraceData, TraceDetail, TraceList, TraceSummary};

#[derive(Debug, Default)]
pub struct TraceStore {
    traces: RwLock<HashMap<String, TraceRecord>>,
}

#[derive(Debug, Clone)]
struct TraceRecord {
    trace_id: String,
    name: String,
    metadata: serde_json::Map<String, Value>,
    created_at: DateTime<Utc>,
    status: StepStatus,
    final_outcome: Option<Value>,
    steps: Vec<Step>,
}

impl TraceRecord {
    fn from_data(data: TraceData) -> Self {
        let status = if data.final_outcome.is_some() {
            StepStatus::Completed
        } else {
            StepStatus::InProgress
        };
        Self {
            trace_id: data.trace_id,
            name: data.name,
            metadata: data.metadata.unwrap_or_default(),
            created_at: data.created_at,
            status,
            final_outcome: data.final_outcome,
            steps: data.steps,
        }
    }

    /// Placeholder for step updates that arrive before their trace.
    fn stub(trace_id: &str) -> Self {
        Self {
            trace_id: trace_id.to_string(),
            name: "Unknown".to_string(),
            metadata: serde_json::Map::new(),
            created_at: Utc::now(),
            status: StepStatus::InProgress,
            final_outcome: None,
            steps: Vec::new(),
        }
    }

    fn summary(&self) -> TraceSummary {
        TraceSummary {
            trace_id: self.trace_id.clone(),
            name: self.name.clone(),
            metadata: self.metadata.clone(),
            created_at: self.created_at,
            status: self.status,
            step_count: self.steps.len(),
            final_outcome: self.final_outcome.clone(),
        }
    }

    fn detail(&self) -> TraceDetail {
        TraceDetail {
            trace_id: self.trace_id.clone(),
            name: self.name.clone(),
            metadata: self.metadata.clone(),
            created_at: self.created_at,
            status: self.status,
            step_count: self.steps.len(),
            final_outcome: self.final_outcome.clone(),
            steps: self.steps.clone(),
        }
    }
}

impl TraceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paginated listing, newest first.
    pub async fn list(&self, limit: usize, offset: usize) -> TraceList {
        let traces = self.traces.read().await;
        let mut summaries: Vec<TraceSummary> =
            traces.values().map(TraceRecord::summary).collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = summaries.len();
        let page = summaries.into_iter().skip(offset).take(limit).collect();
        TraceList {
            traces: page,
            total,
            limit,
            offset,
        }
    }

    pub async fn get(&self, trace_id: &str) -> Option<TraceDetail> {
        self.traces.read().await.get(trace_id).map(TraceRecord::detail)
    }

    /// Insert or fully replace a trace. A replace also replaces the
    /// derived status, so a full upload wins over earlier step updates.
    pub async fn upsert_trace(&self, data: TraceData) -> TraceDetail {
        let record = TraceRecord::from_data(data);
        let detail = record.detail();
        self.traces
            .write()
            .await
            .insert(record.trace_id.clone(), record);
        detail
    }

    /// Insert or replace a single step, creating a stub trace when the
    /// full trace has not arrived yet. Steps are keyed by name, so a
    /// re-sent step updates in place instead of appending. An error
    /// step flips the whole trace to error.
    pub async fn upsert_step(&self, trace_id: &str, step: Step) -> Step {
        let mut traces = self.traces.write().await;
        let record = traces
            .entry(trace_id.to_string())
            .or_insert_with(|| TraceRecord::stub(trace_id));

        if step.status.is_error() {
            record.status = StepStatus::Error;
        }

        let stored = step.clone();
        match record.steps.iter_mut().find(|s| s.name == step.name) {
            Some(existing) => *existing = step,
            None => record.steps.push(step),
        }
        stored
    }

    pub async fn count(&self) -> usize {
        self.traces.read().await.len()
    }

    /// A few known ids, for not-found diagnostics.
    pub async fn sample_ids(&self, n: usize) -> Vec<String> {
        self.traces.read().await.keys().take(n).cloned().collect()
    }
}
