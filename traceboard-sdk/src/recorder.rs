//! Trace recording.
//!
//! A [`TraceRecorder`] owns one trace under construction. Each call
//! to [`TraceRecorder::step`] opens a [`StepGuard`]; when the guard
//! goes out of scope the step's duration is stamped, and if the
//! scope is unwinding from a panic the step is marked as an error so
//! the failure still shows up on the dashboard.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use traceboard_core::{Evaluation, Step, StepStatus, TraceData};

pub struct TraceRecorder {
    trace_id: String,
    name: String,
    metadata: serde_json::Map<String, Value>,
    created_at: DateTime<Utc>,
    steps: Vec<Step>,
    final_outcome: Option<Value>,
}

impl TraceRecorder {
    /// Begin a new trace with a fresh id.
    pub fn start(name: impl Into<String>) -> Self {
        Self::start_with_metadata(name, serde_json::Map::new())
    }

    pub fn start_with_metadata(
        name: impl Into<String>,
        metadata: serde_json::Map<String, Value>,
    ) -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            metadata,
            created_at: Utc::now(),
            steps: Vec::new(),
            final_outcome: None,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The most recently recorded step, typically read right after a
    /// guard scope ends to ship that step to the backend.
    pub fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Open the next step. The returned guard borrows the recorder
    /// exclusively, so steps cannot interleave.
    pub fn step(&mut self, name: impl Into<String>, step_type: impl Into<String>) -> StepGuard<'_> {
        let index = self.steps.len();
        self.steps.push(Step::new(name, step_type));
        StepGuard {
            recorder: self,
            index,
            started: Instant::now(),
        }
    }

    /// Record the final outcome. Anything that is not a JSON object
    /// is wrapped as `{"result": value}` so the wire shape stays an
    /// object.
    pub fn complete(&mut self, outcome: Value) {
        let outcome = match outcome {
            Value::Object(_) => outcome,
            other => json!({ "result": other }),
        };
        self.final_outcome = Some(outcome);
    }

    /// Snapshot the trace in the wire format accepted by
    /// `POST /api/traces`.
    pub fn export(&self) -> TraceData {
        TraceData {
            trace_id: self.trace_id.clone(),
            name: self.name.clone(),
            metadata: Some(self.metadata.clone()),
            created_at: self.created_at,
            steps: self.steps.clone(),
            final_outcome: self.final_outcome.clone(),
        }
    }
}

/// Exclusive handle on one step under recording.
pub struct StepGuard<'a> {
    recorder: &'a mut TraceRecorder,
    index: usize,
    started: Instant,
}

impl StepGuard<'_> {
    fn step_mut(&mut self) -> &mut Step {
        &mut self.recorder.steps[self.index]
    }

    pub fn log_input(&mut self, data: Value) -> &mut Self {
        self.step_mut().input = Some(data);
        self
    }

    pub fn log_output(&mut self, data: Value) -> &mut Self {
        self.step_mut().output = Some(data);
        self
    }

    pub fn set_reasoning(&mut self, text: impl Into<String>) -> &mut Self {
        self.step_mut().reasoning = Some(text.into());
        self
    }

    pub fn set_status(&mut self, status: StepStatus) -> &mut Self {
        self.step_mut().status = status;
        self
    }

    /// Start an evaluation of one candidate item inside this step and
    /// return it for checks and a verdict.
    pub fn evaluation(
        &mut self,
        item_id: impl Into<String>,
        label: impl Into<String>,
    ) -> &mut Evaluation {
        let step = self.step_mut();
        let evaluations = step.evaluations.get_or_insert_with(Vec::new);
        let index = evaluations.len();
        evaluations.push(Evaluation::new(item_id, label));
        &mut evaluations[index]
    }
}

impl Drop for StepGuard<'_> {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed().as_secs_f64();
        let step = &mut self.recorder.steps[self.index];
        step.duration = Some(elapsed);
        if std::thread::panicking() {
            step.status = StepStatus::Error;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_guard_records_fields() {
        let mut trail = TraceRecorder::start("demo");
        {
            let mut step = trail.step("search", "api_call");
            step.log_input(json!({ "query": "wireless mouse" }))
                .log_output(json!({ "count": 3 }))
                .set_reasoning("mock search");
        }

        let step = trail.last_step().unwrap();
        assert_eq!(step.name, "search");
        assert_eq!(step.step_type, "api_call");
        assert_eq!(step.input, Some(json!({ "query": "wireless mouse" })));
        assert_eq!(step.status, StepStatus::Success);
        assert!(step.duration.is_some());
    }

    #[test]
    fn test_complete_wraps_scalar_outcome() {
        let mut trail = TraceRecorder::start("demo");
        trail.complete(json!("B0AAAA"));
        assert_eq!(
            trail.export().final_outcome,
            Some(json!({ "result": "B0AAAA" }))
        );

        let mut trail = TraceRecorder::start("demo");
        trail.complete(json!({ "selected": "B0AAAA" }));
        assert_eq!(
            trail.export().final_outcome,
            Some(json!({ "selected": "B0AAAA" }))
        );
    }
}
