//! Wire types shared by the backend, the SDK, and the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Step status
// ============================================================================

/// Lifecycle / outcome state of a step or a whole trace.
///
/// Producers may send strings this build does not know about; those
/// deserialize as [`StepStatus::Unknown`] and render like a healthy
/// step. Matching is case sensitive, so `"Error"` is unknown while
/// `"error"` is not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Success,
    Completed,
    InProgress,
    Error,
    Warning,
    Partial,
    #[serde(other)]
    Unknown,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Success => "success",
            StepStatus::Completed => "completed",
            StepStatus::InProgress => "in_progress",
            StepStatus::Error => "error",
            StepStatus::Warning => "warning",
            StepStatus::Partial => "partial",
            StepStatus::Unknown => "unknown",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StepStatus::Error)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Evaluations
// ============================================================================

/// One pass/fail check inside an [`Evaluation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

/// Scored assessment of one candidate item considered by a step.
///
/// `status` is free text owned by the producer ("QUALIFIED",
/// "REJECTED", domain-specific verdicts). The dashboard only gives
/// special treatment to the passing statuses, see [`Evaluation::passed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub item_id: String,
    pub label: String,
    #[serde(default)]
    pub checks: Vec<Check>,
    #[serde(default)]
    pub status: String,
}

impl Evaluation {
    pub fn new(item_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            label: label.into(),
            checks: Vec::new(),
            status: "PENDING".to_string(),
        }
    }

    /// Record one named check result.
    pub fn check(
        &mut self,
        name: impl Into<String>,
        passed: bool,
        detail: impl Into<String>,
    ) -> &mut Self {
        self.checks.push(Check {
            name: name.into(),
            passed,
            detail: detail.into(),
        });
        self
    }

    pub fn set_status(&mut self, status: impl Into<String>) -> &mut Self {
        self.status = status.into();
        self
    }

    /// Whether this evaluation ended in a passing verdict.
    pub fn passed(&self) -> bool {
        matches!(self.status.as_str(), "QUALIFIED" | "PASSED")
    }
}

// ============================================================================
// Steps
// ============================================================================

/// One recorded decision step inside a trace.
///
/// Position in the trace's step list drives layout; `name` is the
/// update key, so re-sending a step with an existing name replaces
/// that step instead of appending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    #[serde(default = "default_step_type")]
    pub step_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub status: StepStatus,
    /// Wall-clock seconds the step took, stamped when recording ends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluations: Option<Vec<Evaluation>>,
}

fn default_step_type() -> String {
    "logic".to_string()
}

impl Step {
    pub fn new(name: impl Into<String>, step_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            step_type: step_type.into(),
            input: None,
            output: None,
            reasoning: None,
            status: StepStatus::default(),
            duration: None,
            evaluations: None,
        }
    }
}

// ============================================================================
// Traces
// ============================================================================

/// Full trace payload as produced by the SDK and accepted by
/// `POST /api/traces`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceData {
    pub trace_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, Value>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_outcome: Option<Value>,
}

/// Trace list entry returned by `GET /api/traces`.
///
/// `status` is derived server side: `error` as soon as any step
/// errors, `completed` once a final outcome lands, `in_progress`
/// otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub trace_id: String,
    pub name: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub status: StepStatus,
    pub step_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_outcome: Option<Value>,
}

/// Single trace with its steps, returned by `GET /api/traces/{id}`
/// and carried in WebSocket updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceDetail {
    pub trace_id: String,
    pub name: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub status: StepStatus,
    pub step_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_outcome: Option<Value>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Paginated trace listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceList {
    pub traces: Vec<TraceSummary>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

// ============================================================================
// Tests
// ============================================================================
