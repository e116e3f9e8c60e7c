//! Recorder Integration Tests
//!
//! Exercises the recording flow end to end: steps, evaluations,
//! panics, and the exported wire shape.

use serde_json::{json, Value};

use traceboard_sdk::{StepStatus, TraceRecorder};

#[test]
fn test_steps_keep_declaration_order() {
    let mut trail = TraceRecorder::start("ordered");
    // Each guard drops at the end of its statement.
    trail.step("keyword_generation", "llm_call");
    trail.step("candidate_search", "api_call");
    trail.step("apply_filters", "logic");

    let names: Vec<&str> = trail.steps().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["keyword_generation", "candidate_search", "apply_filters"]);
    assert!(trail.steps().iter().all(|s| s.duration.is_some()));
}

#[test]
fn test_panicking_step_marked_error() {
    let mut trail = TraceRecorder::start("panic demo");

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let mut step = trail.step("explode", "logic");
        step.log_input(json!({ "n": 1 }));
        panic!("boom");
    }));
    assert!(result.is_err());

    let step = trail.last_step().unwrap();
    assert_eq!(step.status, StepStatus::Error);
    assert!(step.duration.is_some());
    assert_eq!(step.input, Some(json!({ "n": 1 })));
}

#[test]
fn test_evaluations_recorded_through_guard() {
    let mut trail = TraceRecorder::start("filter demo");
    {
        let mut step = trail.step("apply_filters", "logic");
        step.evaluation("B0AAAA", "Candidate A")
            .check("price_range", true, "$19.99 within $10.00-$40.00")
            .check("min_rating", true, "4.5 >= 4.0")
            .set_status("QUALIFIED");
        step.evaluation("B0BBBB", "Candidate B")
            .check("price_range", false, "$55.00 outside $10.00-$40.00")
            .set_status("REJECTED");
    }

    let step = trail.last_step().unwrap();
    let evaluations = step.evaluations.as_ref().unwrap();
    assert_eq!(evaluations.len(), 2);
    assert!(evaluations[0].passed());
    assert!(!evaluations[1].passed());
    assert_eq!(evaluations[0].checks.len(), 2);
}

#[test]
fn test_export_wire_shape() {
    let mut metadata = serde_json::Map::new();
    metadata.insert("pipeline".to_string(), json!("demo"));
    let mut trail = TraceRecorder::start_with_metadata("wire demo", metadata);

    {
        let mut step = trail.step("search", "api_call");
        step.log_output(json!({ "count": 1 }));
        step.set_status(StepStatus::Success);
    }
    trail.complete(json!({ "selected": "B0AAAA" }));

    let value = serde_json::to_value(trail.export()).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object["trace_id"], json!(trail.trace_id()));
    assert_eq!(object["name"], "wire demo");
    assert_eq!(object["metadata"]["pipeline"], "demo");
    assert!(object["created_at"].as_str().unwrap().ends_with('Z'));
    assert_eq!(object["steps"][0]["name"], "search");
    assert_eq!(object["final_outcome"], json!({ "selected": "B0AAAA" }));

    // The export parses back as the same payload the backend accepts.
    let back: traceboard_sdk::TraceData = serde_json::from_value(value).unwrap();
    assert_eq!(back.trace_id, trail.trace_id());
    assert_eq!(back.steps.len(), 1);
}

#[test]
fn test_status_override_survives_clean_drop() {
    let mut trail = TraceRecorder::start("warn demo");
    {
        let mut step = trail.step("flaky_lookup", "api_call");
        step.set_status(StepStatus::Warning);
    }
    assert_eq!(trail.last_step().unwrap().status, StepStatus::Warning);
}

#[test]
fn test_export_is_a_snapshot() {
    let mut trail = TraceRecorder::start("snapshot");
    trail.step("first", "logic");
    let before: Value = serde_json::to_value(trail.export()).unwrap();
    trail.step("second", "logic");
    let after: Value = serde_json::to_value(trail.export()).unwrap();

    assert_eq!(before["steps"].as_array().unwrap().len(), 1);
    assert_eq!(after["steps"].as_array().unwrap().len(), 2);
}
