//! Test assertions for pipeline runs.

use crate::core::StepStatus;
use crate::pipeline::PipelineRun;

/// Asserts that a step ended with the expected status.
pub fn assert_step_status(run: &PipelineRun, step: &str, expected: StepStatus) {
    let actual = run.step_status(step);
    assert_eq!(
        actual,
        Some(expected),
        "Expected step '{step}' to be {expected}, got {actual:?}"
    );
}

/// Asserts that a step's transformation was never invoked.
pub fn assert_not_invoked(run: &PipelineRun, step: &str) {
    let record = run
        .record(step)
        .unwrap_or_else(|| panic!("No record for step '{step}'"));
    assert!(
        !record.was_invoked(),
        "Expected step '{step}' not to be invoked, but it started at {:?}",
        record.started_at
    );
}

/// Asserts that `consumer` started no earlier than `producer` ended.
pub fn assert_started_after(run: &PipelineRun, consumer: &str, producer: &str) {
    let started = run.record(consumer).and_then(|r| r.started_at);
    let ended = run.record(producer).and_then(|r| r.ended_at);
    match (started, ended) {
        (Some(started), Some(ended)) => assert!(
            started >= ended,
            "Step '{consumer}' started at {started} before '{producer}' ended at {ended}"
        ),
        _ => panic!("Missing timestamps: '{consumer}' started {started:?}, '{producer}' ended {ended:?}"),
    }
}

/// Asserts that every step reached a terminal status.
pub fn assert_all_terminal(run: &PipelineRun) {
    for record in run.trace() {
        assert!(
            record.is_terminal(),
            "Step '{}' ended in non-terminal status {}",
            record.step,
            record.status
        );
    }
}

/// Asserts that the terminal key resolved to the expected text.
pub fn assert_final_text(run: &PipelineRun, expected: &str) {
    let value = run.final_value();
    assert_eq!(
        value.as_text(),
        Some(expected),
        "Expected final value {expected:?}, got {value:?}"
    );
}
