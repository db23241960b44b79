//! Observability tests for Monte Carlo run lifecycle tracing.
//!
//! These tests verify that structured tracing events are emitted for the
//! key lifecycle events: run start, estimate, baseline, finish and failure.

use mcuq_core::obs::{
    emit_baseline_evaluated, emit_estimate_computed, emit_run_failed, emit_run_finished,
    emit_run_started, emit_sample_evaluated, run_span,
};
use mcuq_core::{L2Sea, McDriver};
use mcuq_protocol::fakes::{FailingModel, FixedModel};
use tracing_test::traced_test;

/// Test: emit_run_started logs endpoint and model
#[traced_test]
#[test]
fn test_emit_run_started_logs_endpoint_and_model() {
    emit_run_started("run-123", "http://localhost:4242", "forward", 1000, Some(42));
    assert!(logs_contain("run.started"));
    assert!(logs_contain("http://localhost:4242"));
}

/// Test: emit_run_finished logs duration
#[traced_test]
#[test]
fn test_emit_run_finished_logs_duration() {
    emit_run_finished("run-456", 5000, 1001);
    assert!(logs_contain("run.finished"));
    assert!(logs_contain("duration_ms=5000"));
}

#[traced_test]
#[test]
fn test_emit_estimate_and_baseline() {
    emit_estimate_computed(2.5, 97, 100);
    emit_baseline_evaluated(&[0.32, -6.2], 64.7470016);
    assert!(logs_contain("estimate.computed"));
    assert!(logs_contain("discarded=3"));
    assert!(logs_contain("baseline.evaluated"));
}

/// Test: emit_run_failed creates a warn-level event
#[traced_test]
#[test]
fn test_emit_run_failed_logs_warning() {
    emit_run_failed("run-err-001", "evaluation", &"connection refused");
    assert!(logs_contain("WARN"));
    assert!(logs_contain("connection refused"));
}

#[traced_test]
#[test]
fn test_run_span_wraps_sample_events() {
    let span = run_span("test-span-run", "predator-prey");
    let _entered = span.enter();
    emit_sample_evaluated(0, &[0.5, 2.0], 1.25);
}

/// Test: a completed run emits start, estimate, baseline and finish in one span
#[traced_test]
#[tokio::test]
async fn test_driver_run_emits_lifecycle_events() {
    let use_case = L2Sea {
        samples: 4,
        seed: Some(1),
        ..L2Sea::default()
    };
    let report = McDriver::new(FixedModel::new("benchmark_FOM", vec![10.0]))
        .run(&use_case)
        .await
        .unwrap();

    assert!(logs_contain("run.started"));
    assert!(logs_contain("estimate.computed"));
    assert!(logs_contain("baseline.evaluated"));
    assert!(logs_contain("run.finished"));
    assert!(logs_contain(&report.run_id));
    assert!(!logs_contain("run.failed"));
}

/// Test: an aborted run emits run.failed with the failing stage
#[traced_test]
#[tokio::test]
async fn test_driver_failure_emits_run_failed() {
    let use_case = L2Sea {
        samples: 4,
        seed: Some(1),
        ..L2Sea::default()
    };
    let result = McDriver::new(FailingModel::new("benchmark_FOM", 2, 10.0))
        .run(&use_case)
        .await;

    assert!(result.is_err());
    assert!(logs_contain("run.failed"));
    assert!(logs_contain("stage=evaluation"));
    assert!(!logs_contain("run.finished"));
}

/// Test: unseeded sampling warns that the run is not reproducible
#[traced_test]
#[tokio::test]
async fn test_unseeded_run_warns() {
    let use_case = L2Sea {
        samples: 2,
        seed: None,
        ..L2Sea::default()
    };
    McDriver::new(FixedModel::new("benchmark_FOM", vec![10.0]))
        .run(&use_case)
        .await
        .unwrap();
    assert!(logs_contain("unseeded"));
}
