//! Structured observability hooks for Monte Carlo run lifecycle events.
//!
//! This module provides:
//! - A run-scoped tracing span via [`run_span`]
//! - Emission functions for key lifecycle events: start, per-sample
//!   evaluation, estimate, baseline, finish and failure
//!
//! Events are emitted at `info!` level, except per-sample events which are
//! `debug!`. Verbosity is controlled through `MCUQ_LOG` / `RUST_LOG`.

use tracing::{debug, info, warn};

/// Span tagging everything inside a run with its id and use case.
///
/// Attach it to the run future with `tracing::Instrument`; entering it
/// across an `.await` would make the future `!Send`.
///
/// # Example
///
/// ```ignore
/// run_future.instrument(run_span("run-12345", "l2-sea")).await
/// ```
pub fn run_span(run_id: &str, use_case: &str) -> tracing::Span {
    tracing::info_span!("mcuq.run", run_id = %run_id, use_case = %use_case)
}

/// Emit event: run started against a model endpoint.
pub fn emit_run_started(run_id: &str, endpoint: &str, model: &str, samples: usize, seed: Option<u64>) {
    info!(
        event = "run.started",
        run_id = %run_id,
        endpoint = %endpoint,
        model = %model,
        samples = samples,
        seed = ?seed,
    );
}

/// Emit event: a single sample came back from the model.
pub fn emit_sample_evaluated(index: usize, input: &[f64], value: f64) {
    debug!(event = "sample.evaluated", index = index, input = ?input, value = value);
}

/// Emit event: the Monte Carlo estimate was computed.
pub fn emit_estimate_computed(mean: f64, retained: usize, total: usize) {
    info!(
        event = "estimate.computed",
        mean = mean,
        retained = retained,
        discarded = total - retained,
    );
}

/// Emit event: the reference evaluation at the baseline input completed.
pub fn emit_baseline_evaluated(input: &[f64], value: f64) {
    info!(event = "baseline.evaluated", input = ?input, value = value);
}

/// Emit event: run finished successfully.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, evaluations: usize) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        evaluations = evaluations,
    );
}

/// Emit event: run aborted (warning level).
pub fn emit_run_failed(run_id: &str, stage: &str, error: &dyn std::fmt::Display) {
    warn!(event = "run.failed", run_id = %run_id, stage = %stage, error = %error);
}
