//! Error taxonomy for Monte Carlo runs.

use mcuq_protocol::ModelError;

/// Errors produced while drawing samples.
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    #[error("invalid parameter domain: {reason}")]
    InvalidDomain { reason: String },
}

/// Errors produced while reducing results to an estimate.
#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    #[error("no samples remain after filtering {total} results{}", fmt_threshold(.threshold))]
    NoSamplesRemain {
        total: usize,
        threshold: Option<f64>,
    },

    #[error("result {index} is not finite ({value})")]
    NonFinite { index: usize, value: f64 },
}

fn fmt_threshold(threshold: &Option<f64>) -> String {
    match threshold {
        Some(t) => format!(" (threshold < {})", t),
        None => String::new(),
    }
}

/// A failed Monte Carlo run, tagged with the stage that failed.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("invalid run configuration: {0}")]
    Config(String),

    #[error("sampling failed: {0}")]
    Sampling(#[from] SamplerError),

    #[error("evaluation of sample {index} {input:?} failed: {source}")]
    Evaluation {
        index: usize,
        input: Vec<f64>,
        #[source]
        source: ModelError,
    },

    #[error("baseline evaluation {input:?} failed: {source}")]
    Baseline {
        input: Vec<f64>,
        #[source]
        source: ModelError,
    },

    #[error("estimation failed: {0}")]
    Estimation(#[from] EstimateError),
}

impl RunError {
    /// Name of the pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            RunError::Config(_) => "config",
            RunError::Sampling(_) => "sampling",
            RunError::Evaluation { .. } | RunError::Baseline { .. } => "evaluation",
            RunError::Estimation(_) => "estimation",
        }
    }
}

/// Result type for Monte Carlo runs.
pub type Result<T> = std::result::Result<T, RunError>;
