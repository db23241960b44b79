//! Monte Carlo mean estimation with an optional threshold filter.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Estimate;
use crate::error::EstimateError;

/// Threshold used by the L2-Sea use case.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 1000.0;

/// Sanity filter that keeps only results strictly below `threshold`.
///
/// This guards against divergent remote computations; it is not a
/// statistical outlier test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierFilter {
    pub threshold: f64,
}

impl OutlierFilter {
    pub fn new(threshold: f64) -> Self {
        OutlierFilter { threshold }
    }

    /// `value < threshold`. NaN is never retained.
    pub fn retains(&self, value: f64) -> bool {
        value < self.threshold
    }
}

impl Default for OutlierFilter {
    fn default() -> Self {
        OutlierFilter::new(DEFAULT_OUTLIER_THRESHOLD)
    }
}

/// Reduce `results` to their arithmetic mean, after applying `filter`.
///
/// Fails with [`EstimateError::NoSamplesRemain`] when nothing is left to
/// average, and with [`EstimateError::NonFinite`] when a retained result is
/// NaN or infinite.
pub fn estimate(results: &[f64], filter: Option<&OutlierFilter>) -> Result<Estimate, EstimateError> {
    let mut retained = Vec::with_capacity(results.len());
    for (index, &value) in results.iter().enumerate() {
        if filter.map_or(true, |f| f.retains(value)) {
            if !value.is_finite() {
                return Err(EstimateError::NonFinite { index, value });
            }
            retained.push(value);
        }
    }

    let m = retained.len();
    if m == 0 {
        return Err(EstimateError::NoSamplesRemain {
            total: results.len(),
            threshold: filter.map(|f| f.threshold),
        });
    }

    let mean = retained.iter().sum::<f64>() / m as f64;
    let std_error = (m >= 2).then(|| {
        let ss: f64 = retained.iter().map(|x| (x - mean) * (x - mean)).sum();
        (ss / (m - 1) as f64).sqrt() / (m as f64).sqrt()
    });

    debug!(
        "Estimated mean {} from {} of {} results",
        mean,
        m,
        results.len()
    );
    Ok(Estimate {
        mean,
        retained: m,
        total: results.len(),
        std_error,
    })
}
