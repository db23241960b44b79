//! Uncertainty-propagation problems driven against remote models.
//!
//! A [`UseCase`] fixes everything model-specific about a run: where inputs
//! are drawn from, how a sampled vector is laid out in the request the
//! service expects, the unperturbed baseline, and whether outputs are
//! filtered before averaging.

use serde::{Deserialize, Serialize};

use crate::domain::{InputVector, ParameterDomain};
use crate::error::RunError;
use crate::estimator::{OutlierFilter, DEFAULT_OUTLIER_THRESHOLD};
use crate::sampler::SamplerConfig;

pub trait UseCase: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &str;

    /// Number of Monte Carlo samples (N).
    fn samples(&self) -> usize;

    /// Domain the uncertain inputs are drawn from.
    fn domain(&self) -> ParameterDomain;

    /// Unperturbed input used for the reference evaluation.
    fn baseline(&self) -> InputVector;

    /// Seeding policy for this use case's sampler.
    fn sampler_config(&self) -> SamplerConfig;

    /// Full request vector for a sampled input.
    fn request(&self, input: &InputVector) -> Vec<f64>;

    /// Filter applied before averaging, if any.
    fn filter(&self) -> Option<OutlierFilter> {
        None
    }

    /// Scalar quantity of interest extracted from one output group.
    fn quantity_of_interest(&self, output: &[f64]) -> f64 {
        output.first().copied().unwrap_or(f64::NAN)
    }

    fn validate(&self) -> Result<(), RunError> {
        if self.samples() == 0 {
            return Err(RunError::Config(format!(
                "{}: sample count must be at least 1",
                self.name()
            )));
        }
        let domain = self.domain();
        domain.validate()?;
        if self.baseline().dim() != domain.dim() {
            return Err(RunError::Config(format!(
                "{}: baseline has {} values, domain has {} dimensions",
                self.name(),
                self.baseline().dim(),
                domain.dim()
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Predator-prey
// ---------------------------------------------------------------------------

/// Prey population at time `T` under uncertain initial conditions.
///
/// Request layout: `[T, u0_1, u0_2, theta1, theta2, theta12, theta21]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredatorPrey {
    /// Time horizon `T`
    pub horizon: f64,
    /// Unperturbed initial condition, also the box center
    pub center: Vec<f64>,
    /// Box half-width around `center`
    pub half_width: f64,
    /// Fixed model coefficients `[theta1, theta2, theta12, theta21]`
    pub theta: Vec<f64>,
    pub samples: usize,
    pub seed: Option<u64>,
}

impl Default for PredatorPrey {
    fn default() -> Self {
        PredatorPrey {
            horizon: 10.0,
            center: vec![0.5, 2.0],
            half_width: 0.2,
            theta: vec![1.0, 1.0, 1.0, 1.0],
            samples: 1000,
            seed: Some(42),
        }
    }
}

impl UseCase for PredatorPrey {
    fn name(&self) -> &str {
        "predator-prey"
    }

    fn samples(&self) -> usize {
        self.samples
    }

    fn domain(&self) -> ParameterDomain {
        ParameterDomain::hyper_box(self.center.clone(), self.half_width)
    }

    fn baseline(&self) -> InputVector {
        InputVector::new(self.center.clone())
    }

    fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig { seed: self.seed }
    }

    fn request(&self, input: &InputVector) -> Vec<f64> {
        let mut request = Vec::with_capacity(1 + input.dim() + self.theta.len());
        request.push(self.horizon);
        request.extend_from_slice(input.as_slice());
        request.extend_from_slice(&self.theta);
        request
    }

    fn validate(&self) -> Result<(), RunError> {
        if self.center.len() != 2 {
            return Err(RunError::Config(format!(
                "predator-prey: initial condition needs 2 values, got {}",
                self.center.len()
            )));
        }
        if self.theta.len() != 4 {
            return Err(RunError::Config(format!(
                "predator-prey: theta needs 4 coefficients, got {}",
                self.theta.len()
            )));
        }
        if !self.horizon.is_finite() || self.horizon <= 0.0 {
            return Err(RunError::Config(format!(
                "predator-prey: horizon must be positive, got {}",
                self.horizon
            )));
        }
        if self.samples == 0 {
            return Err(RunError::Config(
                "predator-prey: sample count must be at least 1".to_string(),
            ));
        }
        self.domain().validate()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// L2-Sea
// ---------------------------------------------------------------------------

/// Total resistance of the L2-Sea hull under uncertain Froude number and draft.
///
/// Request layout: `[Fr, D]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct L2Sea {
    /// Froude number range `[min, max)`
    pub froude: (f64, f64),
    /// Draft range `[min, max)`
    pub draft: (f64, f64),
    /// Reference `[Fr, D]`
    pub baseline: Vec<f64>,
    /// Results at or above this value are discarded; `None` disables filtering
    pub threshold: Option<f64>,
    pub samples: usize,
    pub seed: Option<u64>,
}

impl Default for L2Sea {
    fn default() -> Self {
        L2Sea {
            froude: (0.25, 0.41),
            draft: (-6.776, -5.544),
            baseline: vec![0.32, -6.2],
            threshold: Some(DEFAULT_OUTLIER_THRESHOLD),
            samples: 100,
            seed: None,
        }
    }
}

impl UseCase for L2Sea {
    fn name(&self) -> &str {
        "l2-sea"
    }

    fn samples(&self) -> usize {
        self.samples
    }

    fn domain(&self) -> ParameterDomain {
        ParameterDomain::intervals(vec![self.froude, self.draft])
    }

    fn baseline(&self) -> InputVector {
        InputVector::new(self.baseline.clone())
    }

    fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig { seed: self.seed }
    }

    fn request(&self, input: &InputVector) -> Vec<f64> {
        input.as_slice().to_vec()
    }

    fn filter(&self) -> Option<OutlierFilter> {
        self.threshold.map(OutlierFilter::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predator_prey_request_layout() {
        let pp = PredatorPrey {
            horizon: 5.0,
            theta: vec![0.1, 0.2, 0.3, 0.4],
            ..PredatorPrey::default()
        };
        let req = pp.request(&InputVector::new(vec![0.45, 2.1]));
        assert_eq!(req, vec![5.0, 0.45, 2.1, 0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_predator_prey_defaults() {
        let pp = PredatorPrey::default();
        assert_eq!(pp.baseline().as_slice(), &[0.5, 2.0]);
        assert_eq!(pp.domain(), ParameterDomain::hyper_box(vec![0.5, 2.0], 0.2));
        assert_eq!(pp.samples(), 1000);
        assert!(pp.sampler_config().seed.is_some());
        assert!(pp.filter().is_none());
        assert!(pp.validate().is_ok());
    }

    #[test]
    fn test_predator_prey_rejects_bad_theta() {
        let pp = PredatorPrey {
            theta: vec![1.0, 2.0],
            ..PredatorPrey::default()
        };
        assert!(matches!(pp.validate(), Err(RunError::Config(_))));
    }

    #[test]
    fn test_l2_sea_defaults() {
        let l2 = L2Sea::default();
        assert_eq!(l2.request(&InputVector::new(vec![0.32, -6.2])), vec![0.32, -6.2]);
        assert_eq!(l2.filter(), Some(OutlierFilter::new(1000.0)));
        assert_eq!(l2.sampler_config().seed, None);
        assert!(l2.validate().is_ok());
    }

    #[test]
    fn test_l2_sea_rejects_zero_samples() {
        let l2 = L2Sea {
            samples: 0,
            ..L2Sea::default()
        };
        assert!(l2.validate().is_err());
    }

    #[test]
    fn test_quantity_of_interest_is_first_output() {
        let l2 = L2Sea::default();
        assert_eq!(l2.quantity_of_interest(&[64.7470016, 1.0]), 64.7470016);
        assert!(l2.quantity_of_interest(&[]).is_nan());
    }
}
