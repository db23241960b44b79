//! Data model shared by the sampler, estimator and driver.

use serde::{Deserialize, Serialize};

use crate::error::SamplerError;

/// An ordered vector of uncertain model parameters.
///
/// The values are fixed at construction; only read access is exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputVector(Vec<f64>);

impl InputVector {
    pub fn new(values: Vec<f64>) -> Self {
        InputVector(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, k: usize) -> Option<f64> {
        self.0.get(k).copied()
    }
}

impl From<Vec<f64>> for InputVector {
    fn from(values: Vec<f64>) -> Self {
        InputVector(values)
    }
}

impl std::fmt::Display for InputVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Region the sampler draws input vectors from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterDomain {
    /// Symmetric hyper-box `center ± half_width` in every dimension.
    Box { center: Vec<f64>, half_width: f64 },
    /// Independent half-open interval `[min, max)` per dimension.
    Intervals { bounds: Vec<(f64, f64)> },
}

impl ParameterDomain {
    pub fn hyper_box(center: Vec<f64>, half_width: f64) -> Self {
        ParameterDomain::Box { center, half_width }
    }

    pub fn intervals(bounds: Vec<(f64, f64)>) -> Self {
        ParameterDomain::Intervals { bounds }
    }

    pub fn dim(&self) -> usize {
        match self {
            ParameterDomain::Box { center, .. } => center.len(),
            ParameterDomain::Intervals { bounds } => bounds.len(),
        }
    }

    /// Reject domains the sampler cannot draw from.
    pub fn validate(&self) -> Result<(), SamplerError> {
        let invalid = |reason: String| -> Result<(), SamplerError> {
            Err(SamplerError::InvalidDomain { reason })
        };
        match self {
            ParameterDomain::Box { center, half_width } => {
                if center.is_empty() {
                    return invalid("box domain has no dimensions".to_string());
                }
                if let Some(k) = center.iter().position(|c| !c.is_finite()) {
                    return invalid(format!("center[{}] is not finite", k));
                }
                if !half_width.is_finite() || *half_width < 0.0 {
                    return invalid(format!(
                        "half-width must be finite and non-negative, got {}",
                        half_width
                    ));
                }
            }
            ParameterDomain::Intervals { bounds } => {
                if bounds.is_empty() {
                    return invalid("interval domain has no dimensions".to_string());
                }
                for (k, (min, max)) in bounds.iter().enumerate() {
                    if !min.is_finite() || !max.is_finite() {
                        return invalid(format!("interval {} has a non-finite bound", k));
                    }
                    if min >= max {
                        return invalid(format!(
                            "interval {} is empty: [{}, {})",
                            k, min, max
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether `v` lies inside the domain.
    pub fn contains(&self, v: &InputVector) -> bool {
        if v.dim() != self.dim() {
            return false;
        }
        match self {
            ParameterDomain::Box { center, half_width } => center
                .iter()
                .zip(v.as_slice())
                .all(|(c, x)| (x - c).abs() <= *half_width),
            ParameterDomain::Intervals { bounds } => bounds
                .iter()
                .zip(v.as_slice())
                .all(|((min, max), x)| min <= x && x < max),
        }
    }
}

/// One evaluated sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Position in sampling order
    pub index: usize,
    pub input: InputVector,
    /// First output group returned by the model
    pub output: Vec<f64>,
}

/// Append-only collection of evaluated samples for a single run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    pub fn with_capacity(n: usize) -> Self {
        SampleSet {
            samples: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, input: InputVector, output: Vec<f64>) {
        let index = self.samples.len();
        self.samples.push(Sample {
            index,
            input,
            output,
        });
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Output element `k` of every sample, in sampling order.
    ///
    /// Samples whose output group is shorter than `k + 1` yield `NaN`, which
    /// the estimator rejects.
    pub fn outputs(&self, k: usize) -> Vec<f64> {
        self.samples
            .iter()
            .map(|s| s.output.get(k).copied().unwrap_or(f64::NAN))
            .collect()
    }
}

/// Monte Carlo mean estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Arithmetic mean of the retained results
    pub mean: f64,
    /// Results retained after filtering (M)
    pub retained: usize,
    /// Results offered to the estimator (N)
    pub total: usize,
    /// Standard error of the mean; `None` when fewer than two results remain
    pub std_error: Option<f64>,
}

impl Estimate {
    pub fn discarded(&self) -> usize {
        self.total - self.retained
    }
}
