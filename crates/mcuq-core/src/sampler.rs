//! Input sampling over a parameter domain.
//!
//! Draw order is sample-major: for each of the `count` samples, one uniform
//! variate is consumed per dimension, in dimension order. With a fixed seed
//! the produced sequence is therefore a pure function of `(seed, domain, count)`.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{InputVector, ParameterDomain};
use crate::error::SamplerError;

/// Seeding policy for a sampler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Fixed seed for reproducible runs; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl SamplerConfig {
    pub fn seeded(seed: u64) -> Self {
        SamplerConfig { seed: Some(seed) }
    }

    pub fn unseeded() -> Self {
        SamplerConfig { seed: None }
    }
}

/// Draws independent input vectors from a [`ParameterDomain`].
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: StdRng,
    seed: Option<u64>,
}

impl Sampler {
    pub fn new(config: SamplerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => {
                warn!("Sampler is unseeded; this run will not be reproducible");
                StdRng::from_entropy()
            }
        };
        Sampler {
            rng,
            seed: config.seed,
        }
    }

    /// The seed this sampler was created with, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Draw exactly `count` independent vectors from `domain`.
    pub fn sample(
        &mut self,
        domain: &ParameterDomain,
        count: usize,
    ) -> Result<Vec<InputVector>, SamplerError> {
        domain.validate()?;
        debug!("Drawing {} samples from {}-dimensional domain", count, domain.dim());

        let draws = match domain {
            ParameterDomain::Box { center, half_width } => (0..count)
                .map(|_| {
                    center
                        .iter()
                        .map(|c| {
                            let u: f64 = self.rng.gen();
                            c + half_width * (2.0 * u - 1.0)
                        })
                        .collect::<Vec<f64>>()
                })
                .map(InputVector::new)
                .collect(),
            ParameterDomain::Intervals { bounds } => {
                let dists: Vec<Uniform<f64>> = bounds
                    .iter()
                    .map(|(min, max)| Uniform::new(*min, *max))
                    .collect();
                (0..count)
                    .map(|_| {
                        dists
                            .iter()
                            .map(|d| d.sample(&mut self.rng))
                            .collect::<Vec<f64>>()
                    })
                    .map(InputVector::new)
                    .collect()
            }
        };
        Ok(draws)
    }
}
