//! Monte Carlo run orchestration
//!
//! A run goes sampling → evaluation → estimation → baseline and either
//! completes with a [`McReport`] or aborts with the first [`RunError`].
//! Nothing is retried and nothing partial is reported.
//!
//! Evaluations are issued in sampling order. With `max_in_flight > 1` up to
//! that many requests are outstanding at once, but results are still
//! collected in sampling order, so the estimate does not depend on the
//! setting.

use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use mcuq_protocol::ModelClient;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::{Estimate, InputVector, SampleSet};
use crate::error::{Result, RunError};
use crate::estimator::{estimate, OutlierFilter};
use crate::obs;
use crate::sampler::Sampler;
use crate::usecase::UseCase;

/// Driver tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Maximum evaluations outstanding at once
    pub max_in_flight: usize,
    /// Whether the report carries every evaluated sample
    pub keep_samples: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            max_in_flight: 1,
            keep_samples: false,
        }
    }
}

/// Outcome of a completed Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McReport {
    pub run_id: String,
    pub use_case: String,
    pub endpoint: String,
    pub model: String,
    pub seed: Option<u64>,
    pub filter: Option<OutlierFilter>,
    pub estimate: Estimate,
    pub baseline_input: InputVector,
    pub baseline_output: Vec<f64>,
    /// Quantity of interest at the baseline input
    pub baseline_value: f64,
    /// SHA-256 over the little-endian bits of the retained results, in order
    pub outputs_digest: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<SampleSet>,
}

/// Runs use cases against one model client.
pub struct McDriver<C> {
    client: C,
    config: DriverConfig,
}

impl<C: ModelClient> McDriver<C> {
    pub fn new(client: C) -> Self {
        Self::with_config(client, DriverConfig::default())
    }

    pub fn with_config(client: C, config: DriverConfig) -> Self {
        McDriver { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Execute one complete Monte Carlo run for `use_case`.
    pub async fn run(&self, use_case: &dyn UseCase) -> Result<McReport> {
        let run_id = Uuid::new_v4().to_string();
        let span = obs::run_span(&run_id, use_case.name());

        let result = self.run_stages(&run_id, use_case).instrument(span.clone()).await;
        if let Err(err) = &result {
            let _entered = span.enter();
            obs::emit_run_failed(&run_id, err.stage(), err);
        }
        result
    }

    async fn run_stages(&self, run_id: &str, use_case: &dyn UseCase) -> Result<McReport> {
        if self.config.max_in_flight == 0 {
            return Err(RunError::Config(
                "max_in_flight must be at least 1".to_string(),
            ));
        }
        use_case.validate()?;

        let started = Instant::now();
        let started_at = Utc::now();

        let mut sampler = Sampler::new(use_case.sampler_config());
        obs::emit_run_started(
            run_id,
            self.client.endpoint(),
            self.client.model_name(),
            use_case.samples(),
            sampler.seed(),
        );

        let inputs = sampler.sample(&use_case.domain(), use_case.samples())?;
        let samples = self.evaluate_all(use_case, inputs).await?;

        let results: Vec<f64> = samples
            .iter()
            .map(|s| use_case.quantity_of_interest(&s.output))
            .collect();
        let filter = use_case.filter();
        let estimate = estimate(&results, filter.as_ref())?;
        obs::emit_estimate_computed(estimate.mean, estimate.retained, estimate.total);

        let baseline_input = use_case.baseline();
        let baseline_output = self
            .client
            .evaluate(&use_case.request(&baseline_input))
            .await
            .map_err(|source| RunError::Baseline {
                input: baseline_input.as_slice().to_vec(),
                source,
            })?;
        let baseline_value = use_case.quantity_of_interest(&baseline_output);
        obs::emit_baseline_evaluated(baseline_input.as_slice(), baseline_value);

        let outputs_digest = digest_retained(&results, filter.as_ref());
        obs::emit_run_finished(run_id, started.elapsed().as_millis() as u64, samples.len() + 1);

        Ok(McReport {
            run_id: run_id.to_string(),
            use_case: use_case.name().to_string(),
            endpoint: self.client.endpoint().to_string(),
            model: self.client.model_name().to_string(),
            seed: sampler.seed(),
            filter,
            estimate,
            baseline_input,
            baseline_output,
            baseline_value,
            outputs_digest,
            started_at,
            finished_at: Utc::now(),
            samples: self.config.keep_samples.then_some(samples),
        })
    }

    /// Evaluate every input in order, stopping at the first failure.
    pub async fn evaluate_all(
        &self,
        use_case: &dyn UseCase,
        inputs: Vec<InputVector>,
    ) -> Result<SampleSet> {
        let mut samples = SampleSet::with_capacity(inputs.len());

        let mut pending = stream::iter(inputs.into_iter().enumerate().map(|(index, input)| {
            let request = use_case.request(&input);
            async move {
                match self.client.evaluate(&request).await {
                    Ok(output) => Ok((input, output)),
                    Err(source) => Err(RunError::Evaluation {
                        index,
                        input: input.as_slice().to_vec(),
                        source,
                    }),
                }
            }
        }))
        .buffered(self.config.max_in_flight.max(1));

        while let Some(evaluated) = pending.next().await {
            let (input, output) = evaluated?;
            obs::emit_sample_evaluated(
                samples.len(),
                input.as_slice(),
                use_case.quantity_of_interest(&output),
            );
            samples.push(input, output);
        }
        Ok(samples)
    }
}

/// Fingerprint of the retained results for bit-exact regression comparison.
pub fn digest_retained(results: &[f64], filter: Option<&OutlierFilter>) -> String {
    let mut hasher = Sha256::new();
    for value in results
        .iter()
        .filter(|v| filter.map_or(true, |f| f.retains(**v)))
    {
        hasher.update(value.to_le_bytes());
    }
    hex::encode(hasher.finalize())
}
