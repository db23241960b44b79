//! mcuq core library
//!
//! Monte Carlo uncertainty propagation through remote simulation models:
//! draw inputs from a parameter domain, evaluate each one through a
//! [`mcuq_protocol::ModelClient`], and average the scalar results.

pub mod config;
pub mod domain;
pub mod driver;
pub mod error;
pub mod estimator;
pub mod obs;
pub mod sampler;
pub mod telemetry;
pub mod usecase;

pub use config::{ConfigError, ModelSection, RunConfig};
pub use domain::{Estimate, InputVector, ParameterDomain, Sample, SampleSet};
pub use driver::{digest_retained, DriverConfig, McDriver, McReport};
pub use error::{EstimateError, Result, RunError, SamplerError};
pub use estimator::{estimate, OutlierFilter, DEFAULT_OUTLIER_THRESHOLD};
pub use sampler::{Sampler, SamplerConfig};
pub use telemetry::init_tracing;
pub use usecase::{L2Sea, PredatorPrey, UseCase};

pub use mcuq_protocol::{HttpModelClient, HttpModelConfig, ModelClient, ModelError};
