//! Run configuration loaded from TOML.
//!
//! Every field is optional; anything missing falls back to the built-in
//! defaults. Model connection settings are then overridden by the
//! `MCUQ_MODEL_URL`, `MCUQ_MODEL_NAME` and `MCUQ_TIMEOUT_SECS` environment
//! variables, and finally by command-line flags in the binary.
//!
//! ```toml
//! [model]
//! url = "http://localhost:4242"
//! name = "forward"
//! timeout_secs = 30
//!
//! [driver]
//! max_in_flight = 1
//!
//! [predator_prey]
//! samples = 1000
//! seed = 42
//!
//! [l2_sea]
//! threshold = 1000.0
//! ```

use std::path::{Path, PathBuf};

use mcuq_protocol::http::{
    DEFAULT_MODEL_NAME, DEFAULT_MODEL_URL, DEFAULT_TIMEOUT_SECS, ENV_MODEL_NAME, ENV_MODEL_URL,
    ENV_TIMEOUT_SECS,
};
use mcuq_protocol::HttpModelConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::driver::DriverConfig;
use crate::error::RunError;
use crate::usecase::{L2Sea, PredatorPrey, UseCase};

/// Errors loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// `[model]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    pub url: Option<String>,
    pub name: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Opaque model configuration forwarded with every request
    pub config: Option<Value>,
}

/// Complete run configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub model: ModelSection,
    pub driver: DriverConfig,
    pub predator_prey: PredatorPrey,
    pub l2_sea: L2Sea,
}

impl RunConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RunConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration held in memory.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section for values a run would reject.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.driver.max_in_flight == 0 {
            return Err(ConfigError::Invalid(
                "driver.max_in_flight must be at least 1".to_string(),
            ));
        }
        if self.model.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "model.timeout_secs must be at least 1".to_string(),
            ));
        }
        let invalid = |e: RunError| ConfigError::Invalid(e.to_string());
        self.predator_prey.validate().map_err(invalid)?;
        self.l2_sea.validate().map_err(invalid)?;
        Ok(())
    }

    /// Model connection settings: file values overridden by the process environment.
    pub fn model_config(&self) -> HttpModelConfig {
        self.model_config_with_env(|key| std::env::var(key).ok())
    }

    /// Model connection settings with an explicit environment lookup.
    pub fn model_config_with_env<F>(&self, env: F) -> HttpModelConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = env(ENV_MODEL_URL)
            .or_else(|| self.model.url.clone())
            .unwrap_or_else(|| DEFAULT_MODEL_URL.to_string());
        let name = env(ENV_MODEL_NAME)
            .or_else(|| self.model.name.clone())
            .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string());
        let timeout = env(ENV_TIMEOUT_SECS)
            .and_then(|s| s.parse().ok())
            .or(self.model.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let mut config = HttpModelConfig::new(&url, &name).with_timeout_secs(timeout);
        if let Some(model_config) = &self.model.config {
            config = config.with_config(model_config.clone());
        }
        config
    }
}
