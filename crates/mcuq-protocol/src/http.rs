//! HTTP model client
//!
//! Talks to a model service over the HTTP/JSON model-evaluation protocol.
//! A client is bound to one model on one service: [`HttpModelClient::connect`]
//! performs the handshake (`/Info`, `/InputSizes`, `/OutputSizes`,
//! `/ModelInfo`) and every later [`ModelClient::evaluate`] call sends a
//! single-vector batch to `/Evaluate`.

use crate::client::ModelClient;
use crate::error::ModelError;
use crate::wire::{
    ErrorResponse, EvaluateRequest, EvaluateResponse, InfoResponse, InputSizesResponse,
    ModelInfoResponse, ModelRequest, OutputSizesResponse, Support, PROTOCOL_VERSION,
};
use crate::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default service address when `MCUQ_MODEL_URL` is unset.
pub const DEFAULT_MODEL_URL: &str = "http://localhost:4242";
/// Default model name when `MCUQ_MODEL_NAME` is unset.
pub const DEFAULT_MODEL_NAME: &str = "forward";
/// Default per-request timeout when `MCUQ_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const ENV_MODEL_URL: &str = "MCUQ_MODEL_URL";
pub const ENV_MODEL_NAME: &str = "MCUQ_MODEL_NAME";
pub const ENV_TIMEOUT_SECS: &str = "MCUQ_TIMEOUT_SECS";

/// Connection settings for one model on one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpModelConfig {
    /// Service base URL
    pub base_url: String,
    /// Model name on that service
    pub model_name: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Opaque model configuration forwarded with every request
    pub config: Value,
}

impl Default for HttpModelConfig {
    fn default() -> Self {
        HttpModelConfig {
            base_url: std::env::var(ENV_MODEL_URL)
                .unwrap_or_else(|_| DEFAULT_MODEL_URL.to_string()),
            model_name: std::env::var(ENV_MODEL_NAME)
                .unwrap_or_else(|_| DEFAULT_MODEL_NAME.to_string()),
            timeout_secs: std::env::var(ENV_TIMEOUT_SECS)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            config: Value::Object(Default::default()),
        }
    }
}

impl HttpModelConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific service and model
    pub fn new(base_url: &str, model_name: &str) -> Self {
        HttpModelConfig {
            base_url: base_url.to_string(),
            model_name: model_name.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            config: Value::Object(Default::default()),
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the model configuration object sent with each request
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Client bound to a single model hosted by a protocol-speaking service.
#[derive(Debug, Clone)]
pub struct HttpModelClient {
    config: HttpModelConfig,
    http_client: reqwest::Client,
    input_sizes: Vec<usize>,
    output_sizes: Vec<usize>,
    support: Support,
}

impl HttpModelClient {
    /// Connect to the configured model and verify it can be evaluated.
    ///
    /// Fails with [`ModelError::UnknownModel`] when the service does not list
    /// the model, and with [`ModelError::Protocol`] when the model does not
    /// support evaluation.
    pub async fn connect(config: HttpModelConfig) -> Result<Self> {
        let http_client = build_http_client(config.timeout_secs)?;

        let info = get_info(&http_client, &config).await?;
        if info.protocol_version != PROTOCOL_VERSION {
            return Err(ModelError::UnsupportedProtocol {
                endpoint: config.base_url.clone(),
                version: info.protocol_version,
                expected: PROTOCOL_VERSION,
            });
        }
        if !info.models.iter().any(|m| m == &config.model_name) {
            warn!(
                "Model '{}' not found at {}; available: {:?}",
                config.model_name, config.base_url, info.models
            );
            return Err(ModelError::UnknownModel {
                endpoint: config.base_url.clone(),
                model: config.model_name.clone(),
                available: info.models,
            });
        }

        let mut client = HttpModelClient {
            config,
            http_client,
            input_sizes: Vec::new(),
            output_sizes: Vec::new(),
            support: Support::default(),
        };

        let request = ModelRequest {
            name: &client.config.model_name,
            config: Some(&client.config.config),
        };
        let inputs: InputSizesResponse = client.post_json("InputSizes", &request, None).await?;
        let outputs: OutputSizesResponse = client.post_json("OutputSizes", &request, None).await?;
        let model_info: ModelInfoResponse = client
            .post_json(
                "ModelInfo",
                &ModelRequest {
                    name: &client.config.model_name,
                    config: None,
                },
                None,
            )
            .await?;

        if !model_info.support.evaluate {
            return Err(client.protocol_error(None, "model does not support Evaluate".to_string()));
        }

        client.input_sizes = inputs.input_sizes;
        client.output_sizes = outputs.output_sizes;
        client.support = model_info.support;

        info!(
            "Connected to model '{}' at {} (input sizes {:?}, output sizes {:?})",
            client.config.model_name,
            client.config.base_url,
            client.input_sizes,
            client.output_sizes
        );
        Ok(client)
    }

    /// Query which models a service hosts, without binding to one.
    pub async fn fetch_info(base_url: &str, timeout_secs: u64) -> Result<InfoResponse> {
        let http_client = build_http_client(timeout_secs)?;
        let config = HttpModelConfig::new(base_url, "").with_timeout_secs(timeout_secs);
        get_info(&http_client, &config).await
    }

    /// Connection settings this client was built from
    pub fn config(&self) -> &HttpModelConfig {
        &self.config
    }

    /// Input sizes declared by the model
    pub fn input_sizes(&self) -> &[usize] {
        &self.input_sizes
    }

    /// Output sizes declared by the model
    pub fn output_sizes(&self) -> &[usize] {
        &self.output_sizes
    }

    /// Operations the model declared support for
    pub fn support(&self) -> &Support {
        &self.support
    }

    async fn post_json<B, R>(&self, path: &str, body: &B, input: Option<&[f64]>) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http_client
            .post(self.config.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| map_transport_error(&self.config, input, e))?;
        decode_response(&self.config, input, response).await
    }

    fn protocol_error(&self, input: Option<&[f64]>, reason: String) -> ModelError {
        ModelError::Protocol {
            endpoint: self.config.base_url.clone(),
            model: self.config.model_name.clone(),
            input: input.map(<[f64]>::to_vec),
            reason,
        }
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    fn endpoint(&self) -> &str {
        &self.config.base_url
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }

    async fn evaluate(&self, input: &[f64]) -> Result<Vec<f64>> {
        let expected: usize = self.input_sizes.iter().sum();
        if !self.input_sizes.is_empty() && input.len() != expected {
            return Err(self.protocol_error(
                Some(input),
                format!(
                    "request vector has {} values, model expects {}",
                    input.len(),
                    expected
                ),
            ));
        }

        let request = EvaluateRequest {
            name: &self.config.model_name,
            input: [input],
            config: &self.config.config,
        };
        let response: EvaluateResponse = self.post_json("Evaluate", &request, Some(input)).await?;

        if response.output.len() != 1 {
            return Err(self.protocol_error(
                Some(input),
                format!("expected 1 output group, got {}", response.output.len()),
            ));
        }
        let group = response.output.into_iter().next().unwrap_or_default();
        if group.is_empty() {
            return Err(self.protocol_error(Some(input), "empty output group".to_string()));
        }
        if let Some(&declared) = self.output_sizes.first() {
            if group.len() != declared {
                return Err(self.protocol_error(
                    Some(input),
                    format!(
                        "output group has {} values, model declared {}",
                        group.len(),
                        declared
                    ),
                ));
            }
        }

        debug!("Evaluated {:?} -> {:?}", input, group);
        Ok(group)
    }
}

fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("mcuq-protocol/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ModelError::Client(e.to_string()))
}

async fn get_info(http_client: &reqwest::Client, config: &HttpModelConfig) -> Result<InfoResponse> {
    debug!("Fetching service info from {}", config.base_url);
    let response = http_client
        .get(config.url("Info"))
        .send()
        .await
        .map_err(|e| map_transport_error(config, None, e))?;
    decode_response(config, None, response).await
}

async fn decode_response<R: DeserializeOwned>(
    config: &HttpModelConfig,
    input: Option<&[f64]>,
    response: reqwest::Response,
) -> Result<R> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| map_transport_error(config, input, e))?;

    if let Ok(err) = serde_json::from_slice::<ErrorResponse>(&body) {
        warn!(
            "Model '{}' returned {}: {}",
            config.model_name, err.error.error_type, err.error.message
        );
        return Err(ModelError::Remote {
            endpoint: config.base_url.clone(),
            model: config.model_name.clone(),
            input: input.map(<[f64]>::to_vec),
            error_type: err.error.error_type,
            message: err.error.message,
        });
    }

    if !status.is_success() {
        return Err(ModelError::Protocol {
            endpoint: config.base_url.clone(),
            model: config.model_name.clone(),
            input: input.map(<[f64]>::to_vec),
            reason: format!("HTTP status {}", status),
        });
    }

    serde_json::from_slice(&body).map_err(|e| ModelError::Protocol {
        endpoint: config.base_url.clone(),
        model: config.model_name.clone(),
        input: input.map(<[f64]>::to_vec),
        reason: format!("malformed response body: {}", e),
    })
}

fn map_transport_error(
    config: &HttpModelConfig,
    input: Option<&[f64]>,
    err: reqwest::Error,
) -> ModelError {
    if err.is_timeout() {
        ModelError::Timeout {
            endpoint: config.base_url.clone(),
            model: config.model_name.clone(),
            input: input.map(<[f64]>::to_vec),
            timeout_secs: config.timeout_secs as f64,
        }
    } else {
        ModelError::Connection {
            endpoint: config.base_url.clone(),
            model: config.model_name.clone(),
            input: input.map(<[f64]>::to_vec),
            reason: err.to_string(),
        }
    }
}
