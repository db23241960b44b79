//! JSON bodies exchanged with a model service.
//!
//! Field names follow the protocol's camelCase spelling on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version this client speaks.
pub const PROTOCOL_VERSION: f64 = 1.0;

/// `GET /Info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub protocol_version: f64,
    pub models: Vec<String>,
}

/// Body of `POST /InputSizes`, `/OutputSizes` and `/ModelInfo`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<&'a Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSizesResponse {
    pub input_sizes: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSizesResponse {
    pub output_sizes: Vec<usize>,
}

/// Which operations a model supports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Support {
    #[serde(default)]
    pub evaluate: bool,
    #[serde(default)]
    pub gradient: bool,
    #[serde(default)]
    pub apply_jacobian: bool,
    #[serde(default)]
    pub apply_hessian: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    #[serde(default)]
    pub support: Support,
}

/// `POST /Evaluate` request.
///
/// `input` is a batch of vectors; mcuq always sends exactly one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluateRequest<'a> {
    pub name: &'a str,
    pub input: [&'a [f64]; 1],
    pub config: &'a Value,
}

/// `POST /Evaluate` response: one output group per input vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub output: Vec<Vec<f64>>,
}

/// Error body a service returns instead of a regular response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}
