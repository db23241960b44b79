//! mcuq-protocol: client side of the model-evaluation protocol
//!
//! Remote simulation models are served over a small HTTP/JSON protocol:
//! a service hosts one or more named models, each evaluated by posting a
//! batch of input vectors and receiving one output group per vector.
//!
//! This crate provides:
//! - [`ModelClient`]: the narrow evaluation seam drivers depend on
//! - [`HttpModelClient`]: the network implementation
//! - [`fakes`]: in-process stand-ins for tests

pub mod client;
pub mod error;
pub mod fakes;
pub mod http;
pub mod wire;

pub use client::ModelClient;
pub use error::{ErrorKind, ModelError};
pub use http::{HttpModelClient, HttpModelConfig};
pub use wire::{InfoResponse, Support, PROTOCOL_VERSION};

/// Result type for model-service operations
pub type Result<T> = std::result::Result<T, ModelError>;
