//! Error types for mcuq-protocol

use thiserror::Error;

/// Coarse classification of a [`ModelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service could not be reached, or does not host the requested model.
    Connection,
    /// The service answered, but not with what the request called for.
    Protocol,
}

/// Errors raised while talking to a model service.
///
/// Every variant raised by an evaluation carries the endpoint and model name,
/// and the input vector when one was being evaluated, so a failed run can be
/// traced back to the sample that triggered it.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Endpoint unreachable or the connection dropped mid-request
    #[error("cannot reach model '{model}' at {endpoint}: {reason}{}", fmt_input(.input))]
    Connection {
        endpoint: String,
        model: String,
        input: Option<Vec<f64>>,
        reason: String,
    },

    /// The service is reachable but does not host the named model
    #[error("model '{model}' is not served at {endpoint} (available: {available:?})")]
    UnknownModel {
        endpoint: String,
        model: String,
        available: Vec<String>,
    },

    /// The service speaks a protocol version this client does not understand
    #[error("unsupported protocol version {version} at {endpoint} (expected {expected})")]
    UnsupportedProtocol {
        endpoint: String,
        version: f64,
        expected: f64,
    },

    /// The per-request timeout fired
    #[error("request to model '{model}' at {endpoint} timed out after {timeout_secs}s{}", fmt_input(.input))]
    Timeout {
        endpoint: String,
        model: String,
        input: Option<Vec<f64>>,
        timeout_secs: f64,
    },

    /// Request or response shape inconsistent with the protocol contract
    #[error("protocol error from model '{model}' at {endpoint}: {reason}{}", fmt_input(.input))]
    Protocol {
        endpoint: String,
        model: String,
        input: Option<Vec<f64>>,
        reason: String,
    },

    /// The service reported an error of its own
    #[error("model '{model}' at {endpoint} reported {error_type}: {message}{}", fmt_input(.input))]
    Remote {
        endpoint: String,
        model: String,
        input: Option<Vec<f64>>,
        error_type: String,
        message: String,
    },

    /// The local HTTP client could not be constructed
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

fn fmt_input(input: &Option<Vec<f64>>) -> String {
    match input {
        Some(v) => format!(" (input {:?})", v),
        None => String::new(),
    }
}

impl ModelError {
    /// Classify this error as a connection-level or protocol-level failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::Connection { .. }
            | ModelError::UnknownModel { .. }
            | ModelError::Timeout { .. }
            | ModelError::Client(_) => ErrorKind::Connection,
            ModelError::UnsupportedProtocol { .. }
            | ModelError::Protocol { .. }
            | ModelError::Remote { .. } => ErrorKind::Protocol,
        }
    }

    /// The input vector that was being evaluated, if any.
    pub fn input(&self) -> Option<&[f64]> {
        match self {
            ModelError::Connection { input, .. }
            | ModelError::Timeout { input, .. }
            | ModelError::Protocol { input, .. }
            | ModelError::Remote { input, .. } => input.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let conn = ModelError::Connection {
            endpoint: "http://localhost:4242".into(),
            model: "forward".into(),
            input: None,
            reason: "refused".into(),
        };
        assert_eq!(conn.kind(), ErrorKind::Connection);

        let unknown = ModelError::UnknownModel {
            endpoint: "http://localhost:4242".into(),
            model: "nope".into(),
            available: vec!["forward".into()],
        };
        assert_eq!(unknown.kind(), ErrorKind::Connection);

        let remote = ModelError::Remote {
            endpoint: "http://localhost:4242".into(),
            model: "forward".into(),
            input: Some(vec![0.3, -6.0]),
            error_type: "InvalidInput".into(),
            message: "Fr out of range".into(),
        };
        assert_eq!(remote.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn test_message_names_endpoint_model_and_input() {
        let err = ModelError::Protocol {
            endpoint: "http://hull:4242".into(),
            model: "forward".into(),
            input: Some(vec![0.32, -6.2]),
            reason: "expected 1 output group, got 0".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("http://hull:4242"));
        assert!(msg.contains("'forward'"));
        assert!(msg.contains("[0.32, -6.2]"));
        assert_eq!(err.input(), Some(&[0.32, -6.2][..]));
    }
}
