//! In-process model fakes (testing only)
//!
//! Provides `FnModel`, `FixedModel` and `FailingModel`, which satisfy the
//! [`ModelClient`] contract without a network service.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::ModelClient;
use crate::error::ModelError;
use crate::Result;

const FAKE_ENDPOINT: &str = "memory://fake";

// ---------------------------------------------------------------------------
// FnModel
// ---------------------------------------------------------------------------

/// Deterministic model backed by a closure. Records every request it sees.
pub struct FnModel<F> {
    name: String,
    func: F,
    calls: Mutex<Vec<Vec<f64>>>,
}

impl<F> FnModel<F>
where
    F: Fn(&[f64]) -> Vec<f64> + Send + Sync,
{
    pub fn new(name: &str, func: F) -> Self {
        Self {
            name: name.to_string(),
            func,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in arrival order.
    pub fn calls(&self) -> Vec<Vec<f64>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl<F> ModelClient for FnModel<F>
where
    F: Fn(&[f64]) -> Vec<f64> + Send + Sync,
{
    fn endpoint(&self) -> &str {
        FAKE_ENDPOINT
    }

    fn model_name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.calls.lock().unwrap().push(input.to_vec());
        Ok((self.func)(input))
    }
}

// ---------------------------------------------------------------------------
// FixedModel
// ---------------------------------------------------------------------------

/// Model that returns the same output group for every request.
#[derive(Debug, Clone)]
pub struct FixedModel {
    name: String,
    output: Vec<f64>,
}

impl FixedModel {
    pub fn new(name: &str, output: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            output,
        }
    }
}

#[async_trait]
impl ModelClient for FixedModel {
    fn endpoint(&self) -> &str {
        FAKE_ENDPOINT
    }

    fn model_name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, _input: &[f64]) -> Result<Vec<f64>> {
        Ok(self.output.clone())
    }
}

// ---------------------------------------------------------------------------
// FailingModel
// ---------------------------------------------------------------------------

/// Model that succeeds with a constant output until the `fail_at`-th call
/// (zero-based), which fails with a protocol error.
#[derive(Debug)]
pub struct FailingModel {
    name: String,
    fail_at: usize,
    output: f64,
    calls: Mutex<usize>,
}

impl FailingModel {
    pub fn new(name: &str, fail_at: usize, output: f64) -> Self {
        Self {
            name: name.to_string(),
            fail_at,
            output,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ModelClient for FailingModel {
    fn endpoint(&self) -> &str {
        FAKE_ENDPOINT
    }

    fn model_name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, input: &[f64]) -> Result<Vec<f64>> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let call = *calls;
            *calls += 1;
            call
        };
        if call == self.fail_at {
            return Err(ModelError::Protocol {
                endpoint: FAKE_ENDPOINT.to_string(),
                model: self.name.clone(),
                input: Some(input.to_vec()),
                reason: format!("injected failure on call {}", call),
            });
        }
        Ok(vec![self.output])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fn_model_records_calls_in_order() {
        let model = FnModel::new("sum", |x: &[f64]| vec![x.iter().sum::<f64>()]);
        assert_eq!(model.evaluate(&[1.0, 2.0]).await.unwrap(), vec![3.0]);
        assert_eq!(model.evaluate(&[4.0]).await.unwrap(), vec![4.0]);
        assert_eq!(model.calls(), vec![vec![1.0, 2.0], vec![4.0]]);
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_model_fails_once_at_index() {
        let model = FailingModel::new("flaky", 1, 7.0);
        assert!(model.evaluate(&[0.0]).await.is_ok());
        let err = model.evaluate(&[0.5]).await.unwrap_err();
        assert_eq!(err.input(), Some(&[0.5][..]));
        assert!(model.evaluate(&[1.0]).await.is_ok());
        assert_eq!(model.call_count(), 3);
    }
}
