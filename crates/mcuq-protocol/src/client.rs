//! The `ModelClient` seam between Monte Carlo drivers and model services.

use async_trait::async_trait;

use crate::Result;

/// A remote (or stubbed) model that maps one input vector to one output group.
///
/// Guarantees expected of implementations:
/// - `evaluate` issues at most one request to the service per call.
/// - The returned vector is the service's first output group, unmodified.
/// - Failures are reported as [`crate::ModelError`] carrying the endpoint,
///   the model name and the offending input vector.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Address of the service hosting the model.
    fn endpoint(&self) -> &str;

    /// Logical name of the model on that service.
    fn model_name(&self) -> &str;

    /// Evaluate the model on a single request vector.
    async fn evaluate(&self, input: &[f64]) -> Result<Vec<f64>>;
}

#[async_trait]
impl<T: ModelClient + ?Sized> ModelClient for std::sync::Arc<T> {
    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    async fn evaluate(&self, input: &[f64]) -> Result<Vec<f64>> {
        (**self).evaluate(input).await
    }
}
