// src/predictor/mod.rs

use crate::errors::Result;
use crate::models::{BackendHealth, PredictionResult};
use crate::payload::FormPayload;

pub mod http;

pub use http::HttpPredictionService;

/// The external classifier the form submits to.
pub trait PredictionService: Send + Sync {
    /// Sends one payload and returns the parsed classification.
    ///
    /// A non-2xx answer must surface as [`crate::errors::PredictError::Server`]
    /// carrying the text the user should see.
    fn predict(&self, payload: &FormPayload) -> impl std::future::Future<Output = Result<PredictionResult>> + Send;

    /// Probes the backend's own health route.
    fn health(&self) -> impl std::future::Future<Output = Result<BackendHealth>> + Send;
}
