// src/models.rs
use serde::{Deserialize, Serialize};

/// Class probabilities returned by the backend, each in `0..=1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Probability {
    pub take_package: f64,
    pub not_take_package: f64,
}

/// Successful `/predict` answer, consumed as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// `1` means the customer is expected to buy.
    pub prediction: i64,
    pub message: String,
    /// Percentage in `0..=100`.
    pub confidence: f64,
    pub probability: Probability,
}

/// Body shape of a failed `/predict` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Answer of the backend's `/health` route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendHealth {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
}
