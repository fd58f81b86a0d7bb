// src/errors.rs
use thiserror::Error;

/// Fallback text shown when the backend gives no usable error message.
pub const GENERIC_FAILURE: &str = "Prediction failed";

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML schema: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("{0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx answer from the prediction backend. `message` is already the
    /// text meant for the user.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Required element '{0}' is missing from the page")]
    MissingElement(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PredictError {
    /// Text rendered into the error card for this failure.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        }
    }
}

pub type Result<T> = std::result::Result<T, PredictError>;
