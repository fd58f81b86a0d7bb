// src/predictor/http.rs

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Instant;

use crate::config::BackendConfig;
use crate::errors::{GENERIC_FAILURE, PredictError, Result};
use crate::models::{BackendHealth, ErrorBody, PredictionResult};
use crate::payload::FormPayload;
use crate::predictor::PredictionService;

/// Talks to the prediction backend over HTTP.
#[derive(Clone)]
pub struct HttpPredictionService {
    client: Client,
    config: BackendConfig,
}

impl HttpPredictionService {
    pub fn new(client: Client, config: BackendConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    pub fn api_base(&self) -> &str {
        &self.config.api_base
    }
}

/// Turns the body of a failed call into the message shown to the user.
fn failure_message(body: &str) -> String {
    reported_error(body).unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

/// The body's `error` field, when present and non-empty.
fn reported_error(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.is_empty())
}

async fn failure_body(resp: reqwest::Response) -> String {
    match resp.text().await {
        Ok(body) => body,
        Err(e) => {
            log::debug!("Could not read error response body: {}", e);
            String::new()
        }
    }
}

impl PredictionService for HttpPredictionService {
    async fn predict(&self, payload: &FormPayload) -> Result<PredictionResult> {
        let url = self.url("predict");

        log::debug!("📡 POST {} with {} fields", url, payload.len());

        let mut request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(payload);
        if let Some(timeout) = self.config.timeout {
            request = request.timeout(timeout);
        }

        let start = Instant::now();
        let resp = request.send().await?;
        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        log::info!("📥 Prediction response status: {} ({}ms)", status, latency_ms);

        if !status.is_success() {
            let body = failure_body(resp).await;
            return Err(PredictError::Server {
                status: status.as_u16(),
                message: failure_message(&body),
            });
        }

        let body = resp.text().await?;
        if let Some(message) = reported_error(&body) {
            log::warn!("⚠️ Backend answered {} with an error: {}", status, message);
            return Err(PredictError::Server {
                status: status.as_u16(),
                message,
            });
        }
        let result: PredictionResult = serde_json::from_str(&body)?;
        Ok(result)
    }

    async fn health(&self) -> Result<BackendHealth> {
        let url = self.url("health");
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = failure_body(resp).await;
            return Err(PredictError::Server {
                status: status.as_u16(),
                message: failure_message(&body),
            });
        }

        Ok(resp.json::<BackendHealth>().await?)
    }
}
