// src/api/handlers/health.rs
use actix_web::{web, HttpResponse, Result};
use serde_json::json;

use crate::api::AppState;
use crate::predictor::PredictionService;

/// Reports this service and whether the prediction backend answers.
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let backend = match state.service.health().await {
        Ok(health) => json!({
            "reachable": true,
            "status": health.status,
            "model_loaded": health.model_loaded,
        }),
        Err(e) => {
            log::warn!("Prediction backend health check failed: {}", e);
            json!({
                "reachable": false,
                "error": e.to_string(),
            })
        }
    };

    Ok(HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "holiday-predict",
        "version": env!("CARGO_PKG_VERSION"),
        "checked_at": chrono::Utc::now().to_rfc3339(),
        "api_base": state.service.api_base(),
        "backend": backend,
    })))
}
