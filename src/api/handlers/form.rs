// src/api/handlers/form.rs
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::api::AppState;
use crate::controller::{FormController, KeyEvent, SAMPLE_BTN, UiEvent};
use crate::errors::PredictError;
use crate::layout::{build_page, ACTION_FIELD, ACTION_FILL_SAMPLE, ACTION_RESET};
use crate::page::Document;
use crate::predictor::HttpPredictionService;

/// Strips the port from a `Host` value, keeping bracketed IPv6 literals whole.
pub fn hostname_of(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    host.rsplit_once(':').map_or(host, |(name, _)| name)
}

/// A freshly built page for this request, with load-time behaviour applied.
async fn open_page(
    req: &HttpRequest,
    state: &AppState,
) -> Result<FormController<HttpPredictionService>, PredictError> {
    let hostname = hostname_of(req.connection_info().host()).to_string();
    let document = build_page(&state.schema, &hostname);
    let mut controller =
        FormController::attach(document, state.service.clone(), state.schema.clone())?;
    controller.dispatch(UiEvent::DomContentLoaded).await;
    Ok(controller)
}

fn page_response(document: &Document) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(document.to_html())
}

fn broken_page(e: PredictError) -> HttpResponse {
    log::error!("Could not build the prediction page: {}", e);
    HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
}

pub async fn show_form(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    match open_page(&req, &state).await {
        Ok(controller) => page_response(controller.document()),
        Err(e) => broken_page(e),
    }
}

/// Replays the posted values into a fresh page, then performs the button's
/// action: predict, reset, or fill in the sample data.
pub async fn submit_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<Vec<(String, String)>>,
) -> HttpResponse {
    let mut controller = match open_page(&req, &state).await {
        Ok(controller) => controller,
        Err(e) => return broken_page(e),
    };

    let mut action = String::new();
    for (name, value) in form.into_inner() {
        if name == ACTION_FIELD {
            action = value;
        } else if !controller.set_field_value(&name, &value) {
            log::debug!("Ignoring unknown form field '{}'", name);
        }
    }

    let event = match action.as_str() {
        ACTION_FILL_SAMPLE => UiEvent::Click {
            target: SAMPLE_BTN.to_string(),
        },
        ACTION_RESET => UiEvent::KeyDown(KeyEvent::new("Escape")),
        _ => UiEvent::Submit,
    };

    let dispatch = controller.dispatch(event).await;
    if let Some(outcome) = &dispatch.submission {
        log::info!(
            "Submission {} {}",
            outcome.id,
            if outcome.is_success() { "rendered a prediction" } else { "rendered an error" }
        );
    }

    page_response(controller.document())
}
