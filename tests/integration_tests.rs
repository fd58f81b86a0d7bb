// tests/integration_tests.rs
use actix_web::http::StatusCode;
use actix_web::{test, web, App, HttpRequest, HttpResponse, HttpServer};
use holiday_predict::api::{configure_routes, AppState};
use holiday_predict::config::{AppConfig, BackendConfig};
use holiday_predict::controller::{FormController, Rendered, SubmitState, UiEvent};
use holiday_predict::errors::PredictError;
use holiday_predict::layout::build_page;
use holiday_predict::payload::FormPayload;
use holiday_predict::predictor::{HttpPredictionService, PredictionService};
use holiday_predict::render::WILL_PURCHASE;
use holiday_predict::schema::FormSchema;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

type Received = Arc<Mutex<Vec<(Option<String>, Value)>>>;

#[derive(Clone)]
struct MockBackend {
    status: u16,
    body: String,
    received: Received,
}

async fn mock_predict(req: HttpRequest, backend: web::Data<MockBackend>, body: web::Bytes) -> HttpResponse {
    let content_type = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let payload = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    backend.received.lock().unwrap().push((content_type, payload));

    HttpResponse::build(StatusCode::from_u16(backend.status).unwrap())
        .content_type("application/json")
        .body(backend.body.clone())
}

async fn mock_health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "healthy", "model_loaded": true }))
}

/// Starts a fake prediction backend answering every `/predict` call with the
/// given status and body.
fn spawn_backend(status: u16, body: &str) -> (String, Received) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let backend = MockBackend {
        status,
        body: body.to_string(),
        received: received.clone(),
    };

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(backend.clone()))
            .route("/predict", web::post().to(mock_predict))
            .route("/health", web::get().to(mock_health))
    })
    .workers(1)
    .listen(listener)
    .unwrap()
    .run();
    actix_rt::spawn(server);

    (format!("http://127.0.0.1:{}", port), received)
}

/// An address nothing listens on.
fn dead_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn success_body() -> String {
    json!({
        "prediction": 1,
        "message": "Customer will likely TAKE the holiday package!",
        "confidence": 87.3,
        "probability": { "take_package": 0.873, "not_take_package": 0.127 }
    })
    .to_string()
}

fn backend_config(api_base: &str) -> BackendConfig {
    BackendConfig {
        api_base: api_base.to_string(),
        timeout: None,
    }
}

fn service(api_base: &str) -> HttpPredictionService {
    HttpPredictionService::new(reqwest::Client::new(), backend_config(api_base))
}

fn app_state(api_base: &str) -> AppState {
    let config = AppConfig {
        backend: backend_config(api_base),
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        schema_path: None,
    };
    AppState::with_schema(config, FormSchema::builtin())
}

fn sample_form() -> Vec<(String, String)> {
    FormSchema::builtin().sample.into_iter().collect()
}

#[actix_rt::test]
async fn posts_typed_json_to_predict() {
    let (api_base, received) = spawn_backend(200, &success_body());
    let schema = FormSchema::builtin();
    let payload = FormPayload::from_entries(
        [("Age", "35"), ("Gender", "Male"), ("MonthlyIncome", "n/a")],
        &schema,
    );

    let result = service(&api_base).predict(&payload).await.unwrap();
    assert_eq!(result.prediction, 1);
    assert_eq!(result.probability.take_package, 0.873);

    let received = received.lock().unwrap();
    let (content_type, body) = &received[0];
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(body, &json!({ "Age": 35, "Gender": "Male", "MonthlyIncome": 0 }));
}

#[actix_rt::test]
async fn client_error_carries_server_message() {
    let (api_base, _) = spawn_backend(400, r#"{"error":"Invalid age"}"#);
    let err = service(&api_base)
        .predict(&FormPayload::default())
        .await
        .unwrap_err();
    match err {
        PredictError::Server { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid age");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[actix_rt::test]
async fn error_field_in_success_reply_is_shown_to_user() {
    let (api_base, _) = spawn_backend(200, r#"{"error":"Model not loaded properly"}"#);
    let err = service(&api_base)
        .predict(&FormPayload::default())
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Model not loaded properly");
    assert!(matches!(err, PredictError::Server { status: 200, .. }));

    let schema = Arc::new(FormSchema::builtin());
    let page = build_page(&schema, "example.com");
    let mut controller = FormController::attach(page, service(&api_base), schema).unwrap();
    let Rendered::Error(view) = controller.submit().await.rendered else {
        panic!("expected an error card");
    };
    assert_eq!(view.message, "Model not loaded properly");
}

#[actix_rt::test]
async fn server_error_without_body_uses_generic_message() {
    let (api_base, _) = spawn_backend(500, "");
    let err = service(&api_base)
        .predict(&FormPayload::default())
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Prediction failed");
}

#[actix_rt::test]
async fn malformed_success_body_is_a_parse_error() {
    let (api_base, _) = spawn_backend(200, "not json");
    let err = service(&api_base)
        .predict(&FormPayload::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PredictError::JsonParse(_)));
    assert!(!err.user_message().is_empty());
}

#[actix_rt::test]
async fn controller_renders_backend_failure_and_releases_busy_state() {
    let (api_base, _) = spawn_backend(500, "");
    let schema = Arc::new(FormSchema::builtin());
    let page = build_page(&schema, "example.com");
    let mut controller = FormController::attach(page, service(&api_base), schema).unwrap();

    let dispatch = controller.dispatch(UiEvent::Submit).await;
    let outcome = dispatch.submission.unwrap();
    match outcome.rendered {
        Rendered::Error(view) => assert_eq!(view.message, "Prediction failed"),
        other => panic!("expected an error card, got {other:?}"),
    }
    assert_eq!(controller.state(), SubmitState::Idle);
    assert!(!controller.is_spinner_visible());
    assert!(controller.is_results_visible());
}

#[actix_rt::test]
async fn controller_renders_network_failure() {
    let schema = Arc::new(FormSchema::builtin());
    let page = build_page(&schema, "example.com");
    let mut controller = FormController::attach(page, service(&dead_backend()), schema).unwrap();

    let outcome = controller.submit().await;
    assert!(!outcome.is_success());
    let Rendered::Error(view) = outcome.rendered else {
        panic!("expected an error card");
    };
    assert!(!view.message.is_empty());
    assert_eq!(controller.state(), SubmitState::Idle);
    assert!(!controller.is_spinner_visible());
}

#[actix_rt::test]
async fn controller_sends_whole_form() {
    let (api_base, received) = spawn_backend(200, &success_body());
    let schema = Arc::new(FormSchema::builtin());
    let page = build_page(&schema, "example.com");
    let mut controller = FormController::attach(page, service(&api_base), schema.clone()).unwrap();
    for (name, value) in sample_form() {
        controller.set_field_value(&name, &value);
    }

    let outcome = controller.submit().await;
    assert!(outcome.is_success());

    let received = received.lock().unwrap();
    let body = received[0].1.as_object().unwrap();
    assert_eq!(body.len(), 18);
    assert_eq!(body["Age"], json!(35));
    assert_eq!(body["CityTier"], json!(1));
    assert_eq!(body["Passport"], json!(1));
    assert_eq!(body["TypeofContact"], json!("Self Enquiry"));
    assert_eq!(body["ProductPitched"], json!("Deluxe"));
}

#[actix_rt::test]
async fn get_renders_the_form_page() {
    let (api_base, _) = spawn_backend(200, &success_body());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&api_base)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header(("host", "predict.example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();

    assert!(html.contains("id=\"predictionForm\""));
    assert!(html.contains("id=\"predictBtn\""));
    assert!(html.contains("title=\"How long was the sales pitch in minutes?\""));
    assert!(html.contains("fade-in"));
    assert!(!html.contains("Fill Sample Data"));
}

#[actix_rt::test]
async fn localhost_page_offers_sample_data() {
    let (api_base, _) = spawn_backend(200, &success_body());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&api_base)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/")
        .insert_header(("host", "localhost:8080"))
        .set_form(vec![("action", "fill-sample")])
        .to_request();
    let html = String::from_utf8(test::call_and_read_body(&app, req).await.to_vec()).unwrap();

    assert!(html.contains("Fill Sample Data"));
    assert!(html.contains("id=\"Age\" name=\"Age\""));
    assert!(html.contains("value=\"25000\""));
    assert!(html.contains("<option value=\"Deluxe\" selected>Deluxe</option>"));
}

#[actix_rt::test]
async fn post_submits_and_renders_prediction() {
    let (api_base, received) = spawn_backend(200, &success_body());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&api_base)))
            .configure(configure_routes),
    )
    .await;

    let mut form = sample_form();
    form.push(("action".to_string(), "predict".to_string()));
    let req = test::TestRequest::post()
        .uri("/")
        .insert_header(("host", "predict.example.com"))
        .set_form(form)
        .to_request();
    let html = String::from_utf8(test::call_and_read_body(&app, req).await.to_vec()).unwrap();

    assert!(html.contains("prediction-result positive"));
    assert!(html.contains("Customer will likely TAKE the holiday package!"));
    assert!(html.contains("Confidence: <strong>87.3%</strong>"));
    assert!(html.contains(WILL_PURCHASE));
    assert!(html.contains("Won&#39;t Purchase"));
    assert!(html.contains("12.7%"));
    assert!(html.contains("class=\"results-section\""));
    assert!(!html.contains(" disabled"));

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].1.get("action").is_none());
}

#[actix_rt::test]
async fn post_renders_backend_error() {
    let (api_base, _) = spawn_backend(400, r#"{"error":"Invalid age"}"#);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&api_base)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/")
        .set_form(vec![("Age", "-3"), ("action", "predict")])
        .to_request();
    let html = String::from_utf8(test::call_and_read_body(&app, req).await.to_vec()).unwrap();

    assert!(html.contains("prediction-result error"));
    assert!(html.contains("Error: Invalid age"));
    assert!(html.contains("Please check your input and try again."));
}

#[actix_rt::test]
async fn reset_action_clears_posted_values() {
    let (api_base, received) = spawn_backend(200, &success_body());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&api_base)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/")
        .set_form(vec![("MonthlyIncome", "31337"), ("action", "reset")])
        .to_request();
    let html = String::from_utf8(test::call_and_read_body(&app, req).await.to_vec()).unwrap();

    assert!(!html.contains("31337"));
    assert!(html.contains("class=\"results-section hidden\""));
    assert!(received.lock().unwrap().is_empty());
}

#[actix_rt::test]
async fn health_reports_backend_status() {
    let (api_base, _) = spawn_backend(200, &success_body());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&api_base)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"]["reachable"], true);
    assert_eq!(body["backend"]["model_loaded"], true);
}

#[actix_rt::test]
async fn health_reports_unreachable_backend() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&dead_backend())))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"]["reachable"], false);
    assert!(body["backend"]["error"].is_string());
}
