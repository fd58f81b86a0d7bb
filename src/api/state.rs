// src/api/state.rs
use crate::config::AppConfig;
use crate::errors::Result;
use crate::predictor::HttpPredictionService;
use crate::schema::FormSchema;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub schema: Arc<FormSchema>,
    pub service: HttpPredictionService,
}

impl AppState {
    /// Loads the form schema named in the config, or the built-in one.
    pub fn new(config: AppConfig) -> Result<Self> {
        let schema = match &config.schema_path {
            Some(path) => {
                log::info!("Loading form schema from {}", path.display());
                FormSchema::load(path)?
            }
            None => FormSchema::builtin(),
        };
        Ok(Self::with_schema(config, schema))
    }

    pub fn with_schema(config: AppConfig, schema: FormSchema) -> Self {
        let service = HttpPredictionService::new(Client::new(), config.backend.clone());
        Self {
            config: Arc::new(config),
            schema: Arc::new(schema),
            service,
        }
    }
}
