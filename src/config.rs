// src/config.rs
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{PredictError, Result};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Where the prediction backend lives.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub api_base: String,
    /// `None` waits for the backend indefinitely.
    pub timeout: Option<Duration>,
}

/// High-level application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub bind_addr: String,
    pub port: u16,
    /// TOML file replacing the built-in form schema.
    pub schema_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests never touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = lookup("PREDICT_API_BASE")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
            return Err(PredictError::Config(format!(
                "PREDICT_API_BASE must be an http(s) URL, got '{}'",
                api_base
            )));
        }

        let timeout = match lookup("PREDICT_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    PredictError::Config(format!("PREDICT_TIMEOUT_SECS is not a number: '{}'", raw))
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        let bind_addr = lookup("PREDICT_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let port = match lookup("PREDICT_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                PredictError::Config(format!("PREDICT_PORT is not a valid port: '{}'", raw))
            })?,
            None => DEFAULT_PORT,
        };

        let schema_path = lookup("PREDICT_FORM_SCHEMA")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(AppConfig {
            backend: BackendConfig { api_base, timeout },
            bind_addr,
            port,
            schema_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.backend.api_base, DEFAULT_API_BASE);
        assert_eq!(config.backend.timeout, None);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.schema_path.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PREDICT_API_BASE", "https://ml.internal:9000"),
            ("PREDICT_TIMEOUT_SECS", "30"),
            ("PREDICT_BIND_ADDR", "127.0.0.1"),
            ("PREDICT_PORT", "3000"),
            ("PREDICT_FORM_SCHEMA", "form.toml"),
        ]))
        .unwrap();
        assert_eq!(config.backend.api_base, "https://ml.internal:9000");
        assert_eq!(config.backend.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.schema_path, Some(PathBuf::from("form.toml")));
    }

    #[test]
    fn zero_timeout_means_no_timeout() {
        let config = AppConfig::from_lookup(lookup(&[("PREDICT_TIMEOUT_SECS", "0")])).unwrap();
        assert_eq!(config.backend.timeout, None);
    }

    #[test]
    fn rejects_bad_port() {
        let err = AppConfig::from_lookup(lookup(&[("PREDICT_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, PredictError::Config(msg) if msg.contains("PREDICT_PORT")));
    }

    #[test]
    fn rejects_non_http_api_base() {
        assert!(AppConfig::from_lookup(lookup(&[("PREDICT_API_BASE", "ftp://x")])).is_err());
    }
}
