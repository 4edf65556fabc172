//! Application configuration.
//!
//! Two layers, lowest priority first: built-in defaults, then environment
//! variables (`PROMPTBRUSH_*`). CLI flags override both — that merge happens
//! in `main`, which hands the finished [`AppConfig`] to the rest of the
//! service. Configuration is read once at startup and immutable after.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Development-only flash/session signing secret.
pub const DEV_SECRET: &str = "dev-secret-key-change-in-production";

/// Hard cap on the uploaded payload, matching the engine's assumptions.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("engine URL must start with http:// or https://, got '{0}'")]
    InvalidEngineUrl(String),
    #[error("listen host must not be empty")]
    EmptyHost,
}

/// Immutable service configuration.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    /// Listen host.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Root directory for the artifact store (`uploads/` and `output/` live
    /// under it).
    pub data_dir: PathBuf,
    /// Base URL of the inference sidecar.
    pub engine_url: String,
    /// Flash/session signing secret. Shipping the default is a deployment
    /// hazard; startup warns when it is still in place.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            data_dir: PathBuf::from("data"),
            engine_url: "http://127.0.0.1:5100".to_string(),
            secret: DEV_SECRET.to_string(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with any `PROMPTBRUSH_*` environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("PROMPTBRUSH_HOST") {
            cfg.host = host;
        }
        if let Some(port) = std::env::var("PROMPTBRUSH_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
        {
            cfg.port = port;
        }
        if let Ok(dir) = std::env::var("PROMPTBRUSH_DATA_DIR") {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Ok(url) = std::env::var("PROMPTBRUSH_ENGINE_URL") {
            cfg.engine_url = url;
        }
        if let Ok(secret) = std::env::var("PROMPTBRUSH_SECRET") {
            cfg.secret = secret;
        }
        cfg
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if !self.engine_url.starts_with("http://") && !self.engine_url.starts_with("https://") {
            return Err(ConfigError::InvalidEngineUrl(self.engine_url.clone()));
        }
        Ok(())
    }

    /// True while the development secret is still in place.
    pub fn secret_is_default(&self) -> bool {
        self.secret == DEV_SECRET
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
