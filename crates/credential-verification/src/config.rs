//! Runtime configuration for the verification server.
//!
//! Layered as built-in defaults, then an optional TOML file, then
//! `CREDENTIALS_*` environment variables.

use std::{path::Path, time::Duration};

use axum::http::{HeaderValue, Method, header, header::InvalidHeaderValue};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

/// Prefix for environment overrides, e.g. `CREDENTIALS_ISSUANCE_API_URL`.
pub const ENV_PREFIX: &str = "CREDENTIALS";

pub const DEFAULT_PORT: u16 = 3002;

#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
  pub host:                String,
  pub port:                u16,
  /// Base URL of the issuance service, without the `/api/issuance` prefix.
  pub issuance_api_url:    String,
  /// Upper bound on a single lookup against the issuance service.
  pub lookup_timeout_secs: u64,
  #[serde(default)]
  pub worker_id:           Option<String>,
  pub allowed_origin:      String,
}

impl VerificationConfig {
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", i64::from(DEFAULT_PORT))?
      .set_default("issuance_api_url", "http://localhost:3001")?
      .set_default("lookup_timeout_secs", 5_i64)?
      .set_default("allowed_origin", "http://localhost:5173")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()
  }

  pub fn lookup_timeout(&self) -> Duration {
    Duration::from_secs(self.lookup_timeout_secs)
  }

  pub fn cors_layer(&self) -> Result<CorsLayer, InvalidHeaderValue> {
    let origin = HeaderValue::from_str(&self.allowed_origin)?;
    Ok(
      CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]),
    )
  }
}
