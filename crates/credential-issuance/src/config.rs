//! Runtime configuration for the issuance server.
//!
//! Layered as built-in defaults, then an optional TOML file, then
//! `CREDENTIALS_*` environment variables.

use std::path::{Path, PathBuf};

use axum::http::{HeaderValue, Method, header, header::InvalidHeaderValue};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

/// Prefix for environment overrides, e.g. `CREDENTIALS_PORT=4001`.
pub const ENV_PREFIX: &str = "CREDENTIALS";

pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone, Deserialize)]
pub struct IssuanceConfig {
  pub host:           String,
  pub port:           u16,
  /// SQLite file holding the credentials table.
  pub store_path:     PathBuf,
  /// Overrides the pid-derived worker identity.
  #[serde(default)]
  pub worker_id:      Option<String>,
  /// The single browser origin allowed to call the API.
  pub allowed_origin: String,
}

impl IssuanceConfig {
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", i64::from(DEFAULT_PORT))?
      .set_default("store_path", "data/issuance.db")?
      .set_default("allowed_origin", "http://localhost:5173")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()
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
