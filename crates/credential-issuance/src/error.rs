//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error returned by an issuance handler.
///
/// Store failures are logged in full but answered with a fixed message;
/// storage details never reach the client.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  NotFound(String),

  #[error("store read failed: {0}")]
  StoreRead(#[source] BoxError),

  #[error("store write failed: {0}")]
  StoreWrite(#[source] BoxError),
}

impl ApiError {
  pub fn store_read(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::StoreRead(Box::new(e))
  }

  pub fn store_write(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::StoreWrite(Box::new(e))
  }
}

impl From<credential_core::Error> for ApiError {
  fn from(e: credential_core::Error) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::StoreRead(_) => {
        tracing::error!(error = %self, "credential lookup failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_owned())
      }
      ApiError::StoreWrite(_) => {
        tracing::error!(error = %self, "credential insert failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "Failed to issue credential".to_owned(),
        )
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
