//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::client::LookupError;

/// An error returned by the verify handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  /// The issuance service could not give a definite answer. Network
  /// failures, timeouts, unexpected statuses and undecodable bodies all land
  /// here.
  #[error("issuance service unavailable: {0}")]
  Unavailable(#[from] LookupError),
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::BadRequest(message) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
          .into_response()
      }
      ApiError::Unavailable(e) => {
        tracing::error!(error = %e, "error calling issuance service");
        (
          StatusCode::SERVICE_UNAVAILABLE,
          Json(json!({
            "error": "Issuance service unavailable",
            "verified": false,
          })),
        )
          .into_response()
      }
    }
  }
}
