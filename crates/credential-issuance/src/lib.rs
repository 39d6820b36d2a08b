//! Credential issuance service.
//!
//! Exposes an axum [`Router`] backed by any [`CredentialStore`]. Issuance is
//! idempotent per subject: the first request for a subject writes a
//! credential, every later one gets the existing record back with a 409.
//!
//! CORS, tracing and transport are added by the binary.

pub mod config;
pub mod credentials;
pub mod error;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::State,
  routing::{get, post},
};
use credential_core::{store::CredentialStore, worker::WorkerId};
use serde::Serialize;

/// Name reported by `/health` and used to derive the default worker id.
pub const SERVICE_NAME: &str = "issuance-service";

/// Path prefix under which every issuance route is mounted.
pub const API_PREFIX: &str = "/api/issuance";

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: CredentialStore> {
  pub store:  Arc<S>,
  /// Identity of this process, stamped on every credential it issues.
  pub worker: Arc<WorkerId>,
}

impl<S: CredentialStore> AppState<S> {
  pub fn new(store: S, worker: WorkerId) -> Self {
    Self { store: Arc::new(store), worker: Arc::new(worker) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the issuance [`Router`], with every route under [`API_PREFIX`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CredentialStore + Clone + Send + Sync + 'static,
{
  let api = Router::new()
    .route("/health", get(health::<S>))
    .route("/issue", post(credentials::issue::<S>))
    .route("/credentials", get(credentials::list::<S>))
    .route("/credentials/{subject_id}", get(credentials::get_one::<S>))
    .with_state(state);

  Router::new().nest(API_PREFIX, api)
}

// ─── Health ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse {
  pub status:  &'static str,
  pub service: &'static str,
  pub worker:  String,
}

/// `GET /health`
async fn health<S>(State(state): State<AppState<S>>) -> Json<HealthResponse>
where
  S: CredentialStore + Clone + Send + Sync + 'static,
{
  Json(HealthResponse {
    status:  "healthy",
    service: SERVICE_NAME,
    worker:  state.worker.to_string(),
  })
}

// ─── Tests ────────────────────────────────────────────────────────────────────
