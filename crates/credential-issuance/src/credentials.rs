//! Handlers for the credential endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/issue` | Body: [`IssueRequest`]; 201 on issue, 409 + existing record on repeat |
//! | `GET`  | `/credentials` | All credentials, newest first |
//! | `GET`  | `/credentials/{subject_id}` | 404 if the subject has no credential |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use credential_core::{
  credential::{Credential, IssueRequest},
  store::{CredentialStore, Insertion},
  worker::WorkerId,
};
use serde::Serialize;

use crate::{AppState, error::ApiError};

// ─── Issue ────────────────────────────────────────────────────────────────────

/// What an issuance attempt amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueOutcome {
  /// A new credential was written.
  Issued(Credential),
  /// The subject already had this credential; the request payload was
  /// discarded.
  AlreadyIssued(Credential),
}

/// Issue a credential for the subject named in `request`, unless one exists.
///
/// The existence check and the insert are separate round trips. A concurrent
/// issuance that wins between them is reported by the store as
/// [`Insertion::AlreadyIssued`] and becomes the same conflict outcome as a
/// plain repeat.
pub async fn issue_credential<S>(
  store: &S,
  worker: &WorkerId,
  request: IssueRequest,
) -> Result<IssueOutcome, ApiError>
where
  S: CredentialStore,
{
  let input = request.validate()?;

  if let Some(existing) = store
    .find_by_subject(&input.subject_id)
    .await
    .map_err(ApiError::store_read)?
  {
    return Ok(IssueOutcome::AlreadyIssued(existing));
  }

  match store.insert(input, worker).await.map_err(ApiError::store_write)? {
    Insertion::Inserted(credential) => Ok(IssueOutcome::Issued(credential)),
    Insertion::AlreadyIssued(existing) => {
      tracing::debug!(
        subject_id = %existing.subject_id,
        "lost issuance race; reporting existing credential"
      );
      Ok(IssueOutcome::AlreadyIssued(existing))
    }
  }
}

/// Body of both the 201 and the 409 responses to `POST /issue`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
  pub message:       &'static str,
  pub credential_id: String,
  pub subject_id:    String,
  pub issued_at:     DateTime<Utc>,
  pub worker_id:     String,
}

impl IssueResponse {
  fn new(message: &'static str, credential: Credential) -> Self {
    Self {
      message,
      credential_id: credential.credential_id,
      subject_id: credential.subject_id,
      issued_at: credential.issued_at,
      worker_id: credential.worker_id,
    }
  }
}

impl IntoResponse for IssueOutcome {
  fn into_response(self) -> Response {
    match self {
      IssueOutcome::Issued(c) => (
        StatusCode::CREATED,
        Json(IssueResponse::new("Credential issued successfully", c)),
      )
        .into_response(),
      IssueOutcome::AlreadyIssued(c) => (
        StatusCode::CONFLICT,
        Json(IssueResponse::new("Credential already issued", c)),
      )
        .into_response(),
    }
  }
}

/// `POST /issue`
pub async fn issue<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<IssueRequest>, JsonRejection>,
) -> Result<IssueOutcome, ApiError>
where
  S: CredentialStore + Clone + Send + Sync + 'static,
{
  let Json(request) = body?;
  let outcome = issue_credential(&*state.store, &state.worker, request).await?;

  match &outcome {
    IssueOutcome::Issued(c) => tracing::info!(
      subject_id = %c.subject_id,
      credential_id = %c.credential_id,
      "credential issued"
    ),
    IssueOutcome::AlreadyIssued(c) => tracing::info!(
      subject_id = %c.subject_id,
      credential_id = %c.credential_id,
      "credential already issued"
    ),
  }
  Ok(outcome)
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /credentials/{subject_id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(subject_id): Path<String>,
) -> Result<Json<Credential>, ApiError>
where
  S: CredentialStore + Clone + Send + Sync + 'static,
{
  let credential = state
    .store
    .find_by_subject(&subject_id)
    .await
    .map_err(ApiError::store_read)?
    .ok_or_else(|| ApiError::NotFound("Credential not found".to_owned()))?;
  Ok(Json(credential))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /credentials`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Credential>>, ApiError>
where
  S: CredentialStore + Clone + Send + Sync + 'static,
{
  let credentials = state.store.list_all().await.map_err(ApiError::store_read)?;
  Ok(Json(credentials))
}
