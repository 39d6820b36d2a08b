//! Handler for `POST /verify`.
//!
//! One lookup against the issuance service per request; no caching and no
//! retry. The outcome is one of verified (200), not found (404) or
//! unavailable (503).

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use credential_core::{credential::Credential, worker::WorkerId};
use serde::{Deserialize, Serialize};

use crate::{AppState, client::CredentialLookup, error::ApiError};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
  pub subject_id: Option<String>,
}

/// The definite answers a verification can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
  Verified {
    credential:  Credential,
    verified_by: String,
  },
  NotFound {
    verified_by: String,
  },
}

/// Look `subject_id` up through `lookup` on behalf of `worker`.
pub async fn verify_subject<L>(
  lookup: &L,
  worker: &WorkerId,
  subject_id: Option<&str>,
) -> Result<Verification, ApiError>
where
  L: CredentialLookup,
{
  let subject_id = subject_id
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .ok_or_else(|| ApiError::BadRequest("Subject ID is required".to_owned()))?;

  let verified_by = worker.to_string();
  Ok(match lookup.lookup(subject_id).await? {
    Some(credential) => Verification::Verified { credential, verified_by },
    None => Verification::NotFound { verified_by },
  })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifiedBody {
  verified:    bool,
  #[serde(flatten)]
  credential:  Credential,
  verified_by: String,
  message:     String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NotFoundBody {
  verified:    bool,
  message:     &'static str,
  verified_by: String,
}

impl IntoResponse for Verification {
  fn into_response(self) -> Response {
    match self {
      Verification::Verified { credential, verified_by } => {
        let message = format!("Credential verified by {verified_by}");
        Json(VerifiedBody { verified: true, credential, verified_by, message })
          .into_response()
      }
      Verification::NotFound { verified_by } => (
        StatusCode::NOT_FOUND,
        Json(NotFoundBody {
          verified: false,
          message: "Credential not found",
          verified_by,
        }),
      )
        .into_response(),
    }
  }
}

/// `POST /verify`, body: `{"subjectId":"..."}`
pub async fn handler<L>(
  State(state): State<AppState<L>>,
  body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Verification, ApiError>
where
  L: CredentialLookup + Clone + Send + Sync + 'static,
{
  let Json(request) = body?;
  let verification =
    verify_subject(&*state.lookup, &state.worker, request.subject_id.as_deref())
      .await?;

  if let Verification::Verified { credential, .. } = &verification {
    tracing::info!(
      subject_id = %credential.subject_id,
      credential_id = %credential.credential_id,
      "credential verified"
    );
  }
  Ok(verification)
}
