//! Credential types. The credential is the single persisted entity of the system.
//!
//! A credential is issued to a subject exactly once and is never updated or
//! deleted afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Opaque, order-preserving claim payload. Stored verbatim; the only
/// requirement is that it is JSON-serialisable.
pub type Claims = serde_json::Map<String, serde_json::Value>;

// ─── Credential ──────────────────────────────────────────────────────────────

/// An issued credential as stored and as returned by the lookup endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
  pub credential_id:   String,
  #[serde(rename = "type")]
  pub credential_type: String,
  pub issuer:          String,
  /// Natural key: at most one credential exists per subject.
  pub subject_id:      String,
  #[serde(default)]
  pub claims:          Claims,
  /// Store-assigned timestamp; never accepted from callers.
  pub issued_at:       DateTime<Utc>,
  /// The worker that performed the issuance.
  pub worker_id:       String,
}

// ─── IssueRequest ────────────────────────────────────────────────────────────

/// The raw issuance body. Every field is optional here so that missing
/// fields are reported through [`IssueRequest::validate`] rather than as a
/// deserialisation failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
  #[serde(rename = "type")]
  pub credential_type: Option<String>,
  pub issuer:          Option<String>,
  pub subject_id:      Option<String>,
  pub claims:          Option<Claims>,
  pub credential_id:   Option<String>,
}

impl IssueRequest {
  /// Check the required fields and build a [`NewCredential`].
  ///
  /// A missing or blank `credentialId` is replaced with a fresh UUID.
  pub fn validate(self) -> Result<NewCredential> {
    let (Some(credential_type), Some(issuer), Some(subject_id)) = (
      non_blank(self.credential_type),
      non_blank(self.issuer),
      non_blank(self.subject_id),
    ) else {
      return Err(Error::MissingRequiredFields);
    };

    let credential_id = non_blank(self.credential_id)
      .unwrap_or_else(|| Uuid::new_v4().to_string());

    Ok(NewCredential {
      credential_id,
      credential_type,
      issuer,
      subject_id,
      claims: self.claims.unwrap_or_default(),
    })
  }
}

fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty())
}

// ─── NewCredential ───────────────────────────────────────────────────────────

/// Validated input to [`crate::store::CredentialStore::insert`].
/// `issued_at` is set by the store and the worker by the caller of `insert`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCredential {
  pub credential_id:   String,
  pub credential_type: String,
  pub issuer:          String,
  pub subject_id:      String,
  pub claims:          Claims,
}

impl NewCredential {
  /// Convenience constructor with a generated id and no claims.
  ///
  /// Public API for callers that write to a store directly, without going
  /// through [`IssueRequest::validate`] (tests, seeding tools).
  pub fn new(
    credential_type: impl Into<String>,
    issuer: impl Into<String>,
    subject_id: impl Into<String>,
  ) -> Self {
    Self {
      credential_id:   Uuid::new_v4().to_string(),
      credential_type: credential_type.into(),
      issuer:          issuer.into(),
      subject_id:      subject_id.into(),
      claims:          Claims::new(),
    }
  }

  /// Attach the store timestamp and worker to produce the persisted form.
  pub fn into_credential(
    self,
    issued_at: DateTime<Utc>,
    worker_id: impl Into<String>,
  ) -> Credential {
    Credential {
      credential_id: self.credential_id,
      credential_type: self.credential_type,
      issuer: self.issuer,
      subject_id: self.subject_id,
      claims: self.claims,
      issued_at,
      worker_id: worker_id.into(),
    }
  }
}
