//! Lookup of issued credentials in the issuance service.

use std::{future::Future, time::Duration};

use credential_core::credential::Credential;
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;

/// Why a lookup could not produce an answer. Every variant is treated the
/// same by the verify handler; they exist for logging.
#[derive(Debug, Error)]
pub enum LookupError {
  #[error("invalid issuance service URL {0:?}")]
  InvalidUrl(String),

  #[error("issuance request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("issuance service answered {0}")]
  UnexpectedStatus(StatusCode),
}

/// Source of issued credentials, keyed by subject.
pub trait CredentialLookup: Send + Sync {
  /// `Ok(None)` means the issuer positively reported that the subject has no
  /// credential. Anything short of a definite answer is an error.
  fn lookup<'a>(
    &'a self,
    subject_id: &'a str,
  ) -> impl Future<Output = Result<Option<Credential>, LookupError>> + Send + 'a;
}

/// HTTP client for `GET /api/issuance/credentials/{subject_id}`.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct IssuanceClient {
  client:   Client,
  base_url: Url,
}

impl IssuanceClient {
  /// `timeout` bounds the whole request, connect through body.
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LookupError> {
    let base_url = Url::parse(base_url)
      .ok()
      .filter(|u| !u.cannot_be_a_base())
      .ok_or_else(|| LookupError::InvalidUrl(base_url.to_owned()))?;
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base_url })
  }

  /// The lookup URL for `subject_id`, which is encoded as one path segment.
  pub fn credential_url(&self, subject_id: &str) -> Url {
    let mut url = self.base_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
      segments
        .pop_if_empty()
        .extend(["api", "issuance", "credentials", subject_id]);
    }
    url
  }
}

impl CredentialLookup for IssuanceClient {
  async fn lookup(&self, subject_id: &str) -> Result<Option<Credential>, LookupError> {
    let resp = self.client.get(self.credential_url(subject_id)).send().await?;

    match resp.status() {
      StatusCode::NOT_FOUND => Ok(None),
      status if status.is_success() => Ok(Some(resp.json().await?)),
      status => Err(LookupError::UnexpectedStatus(status)),
    }
  }
}
