//! The `CredentialStore` trait.
//!
//! Implemented by storage backends (e.g. `credential-store-sqlite`). The
//! issuance service depends on this abstraction, not on a concrete backend.

use std::future::Future;

use crate::{
  credential::{Credential, NewCredential},
  worker::WorkerId,
};

/// Result of [`CredentialStore::insert`].
#[derive(Debug, Clone, PartialEq)]
pub enum Insertion {
  /// The record was written; carries the persisted form.
  Inserted(Credential),
  /// The subject already had a credential. Carries the existing record;
  /// nothing was written.
  AlreadyIssued(Credential),
}

/// Abstraction over a durable credential store keyed by subject.
///
/// The store itself enforces "at most one credential per subject". Every
/// method performs exactly one round trip to the backing storage; there is no
/// caching layer.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CredentialStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return the credential issued to `subject_id`, if any.
  fn find_by_subject<'a>(
    &'a self,
    subject_id: &'a str,
  ) -> impl Future<Output = Result<Option<Credential>, Self::Error>> + Send + 'a;

  /// Persist `input` on behalf of `worker`. The `issued_at` timestamp is set
  /// by the store.
  ///
  /// A subject that already has a credential yields
  /// [`Insertion::AlreadyIssued`] rather than an error, even when the
  /// competing write landed after the caller's own existence check.
  fn insert<'a>(
    &'a self,
    input: NewCredential,
    worker: &'a WorkerId,
  ) -> impl Future<Output = Result<Insertion, Self::Error>> + Send + 'a;

  /// All credentials, newest `issued_at` first.
  fn list_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Credential>, Self::Error>> + Send + '_;
}
