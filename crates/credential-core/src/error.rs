//! Error types for `credential-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// One or more of `type`, `issuer` or `subjectId` is absent or blank.
  ///
  /// The message always names all three fields; clients match on it.
  #[error("Missing required fields: type, issuer, subject")]
  MissingRequiredFields,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
