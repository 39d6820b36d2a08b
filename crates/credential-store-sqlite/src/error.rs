//! Error type for `credential-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The subject row vanished between the conflicting insert and the read
  /// of the existing record. Only possible if rows are deleted out of band.
  #[error("credential for subject {0:?} disappeared during insert")]
  MissingAfterConflict(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
