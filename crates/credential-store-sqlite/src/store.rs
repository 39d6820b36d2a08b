//! [`SqliteStore`], the SQLite implementation of [`CredentialStore`].

use std::path::Path;

use chrono::{SubsecRound as _, Utc};
use credential_core::{
  credential::{Credential, NewCredential},
  store::{CredentialStore, Insertion},
  worker::WorkerId,
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{COLUMNS, RawCredential},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A credential store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::info!(path = %path.display(), "opened credential store");
    Ok(store)
  }

  /// Open an in-memory store for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CredentialStore impl ────────────────────────────────────────────────────

impl CredentialStore for SqliteStore {
  type Error = Error;

  async fn find_by_subject(&self, subject_id: &str) -> Result<Option<Credential>> {
    let subject_id = subject_id.to_owned();

    let raw: Option<RawCredential> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {COLUMNS} FROM credentials WHERE subject_id = ?1"),
            rusqlite::params![subject_id],
            RawCredential::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCredential::into_credential).transpose()
  }

  async fn insert(&self, input: NewCredential, worker: &WorkerId) -> Result<Insertion> {
    // Truncated to the stored precision so the returned record equals the row.
    let issued_at = Utc::now().trunc_subsecs(6);
    let credential = input.into_credential(issued_at, worker.as_str());
    let row = RawCredential::encode(&credential)?;

    // `None` when our row went in; otherwise the row that was already there.
    let existing: Option<Option<RawCredential>> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO credentials (
             credential_id, credential_type, issuer, subject_id,
             claims_json, issued_at, worker_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT(subject_id) DO NOTHING",
          rusqlite::params![
            row.credential_id,
            row.credential_type,
            row.issuer,
            row.subject_id,
            row.claims_json,
            row.issued_at,
            row.worker_id,
          ],
        )?;

        if inserted == 1 {
          return Ok(None);
        }

        let current = conn
          .query_row(
            &format!("SELECT {COLUMNS} FROM credentials WHERE subject_id = ?1"),
            rusqlite::params![row.subject_id],
            RawCredential::from_row,
          )
          .optional()?;
        Ok(Some(current))
      })
      .await?;

    match existing {
      None => Ok(Insertion::Inserted(credential)),
      Some(Some(raw)) => Ok(Insertion::AlreadyIssued(raw.into_credential()?)),
      Some(None) => Err(Error::MissingAfterConflict(credential.subject_id)),
    }
  }

  async fn list_all(&self) -> Result<Vec<Credential>> {
    let raws: Vec<RawCredential> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COLUMNS} FROM credentials
           ORDER BY issued_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([], RawCredential::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCredential::into_credential).collect()
  }
}
