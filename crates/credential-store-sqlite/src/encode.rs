//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings with a fixed microsecond precision and a
//! `Z` suffix, so that ordering the column lexically orders it in time.
//! Claims are stored as compact JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use credential_core::credential::{Claims, Credential};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Claims ──────────────────────────────────────────────────────────────────

pub fn encode_claims(claims: &Claims) -> Result<String> {
  Ok(serde_json::to_string(claims)?)
}

pub fn decode_claims(s: &str) -> Result<Claims> { Ok(serde_json::from_str(s)?) }

// ─── Row type ────────────────────────────────────────────────────────────────

/// Column list matching [`RawCredential::from_row`].
pub const COLUMNS: &str = "credential_id, credential_type, issuer, subject_id, \
                           claims_json, issued_at, worker_id";

/// Raw strings read from, or about to be written to, a `credentials` row.
pub struct RawCredential {
  pub credential_id:   String,
  pub credential_type: String,
  pub issuer:          String,
  pub subject_id:      String,
  pub claims_json:     String,
  pub issued_at:       String,
  pub worker_id:       String,
}

impl RawCredential {
  pub fn encode(c: &Credential) -> Result<Self> {
    Ok(Self {
      credential_id:   c.credential_id.clone(),
      credential_type: c.credential_type.clone(),
      issuer:          c.issuer.clone(),
      subject_id:      c.subject_id.clone(),
      claims_json:     encode_claims(&c.claims)?,
      issued_at:       encode_dt(c.issued_at),
      worker_id:       c.worker_id.clone(),
    })
  }

  /// Read a row selected with [`COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      credential_id:   row.get(0)?,
      credential_type: row.get(1)?,
      issuer:          row.get(2)?,
      subject_id:      row.get(3)?,
      claims_json:     row.get(4)?,
      issued_at:       row.get(5)?,
      worker_id:       row.get(6)?,
    })
  }

  pub fn into_credential(self) -> Result<Credential> {
    Ok(Credential {
      credential_id:   self.credential_id,
      credential_type: self.credential_type,
      issuer:          self.issuer,
      subject_id:      self.subject_id,
      claims:          decode_claims(&self.claims_json)?,
      issued_at:       decode_dt(&self.issued_at)?,
      worker_id:       self.worker_id,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 9, 59, 59).unwrap();
    let later = earlier + chrono::Duration::microseconds(1_500_000);

    let (a, b) = (encode_dt(earlier), encode_dt(later));
    assert_eq!(a, "2024-01-01T09:59:59.000000Z");
    assert!(a < b);
    assert_eq!(decode_dt(&b).unwrap(), later);
  }

  #[test]
  fn decode_dt_rejects_garbage() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
