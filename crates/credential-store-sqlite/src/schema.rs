//! SQL schema for the credential SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout; there are no migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per subject, written once and never updated or deleted.
-- The primary key on subject_id is what enforces single issuance.
CREATE TABLE IF NOT EXISTS credentials (
    subject_id      TEXT PRIMARY KEY,
    credential_id   TEXT NOT NULL UNIQUE,
    credential_type TEXT NOT NULL,
    issuer          TEXT NOT NULL,
    claims_json     TEXT NOT NULL DEFAULT '{}',
    issued_at       TEXT NOT NULL,   -- RFC 3339 UTC, fixed precision; server-assigned
    worker_id       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS credentials_issued_idx ON credentials(issued_at);

PRAGMA user_version = 1;
";
