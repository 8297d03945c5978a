//! SQL schema for the Verbandbuch SQLite store.
//!
//! Executed once at pool startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `AUTOINCREMENT` keeps ids from being reused after deletes.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accidents (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    name_verletzte_person TEXT NOT NULL,
    unfall_datum          TEXT NOT NULL,   -- yyyy-mm-dd
    unfall_uhrzeit        TEXT NOT NULL,   -- hh:mm
    ort                   TEXT NOT NULL,
    hergang               TEXT NOT NULL,
    art_der_verletzung    TEXT NOT NULL,
    zeugen                TEXT NOT NULL,
    erstehilfe_datum      TEXT NOT NULL,   -- yyyy-mm-dd
    erstehilfe_uhrzeit    TEXT NOT NULL,   -- hh:mm
    erstehilfe_massnahmen TEXT NOT NULL,
    ersthelfer_name       TEXT NOT NULL,
    bearbeiter_id         INTEGER,         -- external case handler, not modelled
    created_at            TEXT NOT NULL,   -- RFC 3339 UTC, fixed width; server-assigned
    updated_at            TEXT             -- NULL until first overwrite
);

CREATE INDEX IF NOT EXISTS accidents_created_idx ON accidents(created_at);

PRAGMA user_version = 1;
";

/// Per-connection pragmas. WAL only applies to file-backed databases.
pub fn connection_pragmas(busy_timeout_ms: u64, wal: bool) -> String {
  let journal = if wal { "PRAGMA journal_mode = WAL;" } else { "" };
  format!(
    "PRAGMA foreign_keys = ON;
     PRAGMA busy_timeout = {busy_timeout_ms};
     {journal}"
  )
}

/// The columns of an accident row, in the order [`crate::encode::RawAccident`]
/// reads them.
pub const COLUMNS: &str = "id, name_verletzte_person, unfall_datum, unfall_uhrzeit,
   ort, hergang, art_der_verletzung, zeugen,
   erstehilfe_datum, erstehilfe_uhrzeit, erstehilfe_massnahmen, ersthelfer_name,
   bearbeiter_id, created_at, updated_at";
