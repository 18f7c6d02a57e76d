//! SQL schema for the Pinpoint SQLite store.
//!
//! Executed on every open. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per known token. Tokens first seen through a report get a row with
-- no label and no expiry.
CREATE TABLE IF NOT EXISTS links (
    token       TEXT PRIMARY KEY,
    label       TEXT,
    created_at  TEXT NOT NULL,   -- ISO 8601 UTC
    expires_at  TEXT             -- ISO 8601 UTC; informational only
);

-- Reports are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table; id is arrival order.
CREATE TABLE IF NOT EXISTS reports (
    id                INTEGER PRIMARY KEY,
    token             TEXT NOT NULL,
    timestamp         TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    latitude          REAL NOT NULL,
    longitude         REAL NOT NULL,
    accuracy          REAL,
    source_address    TEXT,
    client_timestamp  TEXT,            -- as claimed by the browser
    heading           REAL,
    speed             REAL,
    user_agent        TEXT
);

CREATE INDEX IF NOT EXISTS reports_token_idx ON reports(token);

PRAGMA user_version = 1;
";
