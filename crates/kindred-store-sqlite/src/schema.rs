//! SQL schema for the Kindred SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS profiles (
    profile_id     TEXT PRIMARY KEY,
    username       TEXT NOT NULL UNIQUE,
    first_name     TEXT NOT NULL,
    last_name      TEXT NOT NULL,
    birth_date     TEXT NOT NULL,              -- YYYY-MM-DD
    height         INTEGER,
    weight         INTEGER,
    photos         TEXT NOT NULL DEFAULT '[]', -- JSON array, display photo first
    country        TEXT,
    region         INTEGER,
    city           INTEGER,
    hair_color     INTEGER,
    eye_color      INTEGER,
    religion       INTEGER,
    marital_status INTEGER,
    smoking        INTEGER,
    drinking       INTEGER,
    languages      TEXT NOT NULL DEFAULT '[]', -- JSON array of codes
    last_online    TEXT                        -- RFC 3339 UTC
);

-- Written by the connection layer; the engine only reads it.
CREATE TABLE IF NOT EXISTS presence (
    username TEXT PRIMARY KEY,
    since    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS profiles_location_idx ON profiles(country, region, city);

PRAGMA user_version = 1;
";
