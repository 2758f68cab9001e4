//! SQL schema for the movement ledger.
//!
//! Executed at connection startup and by the `create_tables` operation.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Dates are `YYYY-MM-DD` text so that lexical order is date order.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS transfert (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    date              TEXT NOT NULL,
    plate             TEXT NOT NULL,
    logistic_official TEXT NOT NULL,
    movement_number   TEXT NOT NULL,   -- not unique
    origin_depot      TEXT NOT NULL,
    destination_depot TEXT NOT NULL,
    transport_type    TEXT NOT NULL,
    reason            TEXT,
    photo_url         TEXT
);

CREATE TABLE IF NOT EXISTS stock_suivant (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    transfert_id INTEGER NOT NULL REFERENCES transfert(id) ON DELETE CASCADE,
    next_depot   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS livraison (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    date              TEXT NOT NULL,
    plate             TEXT NOT NULL,
    logistic_official TEXT NOT NULL,
    movement_number   TEXT NOT NULL,
    target_district   TEXT NOT NULL,
    origin_depot      TEXT NOT NULL,
    destination_depot TEXT NOT NULL,
    transport_type    TEXT NOT NULL,
    reason            TEXT,
    photo_url         TEXT
);

CREATE TABLE IF NOT EXISTS boucle (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    livraison_id INTEGER NOT NULL REFERENCES livraison(id) ON DELETE CASCADE,
    return_depot TEXT NOT NULL,
    input        TEXT NOT NULL,
    quantity     TEXT NOT NULL,
    district     TEXT NOT NULL,
    colline      TEXT NOT NULL
);

-- Both columns hold hex SHA-256 digests.
CREATE TABLE IF NOT EXISTS credentials (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    subject_hash TEXT NOT NULL,
    secret_hash  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS users (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

-- Lookup vocabularies: one row per (vocabulary, value).
CREATE TABLE IF NOT EXISTS reference_values (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    vocabulary TEXT NOT NULL,
    value      TEXT NOT NULL,
    UNIQUE (vocabulary, value)
);

CREATE TABLE IF NOT EXISTS collines (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    district TEXT NOT NULL,
    colline  TEXT NOT NULL,
    UNIQUE (district, colline)
);

CREATE INDEX IF NOT EXISTS transfert_date_idx     ON transfert(date);
CREATE INDEX IF NOT EXISTS livraison_date_idx     ON livraison(date);
CREATE INDEX IF NOT EXISTS stock_suivant_fk_idx   ON stock_suivant(transfert_id);
CREATE INDEX IF NOT EXISTS boucle_fk_idx          ON boucle(livraison_id);
CREATE INDEX IF NOT EXISTS credentials_subject_idx ON credentials(subject_hash);

PRAGMA user_version = 1;
";
