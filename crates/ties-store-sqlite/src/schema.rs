//! SQL schema for the Ties SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Only `relations` is a real record table owned by this subsystem;
/// `partners` mirrors host contact records, and the selection/view layers
/// are derived at query time, never stored.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Mirror of host contact records: just the fields validation reads.
CREATE TABLE IF NOT EXISTS partners (
    partner_id TEXT PRIMARY KEY,
    kind       TEXT NOT NULL,   -- 'organisation' | 'individual'
    categories TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS relation_types (
    type_id            TEXT PRIMARY KEY,
    name               TEXT NOT NULL,
    name_inverse       TEXT NOT NULL,
    contact_kind_left  TEXT,    -- NULL = unrestricted
    contact_kind_right TEXT,
    category_left      TEXT,    -- NULL = unrestricted
    category_right     TEXT,
    allow_self         INTEGER NOT NULL DEFAULT 0,
    is_symmetric       INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS relations (
    relation_id      TEXT PRIMARY KEY,
    left_partner_id  TEXT NOT NULL REFERENCES partners(partner_id) ON DELETE CASCADE,
    right_partner_id TEXT NOT NULL REFERENCES partners(partner_id) ON DELETE CASCADE,
    type_id          TEXT NOT NULL REFERENCES relation_types(type_id),
    date_start       TEXT,      -- ISO 8601 date; NULL = unbounded
    date_end         TEXT,
    active           INTEGER NOT NULL DEFAULT 1
);

-- The overlap check filters on exactly this triple.
CREATE INDEX IF NOT EXISTS relations_triple_idx
    ON relations(type_id, left_partner_id, right_partner_id);
CREATE INDEX IF NOT EXISTS relations_left_idx  ON relations(left_partner_id);
CREATE INDEX IF NOT EXISTS relations_right_idx ON relations(right_partner_id);

PRAGMA user_version = 1;
";
