//! SQL schema for the Glossa SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    uid           TEXT NOT NULL UNIQUE,   -- username without dots, lower case
    username      TEXT NOT NULL UNIQUE,
    authority     TEXT NOT NULL,
    email         TEXT NOT NULL,
    email_key     TEXT NOT NULL UNIQUE,   -- email folded to lower case (Unicode)
    display_name  TEXT,
    admin         INTEGER NOT NULL DEFAULT 0,
    staff         INTEGER NOT NULL DEFAULT 0,
    registered_at TEXT NOT NULL           -- ISO 8601 UTC; server-assigned
);

-- Userid lookups bind username and authority separately against this index;
-- the 'acct:' string is never assembled inside a query.
CREATE INDEX IF NOT EXISTS users_userid_idx    ON users(username, authority);
CREATE INDEX IF NOT EXISTS users_authority_idx ON users(authority);

CREATE TABLE IF NOT EXISTS annotations (
    id               TEXT PRIMARY KEY,
    userid           TEXT NOT NULL,                 -- acct:<username>@<authority>
    created          TEXT NOT NULL,
    updated          TEXT NOT NULL,
    uri              TEXT NOT NULL,
    text             TEXT,
    references_json  TEXT NOT NULL DEFAULT '[]',    -- ancestor ids, root first
    permissions_json TEXT NOT NULL,
    document_json    TEXT                           -- NULL when no metadata
);

CREATE INDEX IF NOT EXISTS annotations_userid_idx ON annotations(userid);

-- No UNIQUE (target, type): duplicates are tolerated and the lowest id wins.
CREATE TABLE IF NOT EXISTS subscriptions (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    target TEXT NOT NULL,
    type   TEXT NOT NULL,
    active INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS subscriptions_target_idx ON subscriptions(target, type);

PRAGMA user_version = 1;
";
