//! Database schema migrations for SQLite.
//!
//! A simple versioned migration system: each migration transforms the
//! schema from version N to N+1 inside one transaction.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema. Idempotent.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        )",
        [],
    )?;

    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;
            tx.execute(
                "INSERT INTO schema_migrations (version) VALUES (?1)",
                rusqlite::params![version],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Messages table: one row per signed message
        CREATE TABLE messages (
            session_id      TEXT    NOT NULL,
            seq             INTEGER NOT NULL,
            timestamp       TEXT    NOT NULL,   -- producer-claimed RFC 3339, untrusted
            role            TEXT    NOT NULL,
            agent_id        TEXT    NOT NULL,
            content         TEXT    NOT NULL,
            prev_hash       TEXT    NOT NULL,   -- 64-char hex digest of predecessor
            public_key      TEXT    NOT NULL,   -- base64url, 43 chars
            signature       TEXT    NOT NULL,   -- base64url, 86 chars
            message_digest  TEXT    NOT NULL,   -- digest of this row's signed bytes
            recorded_at     INTEGER NOT NULL,   -- local ingestion time (Unix ms)

            PRIMARY KEY (session_id, seq)
        );

        CREATE INDEX idx_messages_timestamp ON messages(session_id, timestamp);
        CREATE INDEX idx_messages_agent ON messages(agent_id);
        "#,
    )?;

    Ok(())
}
