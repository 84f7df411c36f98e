//! SQLite implementation of the Store trait.
//!
//! The primary storage backend. Uses rusqlite with bundled SQLite in WAL
//! journal mode, so a `put` that has returned survives a process crash.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use attested_logs_core::Message;

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{PutResult, Store};

/// SQLite-based store. Thread-safe via an internal mutex on the
/// connection.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a database at the given path, creating parent directories,
    /// the file, and the schema as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migration::migrate(&mut conn)?;
        debug!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database. Useful for tests; contents are lost
    /// on drop.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&conn)
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        session_id: row.get("session_id")?,
        seq: row.get::<_, i64>("seq")? as u64,
        timestamp: row.get("timestamp")?,
        role: row.get("role")?,
        agent_id: row.get("agent_id")?,
        content: row.get("content")?,
        prev_hash: row.get("prev_hash")?,
        public_key: row.get("public_key")?,
        signature: row.get("signature")?,
    })
}

const MESSAGE_COLUMNS: &str =
    "session_id, seq, timestamp, role, agent_id, content, prev_hash, public_key, signature";

impl Store for SqliteStore {
    fn put(&self, message: &Message) -> Result<PutResult> {
        let digest = message
            .digest()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        self.with_conn(|conn| {
            // Probe the slot first: identical re-put is a no-op, a
            // different record is refused.
            let existing: Option<String> = conn
                .query_row(
                    "SELECT message_digest FROM messages WHERE session_id = ?1 AND seq = ?2",
                    params![message.session_id, message.seq as i64],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_digest) = existing {
                if existing_digest == digest {
                    return Ok(PutResult::AlreadyExists);
                }
                debug!(
                    session_id = %message.session_id,
                    seq = message.seq,
                    "refused overwrite of occupied slot"
                );
                return Ok(PutResult::Conflict { existing_digest });
            }

            conn.execute(
                "INSERT INTO messages (
                    session_id, seq, timestamp, role, agent_id, content,
                    prev_hash, public_key, signature, message_digest, recorded_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    message.session_id,
                    message.seq as i64,
                    message.timestamp,
                    message.role,
                    message.agent_id,
                    message.content,
                    message.prev_hash,
                    message.public_key,
                    message.signature,
                    digest,
                    now_millis(),
                ],
            )?;

            Ok(PutResult::Inserted)
        })
    }

    fn get_chain(&self, session_id: &str) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE session_id = ?1 ORDER BY seq ASC"
            ))?;
            let messages = stmt
                .query_map(params![session_id], row_to_message)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(messages)
        })
    }

    fn list_sessions(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT session_id FROM messages
                 GROUP BY session_id
                 ORDER BY MAX(timestamp) DESC",
            )?;
            let sessions = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(sessions)
        })
    }

    fn message_count(&self, session_id: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
    }

    fn latest_timestamp(&self, session_id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let ts: Option<String> = conn.query_row(
                "SELECT MAX(timestamp) FROM messages WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )?;
            Ok(ts)
        })
    }

    fn tail(&self, session_id: &str, limit: u64) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE session_id = ?1 ORDER BY seq DESC LIMIT ?2"
            ))?;
            let mut messages = stmt
                .query_map(params![session_id, limit as i64], row_to_message)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            messages.reverse(); // oldest first
            Ok(messages)
        })
    }
}

/// Local ingestion time in Unix milliseconds. Metadata only; never part
/// of the signed record.
fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
