//! Store trait: the minimal interface for message persistence.
//!
//! The trait is synchronous; the core has no runtime of its own and the
//! host may call it from any thread. Implementations are in-memory or
//! SQLite; the verifier depends on neither.

use attested_logs_core::Message;

use crate::error::Result;

/// Result of putting a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutResult {
    /// Message was inserted (new slot).
    Inserted,
    /// The identical message already occupies this slot (idempotent,
    /// not an error).
    AlreadyExists,
    /// A different message occupies `(session_id, seq)`. The store
    /// refuses the write; the existing record's digest is returned as
    /// evidence.
    Conflict {
        /// Digest of the record already stored at this position.
        existing_digest: String,
    },
}

/// Append-only message persistence.
///
/// # Design Notes
///
/// - **Idempotent puts**: re-putting a byte-identical record returns
///   `AlreadyExists`.
/// - **Overwrite refusal**: a different record at an occupied position
///   returns `Conflict` and writes nothing.
/// - **No validation**: the store never checks signatures or chain
///   links; retrieval hands back exactly what was stored.
pub trait Store: Send + Sync {
    /// Persist one message. After `Ok(Inserted)` returns, the record
    /// survives a process crash.
    fn put(&self, message: &Message) -> Result<PutResult>;

    /// All messages of a session in ascending `seq` order.
    fn get_chain(&self, session_id: &str) -> Result<Vec<Message>>;

    /// All known session ids, most recently active first.
    fn list_sessions(&self) -> Result<Vec<String>>;

    /// Number of messages recorded for a session.
    fn message_count(&self, session_id: &str) -> Result<u64>;

    /// Timestamp of the most recent message in a session, if any.
    fn latest_timestamp(&self, session_id: &str) -> Result<Option<String>>;

    /// The most recent `limit` messages of a session, oldest first.
    fn tail(&self, session_id: &str, limit: u64) -> Result<Vec<Message>>;
}
