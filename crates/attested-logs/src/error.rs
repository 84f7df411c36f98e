//! Error type for the recording facade.

use thiserror::Error;

use attested_logs_core::CoreError;
use attested_logs_store::StoreError;

/// Errors surfaced while recording a conversation.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Core failure (canonicalization, signing, encoding).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The store holds a different record at the slot this append
    /// targeted. Session state was not advanced.
    #[error("append conflict at session '{session_id}' seq {seq}")]
    AppendConflict {
        /// Session the append targeted.
        session_id: String,
        /// Occupied sequence number.
        seq: u64,
    },

    /// No keypair registered under this agent name.
    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    /// The agent name is already bound to a different keypair; bindings
    /// are append-only within a session.
    #[error("agent '{0}' is already bound to a different key")]
    AgentRebound(String),

    /// JSON (de)serialization failure during export or import.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O failure during export or import.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal lock was poisoned by a panicking writer.
    #[error("recorder lock poisoned")]
    Poisoned,
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
