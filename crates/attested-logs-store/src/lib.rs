//! # Attested Logs Store
//!
//! Durable persistence for attested conversation logs.
//!
//! The store is deliberately dumb: it keeps signed messages and hands
//! them back in order. It rejects any attempt to overwrite an existing
//! `(session_id, seq)` slot with different content, and nothing more;
//! the verifier is the only oracle of integrity.
//!
//! Two implementations of the [`Store`] trait:
//!
//! - [`SqliteStore`] - WAL-backed SQLite row store (primary)
//! - [`MemoryStore`] - in-memory twin for tests

mod error;
mod memory;
mod migration;
mod sqlite;
mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{PutResult, Store};
