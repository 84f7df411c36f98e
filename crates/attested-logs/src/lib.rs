//! # Attested Logs
//!
//! Facade for recording tamper-evident AI conversation logs.
//!
//! Brings the cryptographic core and a storage backend together behind
//! a small API for host frameworks:
//!
//! - [`Recorder`] - one conversation: keypair registry + append protocol
//!   + persistence + injected clock
//! - [`ChatHook`] - maps host chat events onto exactly one `log` call
//!   each, with role translation and duplicate suppression
//! - [`export`] - JSONL export/import of signed chains
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use attested_logs::{Recorder, SystemClock};
//! use attested_logs_core::{Keypair, Verifier};
//! use attested_logs_store::MemoryStore;
//!
//! let store = Arc::new(MemoryStore::new());
//! let recorder = Recorder::new("demo", store, Arc::new(SystemClock)).unwrap();
//! recorder.register_agent("alice", Keypair::generate()).unwrap();
//! recorder.log("hello", "user", "alice").unwrap();
//!
//! let report = Verifier::new(recorder.trusted_keys()).verify(&recorder.chain().unwrap());
//! assert!(report.is_valid);
//! ```

mod clock;
mod error;
mod hooks;
mod recorder;

pub mod export;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{LedgerError, Result};
pub use hooks::{ChatHook, RoleMap};
pub use recorder::Recorder;

pub use attested_logs_core as core;
pub use attested_logs_store as store;
