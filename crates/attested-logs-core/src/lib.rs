//! # Attested Logs Core
//!
//! Cryptographic core for tamper-evident, append-only AI conversation logs.
//!
//! The core does ONE thing: bind every message of a conversation to its
//! author, its content, and its predecessor, so that a holder of the
//! trusted public keys can later establish, entirely offline, that
//! nothing was altered, inserted, removed, or reordered.
//!
//! ## Core Types
//!
//! - [`Message`] - An immutable, signed entry in a session chain
//! - [`Session`] - The single-writer append protocol
//! - [`Verifier`] - Offline whole-chain verification against a [`TrustedKeys`] map
//!
//! ## Core Invariants
//!
//! 1. **Canonical bytes**: the signed bytes of a message are
//!    `"attested-logs/v1\n" || canonical_json(signable_view)` (RFC 8785)
//! 2. **Chain linkage**: `prev_hash` of message *i* equals the SHA-256
//!    digest of message *i−1*'s signed bytes; message 0 links to the
//!    all-zero digest
//! 3. **Identical bytes**: the digested bytes and the signed bytes are the
//!    same byte string, so chain links and signatures can never disagree
//! 4. **All-or-nothing append**: a failed append leaves session state
//!    untouched and emits nothing
//!
//! ## Example
//!
//! ```
//! use attested_logs_core::{Keypair, Session, TrustedKeys, Verifier};
//!
//! let keypair = Keypair::generate();
//! let mut session = Session::new("demo-session").unwrap();
//! let message = session
//!     .append("hello", "user", &keypair, "agent:demo", "2024-01-01T00:00:00.000Z")
//!     .unwrap();
//!
//! let mut trusted = TrustedKeys::new();
//! trusted.insert("agent:demo", keypair.public_key());
//! let report = Verifier::new(trusted).verify(&[message]);
//! assert!(report.is_valid);
//! ```

mod canonical;
mod crypto;
mod encoding;
mod error;
mod message;
mod session;
mod verify;

pub use canonical::{canonical_json, CanonicalizationError, MAX_SAFE_INTEGER};
pub use crypto::{Keypair, PublicKey, Sha256Hash, Signature};
pub use encoding::{b64url_decode, b64url_encode};
pub use error::{CoreError, Result};
pub use message::{Message, SIGN_DOMAIN, ZERO_HASH};
pub use session::Session;
pub use verify::{FailureKind, Finding, TrustedKeys, VerificationReport, Verifier};
