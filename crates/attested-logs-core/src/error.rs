//! Error types for the core.

use thiserror::Error;

use crate::canonical::CanonicalizationError;

/// Core errors that can occur while building or checking messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input could not be canonicalized.
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),

    /// The key backend failed to produce a signature.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Public key bytes do not form a valid Ed25519 point.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Signature verification failed.
    #[error("invalid signature")]
    InvalidSignature,

    /// Base64url or hex text could not be decoded.
    #[error("invalid encoding: {0}")]
    Encoding(String),

    /// A message or session field violates the data model.
    #[error("malformed message: {0}")]
    MalformedMessage(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
