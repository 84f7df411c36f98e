//! Message: the atomic unit of an attested conversation log.
//!
//! A message is an immutable, signed entry. Once emitted it is never
//! edited; corrections are represented as new messages.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::canonical::{canonical_json, CanonicalizationError};
use crate::crypto::{PublicKey, Sha256Hash, Signature};
use crate::error::Result;

/// Domain separation prefix for signing and digesting.
///
/// Prepending this constant prevents signatures from being replayed
/// against any other protocol that signs raw canonical JSON.
pub const SIGN_DOMAIN: &[u8] = b"attested-logs/v1\n";

/// The `prev_hash` of the first message in a session (64 zero chars).
pub const ZERO_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// A single signed entry in a tamper-evident conversation chain.
///
/// The signable view is every field except `signature`; the bytes that
/// are signed are also the bytes that are digested for chain linking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Opaque non-empty session identifier, stable across a conversation.
    pub session_id: String,

    /// Zero-based position within the session; dense, no gaps.
    pub seq: u64,

    /// RFC 3339 UTC timestamp with millisecond precision and trailing
    /// `Z`. A claim made by the producer, never proven.
    pub timestamp: String,

    /// Conversational role (`user`, `assistant`, `system`, `tool`, ...).
    /// Open set; treated as opaque text by verification.
    pub role: String,

    /// Opaque name of the signing identity, e.g. `agent:alice`.
    pub agent_id: String,

    /// The text payload. May be empty.
    pub content: String,

    /// Hex digest of the previous message's signed bytes, or
    /// [`ZERO_HASH`] for `seq == 0`.
    pub prev_hash: String,

    /// The signer's Ed25519 public key, base64url unpadded (43 chars).
    pub public_key: String,

    /// Ed25519 signature over the domain-separated canonical bytes,
    /// base64url unpadded.
    pub signature: String,
}

impl Message {
    /// The signable view: all fields except `signature`, as a JSON object.
    pub fn signable_value(&self) -> serde_json::Value {
        json!({
            "session_id": self.session_id,
            "seq": self.seq,
            "timestamp": self.timestamp,
            "role": self.role,
            "agent_id": self.agent_id,
            "content": self.content,
            "prev_hash": self.prev_hash,
            "public_key": self.public_key,
        })
    }

    /// The bytes that are signed and digested:
    /// `SIGN_DOMAIN || canonical_json(signable_view)`.
    pub fn signed_bytes(&self) -> std::result::Result<Vec<u8>, CanonicalizationError> {
        let canonical = canonical_json(&self.signable_value())?;
        let mut buf = Vec::with_capacity(SIGN_DOMAIN.len() + canonical.len());
        buf.extend_from_slice(SIGN_DOMAIN);
        buf.extend_from_slice(&canonical);
        Ok(buf)
    }

    /// Hex-lowercase SHA-256 digest of the signed bytes (64 chars).
    ///
    /// This is the value the next message carries as `prev_hash`.
    pub fn digest(&self) -> std::result::Result<String, CanonicalizationError> {
        Ok(Sha256Hash::hash(&self.signed_bytes()?).to_hex())
    }

    /// Verify this message's signature under the given public key.
    pub fn verify_signature(&self, public_key: &PublicKey) -> Result<()> {
        let signature = Signature::from_b64url(&self.signature)?;
        public_key.verify(&self.signed_bytes()?, &signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    fn make_message(keypair: &Keypair) -> Message {
        let mut message = Message {
            session_id: "sess-1".into(),
            seq: 0,
            timestamp: "2024-01-01T00:00:00.000Z".into(),
            role: "user".into(),
            agent_id: "agent:a".into(),
            content: "hi".into(),
            prev_hash: ZERO_HASH.into(),
            public_key: keypair.public_key().to_b64url(),
            signature: String::new(),
        };
        let signed = message.signed_bytes().unwrap();
        message.signature = keypair.sign(&signed).to_b64url();
        message
    }

    #[test]
    fn test_domain_prefix_exact_bytes() {
        assert_eq!(SIGN_DOMAIN, b"attested-logs/v1\n");
        assert_eq!(SIGN_DOMAIN.len(), 17);
        assert_eq!(*SIGN_DOMAIN.last().unwrap(), b'\n');
    }

    #[test]
    fn test_zero_hash_shape() {
        assert_eq!(ZERO_HASH.len(), 64);
        assert!(ZERO_HASH.bytes().all(|b| b == b'0'));
    }

    #[test]
    fn test_signed_bytes_start_with_domain() {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let message = make_message(&keypair);
        let bytes = message.signed_bytes().unwrap();
        assert!(bytes.starts_with(SIGN_DOMAIN));
        // The remainder is the canonical JSON of the signable view
        assert_eq!(bytes[SIGN_DOMAIN.len()], b'{');
    }

    #[test]
    fn test_signature_excluded_from_signable_view() {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let mut message = make_message(&keypair);
        let before = message.signed_bytes().unwrap();
        message.signature = "tampered".into();
        let after = message.signed_bytes().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_digest_deterministic_and_hex() {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let message = make_message(&keypair);
        let d1 = message.digest().unwrap();
        let d2 = message.digest().unwrap();
        assert_eq!(d1, d2);
        assert_eq!(d1.len(), 64);
        assert!(d1.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    }

    #[test]
    fn test_digest_changes_with_any_signable_field() {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let base = make_message(&keypair);
        let base_digest = base.digest().unwrap();

        let mut content = base.clone();
        content.content = "HI".into();
        assert_ne!(content.digest().unwrap(), base_digest);

        let mut role = base.clone();
        role.role = "system".into();
        assert_ne!(role.digest().unwrap(), base_digest);

        let mut seq = base.clone();
        seq.seq = 1;
        assert_ne!(seq.digest().unwrap(), base_digest);
    }

    #[test]
    fn test_verify_signature() {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let message = make_message(&keypair);
        message.verify_signature(&keypair.public_key()).unwrap();

        let other = Keypair::from_seed(&[0x02; 32]);
        assert!(message.verify_signature(&other.public_key()).is_err());
    }

    #[test]
    fn test_json_roundtrip_preserves_verification() {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let message = make_message(&keypair);

        // Pretty-printed, non-canonical producer style
        let text = serde_json::to_string_pretty(&message).unwrap();
        let parsed: Message = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed, message);
        parsed.verify_signature(&keypair.public_key()).unwrap();
    }
}
