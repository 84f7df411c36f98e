//! Golden vectors for cross-implementation verification.
//!
//! Every implementation of this log format must produce identical:
//! - canonical signable bytes
//! - signed message (domain prefix || canonical bytes)
//! - signature (deterministic Ed25519)
//! - digest
//! for the same inputs. The vectors here are generated from fixed seeds
//! so they can be dumped, diffed, and checked into sibling
//! implementations.

use serde::{Deserialize, Serialize};

use attested_logs_core::{Keypair, Message, Session};

/// A single golden vector: fixed inputs and their derived outputs.
#[derive(Debug, Serialize, Deserialize)]
pub struct GoldenVector {
    pub name: String,
    pub description: String,

    // Inputs
    pub seed: String, // 32 bytes hex
    pub session_id: String,
    pub seq: u64,
    pub timestamp: String,
    pub role: String,
    pub agent_id: String,
    pub content: String,
    pub prev_hash: String,

    // Derived outputs
    pub public_key: String,     // base64url
    pub canonical_bytes: String, // hex
    pub signed_message: String,  // hex, domain prefix included
    pub signature: String,       // base64url
    pub digest: String,          // hex
}

fn generate_vector(name: &str, description: &str, message: &Message, seed: [u8; 32]) -> GoldenVector {
    let signed = message.signed_bytes().expect("vector canonicalization");
    let domain_len = attested_logs_core::SIGN_DOMAIN.len();

    GoldenVector {
        name: name.to_string(),
        description: description.to_string(),
        seed: hex::encode(seed),
        session_id: message.session_id.clone(),
        seq: message.seq,
        timestamp: message.timestamp.clone(),
        role: message.role.clone(),
        agent_id: message.agent_id.clone(),
        content: message.content.clone(),
        prev_hash: message.prev_hash.clone(),
        public_key: message.public_key.clone(),
        canonical_bytes: hex::encode(&signed[domain_len..]),
        signed_message: hex::encode(&signed),
        signature: message.signature.clone(),
        digest: message.digest().expect("vector digest"),
    }
}

/// Generate all golden vectors.
pub fn generate_all_vectors() -> Vec<GoldenVector> {
    const TS: &str = "2024-01-01T00:00:00.000Z";
    let mut vectors = Vec::new();

    // Vector 1: first message of a session
    {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let mut session = Session::new("golden-session").expect("session");
        let message = session
            .append("hi", "user", &keypair, "agent:a", TS)
            .expect("append");
        vectors.push(generate_vector(
            "first_message",
            "Minimal first message, zero prev_hash",
            &message,
            [0x01; 32],
        ));
    }

    // Vector 2: empty content
    {
        let keypair = Keypair::from_seed(&[0x02; 32]);
        let mut session = Session::new("golden-session").expect("session");
        let message = session
            .append("", "tool", &keypair, "agent:b", TS)
            .expect("append");
        vectors.push(generate_vector(
            "empty_content",
            "Empty content canonicalizes as the empty string",
            &message,
            [0x02; 32],
        ));
    }

    // Vector 3: content that exercises escaping
    {
        let keypair = Keypair::from_seed(&[0x03; 32]);
        let mut session = Session::new("golden-session").expect("session");
        let message = session
            .append(
                "line1\nline2\t\"quoted\" \\ \u{0001}",
                "assistant",
                &keypair,
                "agent:c",
                TS,
            )
            .expect("append");
        vectors.push(generate_vector(
            "escaped_content",
            "Control characters, quotes and backslashes in content",
            &message,
            [0x03; 32],
        ));
    }

    // Vector 4: unicode content
    {
        let keypair = Keypair::from_seed(&[0x04; 32]);
        let mut session = Session::new("golden-session").expect("session");
        let message = session
            .append("héllo 世界 🚀", "user", &keypair, "agent:d", TS)
            .expect("append");
        vectors.push(generate_vector(
            "unicode_content",
            "Non-ASCII content passes through as UTF-8",
            &message,
            [0x04; 32],
        ));
    }

    // Vector 5: second message, linked
    {
        let keypair = Keypair::from_seed(&[0x05; 32]);
        let mut session = Session::new("golden-session").expect("session");
        session
            .append("first", "user", &keypair, "agent:e", TS)
            .expect("append");
        let message = session
            .append("second", "assistant", &keypair, "agent:e", TS)
            .expect("append");
        vectors.push(generate_vector(
            "chained_message",
            "Second message carries the first message's digest",
            &message,
            [0x05; 32],
        ));
    }

    vectors
}
