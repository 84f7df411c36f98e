//! Offline verification of a complete session chain.
//!
//! The verifier re-derives every digest and signature from the message
//! bytes alone, against a caller-supplied trusted-key map. It is total:
//! every message is inspected and every failure is reported, so a tool
//! can surface all tamper points at once.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::canonical::MAX_SAFE_INTEGER;
use crate::crypto::{PublicKey, Signature};
use crate::message::{Message, ZERO_HASH};
use crate::error::Result;

/// Mapping from agent identifier to the public key considered
/// authoritative for that agent. No defaults: an agent absent from the
/// map fails verification.
#[derive(Debug, Clone, Default)]
pub struct TrustedKeys {
    keys: BTreeMap<String, PublicKey>,
}

impl TrustedKeys {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an agent identifier to a public key.
    pub fn insert(&mut self, agent_id: impl Into<String>, public_key: PublicKey) {
        self.keys.insert(agent_id.into(), public_key);
    }

    /// Bind an agent identifier to a base64url-encoded public key.
    pub fn insert_b64url(&mut self, agent_id: impl Into<String>, public_key: &str) -> Result<()> {
        self.keys
            .insert(agent_id.into(), PublicKey::from_b64url(public_key)?);
        Ok(())
    }

    /// Look up the trusted key for an agent.
    pub fn get(&self, agent_id: &str) -> Option<&PublicKey> {
        self.keys.get(agent_id)
    }

    /// Whether an agent is known.
    pub fn contains(&self, agent_id: &str) -> bool {
        self.keys.contains_key(agent_id)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over `(agent_id, public_key)` bindings.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PublicKey)> {
        self.keys.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, PublicKey)> for TrustedKeys {
    fn from_iter<T: IntoIterator<Item = (String, PublicKey)>>(iter: T) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

/// What went wrong with one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// A field is missing, malformed, or inconsistent with its position.
    Schema { detail: String },
    /// `prev_hash` does not equal the digest of the previous message.
    ChainBreak { expected: String, actual: String },
    /// The agent has no entry in the trusted-key map.
    UnknownAgent { agent_id: String },
    /// The embedded public key differs from the trusted key for this
    /// agent (silent key substitution).
    KeyMismatch { agent_id: String },
    /// Ed25519 verification failed over the recomputed signed bytes.
    SignatureInvalid,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Schema { detail } => write!(f, "schema: {detail}"),
            FailureKind::ChainBreak { expected, actual } => {
                write!(f, "chain break: expected prev_hash {expected}, got {actual}")
            }
            FailureKind::UnknownAgent { agent_id } => {
                write!(f, "no trusted public key for agent '{agent_id}'")
            }
            FailureKind::KeyMismatch { agent_id } => {
                write!(f, "embedded public key differs from trusted key for '{agent_id}'")
            }
            FailureKind::SignatureInvalid => write!(f, "signature verification failed"),
        }
    }
}

/// A single verification failure, anchored to a chain index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Index of the offending message within the chain.
    pub index: usize,
    /// The failure itself.
    pub kind: FailureKind,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.index, self.kind)
    }
}

/// Outcome of verifying a chain.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    /// True iff no finding was recorded.
    pub is_valid: bool,
    /// Human-readable one-line summary.
    pub summary: String,
    /// Every failure found, in chain order.
    pub findings: Vec<Finding>,
}

impl VerificationReport {
    fn valid(summary: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            summary: summary.into(),
            findings: Vec::new(),
        }
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary)?;
        for finding in &self.findings {
            writeln!(f, "  - {finding}")?;
        }
        Ok(())
    }
}

/// Offline verifier for a complete session chain.
pub struct Verifier {
    trusted: TrustedKeys,
}

impl Verifier {
    /// Create a verifier over a trusted-key map.
    pub fn new(trusted: TrustedKeys) -> Self {
        Self { trusted }
    }

    /// The trusted-key map this verifier consults.
    pub fn trusted_keys(&self) -> &TrustedKeys {
        &self.trusted
    }

    /// Verify an ordered chain of messages.
    ///
    /// Per message, in order: schema, chain linkage, trust binding,
    /// signature. Checks never throw on bad data; bad data becomes a
    /// reported finding. An empty chain is vacuously valid.
    pub fn verify(&self, chain: &[Message]) -> VerificationReport {
        if chain.is_empty() {
            return VerificationReport::valid("empty chain is vacuously valid");
        }

        let mut findings = Vec::new();
        let session_id = chain[0].session_id.clone();

        // Digests are needed both for chain checks and are recomputed
        // from the raw fields, never trusted from elsewhere.
        let digests: Vec<Option<String>> = chain.iter().map(|m| m.digest().ok()).collect();

        for (index, message) in chain.iter().enumerate() {
            let schema = check_schema(index, message, &session_id, &mut findings);

            // Chain linkage. Skipped only if the previous digest itself
            // could not be computed (which is already reported there).
            let expected_prev = if index == 0 {
                Some(ZERO_HASH.to_string())
            } else {
                digests[index - 1].clone()
            };
            if let Some(expected) = expected_prev {
                if message.prev_hash != expected {
                    findings.push(Finding {
                        index,
                        kind: FailureKind::ChainBreak {
                            expected,
                            actual: message.prev_hash.clone(),
                        },
                    });
                }
            }

            // Trust binding, then signature. The embedded key is compared
            // against the trusted key first, so key substitution surfaces
            // as KeyMismatch rather than a bare signature failure.
            let trusted_key = match self.trusted.get(&message.agent_id) {
                Some(key) => key,
                None => {
                    findings.push(Finding {
                        index,
                        kind: FailureKind::UnknownAgent {
                            agent_id: message.agent_id.clone(),
                        },
                    });
                    continue;
                }
            };

            if message.public_key != trusted_key.to_b64url() {
                findings.push(Finding {
                    index,
                    kind: FailureKind::KeyMismatch {
                        agent_id: message.agent_id.clone(),
                    },
                });
                continue;
            }

            // A message with a malformed signature field was already
            // reported by the schema pass; don't double-report it here.
            if !schema.signature_decodable {
                continue;
            }
            let signature = match Signature::from_b64url(&message.signature) {
                Ok(sig) => sig,
                Err(_) => continue,
            };
            let verified = message
                .signed_bytes()
                .ok()
                .map(|bytes| trusted_key.verify(&bytes, &signature).is_ok())
                .unwrap_or(false);
            if !verified {
                findings.push(Finding {
                    index,
                    kind: FailureKind::SignatureInvalid,
                });
            }
        }

        let is_valid = findings.is_empty();
        let summary = if is_valid {
            format!("chain of {} message(s) verified successfully", chain.len())
        } else {
            format!(
                "chain verification failed with {} finding(s)",
                findings.len()
            )
        };
        VerificationReport {
            is_valid,
            summary,
            findings,
        }
    }
}

/// Outcome of the schema pass that later checks depend on.
struct SchemaFlags {
    signature_decodable: bool,
}

fn check_schema(
    index: usize,
    message: &Message,
    session_id: &str,
    findings: &mut Vec<Finding>,
) -> SchemaFlags {
    let mut schema = |detail: String| {
        findings.push(Finding {
            index,
            kind: FailureKind::Schema { detail },
        });
    };

    if message.session_id.is_empty() {
        schema("empty session_id".into());
    } else if message.session_id != session_id {
        schema(format!(
            "session_id mismatch (expected {:?}, got {:?})",
            session_id, message.session_id
        ));
    }

    if message.seq != index as u64 {
        schema(format!(
            "sequence mismatch (expected {index}, got {})",
            message.seq
        ));
    }
    if message.seq > MAX_SAFE_INTEGER {
        schema(format!("sequence {} exceeds safe integer range", message.seq));
    }

    if message.timestamp.is_empty() {
        schema("empty timestamp".into());
    }
    if message.role.is_empty() {
        schema("empty role".into());
    }
    if message.agent_id.is_empty() {
        schema("empty agent_id".into());
    }

    if message.prev_hash.len() != 64
        || !message
            .prev_hash
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    {
        schema(format!(
            "prev_hash is not a 64-char lowercase hex digest ({} chars)",
            message.prev_hash.len()
        ));
    }

    match PublicKey::from_b64url(&message.public_key) {
        Ok(_) => {}
        Err(_) => schema("public_key is not a base64url 32-byte key".into()),
    }

    let signature_decodable = Signature::from_b64url(&message.signature).is_ok();
    if !signature_decodable {
        schema("signature is not a base64url 64-byte value".into());
    }

    SchemaFlags { signature_decodable }
}
