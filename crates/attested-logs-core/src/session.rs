//! Session: the stateful append protocol for one conversation.
//!
//! A session owns the chain tip of a single conversation: the next
//! sequence number and the digest of the most recently appended message.
//! Each append produces a fully signed, chain-linked [`Message`].
//!
//! A `Session` is a **single-writer** object. `append` takes `&mut self`,
//! so the borrow checker enforces mutual exclusion within one thread;
//! callers sharing a session across threads must wrap it in a mutex.
//! Appends to distinct sessions are independent.

use crate::crypto::Keypair;
use crate::error::{CoreError, Result};
use crate::message::{Message, ZERO_HASH};

/// Append state for one conversation.
#[derive(Debug, Clone)]
pub struct Session {
    session_id: String,
    next_seq: u64,
    last_hash: String,
}

impl Session {
    /// Create a fresh session with no messages.
    pub fn new(session_id: impl Into<String>) -> Result<Self> {
        let session_id = session_id.into();
        if session_id.is_empty() {
            return Err(CoreError::MalformedMessage("empty session_id".into()));
        }
        Ok(Self {
            session_id,
            next_seq: 0,
            last_hash: ZERO_HASH.to_string(),
        })
    }

    /// Resume a session from a persisted chain tip.
    ///
    /// `last_hash` must be the digest of the message at `next_seq - 1`
    /// (or the zero digest when `next_seq == 0`); the caller obtains it
    /// from the stored chain.
    pub fn resume(session_id: impl Into<String>, next_seq: u64, last_hash: String) -> Result<Self> {
        let session_id = session_id.into();
        if session_id.is_empty() {
            return Err(CoreError::MalformedMessage("empty session_id".into()));
        }
        if last_hash.len() != 64 || !last_hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(CoreError::MalformedMessage(format!(
                "last_hash is not a 64-char lowercase hex digest: {last_hash:?}"
            )));
        }
        Ok(Self {
            session_id,
            next_seq,
            last_hash,
        })
    }

    /// The session identifier.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Sequence number the next append will use.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Digest of the most recently appended message (all zeros before
    /// the first append).
    pub fn last_hash(&self) -> &str {
        &self.last_hash
    }

    /// Append a message: build the signable view against the current
    /// chain tip, sign it, commit the new tip, and emit the message.
    ///
    /// All-or-nothing: on any failure the session state is unchanged and
    /// nothing is emitted. The returned message is complete; no caller
    /// ever observes an unsigned or un-chained draft.
    pub fn append(
        &mut self,
        content: &str,
        role: &str,
        keypair: &Keypair,
        agent_id: &str,
        timestamp: &str,
    ) -> Result<Message> {
        let mut message = Message {
            session_id: self.session_id.clone(),
            seq: self.next_seq,
            timestamp: timestamp.to_string(),
            role: role.to_string(),
            agent_id: agent_id.to_string(),
            content: content.to_string(),
            prev_hash: self.last_hash.clone(),
            public_key: keypair.public_key().to_b64url(),
            signature: String::new(),
        };

        // Canonicalization is the only fallible step; it happens before
        // any state change.
        let signed = message.signed_bytes()?;
        message.signature = keypair.sign(&signed).to_b64url();

        // Commit the tip before handing the message out.
        self.last_hash = crate::crypto::Sha256Hash::hash(&signed).to_hex();
        self.next_seq += 1;

        Ok(message)
    }
}
