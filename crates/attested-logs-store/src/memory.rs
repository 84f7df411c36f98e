//! In-memory implementation of the Store trait.
//!
//! Primarily for tests. Same semantics as SQLite but nothing survives
//! the process.

use std::collections::BTreeMap;
use std::sync::RwLock;

use attested_logs_core::Message;

use crate::error::{Result, StoreError};
use crate::traits::{PutResult, Store};

struct StoredMessage {
    message: Message,
    digest: String,
}

/// In-memory store. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryStore {
    // session_id -> seq -> stored message
    sessions: RwLock<BTreeMap<String, BTreeMap<u64, StoredMessage>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn put(&self, message: &Message) -> Result<PutResult> {
        let digest = message
            .digest()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let mut sessions = self.sessions.write().map_err(|_| StoreError::Poisoned)?;
        let slots = sessions.entry(message.session_id.clone()).or_default();

        if let Some(existing) = slots.get(&message.seq) {
            if existing.digest == digest {
                return Ok(PutResult::AlreadyExists);
            }
            return Ok(PutResult::Conflict {
                existing_digest: existing.digest.clone(),
            });
        }

        slots.insert(
            message.seq,
            StoredMessage {
                message: message.clone(),
                digest,
            },
        );
        Ok(PutResult::Inserted)
    }

    fn get_chain(&self, session_id: &str) -> Result<Vec<Message>> {
        let sessions = self.sessions.read().map_err(|_| StoreError::Poisoned)?;
        Ok(sessions
            .get(session_id)
            .map(|slots| slots.values().map(|s| s.message.clone()).collect())
            .unwrap_or_default())
    }

    fn list_sessions(&self) -> Result<Vec<String>> {
        let sessions = self.sessions.read().map_err(|_| StoreError::Poisoned)?;

        let mut with_activity: Vec<(String, String)> = sessions
            .iter()
            .filter(|(_, slots)| !slots.is_empty())
            .map(|(id, slots)| {
                let latest = slots
                    .values()
                    .map(|s| s.message.timestamp.clone())
                    .max()
                    .unwrap_or_default();
                (id.clone(), latest)
            })
            .collect();

        // Most recently active first, as the SQLite backend orders them
        with_activity.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(with_activity.into_iter().map(|(id, _)| id).collect())
    }

    fn message_count(&self, session_id: &str) -> Result<u64> {
        let sessions = self.sessions.read().map_err(|_| StoreError::Poisoned)?;
        Ok(sessions
            .get(session_id)
            .map(|slots| slots.len() as u64)
            .unwrap_or(0))
    }

    fn latest_timestamp(&self, session_id: &str) -> Result<Option<String>> {
        let sessions = self.sessions.read().map_err(|_| StoreError::Poisoned)?;
        Ok(sessions.get(session_id).and_then(|slots| {
            slots.values().map(|s| s.message.timestamp.clone()).max()
        }))
    }

    fn tail(&self, session_id: &str, limit: u64) -> Result<Vec<Message>> {
        let sessions = self.sessions.read().map_err(|_| StoreError::Poisoned)?;
        Ok(sessions
            .get(session_id)
            .map(|slots| {
                let mut latest: Vec<Message> = slots
                    .values()
                    .rev()
                    .take(limit as usize)
                    .map(|s| s.message.clone())
                    .collect();
                latest.reverse(); // oldest first
                latest
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attested_logs_core::{Keypair, Session};

    const TS: &str = "2024-01-01T00:00:00.000Z";

    fn one_message(session_id: &str, content: &str) -> Message {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let mut session = Session::new(session_id).unwrap();
        session
            .append(content, "user", &keypair, "agent:a", TS)
            .unwrap()
    }

    #[test]
    fn test_put_get_roundtrip() {
        let store = MemoryStore::new();
        let message = one_message("sess-1", "hi");

        assert_eq!(store.put(&message).unwrap(), PutResult::Inserted);
        assert_eq!(store.get_chain("sess-1").unwrap(), vec![message]);
    }

    #[test]
    fn test_idempotent_and_conflicting_puts() {
        let store = MemoryStore::new();
        let message = one_message("sess-1", "hi");
        store.put(&message).unwrap();

        assert_eq!(store.put(&message).unwrap(), PutResult::AlreadyExists);

        let mut other = message.clone();
        other.content = "tampered".into();
        assert!(matches!(
            store.put(&other).unwrap(),
            PutResult::Conflict { .. }
        ));
        assert_eq!(store.message_count("sess-1").unwrap(), 1);
    }

    #[test]
    fn test_chain_ordering() {
        let store = MemoryStore::new();
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let mut session = Session::new("sess-1").unwrap();
        let messages: Vec<Message> = (0..4)
            .map(|i| {
                session
                    .append(&format!("m{i}"), "user", &keypair, "agent:a", TS)
                    .unwrap()
            })
            .collect();

        // Insert out of order; retrieval is still seq-ascending
        store.put(&messages[2]).unwrap();
        store.put(&messages[0]).unwrap();
        store.put(&messages[3]).unwrap();
        store.put(&messages[1]).unwrap();

        assert_eq!(store.get_chain("sess-1").unwrap(), messages);
        let tail = store.tail("sess-1", 2).unwrap();
        assert_eq!(tail[0].seq, 2);
        assert_eq!(tail[1].seq, 3);
    }

    #[test]
    fn test_list_sessions_recency() {
        let store = MemoryStore::new();
        let keypair = Keypair::from_seed(&[0x01; 32]);

        let mut a = Session::new("a").unwrap();
        store
            .put(&a.append("x", "user", &keypair, "agent:a", "2024-01-01T00:00:00.000Z").unwrap())
            .unwrap();
        let mut b = Session::new("b").unwrap();
        store
            .put(&b.append("y", "user", &keypair, "agent:a", "2024-06-01T00:00:00.000Z").unwrap())
            .unwrap();

        assert_eq!(store.list_sessions().unwrap(), vec!["b", "a"]);
    }
}
