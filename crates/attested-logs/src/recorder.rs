//! Recorder: the per-conversation recording facade.
//!
//! Owns the session chain tip, a registry of signing identities, the
//! storage backend, and the clock. Host adapters call [`Recorder::log`];
//! everything else (sequencing, linking, signing, persistence) happens
//! here.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, info};

use attested_logs_core::{Keypair, Message, Session, TrustedKeys};
use attested_logs_store::{PutResult, Store};

use crate::clock::Clock;
use crate::error::{LedgerError, Result};

/// Records one conversation into a store.
///
/// Agent bindings are append-only for the lifetime of the recorder:
/// a name, once bound to a keypair, cannot be re-bound to another.
pub struct Recorder<S: Store> {
    session_id: String,
    session: Mutex<Session>,
    agents: RwLock<HashMap<String, Keypair>>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: Store> Recorder<S> {
    /// Create a recorder for `session_id`, resuming the chain tip from
    /// the store if the session already has messages.
    pub fn new(
        session_id: impl Into<String>,
        store: Arc<S>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let session_id = session_id.into();

        let existing = store.get_chain(&session_id)?;
        let session = match existing.last() {
            None => Session::new(session_id.clone())?,
            Some(last) => {
                let tip = last.digest().map_err(attested_logs_core::CoreError::from)?;
                info!(
                    session_id = %session_id,
                    next_seq = last.seq + 1,
                    "resuming session from stored chain tip"
                );
                Session::resume(session_id.clone(), last.seq + 1, tip)?
            }
        };

        Ok(Self {
            session_id,
            session: Mutex::new(session),
            agents: RwLock::new(HashMap::new()),
            store,
            clock,
        })
    }

    /// The session this recorder writes.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Bind an agent name to a signing keypair.
    ///
    /// Registering the same name with the same public key is a no-op;
    /// a different key is refused.
    pub fn register_agent(&self, name: &str, keypair: Keypair) -> Result<()> {
        let mut agents = self.agents.write().map_err(|_| LedgerError::Poisoned)?;
        if let Some(existing) = agents.get(name) {
            if existing.public_key() != keypair.public_key() {
                return Err(LedgerError::AgentRebound(name.to_string()));
            }
            return Ok(());
        }
        debug!(agent = name, "registered signing identity");
        agents.insert(name.to_string(), keypair);
        Ok(())
    }

    /// Whether an agent name is registered.
    pub fn has_agent(&self, name: &str) -> bool {
        self.agents
            .read()
            .map(|agents| agents.contains_key(name))
            .unwrap_or(false)
    }

    /// Append one message signed by the named agent and persist it.
    ///
    /// The agent identifier embedded in the message is `agent:<name>`.
    /// All-or-nothing: a canonicalization, signing, or store failure
    /// leaves the session tip unchanged and writes nothing.
    pub fn log(&self, content: &str, role: &str, agent_name: &str) -> Result<Message> {
        let keypair = {
            let agents = self.agents.read().map_err(|_| LedgerError::Poisoned)?;
            agents
                .get(agent_name)
                .cloned()
                .ok_or_else(|| LedgerError::UnknownAgent(agent_name.to_string()))?
        };

        let agent_id = format!("agent:{agent_name}");
        let timestamp = self.clock.now();

        let mut session = self.session.lock().map_err(|_| LedgerError::Poisoned)?;

        // Stage the append so the tip only advances once the store has
        // durably accepted the record.
        let mut staged = session.clone();
        let message = staged.append(content, role, &keypair, &agent_id, &timestamp)?;

        match self.store.put(&message)? {
            PutResult::Inserted | PutResult::AlreadyExists => {}
            PutResult::Conflict { .. } => {
                return Err(LedgerError::AppendConflict {
                    session_id: self.session_id.clone(),
                    seq: message.seq,
                });
            }
        }

        *session = staged;
        debug!(
            session_id = %self.session_id,
            seq = message.seq,
            agent = agent_name,
            "recorded message"
        );
        Ok(message)
    }

    /// The full stored chain for this session, ascending by `seq`.
    pub fn chain(&self) -> Result<Vec<Message>> {
        Ok(self.store.get_chain(&self.session_id)?)
    }

    /// Export the agent registry as a trusted-key map
    /// (`agent:<name> -> public key`) for offline verification.
    pub fn trusted_keys(&self) -> TrustedKeys {
        self.agents
            .read()
            .map(|agents| {
                agents
                    .iter()
                    .map(|(name, kp)| (format!("agent:{name}"), kp.public_key()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
