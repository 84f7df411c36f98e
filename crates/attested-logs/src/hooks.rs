//! Host-framework hook capability.
//!
//! Host frameworks surface chat traffic through their own callback
//! shapes. This module reduces all of them to one capability: each host
//! message maps to exactly one `log` call. Reordering or dropping events
//! here would break chain semantics, so the hook does only two safe
//! transformations: role translation and duplicate suppression.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use attested_logs_core::Message;
use attested_logs_store::Store;

use crate::error::{LedgerError, Result};
use crate::recorder::Recorder;

/// Translation from host role vocabulary to log roles.
#[derive(Debug, Clone)]
pub struct RoleMap {
    map: HashMap<String, String>,
    fallback: String,
}

impl RoleMap {
    /// A map for the common chat vocabulary: `human -> user`,
    /// `ai -> assistant`, `tool -> tool`, `system -> system`.
    pub fn chat_default() -> Self {
        let mut map = HashMap::new();
        map.insert("human".to_string(), "user".to_string());
        map.insert("ai".to_string(), "assistant".to_string());
        map.insert("tool".to_string(), "tool".to_string());
        map.insert("system".to_string(), "system".to_string());
        Self {
            map,
            fallback: "user".to_string(),
        }
    }

    /// Add or override one translation.
    pub fn with(mut self, host_role: impl Into<String>, role: impl Into<String>) -> Self {
        self.map.insert(host_role.into(), role.into());
        self
    }

    /// Translate a host role, falling back to the default.
    pub fn translate(&self, host_role: &str) -> &str {
        self.map
            .get(host_role)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}

/// Observes host chat events and records them through a [`Recorder`].
///
/// The hook signs each message with the identity registered under the
/// translated role name, so a chat with registered `user` and
/// `assistant` identities records both sides. Events whose role has no
/// registered identity are skipped rather than mis-attributed.
pub struct ChatHook<S: Store> {
    recorder: Arc<Recorder<S>>,
    roles: RoleMap,
    seen: Mutex<HashSet<(String, String)>>,
}

impl<S: Store> ChatHook<S> {
    /// Attach a hook to a recorder.
    pub fn new(recorder: Arc<Recorder<S>>, roles: RoleMap) -> Self {
        Self {
            recorder,
            roles,
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Record one host chat message.
    ///
    /// Returns `Ok(None)` when the event is suppressed: either a
    /// duplicate delivery of a `(role, content)` pair the hook has
    /// already recorded, or a role with no registered identity.
    pub fn on_message(&self, host_role: &str, content: &str) -> Result<Option<Message>> {
        let role = self.roles.translate(host_role).to_string();

        {
            let mut seen = self.seen.lock().map_err(|_| LedgerError::Poisoned)?;
            if !seen.insert((role.clone(), content.to_string())) {
                return Ok(None);
            }
        }

        if !self.recorder.has_agent(&role) {
            return Ok(None);
        }

        self.recorder.log(content, &role, &role).map(Some)
    }

    /// Record a tool invocation result. Tool outputs are recorded
    /// unconditionally (no deduplication; tools may legitimately repeat
    /// themselves).
    pub fn on_tool_output(&self, output: &str) -> Result<Option<Message>> {
        if !self.recorder.has_agent("tool") {
            return Ok(None);
        }
        self.recorder.log(output, "tool", "tool").map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use attested_logs_core::{Keypair, Verifier};
    use attested_logs_store::MemoryStore;

    fn hook() -> ChatHook<MemoryStore> {
        let recorder = Arc::new(
            Recorder::new(
                "sess-1",
                Arc::new(MemoryStore::new()),
                Arc::new(FixedClock("2024-01-01T00:00:00.000Z".into())),
            )
            .unwrap(),
        );
        recorder
            .register_agent("user", Keypair::from_seed(&[0x01; 32]))
            .unwrap();
        recorder
            .register_agent("assistant", Keypair::from_seed(&[0x02; 32]))
            .unwrap();
        ChatHook::new(recorder, RoleMap::chat_default())
    }

    #[test]
    fn test_role_translation() {
        let hook = hook();
        let message = hook.on_message("human", "hello").unwrap().unwrap();
        assert_eq!(message.role, "user");
        assert_eq!(message.agent_id, "agent:user");

        let message = hook.on_message("ai", "hi there").unwrap().unwrap();
        assert_eq!(message.role, "assistant");
    }

    #[test]
    fn test_duplicate_delivery_suppressed() {
        let hook = hook();
        assert!(hook.on_message("human", "hello").unwrap().is_some());
        assert!(hook.on_message("human", "hello").unwrap().is_none());

        let chain = hook.recorder.chain().unwrap();
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_unregistered_role_skipped() {
        let hook = hook();
        // No "system" identity registered
        assert!(hook.on_message("system", "be nice").unwrap().is_none());
        assert!(hook.recorder.chain().unwrap().is_empty());
    }

    #[test]
    fn test_tool_outputs_not_deduplicated() {
        let hook = hook();
        hook.recorder
            .register_agent("tool", Keypair::from_seed(&[0x03; 32]))
            .unwrap();

        assert!(hook.on_tool_output("42").unwrap().is_some());
        assert!(hook.on_tool_output("42").unwrap().is_some());
        assert_eq!(hook.recorder.chain().unwrap().len(), 2);
    }

    #[test]
    fn test_hooked_conversation_verifies() {
        let hook = hook();
        hook.on_message("human", "what is 6 times 7?").unwrap();
        hook.on_message("ai", "42").unwrap();

        let chain = hook.recorder.chain().unwrap();
        let report = Verifier::new(hook.recorder.trusted_keys()).verify(&chain);
        assert!(report.is_valid, "{:?}", report.findings);
    }
}
