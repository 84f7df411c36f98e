//! Test fixtures and helpers.
//!
//! Deterministic setup code shared by integration tests across the
//! workspace.

use attested_logs_core::{Keypair, Message, Session, TrustedKeys};
use attested_logs_store::MemoryStore;

/// The timestamp used by deterministic fixtures.
pub const FIXED_TIMESTAMP: &str = "2024-01-01T00:00:00.000Z";

/// A two-party fixture: alice (`agent:a`, seed `0x01`) and bob
/// (`agent:b`, seed `0x02`), plus an in-memory store.
pub struct TestFixture {
    pub alice: Keypair,
    pub bob: Keypair,
    pub store: MemoryStore,
}

impl TestFixture {
    /// Create the standard deterministic fixture.
    pub fn new() -> Self {
        Self {
            alice: Keypair::from_seed(&[0x01; 32]),
            bob: Keypair::from_seed(&[0x02; 32]),
            store: MemoryStore::new(),
        }
    }

    /// Trusted-key map covering exactly the fixture agents.
    pub fn trusted_keys(&self) -> TrustedKeys {
        let mut trusted = TrustedKeys::new();
        trusted.insert("agent:a", self.alice.public_key());
        trusted.insert("agent:b", self.bob.public_key());
        trusted
    }

    /// The canonical two-message conversation: alice says "hi", bob
    /// answers "hello".
    pub fn two_message_chain(&self, session_id: &str) -> Vec<Message> {
        let mut session = Session::new(session_id).expect("fixture session id");
        vec![
            session
                .append("hi", "user", &self.alice, "agent:a", FIXED_TIMESTAMP)
                .expect("fixture append"),
            session
                .append("hello", "assistant", &self.bob, "agent:b", FIXED_TIMESTAMP)
                .expect("fixture append"),
        ]
    }

    /// A chain of `n` messages with the two agents alternating.
    pub fn chain_of(&self, session_id: &str, n: usize) -> Vec<Message> {
        let mut session = Session::new(session_id).expect("fixture session id");
        (0..n)
            .map(|i| {
                let (keypair, agent_id, role) = if i % 2 == 0 {
                    (&self.alice, "agent:a", "user")
                } else {
                    (&self.bob, "agent:b", "assistant")
                };
                session
                    .append(&format!("message {i}"), role, keypair, agent_id, FIXED_TIMESTAMP)
                    .expect("fixture append")
            })
            .collect()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attested_logs_core::Verifier;

    #[test]
    fn test_fixture_is_deterministic() {
        let f1 = TestFixture::new();
        let f2 = TestFixture::new();
        assert_eq!(
            f1.two_message_chain("sess-1"),
            f2.two_message_chain("sess-1")
        );
    }

    #[test]
    fn test_fixture_chain_verifies() {
        let fixture = TestFixture::new();
        let chain = fixture.chain_of("sess-1", 7);
        let report = Verifier::new(fixture.trusted_keys()).verify(&chain);
        assert!(report.is_valid, "{:?}", report.findings);
    }
}
