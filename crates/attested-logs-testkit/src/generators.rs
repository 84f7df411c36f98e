//! Proptest generators for property-based testing.

use proptest::prelude::*;

use attested_logs_core::{Keypair, Message, Session, TrustedKeys};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a session identifier.
pub fn session_id() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,31}".prop_map(String::from)
}

/// Generate a conversational role.
pub fn role() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("user".to_string()),
        Just("assistant".to_string()),
        Just("system".to_string()),
        Just("tool".to_string()),
    ]
}

/// Generate message content, including empty strings, unicode, and
/// characters the canonical encoding must escape.
pub fn content() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[ -~]{0,64}".prop_map(String::from),
        any::<String>().prop_map(|s| s.chars().take(64).collect()),
    ]
}

/// Generate a fixture timestamp with varying seconds.
pub fn timestamp() -> impl Strategy<Value = String> {
    (0u8..60).prop_map(|s| format!("2024-01-01T00:00:{s:02}.000Z"))
}

/// Parameters for building a valid chain: two signing identities and a
/// list of (content, role, agent index) entries.
#[derive(Debug, Clone)]
pub struct ChainParams {
    pub session_id: String,
    pub seeds: [[u8; 32]; 2],
    pub entries: Vec<(String, String, usize)>,
}

impl Arbitrary for ChainParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            session_id(),
            any::<[u8; 32]>(),
            any::<[u8; 32]>(),
            prop::collection::vec((content(), role(), 0usize..2), 0..12),
        )
            .prop_map(|(session_id, seed_a, seed_b, entries)| ChainParams {
                session_id,
                seeds: [seed_a, seed_b],
                entries,
            })
            .boxed()
    }
}

/// Build a valid chain from parameters, returning the messages and a
/// trusted-key map covering exactly the identities used.
pub fn build_chain(params: &ChainParams) -> (Vec<Message>, TrustedKeys) {
    let keypairs = [
        Keypair::from_seed(&params.seeds[0]),
        Keypair::from_seed(&params.seeds[1]),
    ];
    let agent_ids = ["agent:a", "agent:b"];

    let mut session = Session::new(params.session_id.clone()).expect("generated session id");
    let mut chain = Vec::with_capacity(params.entries.len());
    for (i, (content, role, agent)) in params.entries.iter().enumerate() {
        let timestamp = format!("2024-01-01T00:00:{:02}.000Z", i % 60);
        chain.push(
            session
                .append(content, role, &keypairs[*agent], agent_ids[*agent], &timestamp)
                .expect("append of generated entry"),
        );
    }

    let mut trusted = TrustedKeys::new();
    trusted.insert("agent:a", keypairs[0].public_key());
    trusted.insert("agent:b", keypairs[1].public_key());
    (chain, trusted)
}
