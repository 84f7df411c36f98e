//! Tamper-detection scenarios over fixture chains.
//!
//! Each test mutates a valid chain in one specific way and asserts the
//! verifier pins the damage to the right index with the right kind of
//! finding.

use attested_logs_core::{FailureKind, Keypair, Session, TrustedKeys, Verifier};
use attested_logs_testkit::fixtures::{TestFixture, FIXED_TIMESTAMP};

#[test]
fn happy_two_message_chain() {
    let fixture = TestFixture::new();
    let chain = fixture.two_message_chain("sess-1");

    let report = Verifier::new(fixture.trusted_keys()).verify(&chain);
    assert!(report.is_valid);
    assert!(report.findings.is_empty());
}

#[test]
fn altering_any_field_invalidates_the_signature() {
    let fixture = TestFixture::new();
    let trusted = fixture.trusted_keys();
    let verifier = Verifier::new(trusted);

    let mutations: Vec<(&str, Box<dyn Fn(&mut attested_logs_core::Message)>)> = vec![
        ("content", Box::new(|m| m.content = "HACKED".into())),
        ("role", Box::new(|m| m.role = "system".into())),
        ("timestamp", Box::new(|m| m.timestamp = "2031-01-01T00:00:00.000Z".into())),
        ("agent_id", Box::new(|m| m.agent_id = "agent:a".into())),
    ];

    for (field, mutate) in mutations {
        let mut chain = fixture.two_message_chain("sess-1");
        mutate(&mut chain[1]);

        let report = verifier.verify(&chain);
        assert!(!report.is_valid, "mutating {field} must invalidate");
        assert!(
            report.findings.iter().any(|f| f.index == 1),
            "mutating {field} must anchor a finding at index 1: {:?}",
            report.findings
        );
    }
}

#[test]
fn altering_a_middle_message_also_breaks_the_successor_link() {
    let fixture = TestFixture::new();
    let mut chain = fixture.chain_of("sess-1", 4);
    chain[1].content = "HACKED".into();

    let report = Verifier::new(fixture.trusted_keys()).verify(&chain);
    assert!(!report.is_valid);
    assert!(report
        .findings
        .iter()
        .any(|f| f.index == 1 && f.kind == FailureKind::SignatureInvalid));
    assert!(report
        .findings
        .iter()
        .any(|f| f.index == 2 && matches!(f.kind, FailureKind::ChainBreak { .. })));
}

#[test]
fn swapping_adjacent_messages_invalidates_the_chain() {
    let fixture = TestFixture::new();
    let verifier = Verifier::new(fixture.trusted_keys());

    for n in 2..=5 {
        let base = fixture.chain_of("sess-1", n);
        for i in 0..n - 1 {
            let mut chain = base.clone();
            chain.swap(i, i + 1);
            let report = verifier.verify(&chain);
            assert!(
                !report.is_valid,
                "swap({i},{}) in a chain of {n} must be detected",
                i + 1
            );
        }
    }
}

#[test]
fn deleting_any_message_invalidates_the_chain() {
    let fixture = TestFixture::new();
    let verifier = Verifier::new(fixture.trusted_keys());

    let base = fixture.chain_of("sess-1", 5);
    for victim in 0..4 {
        // A trailing deletion only shortens the chain, which stays
        // valid; every interior or leading deletion must be caught.
        let mut chain = base.clone();
        chain.remove(victim);
        let report = verifier.verify(&chain);
        assert!(
            !report.is_valid,
            "deleting message {victim} must be detected"
        );
    }
}

#[test]
fn unknown_agent_is_reported() {
    let fixture = TestFixture::new();
    let chain = fixture.two_message_chain("sess-1");

    let mut partial = TrustedKeys::new();
    partial.insert("agent:a", fixture.alice.public_key());

    let report = Verifier::new(partial).verify(&chain);
    assert!(!report.is_valid);
    assert!(report.findings.iter().any(|f| f.index == 1
        && f.kind
            == FailureKind::UnknownAgent {
                agent_id: "agent:b".into()
            }));
}

#[test]
fn key_substitution_is_reported() {
    let fixture = TestFixture::new();
    let mut chain = fixture.two_message_chain("sess-1");

    // Re-sign bob's message with a fresh keypair, keeping his agent_id.
    let impostor = Keypair::from_seed(&[0x42; 32]);
    chain[1].public_key = impostor.public_key().to_b64url();
    let signed = chain[1].signed_bytes().unwrap();
    chain[1].signature = impostor.sign(&signed).to_b64url();

    let report = Verifier::new(fixture.trusted_keys()).verify(&chain);
    assert!(!report.is_valid);
    assert!(report.findings.iter().any(|f| f.index == 1
        && f.kind
            == FailureKind::KeyMismatch {
                agent_id: "agent:b".into()
            }));
}

#[test]
fn splicing_two_sessions_is_detected() {
    let fixture = TestFixture::new();
    let mut chain = fixture.two_message_chain("session-one");

    // Graft the tail of another session onto this one.
    let mut other = Session::new("session-two").unwrap();
    other
        .append("x", "user", &fixture.alice, "agent:a", FIXED_TIMESTAMP)
        .unwrap();
    other
        .append("y", "user", &fixture.alice, "agent:a", FIXED_TIMESTAMP)
        .unwrap();
    let grafted = other
        .append("z", "user", &fixture.alice, "agent:a", FIXED_TIMESTAMP)
        .unwrap();
    chain.push(grafted);

    let report = Verifier::new(fixture.trusted_keys()).verify(&chain);
    assert!(!report.is_valid);
    assert!(report.findings.iter().any(|f| f.index == 2
        && matches!(
            f.kind,
            FailureKind::Schema { .. } | FailureKind::ChainBreak { .. }
        )));
}

#[test]
fn whole_chain_rebuilt_by_an_outsider_fails_trust_checks() {
    // An attacker who regenerates the entire chain with their own key
    // produces perfectly linked, perfectly signed messages. Only the
    // trusted-key map catches this.
    let fixture = TestFixture::new();
    let outsider = Keypair::from_seed(&[0x66; 32]);

    let mut session = Session::new("sess-1").unwrap();
    let forged = vec![
        session
            .append("hi", "user", &outsider, "agent:a", FIXED_TIMESTAMP)
            .unwrap(),
        session
            .append("hello", "assistant", &outsider, "agent:b", FIXED_TIMESTAMP)
            .unwrap(),
    ];

    let report = Verifier::new(fixture.trusted_keys()).verify(&forged);
    assert!(!report.is_valid);
    assert!(report
        .findings
        .iter()
        .all(|f| matches!(f.kind, FailureKind::KeyMismatch { .. })));
    assert_eq!(report.findings.len(), 2);
}
