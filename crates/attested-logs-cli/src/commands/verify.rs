//! `verify` command: offline integrity check of one session.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;

use tracing::warn;

use attested_logs_core::{Message, TrustedKeys, Verifier};
use attested_logs_store::Store;

use crate::commands::{open_store, CliError};

pub fn run(db: Option<&Path>, session_id: &str, keys: Option<&Path>) -> Result<ExitCode, CliError> {
    let store = open_store(db)?;
    let chain = store.get_chain(session_id)?;

    if chain.is_empty() {
        println!("no messages found for session '{session_id}'");
        return Ok(ExitCode::SUCCESS);
    }

    let trusted = match keys {
        Some(path) => load_trusted_keys(path)?,
        None => {
            warn!("no --keys file given; trusting first-seen embedded public keys");
            eprintln!(
                "warning: no trusted keys loaded - binding each agent to its first-seen \
                 embedded key; authenticity is self-referential"
            );
            first_seen_keys(&chain)
        }
    };

    let report = Verifier::new(trusted).verify(&chain);

    if report.is_valid {
        println!("OK: session '{session_id}' is valid");
        println!("  {}", report.summary);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("FAILED: verification failed for session '{session_id}'");
        println!("  {}", report.summary);
        for finding in &report.findings {
            println!("  - {finding}");
        }
        Ok(ExitCode::from(1))
    }
}

/// Load a trusted-keys file: a JSON object mapping agent_id to a
/// base64url (unpadded) Ed25519 public key.
fn load_trusted_keys(path: &Path) -> Result<TrustedKeys, CliError> {
    let text = std::fs::read_to_string(path)?;
    let entries: BTreeMap<String, String> = serde_json::from_str(&text)
        .map_err(|e| CliError::Usage(format!("invalid keys file {}: {e}", path.display())))?;

    let mut trusted = TrustedKeys::new();
    for (agent_id, public_key) in entries {
        trusted.insert_b64url(agent_id.as_str(), &public_key).map_err(|e| {
            CliError::Usage(format!(
                "invalid public key for '{agent_id}' in {}: {e}",
                path.display()
            ))
        })?;
    }
    Ok(trusted)
}

/// Trust-on-first-use fallback: bind every agent to the first public key
/// embedded under its name. Unparseable keys are skipped; the verifier
/// reports them as schema findings.
fn first_seen_keys(chain: &[Message]) -> TrustedKeys {
    let mut trusted = TrustedKeys::new();
    for message in chain {
        if !trusted.contains(&message.agent_id) {
            let _ = trusted.insert_b64url(message.agent_id.as_str(), &message.public_key);
        }
    }
    trusted
}
