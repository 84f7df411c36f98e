//! `messages` command: show the most recent messages of a session.

use std::path::Path;
use std::process::ExitCode;

use attested_logs_store::Store;

use crate::commands::{open_store, CliError};
use crate::output::{one_line, truncate};

pub fn run(db: Option<&Path>, session_id: &str, limit: u64) -> Result<ExitCode, CliError> {
    let store = open_store(db)?;
    let messages = store.tail(session_id, limit)?;

    if messages.is_empty() {
        println!("no messages found for session '{session_id}'");
        return Ok(ExitCode::SUCCESS);
    }

    for message in messages {
        println!(
            "{:>4} | {} | {:<10} | {}",
            message.seq,
            message.timestamp,
            message.role.to_uppercase(),
            message.agent_id
        );
        println!("  {}", truncate(&one_line(&message.content), 160));
        println!("  {}", "-".repeat(90));
    }

    Ok(ExitCode::SUCCESS)
}
