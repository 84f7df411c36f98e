//! `sessions` command: list recorded sessions.

use std::path::Path;
use std::process::ExitCode;

use attested_logs_store::Store;

use crate::commands::{open_store, CliError};
use crate::output::truncate;

pub fn run(db: Option<&Path>) -> Result<ExitCode, CliError> {
    let store = open_store(db)?;
    let sessions = store.list_sessions()?;

    if sessions.is_empty() {
        println!("no sessions found in database");
        return Ok(ExitCode::SUCCESS);
    }

    println!("{:<40} {:>9} {:<24}", "SESSION_ID", "MESSAGES", "LAST ACTIVITY");
    println!("{}", "-".repeat(75));
    for session_id in sessions {
        let count = store.message_count(&session_id)?;
        let last = store
            .latest_timestamp(&session_id)?
            .unwrap_or_else(|| "-".to_string());
        println!("{:<40} {:>9} {:<24}", truncate(&session_id, 40), count, last);
    }

    Ok(ExitCode::SUCCESS)
}
