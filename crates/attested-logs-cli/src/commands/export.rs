//! `export` command: dump a session as JSONL.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use attested_logs::export::write_jsonl;
use attested_logs_store::Store;

use crate::commands::{open_store, CliError};

pub fn run(db: Option<&Path>, session_id: &str, output: Option<&Path>) -> Result<ExitCode, CliError> {
    let store = open_store(db)?;
    let chain = store.get_chain(session_id)?;

    if chain.is_empty() {
        println!("no messages found for session '{session_id}'");
        return Ok(ExitCode::SUCCESS);
    }

    let out_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{session_id}.jsonl")));

    let file = File::create(&out_path)?;
    let mut writer = BufWriter::new(file);
    write_jsonl(&mut writer, &chain)?;

    println!("exported {} messages to {}", chain.len(), out_path.display());
    println!("format: JSONL - one signed message per line");

    Ok(ExitCode::SUCCESS)
}
