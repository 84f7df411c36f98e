//! JSONL export and import of signed chains.
//!
//! One message per line, all ten fields including the signature. The
//! line format is ordinary (non-canonical) JSON: consumers
//! re-canonicalize the signable view for verification, so the round
//! trip is safe regardless of producer JSON style.

use std::io::{BufRead, Write};

use attested_logs_core::Message;

use crate::error::Result;

/// Write a chain as JSONL, one compact JSON object per line.
pub fn write_jsonl<W: Write>(writer: &mut W, chain: &[Message]) -> Result<()> {
    for message in chain {
        serde_json::to_writer(&mut *writer, message)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a chain back from JSONL. Blank lines are ignored.
pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Vec<Message>> {
    let mut chain = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        chain.push(serde_json::from_str(&line)?);
    }
    Ok(chain)
}
