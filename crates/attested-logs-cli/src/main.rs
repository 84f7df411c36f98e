//! attested-logs: inspect, verify and export tamper-evident AI
//! conversation logs.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::{export, messages, sessions, verify};

#[derive(Parser)]
#[command(name = "attested-logs")]
#[command(about = "Inspect, verify and export tamper-evident AI conversation logs")]
#[command(version)]
struct Cli {
    /// Path to the SQLite database (overrides the ATTESTED_LOGS_DB
    /// environment variable; default ~/.attested-logs/logs.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all recorded sessions with message counts and last activity
    Sessions,
    /// Show the most recent messages in a session
    Messages {
        /// Session ID to display
        session_id: String,
        /// Number of recent messages to show
        #[arg(long, short = 'n', default_value_t = 20)]
        limit: u64,
    },
    /// Verify the integrity of a session (hash chain + signatures)
    Verify {
        /// Session ID to verify
        session_id: String,
        /// JSON file mapping agent_id to base64url public key
        #[arg(long)]
        keys: Option<PathBuf>,
    },
    /// Export a session as JSONL (one signed message per line)
    Export {
        /// Session ID to export
        session_id: String,
        /// Output file (default: <session_id>.jsonl)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sessions => sessions::run(cli.db.as_deref()),
        Commands::Messages { session_id, limit } => {
            messages::run(cli.db.as_deref(), &session_id, limit)
        }
        Commands::Verify { session_id, keys } => {
            verify::run(cli.db.as_deref(), &session_id, keys.as_deref())
        }
        Commands::Export { session_id, output } => {
            export::run(cli.db.as_deref(), &session_id, output.as_deref())
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}
