//! Subcommand implementations and shared plumbing.

pub mod export;
pub mod messages;
pub mod sessions;
pub mod verify;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use thiserror::Error;

use attested_logs_store::{SqliteStore, StoreError};

/// Environment variable naming the database path.
pub const DB_ENV_VAR: &str = "ATTESTED_LOGS_DB";

/// Errors that terminate a command.
///
/// Exit codes: 0 success, 1 verification failed (not an error here; the
/// verify command returns it as a code), 2 usage error, 3 I/O error.
#[derive(Debug, Error)]
pub enum CliError {
    /// Bad invocation or unusable input files.
    #[error("{0}")]
    Usage(String),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Export/import failure.
    #[error(transparent)]
    Ledger(#[from] attested_logs::LedgerError),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map the error to its process exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Usage(_) => ExitCode::from(2),
            CliError::Store(_) | CliError::Ledger(_) | CliError::Io(_) => ExitCode::from(3),
        }
    }
}

/// Resolve the database path in priority order:
/// 1. `--db` flag
/// 2. `ATTESTED_LOGS_DB` environment variable
/// 3. `~/.attested-logs/logs.db`
pub fn resolve_db_path(flag: Option<&Path>) -> Result<PathBuf, CliError> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = std::env::var(DB_ENV_VAR) {
        if !env_path.is_empty() {
            return Ok(PathBuf::from(env_path));
        }
    }
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Usage("cannot determine home directory; pass --db".into()))?;
    Ok(home.join(".attested-logs").join("logs.db"))
}

/// Open the store at the resolved path, with a friendly message when the
/// database does not exist yet.
pub fn open_store(flag: Option<&Path>) -> Result<SqliteStore, CliError> {
    let path = resolve_db_path(flag)?;
    if !path.exists() {
        eprintln!("database file not found: {}", path.display());
        eprintln!("to get started:");
        eprintln!("  - run an agent session or demo first (creates and populates the database)");
        eprintln!("  - or set {DB_ENV_VAR}=/path/to/logs.db");
        eprintln!("  - or pass --db /path/to/logs.db");
        return Err(CliError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no database at {}", path.display()),
        )));
    }
    Ok(SqliteStore::open(&path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_takes_precedence() {
        let path = resolve_db_path(Some(Path::new("/tmp/explicit.db"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/explicit.db"));
    }

    #[test]
    fn test_default_is_under_home() {
        // Without a flag, resolution falls back to the env var or the
        // home directory; both end in a .db file.
        let path = resolve_db_path(None).unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("db"));
    }

    #[test]
    fn test_missing_db_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.db");
        let err = open_store(Some(&missing)).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
        assert_eq!(err.exit_code(), ExitCode::from(3));
    }
}
