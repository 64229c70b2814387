//! CLI error types

use std::path::PathBuf;
use surety_ledger::SuretyError;
use surety_types::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Ledger error: {0}")]
    Ledger(#[from] SuretyError),

    #[error("Genesis error: {0}")]
    Genesis(#[from] ConfigError),

    #[error("State file already exists: {} (pass --force to overwrite)", .0.display())]
    StateExists(PathBuf),

    #[error("Envelope {index} failed: {source}")]
    Envelope { index: usize, source: SuretyError },
}

pub type CliResult<T> = Result<T, CliError>;
