use std::result::Result as StdResult;

use rustyline::error::ReadlineError;
use thiserror::Error;

/// Unified error type for the domain, store and storage layers.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Envelope {index} is out of range (challenge has {len} envelopes)")]
    EnvelopeOutOfRange { index: usize, len: usize },
    #[error("Invalid import: {0}")]
    InvalidImport(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, CoreError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
    #[error("Line editor failed: {0}")]
    Readline(#[from] ReadlineError),
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}
