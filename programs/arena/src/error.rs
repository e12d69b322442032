//! Application error codes

use match_logic::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("corrupt session state: {0}")]
    SessionState(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("{0} has no open match")]
    NoOpenSession(String),

    #[error("{0} already has an open match")]
    SessionAlreadyOpen(String),

    #[error("seed must be 64 hex digits")]
    InvalidSeed,
}

pub type Result<T> = std::result::Result<T, ArenaError>;
