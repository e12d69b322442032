//! Engine error taxonomy

use thiserror::Error;

/// Errors raised by the match engine.
///
/// Every variant is a caller error: the engine rejects the call and leaves
/// the match untouched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Strategy invoked with histories of different lengths.
    #[error("history length mismatch (own={own}, opponent={opponent})")]
    HistoryMismatch { own: usize, opponent: usize },

    /// A move was submitted after the last round.
    #[error("match is already finished")]
    MatchFinished,

    /// A move was submitted before a bot strategy was chosen.
    #[error("no strategy bound to this match")]
    StrategyNotBound,

    #[error("strategy already bound to this match")]
    StrategyAlreadyBound,

    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("unknown move: {0}")]
    UnknownMove(String),

    /// Stored state whose histories, scores, round counter and result disagree.
    #[error("inconsistent match state")]
    InconsistentState,

    #[error("match must have at least one round")]
    InvalidRules,
}
