//! Match Logic for Eye for an Eye
//!
//! Round-scoring and bot-decision engine for the iterated Prisoner's
//! Dilemma played against a fixed bot strategy.
//! This crate is compiled to:
//! - Native (for the arena CLI and its storage layer)
//! - WASM (for a browser front end that keeps the match state itself)

mod error;
mod random;
mod strategy;
mod game;

#[cfg(feature = "wasm")]
mod wasm;

pub use error::EngineError;
pub use random::{parse_seed, SeededRng};
pub use strategy::{execute_strategy, Move, Strategy, TitForTatRule};
pub use game::{
    run_match, MatchPhase, MatchReplay, MatchResult, MatchRules, MatchState, Outcome,
    RoundOutcome, TieRule, DEFAULT_ROUNDS,
};

/// Payoff matrix for the Prisoner's Dilemma
/// Returns (player_points, bot_points)
pub fn payoff(player: Move, bot: Move) -> (u8, u8) {
    match (player, bot) {
        (Move::Cooperate, Move::Cooperate) => (3, 3),
        (Move::Cooperate, Move::Betray) => (0, 5),
        (Move::Betray, Move::Cooperate) => (5, 0),
        (Move::Betray, Move::Betray) => (1, 1),
    }
}
