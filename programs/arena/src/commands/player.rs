//! Player commands: open a match, play moves, leave

use std::io::{BufRead, Write};

use match_logic::{MatchResult, MatchState, Move, RoundOutcome, Strategy};
use tracing::{debug, info, warn};

use crate::error::{ArenaError, Result};
use crate::state::UserId;
use crate::Arena;

/// Stream slot used for the random strategy draw; rounds use 0..rounds
const STRATEGY_DRAW_SLOT: u8 = u8::MAX;

/// How the bot strategy for a new match is chosen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyPick {
    Named(Strategy),
    Random,
}

/// Open a match for `username`, registering the player if needed
pub fn start_match(arena: &Arena, username: &str, pick: StrategyPick) -> Result<MatchState> {
    let store = arena.store();
    let user = store.get_or_create_user(username)?;

    if store.load_session(user)?.is_some() {
        return Err(ArenaError::SessionAlreadyOpen(username.trim().to_string()));
    }

    let mut state = MatchState::new(arena.config().rules)?;
    let strategy = match pick {
        StrategyPick::Named(strategy) => {
            state.bind_strategy(strategy)?;
            strategy
        }
        StrategyPick::Random => {
            let played = store.games_played(user)?;
            let mut rng = arena.rng_for(user, played, STRATEGY_DRAW_SLOT);
            state.bind_random_strategy(&mut rng)?
        }
    };
    store.save_session(user, &state)?;

    info!(user = username.trim(), strategy = strategy.id(), "match started");
    Ok(state)
}

/// A round played through [`submit_move`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayedMove {
    pub outcome: RoundOutcome,
    /// Length of the match the round belongs to, from its stored rules
    pub rounds: u8,
}

impl PlayedMove {
    pub fn describe(&self) -> String {
        describe_round(&self.outcome, self.rounds)
    }
}

/// Play one round of the open match.
///
/// On the last round the result is recorded and the session closed.
pub fn submit_move(arena: &mut Arena, username: &str, player_move: Move) -> Result<PlayedMove> {
    let user = require_user(arena, username)?;
    let mut state = arena
        .store()
        .load_session(user)?
        .ok_or_else(|| ArenaError::NoOpenSession(username.trim().to_string()))?;

    let rounds = state.rules().rounds;
    let played = arena.store().games_played(user)?;
    let mut rng = arena.rng_for(user, played, state.round());
    let outcome = state.submit_move(player_move, &mut rng)?;
    debug!(
        user = username.trim(),
        round = outcome.round,
        player = %outcome.player_move,
        bot = %outcome.bot_move,
        "round played"
    );

    match &outcome.finished {
        Some(result) => {
            let game = arena.store_mut().finish_match(user, result)?;
            info!(
                user = username.trim(),
                game = game.0,
                strategy = result.strategy.id(),
                self_score = result.self_score,
                opponent_score = result.opponent_score,
                outcome = %result.outcome,
                "match finished"
            );
        }
        None => arena.store().save_session(user, &state)?,
    }

    Ok(PlayedMove { outcome, rounds })
}

/// The open match of `username`, if any
pub fn match_status(arena: &Arena, username: &str) -> Result<Option<MatchState>> {
    let user = require_user(arena, username)?;
    arena.store().load_session(user)
}

/// Drop the open match without recording it
pub fn abandon_match(arena: &Arena, username: &str) -> Result<()> {
    let user = require_user(arena, username)?;
    if !arena.store().clear_session(user)? {
        return Err(ArenaError::NoOpenSession(username.trim().to_string()));
    }
    info!(user = username.trim(), "match abandoned");
    Ok(())
}

/// Interactive match on a line-oriented terminal.
///
/// Resumes the player's open match if there is one. Returns the result once
/// the last round is played, or `None` when the player quits or input ends
/// (an ended input leaves the match open for later).
pub fn play_interactive<R: BufRead, W: Write>(
    arena: &mut Arena,
    username: &str,
    pick: StrategyPick,
    input: R,
    out: &mut W,
) -> Result<Option<MatchResult>> {
    arena.store().get_or_create_user(username)?;
    let state = match match_status(arena, username)? {
        Some(state) => {
            writeln!(out, "Resuming your open match.")?;
            state
        }
        None => start_match(arena, username, pick)?,
    };
    let rounds = state.rules().rounds;
    if let Some(strategy) = state.strategy() {
        writeln!(out, "Your opponent plays {}.", strategy.name())?;
    }
    prompt(out, state.round(), rounds, state.self_score(), state.opponent_score())?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
            abandon_match(arena, username)?;
            writeln!(out, "Match abandoned.")?;
            return Ok(None);
        }

        let player_move = match line.parse::<Move>() {
            Ok(m) => m,
            Err(err) => {
                warn!(input = line, "rejected move: {err}");
                writeln!(out, "Enter c (cooperate), b (betray) or q (quit).")?;
                continue;
            }
        };

        let played = submit_move(arena, username, player_move)?;
        writeln!(out, "{}", played.describe())?;
        let outcome = played.outcome;
        if let Some(result) = outcome.finished {
            writeln!(out, "{}", describe_result(&result))?;
            return Ok(Some(result));
        }
        prompt(out, outcome.round + 1, rounds, outcome.self_score, outcome.opponent_score)?;
    }

    Ok(None)
}

fn prompt<W: Write>(out: &mut W, round: u8, rounds: u8, you: u32, bot: u32) -> Result<()> {
    writeln!(out, "Round {}/{}  score {} : {}  [c]ooperate / [b]etray / [q]uit", round + 1, rounds, you, bot)?;
    Ok(())
}

pub fn describe_round(outcome: &RoundOutcome, rounds: u8) -> String {
    format!(
        "Round {}/{}: you {}, bot {} (+{} / +{}), score {} : {}",
        outcome.round + 1,
        rounds,
        outcome.player_move,
        outcome.bot_move,
        outcome.self_score_delta,
        outcome.opponent_score_delta,
        outcome.self_score,
        outcome.opponent_score,
    )
}

pub fn describe_result(result: &MatchResult) -> String {
    format!(
        "Match over against {}: {} ({} : {})",
        result.strategy.name(),
        result.outcome.as_str().to_uppercase(),
        result.self_score,
        result.opponent_score,
    )
}

fn require_user(arena: &Arena, username: &str) -> Result<UserId> {
    arena
        .store()
        .find_user(username)?
        .map(|user| user.id)
        .ok_or_else(|| ArenaError::UnknownUser(username.trim().to_string()))
}
