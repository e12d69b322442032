//! WASM bindings for a browser front end
//!
//! The page owns the match: it keeps the JSON state returned by
//! [`new_match`] and hands it back on every [`play_round`].

#![cfg(feature = "wasm")]

use wasm_bindgen::prelude::*;
use crate::{run_match, MatchRules, MatchState, Move, RoundOutcome, SeededRng, Strategy};

fn parse_seed_bytes(seed: &[u8]) -> Result<[u8; 32], JsError> {
    seed.try_into()
        .map_err(|_| JsError::new("Seed must be exactly 32 bytes"))
}

fn parse_strategy(id: &str) -> Result<Strategy, JsError> {
    id.parse::<Strategy>()
        .map_err(|e| JsError::new(&e.to_string()))
}

#[derive(serde::Serialize)]
struct StrategyInfo {
    id: &'static str,
    name: &'static str,
    description: &'static str,
}

/// Get all bot strategies
#[wasm_bindgen]
pub fn get_strategy_types() -> Result<JsValue, JsError> {
    let types: Vec<StrategyInfo> = Strategy::ALL
        .iter()
        .map(|s| StrategyInfo {
            id: s.id(),
            name: s.name(),
            description: s.describe(),
        })
        .collect();

    serde_wasm_bindgen::to_value(&types)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Start a match against `strategy_id`
///
/// # Returns
/// JSON serialized MatchState
#[wasm_bindgen]
pub fn new_match(strategy_id: &str, rounds: u8) -> Result<String, JsError> {
    let strategy = parse_strategy(strategy_id)?;
    let rules = MatchRules { rounds, ..MatchRules::default() };
    let state = MatchState::with_strategy(rules, strategy)
        .map_err(|e| JsError::new(&e.to_string()))?;

    serde_json::to_string(&state)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

#[derive(serde::Serialize)]
struct PlayedRound {
    state: String,
    outcome: RoundOutcome,
}

/// Play one round on a JSON match state
///
/// # Arguments
/// * `state_json` - State returned by `new_match` or a previous `play_round`
/// * `player_move` - `"cooperate"` or `"betray"`
/// * `seed` - 32 random bytes for the bot's draw this round
/// * `match_index` - Stream selector for `seed`
///
/// # Returns
/// `{state, outcome}` where `state` is the updated JSON state
#[wasm_bindgen]
pub fn play_round(
    state_json: &str,
    player_move: &str,
    seed: &[u8],
    match_index: u32,
) -> Result<JsValue, JsError> {
    let mut state: MatchState = serde_json::from_str(state_json)
        .map_err(|e| JsError::new(&format!("Invalid match state: {}", e)))?;
    let player_move: Move = player_move.parse()
        .map_err(|e: crate::EngineError| JsError::new(&e.to_string()))?;
    let mut rng = SeededRng::new(&parse_seed_bytes(seed)?, u64::from(match_index));

    let outcome = state.submit_move(player_move, &mut rng)
        .map_err(|e| JsError::new(&e.to_string()))?;
    let state = serde_json::to_string(&state)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))?;

    serde_wasm_bindgen::to_value(&PlayedRound { state, outcome })
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Replay a bot-vs-bot match with full round-by-round details
#[wasm_bindgen]
pub fn replay_match(
    player_id: &str,
    bot_id: &str,
    seed: &[u8],
    match_index: u32,
) -> Result<JsValue, JsError> {
    let player = parse_strategy(player_id)?;
    let bot = parse_strategy(bot_id)?;
    let mut rng = SeededRng::new(&parse_seed_bytes(seed)?, u64::from(match_index));

    let replay = run_match(player, bot, MatchRules::default(), &mut rng)
        .map_err(|e| JsError::new(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&replay)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}
