//! Read-only commands: strategy table, statistics, history, simulations

use match_logic::{run_match, MatchReplay, Strategy};
use serde::Serialize;
use tracing::info;

use crate::error::{ArenaError, Result};
use crate::state::GameRecord;
use crate::stats::{self, Dashboard};
use crate::Arena;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StrategyInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub fn list_strategies() -> Vec<StrategyInfo> {
    Strategy::ALL
        .iter()
        .map(|s| StrategyInfo {
            id: s.id(),
            name: s.name(),
            description: s.describe(),
        })
        .collect()
}

pub fn show_stats(arena: &Arena, limit: u32) -> Result<Dashboard> {
    stats::dashboard(arena.store(), limit)
}

pub fn game_history(arena: &Arena, username: &str) -> Result<Vec<GameRecord>> {
    let user = arena
        .store()
        .find_user(username)?
        .ok_or_else(|| ArenaError::UnknownUser(username.trim().to_string()))?;
    arena.store().games_for_user(user.id)
}

/// Bot-vs-bot match under the configured rules; nothing is stored
pub fn simulate(arena: &Arena, player: Strategy, bot: Strategy) -> Result<MatchReplay> {
    let mut rng = match &arena.config().seed {
        Some(seed) => match_logic::SeededRng::new(seed, 0),
        None => match_logic::SeededRng::from_entropy(),
    };
    let replay = run_match(player, bot, arena.config().rules, &mut rng)?;
    info!(
        player = player.id(),
        bot = bot.id(),
        outcome = %replay.result.outcome,
        "simulated match"
    );
    Ok(replay)
}
