//! Runtime configuration

use std::path::PathBuf;

use match_logic::{parse_seed, MatchRules};

use crate::error::{ArenaError, Result};

/// Database file used when none is given
pub const DEFAULT_DB_PATH: &str = "game_stats.db";

/// Rows shown in the top players view
pub const DEFAULT_TOP_PLAYERS: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// SQLite database holding users, games and open sessions
    pub db_path: PathBuf,
    /// Rules applied to every new match
    pub rules: MatchRules,
    /// Fixed seed for reproducible bots; OS entropy when unset
    pub seed: Option<[u8; 32]>,
}

impl ArenaConfig {
    pub fn with_seed_hex(mut self, hex: Option<&str>) -> Result<Self> {
        self.seed = match hex {
            Some(hex) => Some(parse_seed(hex).ok_or(ArenaError::InvalidSeed)?),
            None => None,
        };
        Ok(self)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            rules: MatchRules::default(),
            seed: None,
        }
    }
}
