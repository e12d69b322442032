//! Eye for an Eye - Iterated Prisoner's Dilemma against a bot
//!
//! Players pick (or are dealt) a bot strategy and play a fixed number of
//! rounds. Each player's in-progress match is kept in SQLite between
//! moves, finished matches are recorded, and the records feed the
//! statistics views.

mod config;
mod error;
mod state;
mod storage;

pub mod commands;
pub mod stats;

pub use config::{ArenaConfig, DEFAULT_DB_PATH, DEFAULT_TOP_PLAYERS};
pub use error::{ArenaError, Result};
pub use state::{GameId, GameRecord, User, UserId};
pub use storage::Store;

use match_logic::SeededRng;

/// Storage plus configuration, passed to every command handler
pub struct Arena {
    store: Store,
    config: ArenaConfig,
}

impl Arena {
    pub fn new(store: Store, config: ArenaConfig) -> Self {
        Self { store, config }
    }

    /// Open the configured database file
    pub fn open(config: ArenaConfig) -> Result<Self> {
        config.rules.validate()?;
        let store = Store::open(&config.db_path)?;
        Ok(Self::new(store, config))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Random source for one decision of one match.
    ///
    /// With a configured seed every (user, match, round) triple reads its
    /// own stream, so replays are exact even though each move may arrive in
    /// a separate process. The user id is folded into the key and the match
    /// and round select the stream within it.
    pub(crate) fn rng_for(&self, user: UserId, match_index: u32, round: u8) -> SeededRng {
        match &self.config.seed {
            Some(seed) => {
                let mut key = *seed;
                for (byte, id) in key.iter_mut().zip(user.0.to_le_bytes()) {
                    *byte ^= id;
                }
                let stream = (u64::from(match_index) << 8) | u64::from(round);
                SeededRng::new(&key, stream)
            }
            None => SeededRng::from_entropy(),
        }
    }
}
