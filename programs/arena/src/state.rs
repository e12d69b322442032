//! Stored record definitions

use serde::{Deserialize, Serialize};

/// Row id in the `users` table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Row id in the `games` table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub i64);

/// A registered player
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: String,
}

/// One completed match
///
/// Strategy and result are kept as stored text so rows written by older
/// versions of the game still load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub user_id: UserId,
    pub opponent_strategy: String,
    pub user_score: u32,
    pub opponent_score: u32,
    pub result: String,
    pub played_at: String,
}
