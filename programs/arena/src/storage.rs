//! SQLite persistence for users, completed games and open sessions

use std::path::Path;

use match_logic::{MatchResult, MatchState};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::{ArenaError, Result};
use crate::state::{GameId, GameRecord, User, UserId};

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        debug!(path = %path.display(), "opened game database");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Look up a player by name, registering them on first sight
    pub fn get_or_create_user(&self, username: &str) -> Result<UserId> {
        let username = normalize_username(username)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO users (username) VALUES (?1)",
            params![username],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM users WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )?;
        Ok(UserId(id))
    }

    pub fn find_user(&self, username: &str) -> Result<Option<User>> {
        let username = normalize_username(username)?;
        let user = self
            .conn
            .query_row(
                "SELECT id, username, created_at FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(User {
                        id: UserId(row.get(0)?),
                        username: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    pub fn record_game(&self, user: UserId, result: &MatchResult) -> Result<GameId> {
        insert_game(&self.conn, user, result)
    }

    /// Store the result and drop the open session in one transaction
    pub fn finish_match(&mut self, user: UserId, result: &MatchResult) -> Result<GameId> {
        let tx = self.conn.transaction()?;
        let id = insert_game(&tx, user, result)?;
        tx.execute("DELETE FROM sessions WHERE user_id = ?1", params![user.0])?;
        tx.commit()?;
        Ok(id)
    }

    /// Completed games of one player, oldest first
    pub fn games_for_user(&self, user: UserId) -> Result<Vec<GameRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, opponent_strategy, user_score, opponent_score, result, played_at
             FROM games WHERE user_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![user.0], |row| {
            Ok(GameRecord {
                id: GameId(row.get(0)?),
                user_id: UserId(row.get(1)?),
                opponent_strategy: row.get(2)?,
                user_score: row.get(3)?,
                opponent_score: row.get(4)?,
                result: row.get(5)?,
                played_at: row.get(6)?,
            })
        })?;

        let mut games = Vec::new();
        for row in rows {
            games.push(row?);
        }
        Ok(games)
    }

    pub fn games_played(&self, user: UserId) -> Result<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM games WHERE user_id = ?1",
            params![user.0],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn load_session(&self, user: UserId) -> Result<Option<MatchState>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT state FROM sessions WHERE user_id = ?1",
                params![user.0],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn save_session(&self, user: UserId, state: &MatchState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.conn.execute(
            "INSERT INTO sessions (user_id, state, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(user_id) DO UPDATE SET state = excluded.state, updated_at = CURRENT_TIMESTAMP",
            params![user.0, json],
        )?;
        Ok(())
    }

    /// Returns whether a session was open
    pub fn clear_session(&self, user: UserId) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM sessions WHERE user_id = ?1", params![user.0])?;
        Ok(removed > 0)
    }
}

fn normalize_username(username: &str) -> Result<&str> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ArenaError::EmptyUsername);
    }
    Ok(username)
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         CREATE TABLE IF NOT EXISTS users (
             id INTEGER PRIMARY KEY,
             username TEXT UNIQUE NOT NULL,
             created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
         );
         CREATE TABLE IF NOT EXISTS games (
             id INTEGER PRIMARY KEY,
             user_id INTEGER NOT NULL REFERENCES users(id),
             opponent_strategy TEXT NOT NULL,
             user_score INTEGER NOT NULL,
             opponent_score INTEGER NOT NULL,
             result TEXT NOT NULL,
             played_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
         );
         CREATE TABLE IF NOT EXISTS sessions (
             user_id INTEGER PRIMARY KEY REFERENCES users(id),
             state TEXT NOT NULL,
             updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
         );",
    )?;
    Ok(())
}

fn insert_game(conn: &Connection, user: UserId, result: &MatchResult) -> Result<GameId> {
    conn.execute(
        "INSERT INTO games (user_id, opponent_strategy, user_score, opponent_score, result)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.0,
            result.strategy.id(),
            result.self_score,
            result.opponent_score,
            result.outcome.as_str(),
        ],
    )?;
    Ok(GameId(conn.last_insert_rowid()))
}
