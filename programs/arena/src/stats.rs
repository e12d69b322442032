//! Statistics views over completed games
//!
//! Three views are offered: a leaderboard, a per-strategy breakdown and the
//! bot's wins per day. A game counts as a bot win when the stored result is
//! `loss`; draws count for neither side.

use std::fmt;

use rusqlite::params;
use serde::Serialize;

use crate::error::Result;
use crate::storage::Store;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopPlayer {
    pub username: String,
    pub total_score: i64,
    pub games: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StrategyStats {
    pub strategy: String,
    pub avg_user_score: f64,
    pub games: u32,
    pub bot_wins: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyBotWins {
    pub day: String,
    pub bot_wins: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dashboard {
    pub top_players: Vec<TopPlayer>,
    pub strategies: Vec<StrategyStats>,
    pub bot_wins_by_day: Vec<DailyBotWins>,
}

/// Players ranked by total score, best first
pub fn top_players(store: &Store, limit: u32) -> Result<Vec<TopPlayer>> {
    let mut stmt = store.conn().prepare(
        "SELECT u.username, SUM(g.user_score), COUNT(g.id)
         FROM games g
         JOIN users u ON g.user_id = u.id
         GROUP BY u.id
         ORDER BY SUM(g.user_score) DESC, u.username ASC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok(TopPlayer {
            username: row.get(0)?,
            total_score: row.get(1)?,
            games: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn strategy_breakdown(store: &Store) -> Result<Vec<StrategyStats>> {
    let mut stmt = store.conn().prepare(
        "SELECT opponent_strategy,
                AVG(user_score),
                COUNT(*),
                SUM(CASE WHEN result = 'loss' THEN 1 ELSE 0 END)
         FROM games
         GROUP BY opponent_strategy
         ORDER BY opponent_strategy ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(StrategyStats {
            strategy: row.get(0)?,
            avg_user_score: row.get(1)?,
            games: row.get(2)?,
            bot_wins: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn bot_wins_by_day(store: &Store) -> Result<Vec<DailyBotWins>> {
    let mut stmt = store.conn().prepare(
        "SELECT date(played_at) AS day,
                SUM(CASE WHEN result = 'loss' THEN 1 ELSE 0 END)
         FROM games
         GROUP BY day
         ORDER BY day ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(DailyBotWins {
            day: row.get(0)?,
            bot_wins: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn dashboard(store: &Store, limit: u32) -> Result<Dashboard> {
    Ok(Dashboard {
        top_players: top_players(store, limit)?,
        strategies: strategy_breakdown(store)?,
        bot_wins_by_day: bot_wins_by_day(store)?,
    })
}

impl Dashboard {
    /// Plain-text rendering with one aligned table per view
    pub fn to_table(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Top players by score")?;
        writeln!(f, "{:<20} {:>8} {:>6}", "Player", "Score", "Games")?;
        for p in &self.top_players {
            writeln!(f, "{:<20} {:>8} {:>6}", p.username, p.total_score, p.games)?;
        }
        if self.top_players.is_empty() {
            writeln!(f, "(no games yet)")?;
        }

        writeln!(f)?;
        writeln!(f, "Strategies")?;
        writeln!(
            f,
            "{:<22} {:>10} {:>6} {:>9}",
            "Strategy", "Avg score", "Games", "Bot wins"
        )?;
        for s in &self.strategies {
            writeln!(
                f,
                "{:<22} {:>10.2} {:>6} {:>9}",
                s.strategy, s.avg_user_score, s.games, s.bot_wins
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Bot wins by day")?;
        for d in &self.bot_wins_by_day {
            writeln!(f, "{:<12} {:>4}", d.day, d.bot_wins)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use match_logic::{MatchResult, Outcome, Strategy};

    fn record(store: &Store, user: &str, strategy: Strategy, score: (u32, u32), outcome: Outcome) {
        let id = store.get_or_create_user(user).unwrap();
        store
            .record_game(
                id,
                &MatchResult {
                    strategy,
                    self_score: score.0,
                    opponent_score: score.1,
                    outcome,
                },
            )
            .unwrap();
    }

    fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        record(&store, "alice", Strategy::TitForTat, (30, 30), Outcome::Draw);
        record(&store, "alice", Strategy::AlwaysCooperate, (50, 0), Outcome::Win);
        record(&store, "bob", Strategy::AlwaysBetray, (0, 50), Outcome::Loss);
        record(&store, "bob", Strategy::TitForTat, (9, 14), Outcome::Loss);
        record(&store, "carol", Strategy::TitForTat, (30, 30), Outcome::Loss);
        store
    }

    #[test]
    fn top_players_ranked_by_total() {
        let store = seeded_store();
        let top = top_players(&store, 10).unwrap();

        let names: Vec<_> = top.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, ["alice", "carol", "bob"]);
        assert_eq!(top[0].total_score, 80);
        assert_eq!(top[0].games, 2);
        assert_eq!(top[2].total_score, 9);

        assert_eq!(top_players(&store, 1).unwrap().len(), 1);
    }

    #[test]
    fn strategy_breakdown_counts_bot_wins() {
        let store = seeded_store();
        let stats = strategy_breakdown(&store).unwrap();

        let tft = stats.iter().find(|s| s.strategy == "TitForTat").unwrap();
        assert_eq!(tft.games, 3);
        assert_eq!(tft.bot_wins, 2);
        assert!((tft.avg_user_score - 23.0).abs() < 1e-9);

        let betray = stats.iter().find(|s| s.strategy == "AlwaysBetray").unwrap();
        assert_eq!((betray.games, betray.bot_wins), (1, 1));

        let coop = stats.iter().find(|s| s.strategy == "AlwaysCooperate").unwrap();
        assert_eq!(coop.bot_wins, 0);
    }

    #[test]
    fn bot_wins_grouped_per_day() {
        let store = seeded_store();
        store
            .conn()
            .execute("UPDATE games SET played_at = '2024-03-01 10:00:00' WHERE id <= 2", [])
            .unwrap();
        store
            .conn()
            .execute("UPDATE games SET played_at = '2024-03-02 18:30:00' WHERE id > 2", [])
            .unwrap();

        let days = bot_wins_by_day(&store).unwrap();
        assert_eq!(
            days,
            vec![
                DailyBotWins { day: "2024-03-01".into(), bot_wins: 0 },
                DailyBotWins { day: "2024-03-02".into(), bot_wins: 3 },
            ]
        );
    }

    #[test]
    fn empty_dashboard_renders() {
        let store = Store::open_in_memory().unwrap();
        let dashboard = dashboard(&store, 10).unwrap();
        assert!(dashboard.top_players.is_empty());
        assert!(dashboard.to_table().contains("(no games yet)"));
    }

    #[test]
    fn dashboard_table_lists_every_view() {
        let store = seeded_store();
        let table = dashboard(&store, 10).unwrap().to_table();
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines[0], "Top players by score");
        assert!(lines[2].starts_with("alice"), "{table}");
        assert!(lines[2].trim_end().ends_with("80      2"), "{table}");
        assert!(table.contains("TitForTat"));
        assert!(table.contains("Bot wins by day"));
        assert!(!table.contains("(no games yet)"));
    }

    #[test]
    fn dashboard_serializes() {
        let store = seeded_store();
        let json = serde_json::to_value(dashboard(&store, 10).unwrap()).unwrap();
        assert_eq!(json["top_players"][0]["username"], "alice");
        assert_eq!(json["strategies"].as_array().unwrap().len(), 3);
    }
}
