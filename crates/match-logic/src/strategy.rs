//! Strategy definitions and execution

use core::fmt;
use core::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Cooperate,
    Betray,
}

impl Move {
    pub fn as_str(&self) -> &'static str {
        match self {
            Move::Cooperate => "cooperate",
            Move::Betray => "betray",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Move {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "cooperate" => Ok(Move::Cooperate),
            "b" | "betray" => Ok(Move::Betray),
            _ => Err(EngineError::UnknownMove(s.to_string())),
        }
    }
}

/// Bot strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Always cooperate, never betray.
    AlwaysCooperate,
    /// Always betray, never cooperate.
    AlwaysBetray,
    /// Coin flip each round.
    Random,
    /// Start with cooperate; see [`TitForTatRule`] for what follows.
    TitForTat,
    /// Tit-for-Tat but start with betray.
    SuspiciousTitForTat,
}

impl Strategy {
    /// The full strategy table, in menu order
    pub const ALL: [Strategy; 5] = [
        Strategy::AlwaysCooperate,
        Strategy::AlwaysBetray,
        Strategy::Random,
        Strategy::TitForTat,
        Strategy::SuspiciousTitForTat,
    ];

    /// Stable identifier, also the value stored with recorded games
    pub fn id(&self) -> &'static str {
        match self {
            Strategy::AlwaysCooperate => "AlwaysCooperate",
            Strategy::AlwaysBetray => "AlwaysBetray",
            Strategy::Random => "Random",
            Strategy::TitForTat => "TitForTat",
            Strategy::SuspiciousTitForTat => "SuspiciousTitForTat",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::AlwaysCooperate => "Always Cooperate",
            Strategy::AlwaysBetray => "Always Betray",
            Strategy::Random => "Random",
            Strategy::TitForTat => "Tit for Tat",
            Strategy::SuspiciousTitForTat => "Suspicious Tit for Tat",
        }
    }

    /// Human-readable description of the strategy
    pub fn describe(&self) -> &'static str {
        match self {
            Strategy::AlwaysCooperate => "Never betrays. Always cooperates.",
            Strategy::AlwaysBetray => "Never cooperates. Always betrays.",
            Strategy::Random => "Randomly cooperates or betrays each round.",
            Strategy::TitForTat => "Starts by cooperating, then answers in kind.",
            Strategy::SuspiciousTitForTat => {
                "Like Tit for Tat, but opens with a betrayal."
            }
        }
    }

    /// Draw a strategy uniformly from the table
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Strategy {
    type Err = EngineError;

    /// Accepts the id (`TitForTat`), the display name (`Tit for Tat`) or a
    /// kebab-case form (`tit-for-tat`), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = fold_name(s);
        Strategy::ALL
            .into_iter()
            .find(|strategy| fold_name(strategy.id()) == wanted)
            .ok_or_else(|| EngineError::UnknownStrategy(s.to_string()))
    }
}

fn fold_name(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Which history Tit-for-Tat looks back at.
///
/// Two revisions of the game disagree here, so both are kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TitForTatRule {
    /// Cooperate first, then copy the opponent's previous move.
    #[default]
    MirrorOpponent,
    /// Cooperate unless our own last two moves were both betray.
    Forgiving,
}

/// Execute a strategy for one round
///
/// # Arguments
/// * `strategy` - The strategy to execute
/// * `rule` - Tit-for-Tat lookback rule
/// * `opponent_history` - Opponent's past moves
/// * `my_history` - Our past moves
/// * `rng` - Random source, consumed only by [`Strategy::Random`]
///
/// # Errors
/// [`EngineError::HistoryMismatch`] if the histories are not aligned.
pub fn execute_strategy<R: Rng + ?Sized>(
    strategy: Strategy,
    rule: TitForTatRule,
    opponent_history: &[Move],
    my_history: &[Move],
    rng: &mut R,
) -> Result<Move, EngineError> {
    if opponent_history.len() != my_history.len() {
        return Err(EngineError::HistoryMismatch {
            own: my_history.len(),
            opponent: opponent_history.len(),
        });
    }

    let next = match strategy {
        Strategy::AlwaysCooperate => Move::Cooperate,
        Strategy::AlwaysBetray => Move::Betray,
        Strategy::Random => execute_random(rng),
        Strategy::TitForTat => match rule {
            TitForTatRule::MirrorOpponent => execute_tit_for_tat(opponent_history),
            TitForTatRule::Forgiving => execute_forgiving_tit_for_tat(my_history),
        },
        Strategy::SuspiciousTitForTat => {
            execute_suspicious_tit_for_tat(opponent_history, my_history)
        }
    };

    Ok(next)
}

/// Tit-for-Tat: copy opponent's last move, start with cooperate
fn execute_tit_for_tat(opponent_history: &[Move]) -> Move {
    opponent_history.last().copied().unwrap_or(Move::Cooperate)
}

/// Forgiving Tit-for-Tat: betray only after two betrayals of our own
fn execute_forgiving_tit_for_tat(my_history: &[Move]) -> Move {
    match my_history {
        [.., Move::Betray, Move::Betray] => Move::Betray,
        _ => Move::Cooperate,
    }
}

/// Suspicious Tit-for-Tat: opens with betray while our own history is empty
fn execute_suspicious_tit_for_tat(opponent_history: &[Move], my_history: &[Move]) -> Move {
    if my_history.is_empty() {
        return Move::Betray;
    }
    opponent_history.last().copied().unwrap_or(Move::Betray)
}

fn execute_random<R: Rng + ?Sized>(rng: &mut R) -> Move {
    if rng.gen_bool(0.5) {
        Move::Cooperate
    } else {
        Move::Betray
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRng;

    fn make_rng() -> SeededRng {
        SeededRng::new(&[42u8; 32], 0)
    }

    fn run(strategy: Strategy, opponent: &[Move], mine: &[Move]) -> Move {
        execute_strategy(strategy, TitForTatRule::default(), opponent, mine, &mut make_rng())
            .unwrap()
    }

    #[test]
    fn test_tit_for_tat_first_move() {
        assert_eq!(run(Strategy::TitForTat, &[], &[]), Move::Cooperate);
    }

    #[test]
    fn test_tit_for_tat_copies() {
        let m = run(Strategy::TitForTat, &[Move::Cooperate], &[Move::Cooperate]);
        assert_eq!(m, Move::Cooperate);

        let m = run(Strategy::TitForTat, &[Move::Betray], &[Move::Cooperate]);
        assert_eq!(m, Move::Betray);

        let m = run(
            Strategy::TitForTat,
            &[Move::Betray, Move::Cooperate],
            &[Move::Cooperate, Move::Betray],
        );
        assert_eq!(m, Move::Cooperate);
    }

    #[test]
    fn test_forgiving_tit_for_tat() {
        let mut rng = make_rng();
        let forgiving = |opp: &[Move], mine: &[Move], rng: &mut SeededRng| {
            execute_strategy(Strategy::TitForTat, TitForTatRule::Forgiving, opp, mine, rng)
                .unwrap()
        };

        assert_eq!(forgiving(&[], &[], &mut rng), Move::Cooperate);
        // Ignores the opponent entirely
        assert_eq!(
            forgiving(&[Move::Betray, Move::Betray], &[Move::Cooperate, Move::Cooperate], &mut rng),
            Move::Cooperate
        );
        assert_eq!(
            forgiving(&[Move::Cooperate, Move::Cooperate], &[Move::Cooperate, Move::Betray], &mut rng),
            Move::Cooperate
        );
        assert_eq!(
            forgiving(
                &[Move::Cooperate, Move::Cooperate, Move::Cooperate],
                &[Move::Cooperate, Move::Betray, Move::Betray],
                &mut rng
            ),
            Move::Betray
        );
    }

    #[test]
    fn test_always_betray() {
        let mut rng = make_rng();
        let mut opp = Vec::new();
        let mut mine = Vec::new();
        for _ in 0..10 {
            let m = execute_strategy(
                Strategy::AlwaysBetray,
                TitForTatRule::default(),
                &opp,
                &mine,
                &mut rng,
            )
            .unwrap();
            assert_eq!(m, Move::Betray);
            opp.push(Move::Cooperate);
            mine.push(m);
        }
    }

    #[test]
    fn test_always_cooperate() {
        assert_eq!(run(Strategy::AlwaysCooperate, &[], &[]), Move::Cooperate);
        assert_eq!(
            run(Strategy::AlwaysCooperate, &[Move::Betray], &[Move::Cooperate]),
            Move::Cooperate
        );
    }

    #[test]
    fn test_suspicious_tft_starts_betray() {
        assert_eq!(run(Strategy::SuspiciousTitForTat, &[], &[]), Move::Betray);
    }

    #[test]
    fn test_suspicious_tft_mirrors_after_first_round() {
        let m = run(Strategy::SuspiciousTitForTat, &[Move::Cooperate], &[Move::Betray]);
        assert_eq!(m, Move::Cooperate);

        let m = run(
            Strategy::SuspiciousTitForTat,
            &[Move::Cooperate, Move::Betray],
            &[Move::Betray, Move::Cooperate],
        );
        assert_eq!(m, Move::Betray);
    }

    #[test]
    fn test_random_produces_both_moves() {
        let mut rng = make_rng();
        let moves: Vec<_> = (0..64)
            .map(|_| {
                execute_strategy(Strategy::Random, TitForTatRule::default(), &[], &[], &mut rng)
                    .unwrap()
            })
            .collect();
        assert!(moves.contains(&Move::Cooperate));
        assert!(moves.contains(&Move::Betray));
    }

    #[test]
    fn test_random_is_reproducible() {
        let draw = || {
            let mut rng = make_rng();
            (0..20)
                .map(|_| {
                    execute_strategy(Strategy::Random, TitForTatRule::default(), &[], &[], &mut rng)
                        .unwrap()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(), draw());
    }

    #[test]
    fn test_mismatched_histories_rejected() {
        for strategy in Strategy::ALL {
            let err = execute_strategy(
                strategy,
                TitForTatRule::default(),
                &[Move::Cooperate],
                &[],
                &mut make_rng(),
            )
            .unwrap_err();
            assert_eq!(err, EngineError::HistoryMismatch { own: 0, opponent: 1 });
        }
    }

    #[test]
    fn test_strategy_names_parse() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.id().parse::<Strategy>().unwrap(), strategy);
            assert_eq!(strategy.name().parse::<Strategy>().unwrap(), strategy);
        }
        assert_eq!("tit-for-tat".parse::<Strategy>().unwrap(), Strategy::TitForTat);
        assert_eq!(
            "suspicious_tit_for_tat".parse::<Strategy>().unwrap(),
            Strategy::SuspiciousTitForTat
        );
        assert_eq!(
            "Grudger".parse::<Strategy>().unwrap_err(),
            EngineError::UnknownStrategy("Grudger".to_string())
        );
    }

    #[test]
    fn test_move_parse() {
        assert_eq!("c".parse::<Move>().unwrap(), Move::Cooperate);
        assert_eq!(" Betray ".parse::<Move>().unwrap(), Move::Betray);
        assert!(matches!("x".parse::<Move>(), Err(EngineError::UnknownMove(_))));
    }

    #[test]
    fn test_random_strategy_draw_covers_table() {
        let mut rng = make_rng();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(Strategy::random(&mut rng));
        }
        assert_eq!(seen.len(), Strategy::ALL.len());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Move::Betray).unwrap(), "\"betray\"");
        assert_eq!(serde_json::to_string(&Strategy::TitForTat).unwrap(), "\"TitForTat\"");
        assert_eq!(
            serde_json::to_string(&TitForTatRule::MirrorOpponent).unwrap(),
            "\"mirror-opponent\""
        );
    }
}
