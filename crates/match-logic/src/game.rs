//! Match execution engine
//!
//! A [`MatchState`] is owned by whoever drives the match (an interactive
//! session, a stored web session, a replay) and is advanced one round at a
//! time with [`MatchState::submit_move`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::payoff;
use crate::strategy::{execute_strategy, Move, Strategy, TitForTatRule};

/// Rounds per match
pub const DEFAULT_ROUNDS: u8 = 10;

/// How a tied final score is reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieRule {
    /// Equal scores are a draw.
    #[default]
    Draw,
    /// Legacy scoring: anything but a strict win is a loss.
    LossOnTie,
}

/// Final outcome from the human player's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Draw => "draw",
        }
    }

    /// Compare final scores under the given tie rule
    pub fn decide(self_score: u32, opponent_score: u32, tie: TieRule) -> Self {
        match self_score.cmp(&opponent_score) {
            core::cmp::Ordering::Greater => Outcome::Win,
            core::cmp::Ordering::Less => Outcome::Loss,
            core::cmp::Ordering::Equal => match tie {
                TieRule::Draw => Outcome::Draw,
                TieRule::LossOnTie => Outcome::Loss,
            },
        }
    }
}

impl core::fmt::Display for Outcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration shared by every match
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRules {
    pub rounds: u8,
    pub tit_for_tat: TitForTatRule,
    pub tie: TieRule,
}

impl MatchRules {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.rounds == 0 {
            return Err(EngineError::InvalidRules);
        }
        Ok(())
    }
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            tit_for_tat: TitForTatRule::default(),
            tie: TieRule::default(),
        }
    }
}

/// Result of a complete match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub strategy: Strategy,
    pub self_score: u32,
    pub opponent_score: u32,
    pub outcome: Outcome,
}

/// Result of a single round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// Zero-based index of the round just played
    pub round: u8,
    pub player_move: Move,
    pub bot_move: Move,
    pub self_score_delta: u8,
    pub opponent_score_delta: u8,
    pub self_score: u32,
    pub opponent_score: u32,
    /// Set on the final round only
    pub finished: Option<MatchResult>,
}

impl RoundOutcome {
    pub fn is_match_finished(&self) -> bool {
        self.finished.is_some()
    }
}

/// Where a match is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchPhase {
    AwaitingStrategy,
    InProgress { round: u8 },
    Finished,
}

/// Live state of one match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredMatchState")]
pub struct MatchState {
    rules: MatchRules,
    strategy: Option<Strategy>,
    round: u8,
    self_score: u32,
    opponent_score: u32,
    self_history: Vec<Move>,
    opponent_history: Vec<Move>,
    result: Option<MatchResult>,
}

/// Wire form of [`MatchState`], checked before it becomes live again
#[derive(Deserialize)]
struct StoredMatchState {
    rules: MatchRules,
    strategy: Option<Strategy>,
    round: u8,
    self_score: u32,
    opponent_score: u32,
    self_history: Vec<Move>,
    opponent_history: Vec<Move>,
    result: Option<MatchResult>,
}

impl TryFrom<StoredMatchState> for MatchState {
    type Error = EngineError;

    fn try_from(stored: StoredMatchState) -> Result<Self, Self::Error> {
        stored.rules.validate()?;
        let round = stored.round as usize;
        let aligned = stored.self_history.len() == round && stored.opponent_history.len() == round;
        let finished = stored.round == stored.rules.rounds;
        if !aligned
            || stored.round > stored.rules.rounds
            || finished != stored.result.is_some()
            || (stored.strategy.is_none() && stored.round > 0)
        {
            return Err(EngineError::InconsistentState);
        }

        let (self_score, opponent_score) = stored
            .self_history
            .iter()
            .zip(&stored.opponent_history)
            .fold((0u32, 0u32), |(mine, theirs), (&player, &bot)| {
                let (a, b) = payoff(player, bot);
                (mine + a as u32, theirs + b as u32)
            });
        if self_score != stored.self_score || opponent_score != stored.opponent_score {
            return Err(EngineError::InconsistentState);
        }

        if let Some(result) = &stored.result {
            let expected = MatchResult {
                strategy: stored.strategy.ok_or(EngineError::InconsistentState)?,
                self_score,
                opponent_score,
                outcome: Outcome::decide(self_score, opponent_score, stored.rules.tie),
            };
            if *result != expected {
                return Err(EngineError::InconsistentState);
            }
        }

        Ok(Self {
            rules: stored.rules,
            strategy: stored.strategy,
            round: stored.round,
            self_score: stored.self_score,
            opponent_score: stored.opponent_score,
            self_history: stored.self_history,
            opponent_history: stored.opponent_history,
            result: stored.result,
        })
    }
}

impl MatchState {
    /// Create an unbound match
    pub fn new(rules: MatchRules) -> Result<Self, EngineError> {
        rules.validate()?;
        Ok(Self {
            rules,
            strategy: None,
            round: 0,
            self_score: 0,
            opponent_score: 0,
            self_history: Vec::with_capacity(rules.rounds as usize),
            opponent_history: Vec::with_capacity(rules.rounds as usize),
            result: None,
        })
    }

    /// Create a match already bound to `strategy`
    pub fn with_strategy(rules: MatchRules, strategy: Strategy) -> Result<Self, EngineError> {
        let mut state = Self::new(rules)?;
        state.bind_strategy(strategy)?;
        Ok(state)
    }

    pub fn bind_strategy(&mut self, strategy: Strategy) -> Result<(), EngineError> {
        if self.strategy.is_some() {
            return Err(EngineError::StrategyAlreadyBound);
        }
        self.strategy = Some(strategy);
        Ok(())
    }

    /// Bind a strategy drawn uniformly from the table
    pub fn bind_random_strategy<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Strategy, EngineError> {
        if self.strategy.is_some() {
            return Err(EngineError::StrategyAlreadyBound);
        }
        let strategy = Strategy::random(rng);
        self.strategy = Some(strategy);
        Ok(strategy)
    }

    pub fn phase(&self) -> MatchPhase {
        match (self.strategy, &self.result) {
            (None, _) => MatchPhase::AwaitingStrategy,
            (Some(_), Some(_)) => MatchPhase::Finished,
            (Some(_), None) => MatchPhase::InProgress { round: self.round },
        }
    }

    /// Play one round against the bound bot strategy.
    ///
    /// The bot decides from the histories before this round, so it never
    /// sees `player_move`. Errors leave the state untouched.
    pub fn submit_move<R: Rng + ?Sized>(
        &mut self,
        player_move: Move,
        rng: &mut R,
    ) -> Result<RoundOutcome, EngineError> {
        let strategy = match self.phase() {
            MatchPhase::AwaitingStrategy => return Err(EngineError::StrategyNotBound),
            MatchPhase::Finished => return Err(EngineError::MatchFinished),
            MatchPhase::InProgress { .. } => self.strategy.ok_or(EngineError::StrategyNotBound)?,
        };

        // The bot's "opponent" is the human player
        let bot_move = execute_strategy(
            strategy,
            self.rules.tit_for_tat,
            &self.self_history,
            &self.opponent_history,
            rng,
        )?;

        let (self_delta, opponent_delta) = payoff(player_move, bot_move);
        let round = self.round;

        self.self_history.push(player_move);
        self.opponent_history.push(bot_move);
        self.self_score += self_delta as u32;
        self.opponent_score += opponent_delta as u32;
        self.round += 1;

        if self.round == self.rules.rounds {
            self.result = Some(MatchResult {
                strategy,
                self_score: self.self_score,
                opponent_score: self.opponent_score,
                outcome: Outcome::decide(self.self_score, self.opponent_score, self.rules.tie),
            });
        }

        Ok(RoundOutcome {
            round,
            player_move,
            bot_move,
            self_score_delta: self_delta,
            opponent_score_delta: opponent_delta,
            self_score: self.self_score,
            opponent_score: self.opponent_score,
            finished: self.result.clone(),
        })
    }

    /// Final result, available once the match is finished
    pub fn result(&self) -> Option<&MatchResult> {
        self.result.as_ref()
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    pub fn strategy(&self) -> Option<Strategy> {
        self.strategy
    }

    /// Number of rounds already played
    pub fn round(&self) -> u8 {
        self.round
    }

    pub fn rounds_remaining(&self) -> u8 {
        self.rules.rounds.saturating_sub(self.round)
    }

    pub fn self_score(&self) -> u32 {
        self.self_score
    }

    pub fn opponent_score(&self) -> u32 {
        self.opponent_score
    }

    pub fn self_history(&self) -> &[Move] {
        &self.self_history
    }

    pub fn opponent_history(&self) -> &[Move] {
        &self.opponent_history
    }
}

/// A complete bot-vs-bot match, round by round
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchReplay {
    pub player: Strategy,
    pub rounds: Vec<RoundOutcome>,
    pub result: MatchResult,
}

/// Run a complete match where the human side is played by `player`.
///
/// # Arguments
/// * `player` - Strategy standing in for the human
/// * `bot` - The bot strategy the match is bound to
/// * `rules` - Match configuration
/// * `rng` - Shared random source (player draws first each round)
///
/// # Returns
/// Complete match replay with round-by-round details
pub fn run_match<R: Rng + ?Sized>(
    player: Strategy,
    bot: Strategy,
    rules: MatchRules,
    rng: &mut R,
) -> Result<MatchReplay, EngineError> {
    let mut state = MatchState::with_strategy(rules, bot)?;
    let mut rounds = Vec::with_capacity(rules.rounds as usize);

    loop {
        let player_move = execute_strategy(
            player,
            rules.tit_for_tat,
            state.opponent_history(),
            state.self_history(),
            rng,
        )?;
        let outcome = state.submit_move(player_move, rng)?;
        let finished = outcome.finished.clone();
        rounds.push(outcome);

        if let Some(result) = finished {
            return Ok(MatchReplay { player, rounds, result });
        }
    }
}
