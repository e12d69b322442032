use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use eye_arena::commands::{self, StrategyPick};
use eye_arena::{Arena, ArenaConfig, DEFAULT_DB_PATH, DEFAULT_TOP_PLAYERS};
use match_logic::{MatchPhase, MatchRules, Move, Strategy, TieRule, TitForTatRule, DEFAULT_ROUNDS};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Eye for an Eye: the iterated Prisoner's Dilemma against a bot", long_about = None)]
struct Args {
    /// SQLite database with players, games and open matches.
    #[arg(long, env = "ARENA_DB", default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Rounds per match.
    #[arg(long, env = "ARENA_ROUNDS", default_value_t = DEFAULT_ROUNDS)]
    rounds: u8,

    /// What Tit for Tat looks back at.
    #[arg(long = "tit-for-tat", env = "ARENA_TIT_FOR_TAT", value_enum, default_value_t = TitForTatArg::MirrorOpponent)]
    tit_for_tat: TitForTatArg,

    /// How a tied match is scored.
    #[arg(long, env = "ARENA_TIE_RULE", value_enum, default_value_t = TieArg::Draw)]
    tie: TieArg,

    /// 32-byte hex seed for reproducible bots (optional).
    #[arg(long, env = "ARENA_SEED")]
    seed: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TitForTatArg {
    MirrorOpponent,
    Forgiving,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TieArg {
    Draw,
    LossOnTie,
}

#[derive(ClapArgs, Debug)]
struct UserArg {
    #[arg(short, long)]
    user: String,
}

#[derive(ClapArgs, Debug)]
struct PickArgs {
    /// Bot strategy, by id or name (see `strategies`).
    #[arg(short, long, conflicts_with = "random_strategy")]
    strategy: Option<Strategy>,

    /// Let the arena pick the bot at random.
    #[arg(long)]
    random_strategy: bool,
}

impl PickArgs {
    fn pick(&self) -> StrategyPick {
        match self.strategy {
            Some(strategy) => StrategyPick::Named(strategy),
            None => StrategyPick::Random,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a whole match interactively.
    Play {
        #[command(flatten)]
        user: UserArg,
        #[command(flatten)]
        pick: PickArgs,
    },
    /// Open a match and wait for moves.
    Start {
        #[command(flatten)]
        user: UserArg,
        #[command(flatten)]
        pick: PickArgs,
    },
    /// Play one move in the open match.
    Move {
        #[command(flatten)]
        user: UserArg,
        /// `cooperate` (c) or `betray` (b).
        #[arg(value_name = "MOVE")]
        player_move: Move,
    },
    /// Show the open match.
    Status {
        #[command(flatten)]
        user: UserArg,
    },
    /// Drop the open match without recording it.
    Abandon {
        #[command(flatten)]
        user: UserArg,
    },
    /// List the bot strategies.
    Strategies,
    /// Leaderboard, strategy breakdown and bot wins per day.
    Stats {
        #[arg(long)]
        json: bool,
        #[arg(long, default_value_t = DEFAULT_TOP_PLAYERS)]
        limit: u32,
    },
    /// Recorded games of one player.
    History {
        #[command(flatten)]
        user: UserArg,
    },
    /// Play two bot strategies against each other.
    Simulate {
        #[arg(long)]
        player: Strategy,
        #[arg(long)]
        bot: Strategy,
        #[arg(long)]
        json: bool,
    },
    /// The shapes page.
    About,
}

fn build_config(args: &Args) -> Result<ArenaConfig> {
    let rules = MatchRules {
        rounds: args.rounds,
        tit_for_tat: match args.tit_for_tat {
            TitForTatArg::MirrorOpponent => TitForTatRule::MirrorOpponent,
            TitForTatArg::Forgiving => TitForTatRule::Forgiving,
        },
        tie: match args.tie {
            TieArg::Draw => TieRule::Draw,
            TieArg::LossOnTie => TieRule::LossOnTie,
        },
    };
    rules.validate().context("invalid --rounds")?;

    let config = ArenaConfig {
        db_path: args.db.clone(),
        rules,
        seed: None,
    }
    .with_seed_hex(args.seed.as_deref())
    .context("invalid --seed")?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_arena(config: ArenaConfig) -> Result<Arena> {
    let path = config.db_path.clone();
    Arena::open(config).with_context(|| format!("failed to open database {}", path.display()))
}

fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;

    match args.command {
        Command::Strategies => {
            for s in commands::list_strategies() {
                println!("{:<20} {:<24} {}", s.id, s.name, s.description);
            }
        }
        Command::About => print!("{}", commands::about_page().to_text()),
        Command::Play { user, pick } => {
            let mut arena = open_arena(config)?;
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            commands::play_interactive(&mut arena, &user.user, pick.pick(), stdin.lock(), &mut stdout)?;
            stdout.flush()?;
        }
        Command::Start { user, pick } => {
            let arena = open_arena(config)?;
            let state = commands::start_match(&arena, &user.user, pick.pick())?;
            if let Some(strategy) = state.strategy() {
                println!("Match started against {} ({} rounds).", strategy.name(), state.rules().rounds);
            }
        }
        Command::Move { user, player_move } => {
            let mut arena = open_arena(config)?;
            let played = commands::submit_move(&mut arena, &user.user, player_move)?;
            println!("{}", played.describe());
            if let Some(result) = &played.outcome.finished {
                println!("{}", commands::describe_result(result));
            }
        }
        Command::Status { user } => {
            let arena = open_arena(config)?;
            match commands::match_status(&arena, &user.user)? {
                Some(state) => {
                    let strategy = state.strategy().map(|s| s.name()).unwrap_or("?");
                    match state.phase() {
                        MatchPhase::InProgress { round } => println!(
                            "Against {}: round {}/{}, score {} : {}",
                            strategy,
                            round + 1,
                            state.rules().rounds,
                            state.self_score(),
                            state.opponent_score()
                        ),
                        phase => println!("Against {}: {:?}", strategy, phase),
                    }
                }
                None => println!("No open match."),
            }
        }
        Command::Abandon { user } => {
            let arena = open_arena(config)?;
            commands::abandon_match(&arena, &user.user)?;
            println!("Match abandoned.");
        }
        Command::Stats { json, limit } => {
            let arena = open_arena(config)?;
            let dashboard = commands::show_stats(&arena, limit)?;
            if json {
                print_json(&dashboard)?;
            } else {
                print!("{}", dashboard.to_table());
            }
        }
        Command::History { user } => {
            let arena = open_arena(config)?;
            for game in commands::game_history(&arena, &user.user)? {
                println!(
                    "{}  {:<20} {:>3} : {:<3} {}",
                    game.played_at, game.opponent_strategy, game.user_score, game.opponent_score, game.result
                );
            }
        }
        Command::Simulate { player, bot, json } => {
            let arena = open_arena(config)?;
            let replay = commands::simulate(&arena, player, bot)?;
            if json {
                print_json(&replay)?;
            } else {
                let rounds = arena.config().rules.rounds;
                for round in &replay.rounds {
                    println!("{}", commands::describe_round(round, rounds));
                }
                println!("{}", commands::describe_result(&replay.result));
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    run(Args::parse())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rule_options() {
        let args = Args::parse_from([
            "arena",
            "--rounds",
            "5",
            "--tit-for-tat",
            "forgiving",
            "--tie",
            "loss-on-tie",
            "strategies",
        ]);
        let config = build_config(&args).expect("config should parse");
        assert_eq!(config.rules.rounds, 5);
        assert_eq!(config.rules.tit_for_tat, TitForTatRule::Forgiving);
        assert_eq!(config.rules.tie, TieRule::LossOnTie);
    }

    #[test]
    fn rejects_zero_rounds() {
        let args = Args::parse_from(["arena", "--rounds", "0", "strategies"]);
        let err = build_config(&args).unwrap_err();
        assert!(err.to_string().contains("rounds"), "unexpected error: {err}");
    }

    #[test]
    fn parses_strategy_and_move_names() {
        let args = Args::parse_from(["arena", "start", "--user", "alice", "--strategy", "tit-for-tat"]);
        match args.command {
            Command::Start { pick, .. } => assert_eq!(pick.pick(), StrategyPick::Named(Strategy::TitForTat)),
            other => panic!("unexpected command {:?}", other),
        }

        let args = Args::parse_from(["arena", "move", "--user", "alice", "b"]);
        match args.command {
            Command::Move { player_move, .. } => assert_eq!(player_move, Move::Betray),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn listing_commands_never_open_the_database() {
        for command in ["strategies", "about"] {
            let args = Args::parse_from(["arena", "--db", "/nonexistent/dir/arena.db", command]);
            run(args).expect("no database needed");
        }

        let args = Args::parse_from(["arena", "--db", "/nonexistent/dir/arena.db", "stats"]);
        let err = run(args).unwrap_err();
        assert!(err.to_string().contains("failed to open database"), "{err}");
    }

    #[test]
    fn unknown_strategy_is_a_parse_error() {
        let res = Args::try_parse_from(["arena", "start", "--user", "a", "--strategy", "grudger"]);
        assert!(res.is_err());
    }
}
