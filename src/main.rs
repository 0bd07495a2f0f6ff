//! Fairodds CLI
//!
//! Plays single rounds, runs return-to-player simulations, verifies fairness
//! proofs and writes a sample configuration file.

use clap::{Parser, Subcommand, ValueEnum};
use fairodds::{
    config::{generate_sample_config, ConfigLoader},
    errors::EngineResult,
    games::{
        coinflip::{CoinFlipParams, CoinSide},
        crash::CrashParams,
        dice::DiceParams,
        dragon_tower::{Difficulty, TowerParams},
        mines::MinesParams,
        plinko::PlinkoParams,
        rps::{RpsParams, Throw},
        simulation::{check_strategy, next_action, simulate, Strategy},
        wheel::WheelParams,
    },
    AccountStore, EngineConfig, FairnessEngine, FairnessProof, GameConfig, GameParams,
    GameError, GameProcessor, InMemoryAccounts, RandomSource, ResolvedRound, RiskTier,
    SessionState, StdRandom,
};
use serde::Serialize;
use std::{path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Fairodds CLI
#[derive(Parser)]
#[command(name = "fairodds")]
#[command(about = "Fair-odds casino round engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one round and print it as JSON
    Play {
        #[command(subcommand)]
        game: GameArgs,

        /// Stake for the round
        #[arg(short, long, default_value = "1.0")]
        bet: f64,

        /// Seed for a replayable RNG; OS entropy when omitted
        #[arg(short, long)]
        seed: Option<u64>,

        /// Hex secret seeding the fairness key; draws come from the signed proof
        #[arg(long)]
        fairness_key: Option<String>,

        /// Client seed mixed into the signed message
        #[arg(long, default_value = "")]
        client_seed: String,

        /// Mines: tiles to reveal before cashing out
        #[arg(long)]
        reveals: Option<usize>,

        /// Dragon tower: rows to climb before cashing out
        #[arg(long)]
        climb: Option<usize>,
    },

    /// Measure return to player over many rounds
    Simulate {
        #[command(subcommand)]
        game: GameArgs,

        /// Number of rounds
        #[arg(short, long, default_value = "100000")]
        rounds: usize,

        /// Mines: tiles to reveal before cashing out
        #[arg(long)]
        reveals: Option<usize>,

        /// Dragon tower: rows to climb before cashing out
        #[arg(long)]
        climb: Option<usize>,

        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Verify a fairness proof read from a JSON file
    Verify {
        /// Proof file produced by `play --fairness-key`
        #[arg(short, long)]
        proof: PathBuf,

        /// Message the proof must sign
        #[arg(short, long)]
        expected_input: String,
    },

    /// Write the default configuration as TOML
    SampleConfig {
        #[arg(short, long, default_value = "fairodds.toml")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RiskArg {
    Low,
    Medium,
    High,
}

impl From<RiskArg> for RiskTier {
    fn from(risk: RiskArg) -> Self {
        match risk {
            RiskArg::Low => RiskTier::Low,
            RiskArg::Medium => RiskTier::Medium,
            RiskArg::High => RiskTier::High,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Heads,
    Tails,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThrowArg {
    Rock,
    Paper,
    Scissors,
}

#[derive(Clone, Copy, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
    Expert,
    Master,
}

#[derive(Subcommand)]
enum GameArgs {
    Dice {
        #[arg(short, long, default_value = "50")]
        target: f64,
        /// Win below the target instead of above
        #[arg(long)]
        under: bool,
    },
    Coinflip {
        #[arg(value_enum, default_value = "heads")]
        pick: SideArg,
    },
    Rps {
        #[arg(value_enum, default_value = "rock")]
        pick: ThrowArg,
    },
    Plinko {
        #[arg(short, long, default_value = "16")]
        rows: u8,
        #[arg(value_enum, long, default_value = "medium")]
        risk: RiskArg,
    },
    Wheel {
        #[arg(short, long, default_value = "30")]
        segments: u8,
        #[arg(value_enum, long, default_value = "medium")]
        risk: RiskArg,
    },
    Mines {
        #[arg(short, long, default_value = "3")]
        mines: usize,
    },
    DragonTower {
        #[arg(value_enum, default_value = "easy")]
        difficulty: DifficultyArg,
    },
    Crash {
        /// Auto cash-out target
        #[arg(short, long)]
        auto_cash_out: Option<f64>,
    },
}

impl GameArgs {
    fn params(&self) -> GameParams {
        match *self {
            GameArgs::Dice { target, under } => GameParams::Dice(DiceParams {
                target,
                roll_over: !under,
            }),
            GameArgs::Coinflip { pick } => GameParams::CoinFlip(CoinFlipParams {
                pick: match pick {
                    SideArg::Heads => CoinSide::Heads,
                    SideArg::Tails => CoinSide::Tails,
                },
                double_or_nothing: false,
                streak: 0,
            }),
            GameArgs::Rps { pick } => GameParams::RockPaperScissors(RpsParams {
                pick: match pick {
                    ThrowArg::Rock => Throw::Rock,
                    ThrowArg::Paper => Throw::Paper,
                    ThrowArg::Scissors => Throw::Scissors,
                },
            }),
            GameArgs::Plinko { rows, risk } => GameParams::Plinko(PlinkoParams {
                rows,
                risk: risk.into(),
            }),
            GameArgs::Wheel { segments, risk } => GameParams::Wheel(WheelParams {
                segments,
                risk: risk.into(),
            }),
            GameArgs::Mines { mines } => GameParams::Mines(MinesParams { mines }),
            GameArgs::DragonTower { difficulty } => GameParams::DragonTower(TowerParams {
                difficulty: match difficulty {
                    DifficultyArg::Easy => Difficulty::Easy,
                    DifficultyArg::Medium => Difficulty::Medium,
                    DifficultyArg::Hard => Difficulty::Hard,
                    DifficultyArg::Expert => Difficulty::Expert,
                    DifficultyArg::Master => Difficulty::Master,
                },
            }),
            GameArgs::Crash { auto_cash_out } => GameParams::Crash(CrashParams { auto_cash_out }),
        }
    }
}

fn strategy_from(reveals: Option<usize>, climb: Option<usize>) -> Strategy {
    match (reveals, climb) {
        (Some(reveals), _) => Strategy::RevealTiles(reveals),
        (None, Some(rows)) => Strategy::ClimbRows(rows),
        (None, None) => Strategy::Instant,
    }
}

fn make_rng(seed: Option<u64>) -> StdRandom {
    match seed {
        Some(seed) => StdRandom::seeded(seed),
        None => StdRandom::from_entropy(),
    }
}

fn main() -> EngineResult<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_path(path);
    }
    let config = loader.load()?;

    match cli.command {
        Commands::Play {
            game,
            bet,
            seed,
            fairness_key,
            client_seed,
            reveals,
            climb,
        } => run_play(
            &config,
            GameConfig::new(bet, game.params()),
            strategy_from(reveals, climb),
            seed,
            fairness_key,
            &client_seed,
        ),
        Commands::Simulate {
            game,
            rounds,
            reveals,
            climb,
            seed,
        } => run_simulate(
            &config,
            GameConfig::new(1.0, game.params()),
            strategy_from(reveals, climb),
            rounds,
            seed,
        ),
        Commands::Verify {
            proof,
            expected_input,
        } => run_verify(&proof, &expected_input),
        Commands::SampleConfig { output } => {
            generate_sample_config(&output.to_string_lossy())?;
            info!(path = %output.display(), "sample configuration written");
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct PlayOutput<'a> {
    round: &'a ResolvedRound,
    balance: f64,
    proof: Option<&'a FairnessProof>,
}

fn run_play(
    config: &EngineConfig,
    game: GameConfig,
    strategy: Strategy,
    seed: Option<u64>,
    fairness_key: Option<String>,
    client_seed: &str,
) -> EngineResult<()> {
    const PLAYER: &str = "cli";

    let accounts = Arc::new(InMemoryAccounts::new(config.accounts.starting_balance));
    accounts.open(PLAYER)?;
    let mut processor = GameProcessor::new(config, accounts.clone())?;

    let round_id = Uuid::new_v4();
    let proof: Option<FairnessProof> = match fairness_key {
        Some(key) => {
            let engine = FairnessEngine::from_seed_hex(&key)?;
            Some(engine.prove_round(&round_id, game.kind(), PLAYER, client_seed))
        }
        None => None,
    };

    let mut rng: Box<dyn RandomSource> = match &proof {
        Some(proof) => Box::new(proof.rng()?),
        None => Box::new(make_rng(seed)),
    };

    let round = if game.kind().is_stepped() {
        check_strategy(&game, strategy, &config.rules)?;
        let mut session = processor.begin_with_id(PLAYER, round_id, game, rng.as_mut())?;
        loop {
            let event = match session.state() {
                SessionState::Resolved { round } => break round.clone(),
                SessionState::Active { round, .. } => {
                    next_action(round, strategy, &config.rules, rng.as_mut())
                }
                other => return Err(GameError::illegal_transition(other.name(), "play").into()),
            };
            processor.act(PLAYER, &mut session, event)?;
        }
    } else {
        processor.play_with_id(PLAYER, round_id, game, rng.as_mut())?
    };
    let output = PlayOutput {
        round: &round,
        balance: accounts.balance(PLAYER)?,
        proof: proof.as_ref(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_simulate(
    config: &EngineConfig,
    game: GameConfig,
    strategy: Strategy,
    rounds: usize,
    seed: Option<u64>,
) -> EngineResult<()> {
    let mut rng = make_rng(seed);
    let report = simulate(&game, strategy, rounds, &config.rules, &mut rng)?;

    info!(
        game = %report.game,
        rounds = report.rounds,
        rtp = report.rtp(),
        win_rate = report.win_rate(),
        elapsed_ms = report.execution_time.as_millis() as u64,
        "simulation complete"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_verify(path: &PathBuf, expected_input: &str) -> EngineResult<()> {
    let content = std::fs::read_to_string(path)?;
    let proof: FairnessProof = serde_json::from_str(&content)?;
    let valid = FairnessEngine::verify_proof(&proof, expected_input)?;

    info!(valid, public_key = %proof.public_key, "proof checked");
    println!("{}", if valid { "valid" } else { "INVALID" });
    Ok(())
}
