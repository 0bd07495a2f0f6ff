use crate::games::coinflip::{CoinFlipOutcome, CoinFlipParams};
use crate::games::crash::{CrashOutcome, CrashParams};
use crate::games::dice::{DiceOutcome, DiceParams};
use crate::games::dragon_tower::{TowerOutcome, TowerParams};
use crate::games::mines::{MinesOutcome, MinesParams};
use crate::games::plinko::{PlinkoOutcome, PlinkoParams};
use crate::games::rps::{RpsOutcome, RpsParams};
use crate::games::settlement::SettlementResult;
use crate::games::wheel::{WheelOutcome, WheelParams};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Supported game types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Dice,
    CoinFlip,
    RockPaperScissors,
    Mines,
    DragonTower,
    Crash,
    Plinko,
    Wheel,
}

impl GameKind {
    pub const ALL: [GameKind; 8] = [
        GameKind::Dice,
        GameKind::CoinFlip,
        GameKind::RockPaperScissors,
        GameKind::Mines,
        GameKind::DragonTower,
        GameKind::Crash,
        GameKind::Plinko,
        GameKind::Wheel,
    ];

    /// Games with player-driven steps between the bet and the result
    pub fn is_stepped(self) -> bool {
        matches!(self, GameKind::Mines | GameKind::DragonTower | GameKind::Crash)
    }

    /// Only rock-paper-scissors can push the stake back
    pub fn supports_draw(self) -> bool {
        matches!(self, GameKind::RockPaperScissors)
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameKind::Dice => "dice",
            GameKind::CoinFlip => "coinflip",
            GameKind::RockPaperScissors => "rps",
            GameKind::Mines => "mines",
            GameKind::DragonTower => "dragon_tower",
            GameKind::Crash => "crash",
            GameKind::Plinko => "plinko",
            GameKind::Wheel => "wheel",
        };
        write!(f, "{}", name)
    }
}

/// Risk tier selecting a plinko or wheel multiplier table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Low => write!(f, "low"),
            RiskTier::Medium => write!(f, "medium"),
            RiskTier::High => write!(f, "high"),
        }
    }
}

/// How a settled round is classified
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeClass {
    Win,
    Loss,
    Draw,
}

/// Player-chosen parameters (discriminated union)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameParams {
    Dice(DiceParams),
    CoinFlip(CoinFlipParams),
    RockPaperScissors(RpsParams),
    Mines(MinesParams),
    DragonTower(TowerParams),
    Crash(CrashParams),
    Plinko(PlinkoParams),
    Wheel(WheelParams),
}

impl GameParams {
    pub fn kind(&self) -> GameKind {
        match self {
            GameParams::Dice(_) => GameKind::Dice,
            GameParams::CoinFlip(_) => GameKind::CoinFlip,
            GameParams::RockPaperScissors(_) => GameKind::RockPaperScissors,
            GameParams::Mines(_) => GameKind::Mines,
            GameParams::DragonTower(_) => GameKind::DragonTower,
            GameParams::Crash(_) => GameKind::Crash,
            GameParams::Plinko(_) => GameKind::Plinko,
            GameParams::Wheel(_) => GameKind::Wheel,
        }
    }
}

/// Immutable parameters of one round, fixed when the bet is submitted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    pub bet_amount: f64,
    #[serde(flatten)]
    pub params: GameParams,
}

impl GameConfig {
    pub fn new(bet_amount: f64, params: GameParams) -> Self {
        Self { bet_amount, params }
    }

    pub fn kind(&self) -> GameKind {
        self.params.kind()
    }
}

/// Realized random result of one round (discriminated union)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum Outcome {
    Dice(DiceOutcome),
    CoinFlip(CoinFlipOutcome),
    RockPaperScissors(RpsOutcome),
    Mines(MinesOutcome),
    DragonTower(TowerOutcome),
    Crash(CrashOutcome),
    Plinko(PlinkoOutcome),
    Wheel(WheelOutcome),
}

impl Outcome {
    pub fn kind(&self) -> GameKind {
        match self {
            Outcome::Dice(_) => GameKind::Dice,
            Outcome::CoinFlip(_) => GameKind::CoinFlip,
            Outcome::RockPaperScissors(_) => GameKind::RockPaperScissors,
            Outcome::Mines(_) => GameKind::Mines,
            Outcome::DragonTower(_) => GameKind::DragonTower,
            Outcome::Crash(_) => GameKind::Crash,
            Outcome::Plinko(_) => GameKind::Plinko,
            Outcome::Wheel(_) => GameKind::Wheel,
        }
    }
}

/// A finished round: config, outcome, multiplier and settlement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedRound {
    pub round_id: Uuid,
    pub config: GameConfig,
    pub outcome: Outcome,
    pub multiplier: f64,
    pub settlement: SettlementResult,
}

/// Append-only record of a past round, kept for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundHistoryEntry {
    pub round_id: Uuid,
    pub player_id: String,
    pub timestamp: DateTime<Utc>,
    pub config: GameConfig,
    pub outcome: Outcome,
    pub multiplier: f64,
    pub settlement: SettlementResult,
}

impl RoundHistoryEntry {
    pub fn from_round(player_id: &str, round: &ResolvedRound, timestamp: DateTime<Utc>) -> Self {
        Self {
            round_id: round.round_id,
            player_id: player_id.to_string(),
            timestamp,
            config: round.config.clone(),
            outcome: round.outcome.clone(),
            multiplier: round.multiplier,
            settlement: round.settlement.clone(),
        }
    }
}
