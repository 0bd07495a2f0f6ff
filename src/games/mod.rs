pub mod coinflip;
pub mod crash;
pub mod dice;
pub mod dragon_tower;
pub mod history;
pub mod mines;
pub mod plinko;
pub mod processor;
pub mod rps;
pub mod settlement;
pub mod simulation;
pub mod types;
pub mod vrf_engine;
pub mod wheel;

pub use history::{HistorySink, RoundHistory};
pub use processor::GameProcessor;
pub use settlement::{settle, SettlementResult};
pub use types::*;
pub use vrf_engine::{FairnessEngine, FairnessProof};

use crate::config::GameRules;
use crate::errors::GameError;
use crate::rng::RandomSource;
use crash::CrashRound;
use dragon_tower::TowerRound;
use mines::MinesRound;
use serde::{Deserialize, Serialize};

/// A game whose outcome is fully determined by a single draw.
pub trait InstantGame {
    type Params;
    type Outcome;
    const KIND: GameKind;
    const SUPPORTS_DRAW: bool = false;

    fn validate(params: &Self::Params, rules: &GameRules) -> Result<(), GameError>;

    /// Draw the outcome. Params must already be validated.
    fn generate(params: &Self::Params, rules: &GameRules, rng: &mut dyn RandomSource) -> Self::Outcome;

    fn multiplier(
        params: &Self::Params,
        rules: &GameRules,
        outcome: &Self::Outcome,
    ) -> Result<f64, GameError>;
}

/// Final outcome and multiplier of a round, ready for settlement
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub multiplier: f64,
}

/// A round that waits on player input between the bet and the result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum ActiveRound {
    Mines(MinesRound),
    DragonTower(TowerRound),
    Crash(CrashRound),
}

impl ActiveRound {
    pub fn kind(&self) -> GameKind {
        match self {
            ActiveRound::Mines(_) => GameKind::Mines,
            ActiveRound::DragonTower(_) => GameKind::DragonTower,
            ActiveRound::Crash(_) => GameKind::Crash,
        }
    }

    /// Multiplier the player would lock in by cashing out now
    pub fn current_multiplier(&self) -> f64 {
        match self {
            ActiveRound::Mines(round) => round.current_multiplier(),
            ActiveRound::DragonTower(round) => round.current_multiplier(),
            ActiveRound::Crash(round) => round.current_multiplier(),
        }
    }

    pub fn can_cash_out(&self) -> bool {
        match self {
            ActiveRound::Mines(round) => round.can_cash_out(),
            ActiveRound::DragonTower(round) => round.can_cash_out(),
            ActiveRound::Crash(round) => round.can_cash_out(),
        }
    }

    pub fn cash_out(&self) -> Result<Resolution, GameError> {
        match self {
            ActiveRound::Mines(round) => round.cash_out(),
            ActiveRound::DragonTower(round) => round.cash_out(),
            ActiveRound::Crash(round) => round.cash_out(),
        }
    }
}

/// Result of drawing randomness for a freshly placed bet
#[derive(Debug, Clone, PartialEq)]
pub enum Drawn {
    Instant(Resolution),
    Active(ActiveRound),
}

fn resolve_instant<G: InstantGame>(
    params: &G::Params,
    rules: &GameRules,
    rng: &mut dyn RandomSource,
    wrap: fn(G::Outcome) -> Outcome,
) -> Result<Drawn, GameError> {
    G::validate(params, rules)?;
    let outcome = G::generate(params, rules, rng);
    let multiplier = G::multiplier(params, rules, &outcome)?;
    Ok(Drawn::Instant(Resolution {
        outcome: wrap(outcome),
        multiplier,
    }))
}

/// Checks game parameters without drawing any randomness.
pub fn validate_params(params: &GameParams, rules: &GameRules) -> Result<(), GameError> {
    match params {
        GameParams::Dice(p) => dice::Dice::validate(p, rules),
        GameParams::CoinFlip(p) => coinflip::CoinFlip::validate(p, rules),
        GameParams::RockPaperScissors(p) => rps::RockPaperScissors::validate(p, rules),
        GameParams::Plinko(p) => plinko::Plinko::validate(p, rules),
        GameParams::Wheel(p) => wheel::Wheel::validate(p, rules),
        GameParams::Mines(p) => mines::validate(p, rules),
        GameParams::DragonTower(_) => Ok(()),
        GameParams::Crash(p) => crash::validate(p),
    }
}

/// Draws the outcome of an instant game, or sets up a stepped round.
pub fn draw(params: &GameParams, rules: &GameRules, rng: &mut dyn RandomSource) -> Result<Drawn, GameError> {
    match params {
        GameParams::Dice(p) => resolve_instant::<dice::Dice>(p, rules, rng, Outcome::Dice),
        GameParams::CoinFlip(p) => resolve_instant::<coinflip::CoinFlip>(p, rules, rng, Outcome::CoinFlip),
        GameParams::RockPaperScissors(p) => {
            resolve_instant::<rps::RockPaperScissors>(p, rules, rng, Outcome::RockPaperScissors)
        }
        GameParams::Plinko(p) => resolve_instant::<plinko::Plinko>(p, rules, rng, Outcome::Plinko),
        GameParams::Wheel(p) => resolve_instant::<wheel::Wheel>(p, rules, rng, Outcome::Wheel),
        GameParams::Mines(p) => Ok(Drawn::Active(ActiveRound::Mines(MinesRound::begin(p, rules, rng)?))),
        GameParams::DragonTower(p) => Ok(Drawn::Active(ActiveRound::DragonTower(TowerRound::begin(p, rng)))),
        GameParams::Crash(p) => Ok(Drawn::Active(ActiveRound::Crash(CrashRound::begin(p, rules, rng)?))),
    }
}
