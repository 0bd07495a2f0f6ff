//! Dice: roll in `[0, 99.99]` against a player-chosen target.

use crate::config::GameRules;
use crate::errors::GameError;
use crate::games::types::GameKind;
use crate::games::InstantGame;
use crate::probability;
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiceParams {
    pub target: f64,
    pub roll_over: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiceOutcome {
    pub roll: f64,
    pub won: bool,
}

/// Maps a uniform draw onto two-decimal rolls `0.00..=99.99`.
pub fn roll_from_draw(u: f64) -> f64 {
    ((u * 10_000.0).floor() / 100.0).min(99.99)
}

/// Strict comparison: a roll equal to the target never wins.
pub fn is_winning_roll(roll: f64, target: f64, roll_over: bool) -> bool {
    if roll_over {
        roll > target
    } else {
        roll < target
    }
}

pub struct Dice;

impl InstantGame for Dice {
    type Params = DiceParams;
    type Outcome = DiceOutcome;
    const KIND: GameKind = GameKind::Dice;

    fn validate(params: &DiceParams, _rules: &GameRules) -> Result<(), GameError> {
        probability::validate_dice_target(params.target)
    }

    fn generate(params: &DiceParams, _rules: &GameRules, rng: &mut dyn RandomSource) -> DiceOutcome {
        let roll = roll_from_draw(rng.next_f64());
        DiceOutcome {
            roll,
            won: is_winning_roll(roll, params.target, params.roll_over),
        }
    }

    fn multiplier(
        params: &DiceParams,
        rules: &GameRules,
        outcome: &DiceOutcome,
    ) -> Result<f64, GameError> {
        if !outcome.won {
            return Ok(0.0);
        }
        probability::dice_multiplier(params.target, params.roll_over, rules.dice_house_edge)
    }
}
