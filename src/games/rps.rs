//! Rock-paper-scissors against a uniformly random house throw.

use crate::config::GameRules;
use crate::errors::GameError;
use crate::games::types::{GameKind, OutcomeClass};
use crate::games::InstantGame;
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Throw {
    Rock,
    Paper,
    Scissors,
}

impl Throw {
    pub const ALL: [Throw; 3] = [Throw::Rock, Throw::Paper, Throw::Scissors];

    pub fn beats(self, other: Throw) -> bool {
        matches!(
            (self, other),
            (Throw::Rock, Throw::Scissors)
                | (Throw::Paper, Throw::Rock)
                | (Throw::Scissors, Throw::Paper)
        )
    }

    /// Result from the player's side.
    pub fn against(self, house: Throw) -> OutcomeClass {
        if self == house {
            OutcomeClass::Draw
        } else if self.beats(house) {
            OutcomeClass::Win
        } else {
            OutcomeClass::Loss
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpsParams {
    pub pick: Throw,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpsOutcome {
    pub house: Throw,
    pub result: OutcomeClass,
}

pub struct RockPaperScissors;

impl InstantGame for RockPaperScissors {
    type Params = RpsParams;
    type Outcome = RpsOutcome;
    const KIND: GameKind = GameKind::RockPaperScissors;
    const SUPPORTS_DRAW: bool = true;

    fn validate(_params: &RpsParams, _rules: &GameRules) -> Result<(), GameError> {
        Ok(())
    }

    fn generate(params: &RpsParams, _rules: &GameRules, rng: &mut dyn RandomSource) -> RpsOutcome {
        let house = Throw::ALL[rng.next_index(Throw::ALL.len())];
        RpsOutcome {
            house,
            result: params.pick.against(house),
        }
    }

    fn multiplier(
        _params: &RpsParams,
        rules: &GameRules,
        outcome: &RpsOutcome,
    ) -> Result<f64, GameError> {
        Ok(match outcome.result {
            OutcomeClass::Win => rules.even_money_multiplier,
            OutcomeClass::Draw => 1.0,
            OutcomeClass::Loss => 0.0,
        })
    }
}
