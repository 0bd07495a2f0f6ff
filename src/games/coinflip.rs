//! Coin flip with an optional double-or-nothing streak.

use crate::config::GameRules;
use crate::errors::GameError;
use crate::games::types::GameKind;
use crate::games::InstantGame;
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CoinSide {
    Heads,
    Tails,
}

impl CoinSide {
    pub fn from_draw(u: f64) -> Self {
        if u < 0.5 {
            CoinSide::Heads
        } else {
            CoinSide::Tails
        }
    }
}

impl fmt::Display for CoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinSide::Heads => write!(f, "heads"),
            CoinSide::Tails => write!(f, "tails"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoinFlipParams {
    pub pick: CoinSide,
    #[serde(default)]
    pub double_or_nothing: bool,
    /// Consecutive double-or-nothing wins before this flip
    #[serde(default)]
    pub streak: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoinFlipOutcome {
    pub result: CoinSide,
    pub won: bool,
}

/// `min(base * 2^streak, cap)`
pub fn streak_multiplier(rules: &GameRules, streak: u32) -> f64 {
    let doubled = rules.even_money_multiplier * 2f64.powi(streak.min(i32::MAX as u32) as i32);
    doubled.min(rules.coin_flip_streak_cap)
}

/// Streak after a flip: grows only on a double-or-nothing win.
pub fn next_streak(params: &CoinFlipParams, won: bool) -> u32 {
    if params.double_or_nothing && won {
        params.streak.saturating_add(1)
    } else {
        0
    }
}

pub struct CoinFlip;

impl InstantGame for CoinFlip {
    type Params = CoinFlipParams;
    type Outcome = CoinFlipOutcome;
    const KIND: GameKind = GameKind::CoinFlip;

    fn validate(params: &CoinFlipParams, _rules: &GameRules) -> Result<(), GameError> {
        if params.streak > 0 && !params.double_or_nothing {
            return Err(GameError::invalid_parameter(
                "streak",
                "a streak only applies to double-or-nothing flips",
            ));
        }
        Ok(())
    }

    fn generate(
        params: &CoinFlipParams,
        _rules: &GameRules,
        rng: &mut dyn RandomSource,
    ) -> CoinFlipOutcome {
        let result = CoinSide::from_draw(rng.next_f64());
        CoinFlipOutcome {
            result,
            won: result == params.pick,
        }
    }

    fn multiplier(
        params: &CoinFlipParams,
        rules: &GameRules,
        outcome: &CoinFlipOutcome,
    ) -> Result<f64, GameError> {
        if !outcome.won {
            return Ok(0.0);
        }
        if params.double_or_nothing {
            Ok(streak_multiplier(rules, params.streak))
        } else {
            Ok(rules.even_money_multiplier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;

    #[test]
    fn test_streak_multiplier_doubles_and_caps() {
        let rules = GameRules::default();
        assert_eq!(streak_multiplier(&rules, 0), 1.98);
        assert_eq!(streak_multiplier(&rules, 1), 3.96);
        assert_eq!(streak_multiplier(&rules, 3), 15.84);
        assert_eq!(streak_multiplier(&rules, 9), 1000.0);
        assert_eq!(streak_multiplier(&rules, 500), 1000.0);
    }

    #[test]
    fn test_flip_pays_even_money() {
        let rules = GameRules::default();
        let params = CoinFlipParams {
            pick: CoinSide::Heads,
            double_or_nothing: false,
            streak: 0,
        };
        let mut rng = ScriptedRandom::new([0.2, 0.8]);

        let win = CoinFlip::generate(&params, &rules, &mut rng);
        assert!(win.won);
        assert_eq!(CoinFlip::multiplier(&params, &rules, &win).unwrap(), 1.98);

        let loss = CoinFlip::generate(&params, &rules, &mut rng);
        assert_eq!(loss.result, CoinSide::Tails);
        assert_eq!(CoinFlip::multiplier(&params, &rules, &loss).unwrap(), 0.0);
    }

    #[test]
    fn test_streak_progression() {
        let params = CoinFlipParams {
            pick: CoinSide::Tails,
            double_or_nothing: true,
            streak: 2,
        };
        assert_eq!(next_streak(&params, true), 3);
        assert_eq!(next_streak(&params, false), 0);

        let plain = CoinFlipParams {
            double_or_nothing: false,
            streak: 0,
            ..params
        };
        assert_eq!(next_streak(&plain, true), 0);
    }

    #[test]
    fn test_streak_requires_double_or_nothing() {
        let params = CoinFlipParams {
            pick: CoinSide::Heads,
            double_or_nothing: false,
            streak: 2,
        };
        assert!(CoinFlip::validate(&params, &GameRules::default()).is_err());
    }
}
