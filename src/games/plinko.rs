//! Plinko: a ball falls through `rows` peg rows into one of `rows + 1` slots.
//!
//! Each peg is a fair left/right bounce, so the slot index is the number of
//! right bounces and follows a binomial distribution centred on the middle
//! slot. Multiplier tables grow from the centre toward the edges.

use crate::config::GameRules;
use crate::errors::GameError;
use crate::games::types::{GameKind, RiskTier};
use crate::games::InstantGame;
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};

pub const MIN_ROWS: u8 = 8;
pub const MAX_ROWS: u8 = 16;
pub const DEFAULT_ROWS: u8 = 16;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Bounce {
    Left,
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlinkoParams {
    #[serde(default = "default_rows")]
    pub rows: u8,
    pub risk: RiskTier,
}

fn default_rows() -> u8 {
    DEFAULT_ROWS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlinkoOutcome {
    pub path: Vec<Bounce>,
    pub slot: usize,
}

fn tier_multiplier(risk: RiskTier, position: f64) -> f64 {
    match risk {
        RiskTier::Low => match position {
            p if p < 0.2 => 1.0,
            p if p < 0.4 => 1.5,
            p if p < 0.6 => 2.0,
            p if p < 0.8 => 3.0,
            _ => 5.0,
        },
        RiskTier::Medium => match position {
            p if p < 0.15 => 1.0,
            p if p < 0.3 => 1.5,
            p if p < 0.45 => 3.0,
            p if p < 0.6 => 5.0,
            p if p < 0.75 => 10.0,
            p if p < 0.9 => 41.0,
            _ => 110.0,
        },
        RiskTier::High => match position {
            p if p < 0.15 => 0.5,
            p if p < 0.3 => 1.0,
            p if p < 0.45 => 3.0,
            p if p < 0.6 => 10.0,
            p if p < 0.75 => 45.0,
            p if p < 0.9 => 130.0,
            _ => 300.0,
        },
    }
}

/// Slot multipliers for a board, indexed by slot.
///
/// A slot's position is its normalised distance from the centre, `0` in the
/// middle and `1` at either edge.
pub fn multiplier_table(rows: u8, risk: RiskTier) -> Vec<f64> {
    let count = rows as usize + 1;
    let centre = (count - 1) as f64 / 2.0;
    (0..count)
        .map(|slot| {
            let position = ((slot as f64 - centre) / centre).abs();
            tier_multiplier(risk, position)
        })
        .collect()
}

pub fn validate_rows(rows: u8) -> Result<(), GameError> {
    if (MIN_ROWS..=MAX_ROWS).contains(&rows) {
        Ok(())
    } else {
        Err(GameError::invalid_parameter(
            "rows",
            format!("{} must be within {}..={}", rows, MIN_ROWS, MAX_ROWS),
        ))
    }
}

pub struct Plinko;

impl InstantGame for Plinko {
    type Params = PlinkoParams;
    type Outcome = PlinkoOutcome;
    const KIND: GameKind = GameKind::Plinko;

    fn validate(params: &PlinkoParams, _rules: &GameRules) -> Result<(), GameError> {
        validate_rows(params.rows)
    }

    fn generate(params: &PlinkoParams, _rules: &GameRules, rng: &mut dyn RandomSource) -> PlinkoOutcome {
        let path: Vec<Bounce> = (0..params.rows)
            .map(|_| {
                if rng.next_f64() < 0.5 {
                    Bounce::Left
                } else {
                    Bounce::Right
                }
            })
            .collect();
        let slot = path.iter().filter(|b| **b == Bounce::Right).count();
        PlinkoOutcome { path, slot }
    }

    fn multiplier(
        params: &PlinkoParams,
        _rules: &GameRules,
        outcome: &PlinkoOutcome,
    ) -> Result<f64, GameError> {
        multiplier_table(params.rows, params.risk)
            .get(outcome.slot)
            .copied()
            .ok_or_else(|| {
                GameError::invalid_parameter(
                    "slot",
                    format!("{} is outside a {}-row board", outcome.slot, params.rows),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRandom, StdRandom};

    #[test]
    fn test_tables_are_symmetric_with_low_centre() {
        for rows in MIN_ROWS..=MAX_ROWS {
            for risk in [RiskTier::Low, RiskTier::Medium, RiskTier::High] {
                let table = multiplier_table(rows, risk);
                assert_eq!(table.len(), rows as usize + 1);
                let reversed: Vec<f64> = table.iter().rev().copied().collect();
                assert_eq!(table, reversed);
                let min = table.iter().copied().fold(f64::MAX, f64::min);
                assert_eq!(table[rows as usize / 2], min);
            }
        }
    }

    #[test]
    fn test_edge_values() {
        assert_eq!(multiplier_table(16, RiskTier::Low)[0], 5.0);
        assert_eq!(multiplier_table(16, RiskTier::Medium)[16], 110.0);
        assert_eq!(multiplier_table(16, RiskTier::High)[0], 300.0);
        assert_eq!(multiplier_table(16, RiskTier::High)[8], 0.5);
    }

    #[test]
    fn test_slot_counts_right_bounces() {
        let params = PlinkoParams {
            rows: 8,
            risk: RiskTier::Low,
        };
        let mut rng = ScriptedRandom::new([0.9, 0.1]);
        let outcome = Plinko::generate(&params, &GameRules::default(), &mut rng);
        assert_eq!(outcome.path.len(), 8);
        assert_eq!(outcome.slot, 4);
    }

    #[test]
    fn test_all_right_lands_on_edge() {
        let params = PlinkoParams {
            rows: 12,
            risk: RiskTier::High,
        };
        let rules = GameRules::default();
        let mut rng = ScriptedRandom::new([0.99]);
        let outcome = Plinko::generate(&params, &rules, &mut rng);
        assert_eq!(outcome.slot, 12);
        assert_eq!(Plinko::multiplier(&params, &rules, &outcome).unwrap(), 300.0);
    }

    #[test]
    fn test_slots_stay_in_range() {
        let params = PlinkoParams {
            rows: 16,
            risk: RiskTier::Medium,
        };
        let mut rng = StdRandom::seeded(5);
        for _ in 0..500 {
            let outcome = Plinko::generate(&params, &GameRules::default(), &mut rng);
            assert!(outcome.slot <= 16);
        }
    }

    #[test]
    fn test_row_bounds() {
        assert!(validate_rows(7).is_err());
        assert!(validate_rows(17).is_err());
        assert!(validate_rows(8).is_ok());
    }
}
