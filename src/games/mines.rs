//! Mines
//!
//! A hidden board of `tiles` cells with `mines` of them mined. The player
//! reveals cells one at a time (or several at once); every safe reveal raises
//! the multiplier, a mine ends the round with nothing. Finding every gem
//! resolves the round automatically.

use crate::config::GameRules;
use crate::errors::GameError;
use crate::games::types::Outcome;
use crate::games::Resolution;
use crate::probability;
use crate::rng::{sample_distinct, RandomSource};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinesParams {
    pub mines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinesOutcome {
    pub tiles: usize,
    pub mine_positions: Vec<usize>,
    /// Safe tiles in reveal order
    pub revealed: Vec<usize>,
    pub hit_mine: Option<usize>,
    pub cashed_out: bool,
}

pub fn validate(params: &MinesParams, rules: &GameRules) -> Result<(), GameError> {
    probability::validate_mines(rules.mines_tiles, params.mines)
}

/// Live mines round. Mine positions are fixed at [`MinesRound::begin`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinesRound {
    tiles: usize,
    mines: usize,
    payout_factor: f64,
    mine_positions: Vec<usize>,
    revealed: Vec<usize>,
}

impl MinesRound {
    pub fn begin(
        params: &MinesParams,
        rules: &GameRules,
        rng: &mut dyn RandomSource,
    ) -> Result<Self, GameError> {
        validate(params, rules)?;
        let mut mine_positions = sample_distinct(rng, rules.mines_tiles, params.mines);
        mine_positions.sort_unstable();
        Ok(Self {
            tiles: rules.mines_tiles,
            mines: params.mines,
            payout_factor: rules.mines_payout_factor,
            mine_positions,
            revealed: Vec::new(),
        })
    }

    pub fn tiles(&self) -> usize {
        self.tiles
    }

    pub fn mines(&self) -> usize {
        self.mines
    }

    pub fn gems_found(&self) -> usize {
        self.revealed.len()
    }

    pub fn gems_total(&self) -> usize {
        self.tiles - self.mines
    }

    pub fn revealed(&self) -> &[usize] {
        &self.revealed
    }

    pub fn is_revealed(&self, tile: usize) -> bool {
        self.revealed.contains(&tile)
    }

    fn is_mine(&self, tile: usize) -> bool {
        self.mine_positions.binary_search(&tile).is_ok()
    }

    pub fn current_multiplier(&self) -> f64 {
        probability::mines_multiplier(self.tiles, self.mines, self.gems_found(), self.payout_factor)
            .unwrap_or(1.0)
    }

    /// Multiplier after one more safe reveal, `None` once every gem is found
    pub fn next_multiplier(&self) -> Option<f64> {
        probability::next_mines_multiplier(self.tiles, self.mines, self.gems_found(), self.payout_factor)
            .ok()
    }

    pub fn can_cash_out(&self) -> bool {
        self.gems_found() > 0
    }

    fn check_tile(&self, tile: usize) -> Result<(), GameError> {
        if tile >= self.tiles {
            return Err(GameError::invalid_parameter(
                "tile",
                format!("{} is off a {}-tile board", tile, self.tiles),
            ));
        }
        if self.is_revealed(tile) {
            return Err(GameError::invalid_parameter(
                "tile",
                format!("{} is already revealed", tile),
            ));
        }
        Ok(())
    }

    fn finish(&self, hit_mine: Option<usize>, cashed_out: bool) -> Result<Resolution, GameError> {
        let multiplier = if hit_mine.is_some() {
            0.0
        } else {
            probability::mines_multiplier(self.tiles, self.mines, self.gems_found(), self.payout_factor)?
        };
        Ok(Resolution {
            outcome: Outcome::Mines(MinesOutcome {
                tiles: self.tiles,
                mine_positions: self.mine_positions.clone(),
                revealed: self.revealed.clone(),
                hit_mine,
                cashed_out,
            }),
            multiplier,
        })
    }

    /// Reveals one tile. Returns the resolution when the round ends.
    pub fn reveal(&mut self, tile: usize) -> Result<Option<Resolution>, GameError> {
        self.check_tile(tile)?;
        if self.is_mine(tile) {
            return self.finish(Some(tile), false).map(Some);
        }
        self.revealed.push(tile);
        if self.gems_found() == self.gems_total() {
            return self.finish(None, false).map(Some);
        }
        Ok(None)
    }

    /// Reveals a batch of tiles at once; any mine in the batch loses the round.
    pub fn reveal_many(&mut self, tiles: &[usize]) -> Result<Option<Resolution>, GameError> {
        if tiles.is_empty() {
            return Err(GameError::invalid_parameter("tiles", "no tiles selected"));
        }
        let mut seen = HashSet::with_capacity(tiles.len());
        for &tile in tiles {
            self.check_tile(tile)?;
            if !seen.insert(tile) {
                return Err(GameError::invalid_parameter(
                    "tiles",
                    format!("{} selected twice", tile),
                ));
            }
        }

        if let Some(&mine) = tiles.iter().find(|&&t| self.is_mine(t)) {
            return self.finish(Some(mine), false).map(Some);
        }
        self.revealed.extend_from_slice(tiles);
        if self.gems_found() == self.gems_total() {
            return self.finish(None, false).map(Some);
        }
        Ok(None)
    }

    pub fn cash_out(&self) -> Result<Resolution, GameError> {
        if !self.can_cash_out() {
            return Err(GameError::invalid_parameter(
                "cash_out",
                "reveal at least one tile before cashing out",
            ));
        }
        self.finish(None, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRandom, StdRandom};

    // All-zero draws place mines on the first tiles
    fn board(mines: usize) -> MinesRound {
        let mut rng = ScriptedRandom::new([0.0]);
        MinesRound::begin(&MinesParams { mines }, &GameRules::default(), &mut rng).unwrap()
    }

    fn mines_outcome(resolution: &Resolution) -> &MinesOutcome {
        match &resolution.outcome {
            Outcome::Mines(outcome) => outcome,
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_begin_places_exact_mine_count() {
        let mut rng = StdRandom::seeded(9);
        for mines in 1..25 {
            let round =
                MinesRound::begin(&MinesParams { mines }, &GameRules::default(), &mut rng).unwrap();
            let unique: HashSet<_> = round.mine_positions.iter().collect();
            assert_eq!(unique.len(), mines);
            assert!(round.mine_positions.iter().all(|&p| p < 25));
        }
    }

    #[test]
    fn test_safe_reveal_raises_multiplier() {
        let mut round = board(3);
        assert_eq!(round.current_multiplier(), 1.0);
        assert!(round.reveal(10).unwrap().is_none());
        assert!((round.current_multiplier() - 0.99 / (22.0 / 25.0)).abs() < 1e-9);
        assert_eq!(round.next_multiplier(), Some(probability::mines_multiplier(25, 3, 2, 0.99).unwrap()));
    }

    #[test]
    fn test_mine_ends_round() {
        let mut round = board(3);
        round.reveal(20).unwrap();
        let resolution = round.reveal(0).unwrap().unwrap();
        assert_eq!(resolution.multiplier, 0.0);
        let outcome = mines_outcome(&resolution);
        assert_eq!(outcome.hit_mine, Some(0));
        assert_eq!(outcome.revealed, vec![20]);
    }

    #[test]
    fn test_rejects_repeat_and_off_board() {
        let mut round = board(3);
        round.reveal(5).unwrap();
        assert!(round.reveal(5).is_err());
        assert!(round.reveal(25).is_err());
    }

    #[test]
    fn test_cash_out_needs_a_reveal() {
        let mut round = board(5);
        assert!(round.cash_out().is_err());
        round.reveal(12).unwrap();
        let resolution = round.cash_out().unwrap();
        assert!(mines_outcome(&resolution).cashed_out);
        assert!(resolution.multiplier > 1.0);
    }

    #[test]
    fn test_all_gems_auto_resolves() {
        let mut round = board(24);
        let resolution = round.reveal(24).unwrap().unwrap();
        assert!((resolution.multiplier - 0.99 * 25.0).abs() < 1e-9);
        assert!(!mines_outcome(&resolution).cashed_out);
    }

    #[test]
    fn test_batch_reveal() {
        let mut round = board(3);
        assert!(round.reveal_many(&[5, 6, 7]).unwrap().is_none());
        assert_eq!(round.gems_found(), 3);

        assert!(round.reveal_many(&[8, 8]).is_err());
        assert!(round.reveal_many(&[]).is_err());

        let resolution = round.reveal_many(&[9, 1]).unwrap().unwrap();
        assert_eq!(resolution.multiplier, 0.0);
        assert_eq!(mines_outcome(&resolution).hit_mine, Some(1));
    }
}
