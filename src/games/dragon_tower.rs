//! Dragon tower
//!
//! Nine rows of tiles, some safe and some hiding a dragon. The player climbs
//! one row at a time by picking a tile; the multiplier for each cleared row
//! comes from a fixed per-difficulty table.

use crate::errors::GameError;
use crate::games::types::Outcome;
use crate::games::Resolution;
use crate::rng::{sample_distinct, RandomSource};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TOWER_ROWS: usize = 9;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
    Master,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
        Difficulty::Master,
    ];

    pub fn tiles_per_row(self) -> usize {
        match self {
            Difficulty::Easy => 4,
            Difficulty::Medium => 3,
            Difficulty::Hard => 2,
            Difficulty::Expert => 3,
            Difficulty::Master => 4,
        }
    }

    pub fn safe_per_row(self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 2,
            Difficulty::Hard | Difficulty::Expert | Difficulty::Master => 1,
        }
    }

    /// Multiplier after clearing row `i + 1`
    pub fn multipliers(self) -> &'static [f64; TOWER_ROWS] {
        match self {
            Difficulty::Easy => &[1.31, 1.74, 2.32, 3.10, 4.13, 5.51, 7.34, 9.79, 13.05],
            Difficulty::Medium => &[1.47, 2.21, 3.31, 4.96, 7.44, 11.16, 16.74, 25.11, 37.67],
            Difficulty::Hard => &[1.96, 3.92, 7.84, 15.68, 31.36, 62.72, 125.44, 250.88, 501.76],
            Difficulty::Expert => &[
                2.94, 8.82, 26.46, 79.38, 238.14, 714.42, 2143.26, 6429.78, 19289.34,
            ],
            Difficulty::Master => &[
                3.92, 15.68, 62.72, 250.88, 1003.52, 4014.08, 16056.32, 64225.28, 256901.12,
            ],
        }
    }

    /// Chance of clearing a single row
    pub fn row_survival(self) -> f64 {
        self.safe_per_row() as f64 / self.tiles_per_row() as f64
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
            Difficulty::Master => "master",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TowerParams {
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TowerEnd {
    Fell,
    CashedOut,
    Topped,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TowerOutcome {
    pub difficulty: Difficulty,
    /// `rows[r][c]` is true when tile `c` of row `r` is safe
    pub rows: Vec<Vec<bool>>,
    pub picks: Vec<usize>,
    pub end: TowerEnd,
}

impl TowerOutcome {
    pub fn rows_cleared(&self) -> usize {
        match self.end {
            TowerEnd::Fell => self.picks.len().saturating_sub(1),
            TowerEnd::CashedOut | TowerEnd::Topped => self.picks.len(),
        }
    }
}

/// Builds a tower layout; every row has exactly `safe_per_row` safe tiles.
pub fn generate_layout(difficulty: Difficulty, rng: &mut dyn RandomSource) -> Vec<Vec<bool>> {
    (0..TOWER_ROWS)
        .map(|_| {
            let mut row = vec![false; difficulty.tiles_per_row()];
            for safe in sample_distinct(rng, row.len(), difficulty.safe_per_row()) {
                row[safe] = true;
            }
            ensure_safe_tile(&mut row, rng);
            row
        })
        .collect()
}

/// Marks a random tile safe when a row came out without any.
fn ensure_safe_tile(row: &mut [bool], rng: &mut dyn RandomSource) {
    if !row.is_empty() && !row.iter().any(|safe| *safe) {
        let index = rng.next_index(row.len());
        row[index] = true;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TowerRound {
    difficulty: Difficulty,
    rows: Vec<Vec<bool>>,
    picks: Vec<usize>,
}

impl TowerRound {
    pub fn begin(params: &TowerParams, rng: &mut dyn RandomSource) -> Self {
        Self {
            difficulty: params.difficulty,
            rows: generate_layout(params.difficulty, rng),
            picks: Vec::new(),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Row currently being attempted, starting at 1
    pub fn level(&self) -> usize {
        self.picks.len() + 1
    }

    pub fn rows_cleared(&self) -> usize {
        self.picks.len()
    }

    pub fn current_multiplier(&self) -> f64 {
        match self.rows_cleared() {
            0 => 1.0,
            n => self.difficulty.multipliers()[n - 1],
        }
    }

    pub fn next_multiplier(&self) -> Option<f64> {
        self.difficulty.multipliers().get(self.rows_cleared()).copied()
    }

    pub fn can_cash_out(&self) -> bool {
        self.rows_cleared() > 0
    }

    fn finish(&self, end: TowerEnd) -> Resolution {
        let multiplier = match end {
            TowerEnd::Fell => 0.0,
            TowerEnd::CashedOut | TowerEnd::Topped => self.current_multiplier(),
        };
        Resolution {
            outcome: Outcome::DragonTower(TowerOutcome {
                difficulty: self.difficulty,
                rows: self.rows.clone(),
                picks: self.picks.clone(),
                end,
            }),
            multiplier,
        }
    }

    /// Picks tile `column` on the current row.
    pub fn reveal(&mut self, column: usize) -> Result<Option<Resolution>, GameError> {
        let row = self.rows_cleared();
        let tiles = self.difficulty.tiles_per_row();
        if column >= tiles {
            return Err(GameError::invalid_parameter(
                "column",
                format!("{} is outside a {}-tile row", column, tiles),
            ));
        }

        self.picks.push(column);
        if !self.rows[row][column] {
            return Ok(Some(self.finish(TowerEnd::Fell)));
        }
        if self.rows_cleared() == TOWER_ROWS {
            return Ok(Some(self.finish(TowerEnd::Topped)));
        }
        Ok(None)
    }

    pub fn cash_out(&self) -> Result<Resolution, GameError> {
        if !self.can_cash_out() {
            return Err(GameError::invalid_parameter(
                "cash_out",
                "clear at least one row before cashing out",
            ));
        }
        Ok(self.finish(TowerEnd::CashedOut))
    }
}
