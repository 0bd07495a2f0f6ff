//! Wheel: a shuffled ring of multiplier segments with risk-weighted landing.

use crate::config::GameRules;
use crate::errors::GameError;
use crate::games::types::{GameKind, RiskTier};
use crate::games::InstantGame;
use crate::rng::{shuffle, RandomSource};
use serde::{Deserialize, Serialize};

pub const SEGMENT_CHOICES: [u8; 5] = [10, 20, 30, 40, 50];
pub const DEFAULT_SEGMENTS: u8 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WheelParams {
    #[serde(default = "default_segments")]
    pub segments: u8,
    pub risk: RiskTier,
}

fn default_segments() -> u8 {
    DEFAULT_SEGMENTS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WheelOutcome {
    /// Shuffled segment table the wheel was drawn with
    pub segments: Vec<f64>,
    pub index: usize,
}

impl WheelOutcome {
    pub fn landed(&self) -> Option<f64> {
        self.segments.get(self.index).copied()
    }
}

fn tier_multiplier(risk: RiskTier, position: f64) -> f64 {
    match risk {
        RiskTier::Low => match position {
            p if p < 0.05 => 0.0,
            p if p < 0.2 => 0.5,
            p if p < 0.4 => 1.0,
            p if p < 0.6 => 1.5,
            p if p < 0.8 => 2.0,
            p if p < 0.9 => 3.0,
            _ => 4.0,
        },
        RiskTier::Medium => match position {
            p if p < 0.1 => 0.0,
            p if p < 0.2 => 0.5,
            p if p < 0.3 => 1.0,
            p if p < 0.45 => 1.5,
            p if p < 0.6 => 2.0,
            p if p < 0.7 => 3.0,
            p if p < 0.8 => 5.0,
            p if p < 0.9 => 10.0,
            _ => 20.0,
        },
        RiskTier::High => match position {
            p if p < 0.15 => 0.0,
            p if p < 0.3 => 0.5,
            p if p < 0.4 => 1.0,
            p if p < 0.5 => 1.5,
            p if p < 0.6 => 2.0,
            p if p < 0.7 => 5.0,
            p if p < 0.8 => 10.0,
            p if p < 0.9 => 25.0,
            _ => 50.0,
        },
    }
}

/// Unshuffled segment table, ascending.
pub fn base_table(segments: u8, risk: RiskTier) -> Vec<f64> {
    let count = segments as usize;
    (0..count)
        .map(|i| tier_multiplier(risk, i as f64 / count as f64))
        .collect()
}

/// Band weights (low, mid, high) out of 100
fn band_weights(risk: RiskTier) -> [f64; 3] {
    match risk {
        RiskTier::Low => [70.0, 20.0, 10.0],
        RiskTier::Medium => [30.0, 40.0, 30.0],
        RiskTier::High => [15.0, 25.0, 60.0],
    }
}

/// Picks a segment index: sort by multiplier, split into low (40%), mid and
/// high (30%) bands, pick a band by risk weight, then a segment uniformly
/// inside it.
pub fn weighted_index(table: &[f64], risk: RiskTier, rng: &mut dyn RandomSource) -> usize {
    let mut sorted: Vec<usize> = (0..table.len()).collect();
    sorted.sort_by(|&a, &b| table[a].total_cmp(&table[b]));

    let low_len = table.len() * 2 / 5;
    let high_len = table.len() * 3 / 10;
    let mid_len = table.len() - low_len - high_len;
    let (low, rest) = sorted.split_at(low_len);
    let (mid, high) = rest.split_at(mid_len);

    let [w_low, w_mid, _] = band_weights(risk);
    let roll = rng.next_f64() * 100.0;
    let band = if roll < w_low {
        low
    } else if roll < w_low + w_mid {
        mid
    } else {
        high
    };
    let band = if band.is_empty() { &sorted[..] } else { band };

    band[rng.next_index(band.len())]
}

pub fn validate_segments(segments: u8) -> Result<(), GameError> {
    if SEGMENT_CHOICES.contains(&segments) {
        Ok(())
    } else {
        Err(GameError::invalid_parameter(
            "segments",
            format!("{} must be one of {:?}", segments, SEGMENT_CHOICES),
        ))
    }
}

pub struct Wheel;

impl InstantGame for Wheel {
    type Params = WheelParams;
    type Outcome = WheelOutcome;
    const KIND: GameKind = GameKind::Wheel;

    fn validate(params: &WheelParams, _rules: &GameRules) -> Result<(), GameError> {
        validate_segments(params.segments)
    }

    fn generate(params: &WheelParams, _rules: &GameRules, rng: &mut dyn RandomSource) -> WheelOutcome {
        let mut segments = base_table(params.segments, params.risk);
        shuffle(rng, &mut segments);
        let index = weighted_index(&segments, params.risk, rng);
        WheelOutcome { segments, index }
    }

    fn multiplier(
        params: &WheelParams,
        _rules: &GameRules,
        outcome: &WheelOutcome,
    ) -> Result<f64, GameError> {
        outcome.landed().ok_or_else(|| {
            GameError::invalid_parameter(
                "index",
                format!("{} is outside a {}-segment wheel", outcome.index, params.segments),
            )
        })
    }
}
