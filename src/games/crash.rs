//! Crash
//!
//! The multiplier grows as `exp(k * t)` from 1.00x until it reaches a crash
//! point drawn at round start. Cashing out before the crash pays the current
//! multiplier; an optional auto cash-out target pays exactly the target.

use crate::config::GameRules;
use crate::errors::GameError;
use crate::games::types::Outcome;
use crate::games::Resolution;
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};

pub const MIN_CRASH_POINT: f64 = 1.01;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CrashParams {
    #[serde(default)]
    pub auto_cash_out: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrashOutcome {
    pub crash_point: f64,
    pub cashed_out_at: Option<f64>,
    pub elapsed_secs: f64,
}

pub fn validate(params: &CrashParams) -> Result<(), GameError> {
    match params.auto_cash_out {
        Some(target) if !(target.is_finite() && target > 1.0) => Err(GameError::invalid_parameter(
            "auto_cash_out",
            format!("{} must be greater than 1.0", target),
        )),
        _ => Ok(()),
    }
}

/// Draws a crash point.
///
/// 80% of rounds land in `[1.01, 4.99)`, 10% in `[8, 15)` and 10% in
/// `[15, max)`, each nudged by up to ±0.25 and clamped to `[1.01, max]`.
pub fn generate_crash_point(rng: &mut dyn RandomSource, max_multiplier: f64) -> f64 {
    let ceiling = max_multiplier.max(MIN_CRASH_POINT);
    let band = rng.next_f64();
    let base = if band < 0.8 {
        rng.next_in(MIN_CRASH_POINT, 3.98)
    } else if band < 0.9 {
        rng.next_in(8.0, 7.0)
    } else {
        rng.next_in(15.0, ceiling - 15.0)
    };
    let jitter = rng.next_f64() * 0.5 - 0.25;
    (base + jitter).clamp(MIN_CRASH_POINT, ceiling)
}

/// `min(exp(k * t), max)`
pub fn multiplier_at(elapsed_secs: f64, growth_rate: f64, max_multiplier: f64) -> f64 {
    (growth_rate * elapsed_secs).exp().min(max_multiplier)
}

/// Seconds until the curve reaches `multiplier`.
pub fn time_to_reach(multiplier: f64, growth_rate: f64) -> f64 {
    multiplier.max(1.0).ln() / growth_rate
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrashRound {
    crash_point: f64,
    growth_rate: f64,
    max_multiplier: f64,
    auto_cash_out: Option<f64>,
    elapsed_secs: f64,
    multiplier: f64,
}

impl CrashRound {
    pub fn begin(
        params: &CrashParams,
        rules: &GameRules,
        rng: &mut dyn RandomSource,
    ) -> Result<Self, GameError> {
        validate(params)?;
        Ok(Self::with_crash_point(
            params,
            rules,
            generate_crash_point(rng, rules.crash_max_multiplier),
        ))
    }

    /// Round with a known crash point, used when replaying a proof.
    pub fn with_crash_point(params: &CrashParams, rules: &GameRules, crash_point: f64) -> Self {
        Self {
            crash_point,
            growth_rate: rules.crash_growth_rate,
            max_multiplier: rules.crash_max_multiplier,
            auto_cash_out: params.auto_cash_out,
            elapsed_secs: 0.0,
            multiplier: 1.0,
        }
    }

    pub fn crash_point(&self) -> f64 {
        self.crash_point
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    pub fn current_multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn can_cash_out(&self) -> bool {
        self.multiplier > 1.0
    }

    fn finish(&self, cashed_out_at: Option<f64>) -> Resolution {
        Resolution {
            outcome: Outcome::Crash(CrashOutcome {
                crash_point: self.crash_point,
                cashed_out_at,
                elapsed_secs: self.elapsed_secs,
            }),
            multiplier: cashed_out_at.unwrap_or(0.0),
        }
    }

    /// Advances the clock to `elapsed_secs` since round start.
    pub fn tick(&mut self, elapsed_secs: f64) -> Result<Option<Resolution>, GameError> {
        if !elapsed_secs.is_finite() || elapsed_secs < self.elapsed_secs {
            return Err(GameError::invalid_parameter(
                "elapsed_secs",
                format!("{} must not move backwards from {}", elapsed_secs, self.elapsed_secs),
            ));
        }
        self.elapsed_secs = elapsed_secs;
        let reached = multiplier_at(elapsed_secs, self.growth_rate, self.max_multiplier);

        if let Some(target) = self.auto_cash_out {
            if target < self.crash_point && reached >= target {
                self.multiplier = target;
                return Ok(Some(self.finish(Some(target))));
            }
        }
        if reached >= self.crash_point {
            self.multiplier = self.crash_point;
            return Ok(Some(self.finish(None)));
        }
        self.multiplier = reached;
        Ok(None)
    }

    pub fn cash_out(&self) -> Result<Resolution, GameError> {
        if !self.can_cash_out() {
            return Err(GameError::invalid_parameter(
                "cash_out",
                "the multiplier has not risen above 1.00x yet",
            ));
        }
        Ok(self.finish(Some(self.multiplier)))
    }
}
