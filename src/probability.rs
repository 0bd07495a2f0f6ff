//! Probability engine
//!
//! Pure functions turning a game configuration into a win probability and a
//! payout multiplier. Nothing here rounds; use [`round_for_display`] only when
//! presenting a value.

use crate::config::GameRules;
use crate::errors::GameError;
use crate::games::rps::Throw;
use crate::games::types::GameParams;

/// Lowest accepted dice target
pub const DICE_TARGET_MIN: f64 = 0.01;
/// Highest accepted dice target
pub const DICE_TARGET_MAX: f64 = 99.99;

/// Fair multiplier for a win probability `p`: `1 / p`.
pub fn fair_multiplier(p: f64) -> Result<f64, GameError> {
    if !(p > 0.0 && p <= 1.0) {
        return Err(GameError::invalid_parameter(
            "probability",
            format!("{} is outside (0, 1]", p),
        ));
    }
    Ok(1.0 / p)
}

/// House-adjusted multiplier: `fair * (1 - house_edge)`.
pub fn adjusted_multiplier(fair: f64, house_edge: f64) -> f64 {
    fair * (1.0 - house_edge)
}

/// Checks a dice target lies in `[0.01, 99.99]`.
pub fn validate_dice_target(target: f64) -> Result<(), GameError> {
    if target.is_finite() && (DICE_TARGET_MIN..=DICE_TARGET_MAX).contains(&target) {
        Ok(())
    } else {
        Err(GameError::invalid_parameter(
            "target",
            format!(
                "{} must be within [{}, {}]",
                target, DICE_TARGET_MIN, DICE_TARGET_MAX
            ),
        ))
    }
}

/// Probability of winning a dice roll against `target`.
pub fn dice_win_probability(target: f64, roll_over: bool) -> Result<f64, GameError> {
    validate_dice_target(target)?;
    Ok(if roll_over {
        (100.0 - target) / 100.0
    } else {
        target / 100.0
    })
}

/// Dice payout multiplier after the house edge.
pub fn dice_multiplier(target: f64, roll_over: bool, house_edge: f64) -> Result<f64, GameError> {
    let p = dice_win_probability(target, roll_over)?;
    Ok(adjusted_multiplier(fair_multiplier(p)?, house_edge))
}

/// Checks a mines board: at least one mine and at least one safe tile.
pub fn validate_mines(total_tiles: usize, total_mines: usize) -> Result<(), GameError> {
    if total_mines == 0 || total_mines >= total_tiles {
        return Err(GameError::invalid_parameter(
            "mines",
            format!("{} mines on {} tiles; need 1..{}", total_mines, total_tiles, total_tiles),
        ));
    }
    Ok(())
}

/// Probability of drawing `gems_revealed` safe tiles in sequence without
/// replacement.
pub fn mines_survival_probability(total_tiles: usize, total_mines: usize, gems_revealed: usize) -> f64 {
    let mut product = 1.0;
    for i in 0..gems_revealed {
        let safe_remaining = total_tiles.saturating_sub(total_mines + i) as f64;
        let tiles_remaining = (total_tiles - i) as f64;
        product *= safe_remaining / tiles_remaining;
    }
    product
}

/// Mines multiplier after `gems_revealed` safe reveals:
/// `payout_factor / survival_probability`, with `1.0` before any reveal.
pub fn mines_multiplier(
    total_tiles: usize,
    total_mines: usize,
    gems_revealed: usize,
    payout_factor: f64,
) -> Result<f64, GameError> {
    validate_mines(total_tiles, total_mines)?;
    let gems = total_tiles - total_mines;
    if gems_revealed > gems {
        return Err(GameError::invalid_parameter(
            "gems_revealed",
            format!("{} exceeds the {} gems on the board", gems_revealed, gems),
        ));
    }
    if gems_revealed == 0 {
        return Ok(1.0);
    }
    Ok(payout_factor / mines_survival_probability(total_tiles, total_mines, gems_revealed))
}

/// Multiplier the next safe reveal would lock in.
pub fn next_mines_multiplier(
    total_tiles: usize,
    total_mines: usize,
    gems_revealed: usize,
    payout_factor: f64,
) -> Result<f64, GameError> {
    mines_multiplier(total_tiles, total_mines, gems_revealed + 1, payout_factor)
}

/// Chance that the next decision of a round wins.
///
/// Dice is the chance of the roll clearing the target. Mines and dragon tower
/// give the chance of surviving the first pick. Rock-paper-scissors counts
/// only outright wins; a draw returns the stake. Crash, plinko and wheel have
/// no single win event and are rejected.
pub fn win_probability(params: &GameParams, rules: &GameRules) -> Result<f64, GameError> {
    match params {
        GameParams::Dice(dice) => dice_win_probability(dice.target, dice.roll_over),
        GameParams::CoinFlip(_) => Ok(0.5),
        GameParams::RockPaperScissors(_) => Ok(1.0 / Throw::ALL.len() as f64),
        GameParams::Mines(mines) => {
            validate_mines(rules.mines_tiles, mines.mines)?;
            Ok(mines_survival_probability(rules.mines_tiles, mines.mines, 1))
        }
        GameParams::DragonTower(tower) => {
            let difficulty = tower.difficulty;
            Ok(difficulty.safe_per_row() as f64 / difficulty.tiles_per_row() as f64)
        }
        GameParams::Crash(_) | GameParams::Plinko(_) | GameParams::Wheel(_) => {
            Err(GameError::invalid_parameter(
                "game",
                format!("{} has no closed-form win probability", params.kind()),
            ))
        }
    }
}

/// Preview of the payout for a stake at a multiplier.
pub fn potential_win(bet_amount: f64, multiplier: f64) -> f64 {
    bet_amount * multiplier
}

/// Rounds for presentation only.
pub fn round_for_display(value: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (value * scale).round() / scale
}
