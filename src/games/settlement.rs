//! Settlement
//!
//! Turns a stake and a final multiplier into a payout, a signed profit and a
//! win/loss/draw classification. Settlement is pure; the account store takes
//! the stake when the bet is placed and credits the payout afterwards.

use crate::errors::GameError;
use crate::games::types::OutcomeClass;
use serde::{Deserialize, Serialize};

/// Result of settling one round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettlementResult {
    pub payout: f64,
    pub profit: f64,
    pub outcome_class: OutcomeClass,
}

impl SettlementResult {
    /// Partial multipliers (0 < m < 1) classify as wins but still lose money.
    pub fn is_net_loss(&self) -> bool {
        self.profit < 0.0
    }
}

/// Checks a stake is a positive finite amount.
pub fn validate_bet(bet_amount: f64) -> Result<(), GameError> {
    if bet_amount.is_finite() && bet_amount > 0.0 {
        Ok(())
    } else {
        Err(GameError::InvalidBet(format!(
            "bet amount must be positive, got {}",
            bet_amount
        )))
    }
}

/// Checks a stake against the available balance.
pub fn validate_affordable(bet_amount: f64, balance: f64) -> Result<(), GameError> {
    validate_bet(bet_amount)?;
    if bet_amount > balance {
        return Err(GameError::InvalidBet(format!(
            "bet {} exceeds balance {}",
            bet_amount, balance
        )));
    }
    Ok(())
}

/// Settles a stake at `multiplier`.
///
/// `multiplier == 0` is a loss, `multiplier == 1` is a draw for games that
/// support one, anything else is a win.
pub fn settle(
    bet_amount: f64,
    multiplier: f64,
    supports_draw: bool,
) -> Result<SettlementResult, GameError> {
    validate_bet(bet_amount)?;
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(GameError::invalid_parameter(
            "multiplier",
            format!("{} is not a valid multiplier", multiplier),
        ));
    }

    let payout = bet_amount * multiplier;
    let outcome_class = if multiplier == 0.0 {
        OutcomeClass::Loss
    } else if multiplier == 1.0 && supports_draw {
        OutcomeClass::Draw
    } else {
        OutcomeClass::Win
    };

    Ok(SettlementResult {
        payout,
        profit: payout - bet_amount,
        outcome_class,
    })
}
