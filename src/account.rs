//! Player accounts
//!
//! The engine never owns balances. The stake leaves the account as soon as a
//! bet is accepted and the payout comes back when the round ends, so an
//! abandoned round simply keeps the stake.

use crate::errors::AccountError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Balance and lifetime statistics for one player
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerStats {
    pub balance: f64,
    /// Sum of accepted stakes
    pub total_wagered: f64,
    /// Sum of payouts returned by settled rounds
    pub total_paid_out: f64,
    pub rounds_played: u64,
    pub last_played: Option<DateTime<Utc>>,
}

impl PlayerStats {
    fn opened_with(balance: f64) -> Self {
        Self {
            balance,
            total_wagered: 0.0,
            total_paid_out: 0.0,
            rounds_played: 0,
            last_played: None,
        }
    }

    pub fn net_profit(&self) -> f64 {
        self.total_paid_out - self.total_wagered
    }
}

/// Interface for balance storage
pub trait AccountStore: Send + Sync {
    fn balance(&self, player_id: &str) -> Result<f64, AccountError>;

    /// Adds `delta` (negative to debit) and returns the new balance.
    fn apply_delta(&self, player_id: &str, delta: f64) -> Result<f64, AccountError>;

    /// Takes a stake off the balance, refusing to go below zero.
    fn place_stake(&self, player_id: &str, amount: f64) -> Result<f64, AccountError> {
        check_amount(amount)?;
        let balance = self.balance(player_id)?;
        if amount > balance {
            return Err(AccountError::InsufficientFunds {
                player: player_id.to_string(),
                balance,
                amount,
            });
        }
        self.apply_delta(player_id, -amount)
    }

    /// Credits a settled round's payout. A zero payout leaves the balance alone.
    fn pay_out(&self, player_id: &str, payout: f64) -> Result<f64, AccountError> {
        if !payout.is_finite() || payout < 0.0 {
            return Err(AccountError::InvalidAmount(payout));
        }
        self.apply_delta(player_id, payout)
    }
}

fn check_amount(amount: f64) -> Result<(), AccountError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(AccountError::InvalidAmount(amount))
    }
}

/// Concurrent in-memory account store
pub struct InMemoryAccounts {
    accounts: DashMap<String, PlayerStats>,
    starting_balance: f64,
}

impl InMemoryAccounts {
    pub fn new(starting_balance: f64) -> Self {
        Self {
            accounts: DashMap::new(),
            starting_balance,
        }
    }

    /// Opens an account with the configured starting balance.
    pub fn open(&self, player_id: &str) -> Result<f64, AccountError> {
        self.open_with(player_id, self.starting_balance)
    }

    pub fn open_with(&self, player_id: &str, balance: f64) -> Result<f64, AccountError> {
        if !balance.is_finite() || balance < 0.0 {
            return Err(AccountError::InvalidAmount(balance));
        }
        if self.accounts.contains_key(player_id) {
            return Err(AccountError::AlreadyExists(player_id.to_string()));
        }
        self.accounts
            .insert(player_id.to_string(), PlayerStats::opened_with(balance));
        debug!(player = player_id, balance, "account opened");
        Ok(balance)
    }

    /// Returns the balance, opening the account first if needed.
    pub fn ensure(&self, player_id: &str) -> f64 {
        self.accounts
            .entry(player_id.to_string())
            .or_insert_with(|| PlayerStats::opened_with(self.starting_balance))
            .balance
    }

    pub fn deposit(&self, player_id: &str, amount: f64) -> Result<f64, AccountError> {
        check_amount(amount)?;
        let mut stats = self.entry_mut(player_id)?;
        stats.balance += amount;
        Ok(stats.balance)
    }

    pub fn stats(&self, player_id: &str) -> Result<PlayerStats, AccountError> {
        self.accounts
            .get(player_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AccountError::UnknownPlayer(player_id.to_string()))
    }

    pub fn player_count(&self) -> usize {
        self.accounts.len()
    }

    fn entry_mut(
        &self,
        player_id: &str,
    ) -> Result<dashmap::mapref::one::RefMut<'_, String, PlayerStats>, AccountError> {
        self.accounts
            .get_mut(player_id)
            .ok_or_else(|| AccountError::UnknownPlayer(player_id.to_string()))
    }
}

impl Default for InMemoryAccounts {
    fn default() -> Self {
        Self::new(crate::config::AccountsConfig::default().starting_balance)
    }
}

impl AccountStore for InMemoryAccounts {
    fn balance(&self, player_id: &str) -> Result<f64, AccountError> {
        self.accounts
            .get(player_id)
            .map(|entry| entry.balance)
            .ok_or_else(|| AccountError::UnknownPlayer(player_id.to_string()))
    }

    fn apply_delta(&self, player_id: &str, delta: f64) -> Result<f64, AccountError> {
        if !delta.is_finite() {
            return Err(AccountError::InvalidAmount(delta));
        }
        let mut stats = self.entry_mut(player_id)?;
        stats.balance += delta;
        Ok(stats.balance)
    }

    /// Check and debit happen under one shard lock, so overlapping rounds
    /// cannot both spend the same balance.
    fn place_stake(&self, player_id: &str, amount: f64) -> Result<f64, AccountError> {
        check_amount(amount)?;
        let mut stats = self.entry_mut(player_id)?;
        if amount > stats.balance {
            return Err(AccountError::InsufficientFunds {
                player: player_id.to_string(),
                balance: stats.balance,
                amount,
            });
        }
        stats.balance -= amount;
        stats.total_wagered += amount;
        stats.rounds_played += 1;
        stats.last_played = Some(Utc::now());
        Ok(stats.balance)
    }

    fn pay_out(&self, player_id: &str, payout: f64) -> Result<f64, AccountError> {
        if !payout.is_finite() || payout < 0.0 {
            return Err(AccountError::InvalidAmount(payout));
        }
        let mut stats = self.entry_mut(player_id)?;
        stats.balance += payout;
        stats.total_paid_out += payout;
        Ok(stats.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::settlement::settle;

    #[test]
    fn test_open_and_duplicate() {
        let accounts = InMemoryAccounts::new(100.0);
        assert_eq!(accounts.open("alice").unwrap(), 100.0);
        assert_eq!(
            accounts.open("alice"),
            Err(AccountError::AlreadyExists("alice".to_string()))
        );
        assert!(accounts.open_with("bob", -1.0).is_err());
    }

    #[test]
    fn test_settlements_update_stats() {
        let accounts = InMemoryAccounts::new(100.0);
        accounts.open("alice").unwrap();

        let win = settle(10.0, 2.0, false).unwrap();
        assert_eq!(accounts.place_stake("alice", 10.0).unwrap(), 90.0);
        assert_eq!(accounts.pay_out("alice", win.payout).unwrap(), 110.0);

        let loss = settle(5.0, 0.0, false).unwrap();
        assert_eq!(accounts.place_stake("alice", 5.0).unwrap(), 105.0);
        assert_eq!(accounts.pay_out("alice", loss.payout).unwrap(), 105.0);

        let stats = accounts.stats("alice").unwrap();
        assert_eq!(stats.total_wagered, 15.0);
        assert_eq!(stats.total_paid_out, 20.0);
        assert_eq!(stats.rounds_played, 2);
        assert_eq!(stats.net_profit(), 5.0);
        assert!(stats.last_played.is_some());
    }

    #[test]
    fn test_stake_cannot_overdraw() {
        let accounts = InMemoryAccounts::new(30.0);
        accounts.open("dave").unwrap();

        assert_eq!(accounts.place_stake("dave", 20.0).unwrap(), 10.0);
        assert!(matches!(
            accounts.place_stake("dave", 20.0),
            Err(AccountError::InsufficientFunds { .. })
        ));
        assert!(accounts.place_stake("dave", 0.0).is_err());
        assert!(accounts.pay_out("dave", -1.0).is_err());
        assert_eq!(accounts.balance("dave").unwrap(), 10.0);
        assert_eq!(accounts.stats("dave").unwrap().rounds_played, 1);
    }

    #[test]
    fn test_unknown_player() {
        let accounts = InMemoryAccounts::default();
        assert!(matches!(
            accounts.balance("ghost"),
            Err(AccountError::UnknownPlayer(_))
        ));
        assert_eq!(accounts.ensure("ghost"), 100.0);
        assert_eq!(accounts.player_count(), 1);
    }

    #[test]
    fn test_deposit() {
        let accounts = InMemoryAccounts::new(0.0);
        accounts.open("carol").unwrap();
        assert_eq!(accounts.deposit("carol", 25.0).unwrap(), 25.0);
        assert!(accounts.deposit("carol", 0.0).is_err());
    }
}
