//! Error types for the fairodds engine
//!
//! Game rule violations are rejected synchronously, before any randomness is
//! drawn or any balance is touched. The remaining categories cover the
//! collaborators around the engine (configuration, accounts, fairness proofs).

/// Root error type for all engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    #[error("Fairness error: {0}")]
    Fairness(#[from] FairnessError),
}

/// Rule violations raised by the games, the settlement step and the session
/// state machines
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("Invalid bet: {0}")]
    InvalidBet(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Illegal state transition: cannot apply {event} while {state}")]
    IllegalStateTransition {
        state: &'static str,
        event: &'static str,
    },
}

impl GameError {
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        GameError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub fn illegal_transition(state: &'static str, event: &'static str) -> Self {
        GameError::IllegalStateTransition { state, event }
    }
}

/// Configuration and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

/// Errors raised by account stores
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AccountError {
    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("Player already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid balance amount: {0}")]
    InvalidAmount(f64),

    #[error("Insufficient funds for {player}: balance {balance}, stake {amount}")]
    InsufficientFunds {
        player: String,
        balance: f64,
        amount: f64,
    },
}

/// Errors raised while producing or checking fairness proofs
#[derive(Debug, thiserror::Error)]
pub enum FairnessError {
    #[error("Invalid hex in {field}: {reason}")]
    InvalidHex { field: &'static str, reason: String },

    #[error("Invalid length for {field}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Configuration(ConfigurationError::LoadFailed(e.to_string()))
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Configuration(ConfigurationError::LoadFailed(e.to_string()))
    }
}

/// Convenience type alias for engine results
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let game_error = GameError::InvalidBet("bet must be positive".to_string());
        let engine_error = EngineError::Game(game_error);

        assert!(engine_error.to_string().contains("Game error"));
        assert!(engine_error.to_string().contains("bet must be positive"));
    }

    #[test]
    fn test_transition_error_details() {
        let err = GameError::illegal_transition("idle", "cash_out");

        assert!(err.to_string().contains("cash_out"));
        assert!(err.to_string().contains("idle"));
    }

    #[test]
    fn test_error_conversion() {
        let config_error = ConfigurationError::ValidationFailed("test".to_string());
        let engine_error: EngineError = config_error.into();

        match engine_error {
            EngineError::Configuration(_) => {}
            _ => panic!("Expected configuration error"),
        }
    }

    #[test]
    fn test_error_source() {
        let engine_error = EngineError::Account(AccountError::UnknownPlayer("bob".to_string()));

        assert!(engine_error.source().is_some());
    }
}
