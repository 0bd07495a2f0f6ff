//! Configuration management for the fairodds engine
//!
//! Centralized configuration with defaults that match the published game
//! rules, TOML file support and `FAIRODDS_*` environment overrides.

use crate::errors::{ConfigurationError, EngineResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Complete engine configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub rules: GameRules,
    pub history: HistoryConfig,
    pub session: SessionConfig,
    pub accounts: AccountsConfig,
}

/// Payout constants shared by every game
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameRules {
    /// Fraction removed from the fair dice multiplier
    pub dice_house_edge: f64,
    /// Fixed win multiplier for the 50% games (coin flip, rock-paper-scissors)
    pub even_money_multiplier: f64,
    /// Upper bound for the coin flip double-or-nothing streak multiplier
    pub coin_flip_streak_cap: f64,
    /// Payout factor applied to the mines probability product
    pub mines_payout_factor: f64,
    /// Number of cells on the mines board
    pub mines_tiles: usize,
    /// Growth constant k in `exp(k * t)` for crash rounds, per second
    pub crash_growth_rate: f64,
    /// Ceiling for the crash multiplier and crash point
    pub crash_max_multiplier: f64,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            dice_house_edge: 0.02,
            even_money_multiplier: 1.98,
            coin_flip_streak_cap: 1000.0,
            mines_payout_factor: 0.99,
            mines_tiles: 25,
            crash_growth_rate: 0.05,
            crash_max_multiplier: 25.0,
        }
    }
}

impl GameRules {
    /// Checks the payout constants. Generators assume these hold.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        check_fraction("rules.dice_house_edge", self.dice_house_edge)?;
        check_range(
            "rules.mines_payout_factor",
            self.mines_payout_factor,
            "Payout factor must be in (0, 1]",
            |v| v > 0.0 && v <= 1.0,
        )?;
        check_range(
            "rules.even_money_multiplier",
            self.even_money_multiplier,
            "Even-money multiplier must be in (1, 2]",
            |v| v > 1.0 && v <= 2.0,
        )?;
        check_range(
            "rules.coin_flip_streak_cap",
            self.coin_flip_streak_cap,
            "Streak cap cannot be below the base multiplier",
            |v| v >= self.even_money_multiplier,
        )?;
        check_range(
            "rules.crash_growth_rate",
            self.crash_growth_rate,
            "Growth rate must be positive",
            |v| v > 0.0 && v.is_finite(),
        )?;
        check_range(
            "rules.crash_max_multiplier",
            self.crash_max_multiplier,
            "Crash ceiling must exceed the highest crash band start (15x)",
            |v| v > 15.0 && v.is_finite(),
        )?;

        if self.mines_tiles < 2 {
            return Err(ConfigurationError::InvalidValue {
                field: "rules.mines_tiles".to_string(),
                value: self.mines_tiles.to_string(),
                reason: "Board needs at least two tiles".to_string(),
            });
        }
        Ok(())
    }
}

/// Round history retention
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Entries kept per game, newest first
    pub retention: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { retention: 10 }
    }
}

/// Presentation timing handed back to callers; the engine never sleeps
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Delay before a resolved round returns to idle
    pub reset_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reset_delay_ms: 3000,
        }
    }
}

/// Defaults for the in-memory account store
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AccountsConfig {
    pub starting_balance: f64,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            starting_balance: 100.0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.rules.validate()?;

        if self.history.retention == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "history.retention".to_string(),
                value: "0".to_string(),
                reason: "Retention cannot be zero".to_string(),
            });
        }

        check_range(
            "accounts.starting_balance",
            self.accounts.starting_balance,
            "Starting balance cannot be negative",
            |v| v >= 0.0 && v.is_finite(),
        )
    }
}

/// Configuration loader with environment variable support
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> EngineResult<EngineConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            EngineConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        self.validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> EngineResult<EngineConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    fn apply_env_overrides(&self, config: &mut EngineConfig) -> EngineResult<()> {
        if let Some(edge) = parse_env::<f64>("FAIRODDS_DICE_HOUSE_EDGE")? {
            config.rules.dice_house_edge = edge;
        }
        if let Some(factor) = parse_env::<f64>("FAIRODDS_MINES_PAYOUT_FACTOR")? {
            config.rules.mines_payout_factor = factor;
        }
        if let Some(max) = parse_env::<f64>("FAIRODDS_CRASH_MAX_MULTIPLIER")? {
            config.rules.crash_max_multiplier = max;
        }
        if let Some(retention) = parse_env::<usize>("FAIRODDS_HISTORY_RETENTION")? {
            config.history.retention = retention;
        }
        if let Some(delay) = parse_env::<u64>("FAIRODDS_RESET_DELAY_MS")? {
            config.session.reset_delay_ms = delay;
        }
        if let Some(balance) = parse_env::<f64>("FAIRODDS_STARTING_BALANCE")? {
            config.accounts.starting_balance = balance;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self, config: &EngineConfig) -> EngineResult<()> {
        config.validate().map_err(Into::into)
    }

    /// Save configuration to file
    pub fn save(&self, config: &EngineConfig, path: &str) -> EngineResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> EngineResult<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw.parse().map(Some).map_err(|_| {
            ConfigurationError::InvalidValue {
                field: key.to_string(),
                value: raw,
                reason: "Could not parse value".to_string(),
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}

fn check_fraction(field: &str, value: f64) -> Result<(), ConfigurationError> {
    check_range(field, value, "Must be in [0, 1)", |v| (0.0..1.0).contains(&v))
}

fn check_range(
    field: &str,
    value: f64,
    reason: &str,
    accept: impl Fn(f64) -> bool,
) -> Result<(), ConfigurationError> {
    if accept(value) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        })
    }
}

/// Builder pattern for creating configurations
pub struct ConfigBuilder {
    config: EngineConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    pub fn rules(mut self, rules: GameRules) -> Self {
        self.config.rules = rules;
        self
    }

    pub fn history_retention(mut self, retention: usize) -> Self {
        self.config.history.retention = retention;
        self
    }

    pub fn reset_delay_ms(mut self, delay: u64) -> Self {
        self.config.session.reset_delay_ms = delay;
        self
    }

    pub fn starting_balance(mut self, balance: f64) -> Self {
        self.config.accounts.starting_balance = balance;
        self
    }

    pub fn build(self) -> EngineConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config(path: &str) -> EngineResult<()> {
    let config = EngineConfig::default();
    ConfigLoader::new().save(&config, path)
}
