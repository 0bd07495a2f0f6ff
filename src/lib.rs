//! Fairodds - Fair-Odds Casino Round Engine
//!
//! Probability, outcome generation, settlement and round sequencing for
//! dice, coin flip, rock-paper-scissors, mines, dragon tower, crash, plinko
//! and wheel. Randomness is injected, so every round can be replayed from a
//! seed or checked against a signed fairness proof.

pub mod account;
pub mod config;
pub mod errors;
pub mod games;
pub mod probability;
pub mod rng;
pub mod session;

pub use account::{AccountStore, InMemoryAccounts, PlayerStats};
pub use config::{ConfigBuilder, ConfigLoader, EngineConfig, GameRules};
pub use errors::{EngineError, EngineResult, GameError};
pub use games::{
    FairnessEngine, FairnessProof, GameConfig, GameKind, GameParams, GameProcessor, Outcome,
    OutcomeClass, ResolvedRound, RiskTier, RoundHistory, RoundHistoryEntry, SettlementResult,
};
pub use rng::{HashChainRandom, RandomSource, ScriptedRandom, StdRandom};
pub use session::{reduce, Session, SessionEvent, SessionState};
