//! Round session state machine
//!
//! Every game follows `Idle -> AwaitingOutcome -> Resolved -> Idle`. Mines,
//! dragon tower and crash pass through `Active` while the player acts.
//! [`reduce`] is pure: it never draws randomness or touches a balance. The
//! caller feeds it the drawn outcome and the current balance as events.

use crate::errors::GameError;
use crate::games::settlement::{settle, validate_affordable};
use crate::games::types::{GameConfig, ResolvedRound};
use crate::games::{ActiveRound, Drawn, Resolution};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    AwaitingOutcome {
        round_id: Uuid,
        config: GameConfig,
    },
    Active {
        round_id: Uuid,
        config: GameConfig,
        round: ActiveRound,
    },
    Resolved {
        round: ResolvedRound,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingOutcome { .. } => "awaiting_outcome",
            SessionState::Active { .. } => "active",
            SessionState::Resolved { .. } => "resolved",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    pub fn resolved(&self) -> Option<&ResolvedRound> {
        match self {
            SessionState::Resolved { round } => Some(round),
            _ => None,
        }
    }

    pub fn active_round(&self) -> Option<&ActiveRound> {
        match self {
            SessionState::Active { round, .. } => Some(round),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Stake submitted; `balance` is the player's balance at submission
    PlaceBet {
        round_id: Uuid,
        config: GameConfig,
        balance: f64,
    },
    OutcomeDrawn(Drawn),
    Reveal(usize),
    RevealMany(Vec<usize>),
    /// Seconds since the crash round started
    Tick(f64),
    CashOut,
    Reset,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::PlaceBet { .. } => "place_bet",
            SessionEvent::OutcomeDrawn(_) => "outcome_drawn",
            SessionEvent::Reveal(_) => "reveal",
            SessionEvent::RevealMany(_) => "reveal_many",
            SessionEvent::Tick(_) => "tick",
            SessionEvent::CashOut => "cash_out",
            SessionEvent::Reset => "reset",
        }
    }
}

fn resolve(round_id: Uuid, config: &GameConfig, resolution: Resolution) -> Result<SessionState, GameError> {
    let settlement = settle(
        config.bet_amount,
        resolution.multiplier,
        config.kind().supports_draw(),
    )?;
    Ok(SessionState::Resolved {
        round: ResolvedRound {
            round_id,
            config: config.clone(),
            outcome: resolution.outcome,
            multiplier: resolution.multiplier,
            settlement,
        },
    })
}

fn step(
    round_id: Uuid,
    config: &GameConfig,
    round: ActiveRound,
    progress: Option<Resolution>,
) -> Result<SessionState, GameError> {
    match progress {
        Some(resolution) => resolve(round_id, config, resolution),
        None => Ok(SessionState::Active {
            round_id,
            config: config.clone(),
            round,
        }),
    }
}

/// Computes the next state. Illegal events leave the caller's state untouched.
pub fn reduce(state: &SessionState, event: SessionEvent) -> Result<SessionState, GameError> {
    let illegal = GameError::illegal_transition(state.name(), event.name());

    match (state, &event) {
        (
            SessionState::Idle,
            SessionEvent::PlaceBet {
                round_id,
                config,
                balance,
            },
        ) => {
            validate_affordable(config.bet_amount, *balance)?;
            Ok(SessionState::AwaitingOutcome {
                round_id: *round_id,
                config: config.clone(),
            })
        }

        (SessionState::AwaitingOutcome { round_id, config }, SessionEvent::OutcomeDrawn(drawn)) => {
            match drawn {
                Drawn::Instant(resolution) => {
                    if resolution.outcome.kind() != config.kind() {
                        return Err(GameError::invalid_parameter(
                            "outcome",
                            format!("{} outcome for a {} round", resolution.outcome.kind(), config.kind()),
                        ));
                    }
                    resolve(*round_id, config, resolution.clone())
                }
                Drawn::Active(round) => {
                    if round.kind() != config.kind() {
                        return Err(GameError::invalid_parameter(
                            "round",
                            format!("{} round for a {} bet", round.kind(), config.kind()),
                        ));
                    }
                    Ok(SessionState::Active {
                        round_id: *round_id,
                        config: config.clone(),
                        round: round.clone(),
                    })
                }
            }
        }

        (
            SessionState::Active {
                round_id,
                config,
                round,
            },
            SessionEvent::Reveal(_) | SessionEvent::RevealMany(_) | SessionEvent::Tick(_),
        ) => {
            let mut round = round.clone();
            let progress = match (&mut round, &event) {
                (ActiveRound::Mines(mines), SessionEvent::Reveal(tile)) => mines.reveal(*tile)?,
                (ActiveRound::Mines(mines), SessionEvent::RevealMany(tiles)) => mines.reveal_many(tiles)?,
                (ActiveRound::DragonTower(tower), SessionEvent::Reveal(column)) => tower.reveal(*column)?,
                (ActiveRound::Crash(crash), SessionEvent::Tick(elapsed)) => crash.tick(*elapsed)?,
                _ => return Err(illegal),
            };
            step(*round_id, config, round, progress)
        }

        (
            SessionState::Active {
                round_id,
                config,
                round,
            },
            SessionEvent::CashOut,
        ) => resolve(*round_id, config, round.cash_out()?),

        (SessionState::Resolved { .. }, SessionEvent::Reset) => Ok(SessionState::Idle),

        _ => Err(illegal),
    }
}

/// Owns a session state and only commits successful transitions
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn apply(&mut self, event: SessionEvent) -> Result<&SessionState, GameError> {
        let event_name = event.name();
        match reduce(&self.state, event) {
            Ok(next) => {
                self.state = next;
                Ok(&self.state)
            }
            Err(e) => {
                warn!(state = self.state.name(), event = event_name, error = %e, "transition rejected");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameRules;
    use crate::games::coinflip::{CoinFlipParams, CoinSide};
    use crate::games::dragon_tower::{Difficulty, TowerParams};
    use crate::games::mines::MinesParams;
    use crate::games::types::{GameParams, OutcomeClass};
    use crate::games::draw;
    use crate::rng::ScriptedRandom;

    fn place(config: GameConfig, balance: f64) -> SessionEvent {
        SessionEvent::PlaceBet {
            round_id: Uuid::new_v4(),
            config,
            balance,
        }
    }

    fn flip(bet: f64) -> GameConfig {
        GameConfig::new(
            bet,
            GameParams::CoinFlip(CoinFlipParams {
                pick: CoinSide::Heads,
                double_or_nothing: false,
                streak: 0,
            }),
        )
    }

    fn drawn(config: &GameConfig, draws: &[f64]) -> SessionEvent {
        let mut rng = ScriptedRandom::new(draws.iter().copied());
        SessionEvent::OutcomeDrawn(draw(&config.params, &GameRules::default(), &mut rng).unwrap())
    }

    #[test]
    fn test_instant_round_lifecycle() {
        let mut session = Session::new();
        let config = flip(10.0);

        session.apply(place(config.clone(), 100.0)).unwrap();
        assert_eq!(session.state().name(), "awaiting_outcome");

        let state = session.apply(drawn(&config, &[0.1])).unwrap();
        let round = state.resolved().unwrap();
        assert_eq!(round.settlement.outcome_class, OutcomeClass::Win);
        assert!((round.settlement.payout - 19.8).abs() < 1e-9);

        session.apply(SessionEvent::Reset).unwrap();
        assert!(session.state().is_idle());
    }

    #[test]
    fn test_bet_guards() {
        let idle = SessionState::Idle;
        assert!(matches!(
            reduce(&idle, place(flip(0.0), 100.0)),
            Err(GameError::InvalidBet(_))
        ));
        assert!(matches!(
            reduce(&idle, place(flip(-5.0), 100.0)),
            Err(GameError::InvalidBet(_))
        ));
        assert!(matches!(
            reduce(&idle, place(flip(150.0), 100.0)),
            Err(GameError::InvalidBet(_))
        ));
    }

    #[test]
    fn test_illegal_events_rejected() {
        let idle = SessionState::Idle;
        assert_eq!(
            reduce(&idle, SessionEvent::CashOut),
            Err(GameError::illegal_transition("idle", "cash_out"))
        );
        assert!(reduce(&idle, SessionEvent::Reset).is_err());
        assert!(reduce(&idle, SessionEvent::Reveal(0)).is_err());

        let mut session = Session::new();
        session.apply(place(flip(1.0), 10.0)).unwrap();
        assert!(session.apply(place(flip(1.0), 10.0)).is_err());
        assert_eq!(session.state().name(), "awaiting_outcome");
    }

    #[test]
    fn test_mines_reveal_and_cash_out() {
        let config = GameConfig::new(2.0, GameParams::Mines(MinesParams { mines: 3 }));
        let mut session = Session::new();
        session.apply(place(config.clone(), 100.0)).unwrap();
        session.apply(drawn(&config, &[0.0])).unwrap();

        assert!(session.apply(SessionEvent::CashOut).is_err());
        assert_eq!(session.state().name(), "active");

        session.apply(SessionEvent::Reveal(10)).unwrap();
        assert!(session.apply(SessionEvent::Tick(1.0)).is_err());

        let round = session.apply(SessionEvent::CashOut).unwrap().resolved().unwrap();
        assert!((round.multiplier - 0.99 / (22.0 / 25.0)).abs() < 1e-9);
        assert_eq!(round.settlement.outcome_class, OutcomeClass::Win);
    }

    #[test]
    fn test_mines_hit_resolves_as_loss() {
        let config = GameConfig::new(2.0, GameParams::Mines(MinesParams { mines: 3 }));
        let mut session = Session::new();
        session.apply(place(config.clone(), 100.0)).unwrap();
        session.apply(drawn(&config, &[0.0])).unwrap();

        let round = session.apply(SessionEvent::Reveal(1)).unwrap().resolved().unwrap();
        assert_eq!(round.settlement.outcome_class, OutcomeClass::Loss);
        assert_eq!(round.settlement.profit, -2.0);
    }

    #[test]
    fn test_outcome_must_match_bet() {
        let config = flip(1.0);
        let tower = GameConfig::new(
            1.0,
            GameParams::DragonTower(TowerParams {
                difficulty: Difficulty::Easy,
            }),
        );
        let state = reduce(&SessionState::Idle, place(config, 10.0)).unwrap();
        assert!(reduce(&state, drawn(&tower, &[0.3])).is_err());
    }
}
