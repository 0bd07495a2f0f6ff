//! Return-to-player simulation
//!
//! Plays many rounds of one configuration against an RNG and reports the
//! observed payout ratio. Stepped games follow a fixed [`Strategy`].

use crate::config::GameRules;
use crate::errors::GameError;
use crate::games::crash;
use crate::games::dragon_tower::TOWER_ROWS;
use crate::games::types::{GameConfig, GameKind, GameParams, OutcomeClass, ResolvedRound};
use crate::games::{draw, validate_params, ActiveRound};
use crate::rng::RandomSource;
use crate::session::{Session, SessionEvent, SessionState};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

/// How a simulated player drives a stepped round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Instant games, and crash rounds settled by their auto cash-out target
    Instant,
    /// Mines: reveal this many random tiles, then cash out
    RevealTiles(usize),
    /// Dragon tower: climb this many rows picking random tiles, then cash out
    ClimbRows(usize),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub game: GameKind,
    pub rounds: usize,
    pub total_bet: f64,
    pub total_payout: f64,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub max_multiplier: f64,
    pub execution_time: Duration,
}

impl SimulationReport {
    fn new(game: GameKind) -> Self {
        Self {
            game,
            rounds: 0,
            total_bet: 0.0,
            total_payout: 0.0,
            wins: 0,
            losses: 0,
            draws: 0,
            max_multiplier: 0.0,
            execution_time: Duration::ZERO,
        }
    }

    /// Observed return to player: payout / stake
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0.0 {
            self.total_payout / self.total_bet
        } else {
            0.0
        }
    }

    pub fn house_edge(&self) -> f64 {
        1.0 - self.rtp()
    }

    /// Share of rounds that returned more than the stake
    pub fn win_rate(&self) -> f64 {
        if self.rounds > 0 {
            self.wins as f64 / self.rounds as f64
        } else {
            0.0
        }
    }

    fn add(&mut self, round: &ResolvedRound) {
        self.rounds += 1;
        self.total_bet += round.config.bet_amount;
        self.total_payout += round.settlement.payout;
        self.max_multiplier = self.max_multiplier.max(round.multiplier);
        match round.settlement.outcome_class {
            OutcomeClass::Draw => self.draws += 1,
            OutcomeClass::Loss => self.losses += 1,
            OutcomeClass::Win if round.settlement.is_net_loss() => self.losses += 1,
            OutcomeClass::Win => self.wins += 1,
        }
    }
}

/// Checks that `strategy` can drive rounds of `config` to resolution.
pub fn check_strategy(config: &GameConfig, strategy: Strategy, rules: &GameRules) -> Result<(), GameError> {
    match (&config.params, strategy) {
        (GameParams::Mines(params), Strategy::RevealTiles(reveals)) => {
            let gems = rules.mines_tiles.saturating_sub(params.mines);
            if reveals == 0 || reveals > gems {
                return Err(GameError::invalid_parameter(
                    "reveals",
                    format!("{} must be within 1..={}", reveals, gems),
                ));
            }
            Ok(())
        }
        (GameParams::DragonTower(_), Strategy::ClimbRows(rows)) => {
            if rows == 0 || rows > TOWER_ROWS {
                return Err(GameError::invalid_parameter(
                    "rows",
                    format!("{} must be within 1..={}", rows, TOWER_ROWS),
                ));
            }
            Ok(())
        }
        (GameParams::Crash(params), Strategy::Instant) => {
            if params.auto_cash_out.is_none() {
                return Err(GameError::invalid_parameter(
                    "auto_cash_out",
                    "crash simulations need an auto cash-out target",
                ));
            }
            Ok(())
        }
        (params, Strategy::Instant) if !params.kind().is_stepped() => Ok(()),
        (params, strategy) => Err(GameError::invalid_parameter(
            "strategy",
            format!("{:?} does not apply to {}", strategy, params.kind()),
        )),
    }
}

/// Next player action for a live round under `strategy`.
pub fn next_action(
    round: &ActiveRound,
    strategy: Strategy,
    rules: &GameRules,
    rng: &mut dyn RandomSource,
) -> SessionEvent {
    match (round, strategy) {
        (ActiveRound::Mines(mines), Strategy::RevealTiles(reveals)) if mines.gems_found() < reveals => {
            let hidden: Vec<usize> = (0..mines.tiles()).filter(|t| !mines.is_revealed(*t)).collect();
            SessionEvent::Reveal(hidden[rng.next_index(hidden.len())])
        }
        (ActiveRound::DragonTower(tower), Strategy::ClimbRows(rows)) if tower.rows_cleared() < rows => {
            SessionEvent::Reveal(rng.next_index(tower.difficulty().tiles_per_row()))
        }
        (ActiveRound::Crash(_), _) => SessionEvent::Tick(
            crash::time_to_reach(rules.crash_max_multiplier, rules.crash_growth_rate) + 1.0,
        ),
        _ => SessionEvent::CashOut,
    }
}

/// Plays one round to resolution without touching any balance.
pub fn play_round(
    config: &GameConfig,
    strategy: Strategy,
    rules: &GameRules,
    rng: &mut dyn RandomSource,
) -> Result<ResolvedRound, GameError> {
    let mut session = Session::new();
    session.apply(SessionEvent::PlaceBet {
        round_id: Uuid::new_v4(),
        config: config.clone(),
        balance: f64::INFINITY,
    })?;
    session.apply(SessionEvent::OutcomeDrawn(draw(&config.params, rules, rng)?))?;

    loop {
        let event = match session.state() {
            SessionState::Resolved { round } => return Ok(round.clone()),
            SessionState::Active { round, .. } => next_action(round, strategy, rules, rng),
            other => return Err(GameError::illegal_transition(other.name(), "simulate")),
        };
        session.apply(event)?;
    }
}

/// Runs `rounds` rounds of `config` and aggregates the results.
pub fn simulate(
    config: &GameConfig,
    strategy: Strategy,
    rounds: usize,
    rules: &GameRules,
    rng: &mut dyn RandomSource,
) -> Result<SimulationReport, GameError> {
    rules
        .validate()
        .map_err(|err| GameError::invalid_parameter("rules", err.to_string()))?;
    validate_params(&config.params, rules)?;
    check_strategy(config, strategy, rules)?;

    let start_time = Instant::now();
    let mut report = SimulationReport::new(config.kind());
    for _ in 0..rounds {
        let round = play_round(config, strategy, rules, rng)?;
        report.add(&round);
    }
    report.execution_time = start_time.elapsed();

    debug!(
        game = %report.game,
        rounds = report.rounds,
        rtp = report.rtp(),
        "simulation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::coinflip::{CoinFlipParams, CoinSide};
    use crate::games::crash::CrashParams;
    use crate::games::dice::DiceParams;
    use crate::games::dragon_tower::{Difficulty, TowerParams};
    use crate::games::mines::MinesParams;
    use crate::rng::StdRandom;

    fn run(params: GameParams, strategy: Strategy, rounds: usize) -> SimulationReport {
        let mut rng = StdRandom::seeded(2024);
        simulate(
            &GameConfig::new(1.0, params),
            strategy,
            rounds,
            &GameRules::default(),
            &mut rng,
        )
        .unwrap()
    }

    #[test]
    fn test_dice_rtp_near_published_edge() {
        let report = run(
            GameParams::Dice(DiceParams {
                target: 50.0,
                roll_over: true,
            }),
            Strategy::Instant,
            100_000,
        );
        assert_eq!(report.rounds, 100_000);
        assert!((0.955..1.005).contains(&report.rtp()), "rtp {}", report.rtp());
    }

    #[test]
    fn test_coin_flip_rtp() {
        let report = run(
            GameParams::CoinFlip(CoinFlipParams {
                pick: CoinSide::Tails,
                double_or_nothing: false,
                streak: 0,
            }),
            Strategy::Instant,
            50_000,
        );
        assert!((0.96..1.02).contains(&report.rtp()), "rtp {}", report.rtp());
        assert_eq!(report.wins + report.losses, 50_000);
    }

    #[test]
    fn test_mines_single_reveal_rtp() {
        let report = run(
            GameParams::Mines(MinesParams { mines: 3 }),
            Strategy::RevealTiles(1),
            50_000,
        );
        assert!((0.96..1.02).contains(&report.rtp()), "rtp {}", report.rtp());
    }

    #[test]
    fn test_tower_climb_settles_every_round() {
        let report = run(
            GameParams::DragonTower(TowerParams {
                difficulty: Difficulty::Easy,
            }),
            Strategy::ClimbRows(2),
            2_000,
        );
        assert_eq!(report.rounds, 2_000);
        assert!(report.max_multiplier <= 1.74);
    }

    #[test]
    fn test_crash_needs_auto_target() {
        let mut rng = StdRandom::seeded(1);
        let rules = GameRules::default();
        let manual = GameConfig::new(1.0, GameParams::Crash(CrashParams::default()));
        assert!(simulate(&manual, Strategy::Instant, 10, &rules, &mut rng).is_err());

        let report = run(
            GameParams::Crash(CrashParams {
                auto_cash_out: Some(2.0),
            }),
            Strategy::Instant,
            5_000,
        );
        assert!(report.max_multiplier <= 2.0);
        assert!(report.wins > 0 && report.losses > 0);
    }

    #[test]
    fn test_strategy_must_fit_game() {
        let mut rng = StdRandom::seeded(1);
        let rules = GameRules::default();
        let mines = GameConfig::new(1.0, GameParams::Mines(MinesParams { mines: 3 }));
        assert!(simulate(&mines, Strategy::Instant, 1, &rules, &mut rng).is_err());
        assert!(simulate(&mines, Strategy::RevealTiles(0), 1, &rules, &mut rng).is_err());
        assert!(simulate(&mines, Strategy::RevealTiles(23), 1, &rules, &mut rng).is_err());
    }

    #[test]
    fn test_broken_rules_are_refused() {
        let mut rng = StdRandom::seeded(1);
        let rules = GameRules {
            crash_max_multiplier: 1.0,
            ..GameRules::default()
        };
        let crash = GameConfig::new(
            1.0,
            GameParams::Crash(CrashParams {
                auto_cash_out: Some(2.0),
            }),
        );
        assert!(matches!(
            simulate(&crash, Strategy::Instant, 10, &rules, &mut rng),
            Err(GameError::InvalidParameter { name: "rules", .. })
        ));
    }
}
