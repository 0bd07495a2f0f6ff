use crate::account::AccountStore;
use crate::config::{EngineConfig, GameRules};
use crate::errors::{EngineResult, GameError};
use crate::games::coinflip;
use crate::games::history::{HistorySink, RoundHistory};
use crate::games::types::{GameConfig, GameKind, GameParams, ResolvedRound, RoundHistoryEntry};
use crate::games::{draw, validate_params, Drawn};
use crate::rng::RandomSource;
use crate::session::{Session, SessionEvent, SessionState};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Smallest stake the half-bet helper will produce
pub const MIN_BET_STEP: f64 = 0.5;

/// Halves a stake, never below [`MIN_BET_STEP`].
pub fn half_bet(bet_amount: f64) -> f64 {
    (bet_amount / 2.0).max(MIN_BET_STEP)
}

/// Doubles a stake.
pub fn double_bet(bet_amount: f64) -> f64 {
    bet_amount * 2.0
}

/// Runs rounds for every game: validation, outcome generation, settlement,
/// balance update and history.
pub struct GameProcessor {
    rules: GameRules,
    accounts: Arc<dyn AccountStore>,
    history: RoundHistory,
    flip_streaks: HashMap<String, u32>,
}

impl GameProcessor {
    /// Builds a processor, rejecting rules the generators cannot honour.
    pub fn new(config: &EngineConfig, accounts: Arc<dyn AccountStore>) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            rules: config.rules.clone(),
            accounts,
            history: RoundHistory::new(config.history.retention),
            flip_streaks: HashMap::new(),
        })
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn history(&self) -> &RoundHistory {
        &self.history
    }

    /// Current double-or-nothing streak for a player
    pub fn flip_streak(&self, player_id: &str) -> u32 {
        self.flip_streaks.get(player_id).copied().unwrap_or(0)
    }

    fn check_streak(&self, player_id: &str, config: &GameConfig) -> Result<(), GameError> {
        if let GameParams::CoinFlip(params) = &config.params {
            let tracked = self.flip_streak(player_id);
            if params.double_or_nothing && params.streak != tracked {
                return Err(GameError::invalid_parameter(
                    "streak",
                    format!("player streak is {}, bet claims {}", tracked, params.streak),
                ));
            }
        }
        Ok(())
    }

    /// Places a bet and draws its outcome.
    ///
    /// Instant games come back already resolved and settled; stepped games
    /// come back `Active` and continue through [`GameProcessor::act`].
    pub fn begin(
        &mut self,
        player_id: &str,
        config: GameConfig,
        rng: &mut dyn RandomSource,
    ) -> EngineResult<Session> {
        self.begin_with_id(player_id, Uuid::new_v4(), config, rng)
    }

    /// Same as [`GameProcessor::begin`] with a caller-chosen round id, so a
    /// fairness proof signed over that id matches the settled round.
    ///
    /// The stake leaves the balance once the bet is accepted; the payout is
    /// credited when the round resolves. A round that is never finished keeps
    /// its stake.
    pub fn begin_with_id(
        &mut self,
        player_id: &str,
        round_id: Uuid,
        config: GameConfig,
        rng: &mut dyn RandomSource,
    ) -> EngineResult<Session> {
        validate_params(&config.params, &self.rules)?;
        self.check_streak(player_id, &config)?;
        let balance = self.accounts.balance(player_id)?;

        let mut session = Session::new();
        session.apply(SessionEvent::PlaceBet {
            round_id,
            config: config.clone(),
            balance,
        })?;
        let remaining = self.accounts.place_stake(player_id, config.bet_amount)?;
        debug!(%round_id, player = player_id, stake = config.bet_amount, remaining, "stake taken");

        if let Err(err) = self.draw_into(&mut session, round_id, &config, rng) {
            self.accounts.apply_delta(player_id, config.bet_amount)?;
            return Err(err);
        }

        self.commit_if_resolved(player_id, &session)?;
        Ok(session)
    }

    fn draw_into(
        &self,
        session: &mut Session,
        round_id: Uuid,
        config: &GameConfig,
        rng: &mut dyn RandomSource,
    ) -> EngineResult<()> {
        let drawn = draw(&config.params, &self.rules, rng)?;
        match &drawn {
            Drawn::Instant(resolution) => debug!(
                %round_id,
                game = %config.kind(),
                multiplier = resolution.multiplier,
                "outcome generated"
            ),
            Drawn::Active(_) => debug!(%round_id, game = %config.kind(), "round started"),
        }
        session.apply(SessionEvent::OutcomeDrawn(drawn))?;
        Ok(())
    }

    /// Plays an instant game to completion.
    pub fn play(
        &mut self,
        player_id: &str,
        config: GameConfig,
        rng: &mut dyn RandomSource,
    ) -> EngineResult<ResolvedRound> {
        self.play_with_id(player_id, Uuid::new_v4(), config, rng)
    }

    pub fn play_with_id(
        &mut self,
        player_id: &str,
        round_id: Uuid,
        config: GameConfig,
        rng: &mut dyn RandomSource,
    ) -> EngineResult<ResolvedRound> {
        if config.kind().is_stepped() {
            return Err(GameError::invalid_parameter(
                "game",
                format!("{} needs player actions; use begin/act", config.kind()),
            )
            .into());
        }
        let session = self.begin_with_id(player_id, round_id, config, rng)?;
        session
            .state()
            .resolved()
            .cloned()
            .ok_or_else(|| GameError::illegal_transition(session.state().name(), "outcome_drawn").into())
    }

    /// Applies a player action to a live round. Returns the settled round when
    /// the action ends it.
    pub fn act(
        &mut self,
        player_id: &str,
        session: &mut Session,
        event: SessionEvent,
    ) -> EngineResult<Option<ResolvedRound>> {
        if matches!(
            event,
            SessionEvent::PlaceBet { .. } | SessionEvent::OutcomeDrawn(_)
        ) {
            return Err(GameError::illegal_transition(session.state().name(), event.name()).into());
        }
        let was_resolved = session.state().resolved().is_some();
        session.apply(event)?;
        if was_resolved {
            return Ok(None);
        }
        self.commit_if_resolved(player_id, session)
    }

    fn commit_if_resolved(
        &mut self,
        player_id: &str,
        session: &Session,
    ) -> EngineResult<Option<ResolvedRound>> {
        let round = match session.state() {
            SessionState::Resolved { round } => round.clone(),
            _ => return Ok(None),
        };

        let balance = self.accounts.pay_out(player_id, round.settlement.payout)?;

        if let GameParams::CoinFlip(params) = &round.config.params {
            let won = round.multiplier > 0.0;
            self.flip_streaks
                .insert(player_id.to_string(), coinflip::next_streak(params, won));
        }

        self.history
            .record(RoundHistoryEntry::from_round(player_id, &round, Utc::now()));

        info!(
            round_id = %round.round_id,
            player = player_id,
            game = %round.config.kind(),
            bet = round.config.bet_amount,
            multiplier = round.multiplier,
            payout = round.settlement.payout,
            outcome = ?round.settlement.outcome_class,
            balance,
            "round settled"
        );

        Ok(Some(round))
    }

    pub fn recent(&self, kind: GameKind) -> Vec<RoundHistoryEntry> {
        self.history.recent(kind).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::InMemoryAccounts;
    use crate::errors::EngineError;
    use crate::games::coinflip::{CoinFlipParams, CoinSide};
    use crate::games::dice::DiceParams;
    use crate::games::mines::MinesParams;
    use crate::games::types::OutcomeClass;
    use crate::rng::ScriptedRandom;

    fn setup() -> (GameProcessor, Arc<InMemoryAccounts>) {
        let accounts = Arc::new(InMemoryAccounts::new(100.0));
        accounts.open("p1").unwrap();
        let processor = GameProcessor::new(&EngineConfig::default(), accounts.clone()).unwrap();
        (processor, accounts)
    }

    fn double_flip(streak: u32) -> GameConfig {
        GameConfig::new(
            1.0,
            GameParams::CoinFlip(CoinFlipParams {
                pick: CoinSide::Heads,
                double_or_nothing: true,
                streak,
            }),
        )
    }

    #[test]
    fn test_play_dice_updates_balance_and_history() {
        let (mut processor, accounts) = setup();
        let config = GameConfig::new(
            10.0,
            GameParams::Dice(DiceParams {
                target: 50.0,
                roll_over: true,
            }),
        );
        let mut rng = ScriptedRandom::new([0.9]);
        let round = processor.play("p1", config, &mut rng).unwrap();

        assert_eq!(round.settlement.outcome_class, OutcomeClass::Win);
        assert!((accounts.balance("p1").unwrap() - 109.6).abs() < 1e-9);
        assert_eq!(processor.history().len(GameKind::Dice), 1);
    }

    #[test]
    fn test_rejected_bet_touches_nothing() {
        let (mut processor, accounts) = setup();
        let config = GameConfig::new(
            500.0,
            GameParams::Dice(DiceParams {
                target: 50.0,
                roll_over: true,
            }),
        );
        let mut rng = ScriptedRandom::new([0.9]);
        let err = processor.play("p1", config, &mut rng).unwrap_err();

        assert!(matches!(err, EngineError::Game(GameError::InvalidBet(_))));
        assert_eq!(accounts.balance("p1").unwrap(), 100.0);
        assert!(processor.history().is_empty());
    }

    #[test]
    fn test_double_or_nothing_streak() {
        let (mut processor, _) = setup();
        let mut heads = ScriptedRandom::new([0.1]);

        let first = processor.play("p1", double_flip(0), &mut heads).unwrap();
        assert_eq!(first.multiplier, 1.98);
        assert_eq!(processor.flip_streak("p1"), 1);

        let second = processor.play("p1", double_flip(1), &mut heads).unwrap();
        assert_eq!(second.multiplier, 3.96);
        assert_eq!(processor.flip_streak("p1"), 2);

        assert!(processor.play("p1", double_flip(0), &mut heads).is_err());

        let mut tails = ScriptedRandom::new([0.9]);
        processor.play("p1", double_flip(2), &mut tails).unwrap();
        assert_eq!(processor.flip_streak("p1"), 0);
    }

    #[test]
    fn test_stepped_round_through_act() {
        let (mut processor, accounts) = setup();
        let config = GameConfig::new(4.0, GameParams::Mines(MinesParams { mines: 3 }));
        let mut rng = ScriptedRandom::new([0.0]);

        assert!(processor.play("p1", config.clone(), &mut rng).is_err());

        let mut session = processor.begin("p1", config, &mut rng).unwrap();
        assert_eq!(session.state().name(), "active");
        assert_eq!(accounts.balance("p1").unwrap(), 96.0);

        assert!(processor
            .act("p1", &mut session, SessionEvent::Reveal(20))
            .unwrap()
            .is_none());
        let round = processor
            .act("p1", &mut session, SessionEvent::CashOut)
            .unwrap()
            .unwrap();

        let expected = 100.0 + round.settlement.profit;
        assert!((accounts.balance("p1").unwrap() - expected).abs() < 1e-9);
        assert!(processor
            .act("p1", &mut session, SessionEvent::Reset)
            .unwrap()
            .is_none());
        assert!(session.state().is_idle());
    }

    #[test]
    fn test_invalid_rules_are_refused() {
        let accounts = Arc::new(InMemoryAccounts::new(100.0));
        let mut config = EngineConfig::default();
        config.rules.crash_max_multiplier = 1.0;

        let err = GameProcessor::new(&config, accounts).err().unwrap();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn test_caller_round_id_is_kept() {
        let (mut processor, _) = setup();
        let round_id = Uuid::new_v4();
        let config = GameConfig::new(
            1.0,
            GameParams::Dice(DiceParams {
                target: 50.0,
                roll_over: true,
            }),
        );
        let round = processor
            .play_with_id("p1", round_id, config, &mut ScriptedRandom::new([0.2]))
            .unwrap();

        assert_eq!(round.round_id, round_id);
        assert_eq!(processor.recent(GameKind::Dice)[0].round_id, round_id);
    }

    #[test]
    fn test_bet_helpers() {
        assert_eq!(half_bet(10.0), 5.0);
        assert_eq!(half_bet(0.6), MIN_BET_STEP);
        assert_eq!(double_bet(2.5), 5.0);
    }
}
