use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    bet::{BetSelector, RandomBet},
    config::GameConfig,
    engine::{spin_once, SpinOutcome},
    error::{ProtocolViolation, SessionError, SessionResult},
    ledger::Ledger,
    mode::{GameMode, ModeMachine},
    money::Credits,
    rng::RandomSource,
    symbols::VisibleWindow,
    wheel::WheelDraw,
};

fn reject(violation: ProtocolViolation) -> SessionError {
    warn!(%violation, "protocol violation");
    violation.into()
}

/// One player's game. Spins and wheel draws are computed first and applied
/// by a separate credit call.
pub struct GameSession {
    config: Arc<GameConfig>,
    ledger: Ledger,
    mode: ModeMachine,
    stops: Vec<usize>,
    selected_bet: Credits,
    bet_selector: Box<dyn BetSelector>,
    pending_spin: Option<SpinOutcome>,
    pending_prize: Option<WheelDraw>,
    last_bonus_prize: Credits,
    prize_override: Option<usize>,
}

impl GameSession {
    pub fn new(config: Arc<GameConfig>) -> Self {
        let balance = config.starting_balance;
        Self::with_balance(config, balance)
    }

    pub fn with_balance(config: Arc<GameConfig>, balance: Credits) -> Self {
        let selected_bet = config.bets.first().copied().unwrap_or(Credits::ZERO);
        Self {
            stops: config.initial_stops.clone(),
            ledger: Ledger::new(balance),
            mode: ModeMachine::new(),
            selected_bet,
            bet_selector: Box::new(RandomBet),
            pending_spin: None,
            pending_prize: None,
            last_bonus_prize: Credits::ZERO,
            prize_override: None,
            config,
        }
    }

    pub fn with_bet_selector(mut self, selector: impl BetSelector + 'static) -> Self {
        self.bet_selector = Box::new(selector);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn current_balance(&self) -> Credits {
        self.ledger.balance()
    }

    pub fn mode(&self) -> GameMode {
        self.mode.mode()
    }

    pub fn selected_bet(&self) -> Credits {
        self.selected_bet
    }

    pub fn stops(&self) -> &[usize] {
        &self.stops
    }

    /// Recomputed from the current stops on every call.
    pub fn window(&self) -> VisibleWindow {
        self.config.reels.window(&self.stops)
    }

    pub fn pending_spin(&self) -> Option<&SpinOutcome> {
        self.pending_spin.as_ref()
    }

    pub fn pending_prize(&self) -> Option<WheelDraw> {
        self.pending_prize
    }

    /// Value of the most recent wheel award, credited or not.
    pub fn last_bonus_prize(&self) -> Credits {
        self.last_bonus_prize
    }

    pub fn prize_values(&self) -> Vec<Credits> {
        self.config.wheel.values()
    }

    pub fn prize_override(&self) -> Option<usize> {
        self.prize_override
    }

    /// Ask the bet policy for the next stake and remember it.
    pub fn select_bet(&mut self, rng: &mut dyn RandomSource) -> Credits {
        self.selected_bet = self.bet_selector.select(&self.config.bets, rng);
        self.selected_bet
    }

    pub fn place_bet(&mut self, amount: Credits) -> SessionResult<()> {
        self.mode.require(GameMode::BaseGame).map_err(reject)?;
        if self.ledger.open_bet().is_some() {
            return Err(reject(ProtocolViolation::BetAlreadyOpen));
        }
        if amount.is_zero() {
            return Err(reject(ProtocolViolation::ZeroBet));
        }
        if !self.config.is_allowed_bet(amount) {
            return Err(reject(ProtocolViolation::BetNotAllowed(amount)));
        }
        self.ledger.place_bet(amount)?;
        self.selected_bet = amount;
        Ok(())
    }

    /// Sample and score the reels for the open bet. The win is held as
    /// pending until [`GameSession::credit_winnings`] applies it.
    pub fn spin_base_game<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> SessionResult<SpinOutcome> {
        self.mode.require(GameMode::BaseGame).map_err(reject)?;
        let Some(bet) = self.ledger.open_bet() else {
            return Err(reject(ProtocolViolation::SpinWithoutBet));
        };
        if self.pending_spin.is_some() {
            return Err(reject(ProtocolViolation::SpinInFlight));
        }
        let outcome = match spin_once(rng, &self.config, bet) {
            Ok(outcome) => outcome,
            Err(err) => {
                // no result exists for this bet, so it is handed back
                self.ledger.refund()?;
                warn!(%err, bet = %bet, "spin failed, bet refunded");
                return Err(err.into());
            }
        };
        self.stops.clone_from(&outcome.stops);
        self.pending_spin = Some(outcome.clone());
        Ok(outcome)
    }

    pub fn credit_winnings(&mut self, total_win: Credits) -> SessionResult<Credits> {
        if self.ledger.open_bet().is_none() {
            return Err(reject(ProtocolViolation::SettleWithoutBet));
        }
        let Some(pending) = self.pending_spin.as_ref() else {
            return Err(reject(ProtocolViolation::SettleBeforeSpin));
        };
        if pending.total_win != total_win {
            return Err(reject(ProtocolViolation::SettlementMismatch {
                expected: pending.total_win,
                offered: total_win,
            }));
        }
        let balance = self.ledger.settle(total_win)?;
        self.pending_spin = None;
        Ok(balance)
    }

    /// Select, place, spin and settle in one go.
    pub fn play_base_round<R: RandomSource>(&mut self, rng: &mut R) -> SessionResult<SpinOutcome> {
        let bet = self.select_bet(rng);
        self.place_bet(bet)?;
        let outcome = self.spin_base_game(rng)?;
        self.credit_winnings(outcome.total_win)?;
        Ok(outcome)
    }

    pub fn draw_bonus_prize<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> SessionResult<WheelDraw> {
        self.mode.require(GameMode::BonusGame).map_err(reject)?;
        if self.pending_prize.is_some() {
            return Err(reject(ProtocolViolation::PrizeNotCredited));
        }
        let draw = self.config.wheel.draw(rng, &mut self.prize_override);
        self.last_bonus_prize = draw.value;
        self.pending_prize = Some(draw);
        Ok(draw)
    }

    pub fn credit_bonus_prize(&mut self, value: Credits) -> SessionResult<Credits> {
        let Some(pending) = self.pending_prize else {
            return Err(reject(ProtocolViolation::NoPrizeAwarded));
        };
        if pending.value != value {
            return Err(reject(ProtocolViolation::SettlementMismatch {
                expected: pending.value,
                offered: value,
            }));
        }
        let balance = self.ledger.credit_bonus(value)?;
        self.pending_prize = None;
        Ok(balance)
    }

    pub fn toggle_game_mode(&mut self) -> SessionResult<GameMode> {
        if self.ledger.open_bet().is_some() {
            return Err(reject(ProtocolViolation::SpinInFlight));
        }
        if self.pending_prize.is_some() {
            return Err(reject(ProtocolViolation::PrizeNotCredited));
        }
        let mode = self.mode.toggle();
        if let Some(index) = self.prize_override.take() {
            debug!(index, "unused prize override dropped on mode change");
        }
        debug!(?mode, "game mode toggled");
        Ok(mode)
    }

    /// Force the next wheel draw onto `index`. Test hook; a mode change
    /// discards an override that was never drawn.
    pub fn set_prize_override(&mut self, index: usize) -> SessionResult<()> {
        if self.prize_override.is_some() {
            return Err(reject(ProtocolViolation::OverrideAlreadySet));
        }
        let len = self.config.wheel.len();
        if index >= len {
            return Err(reject(ProtocolViolation::OverrideOutOfRange { index, len }));
        }
        self.prize_override = Some(index);
        Ok(())
    }

    pub fn clear_prize_override(&mut self) -> Option<usize> {
        self.prize_override.take()
    }
}
