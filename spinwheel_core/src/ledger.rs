use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{ProtocolViolation, SessionError, SessionResult},
    money::Credits,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    balance: Credits,
    initial: Credits,
    total_wagered: Credits,
    total_won: Credits,
    open_bet: Option<Credits>,
}

impl Ledger {
    pub fn new(initial: Credits) -> Self {
        Self {
            balance: initial,
            initial,
            total_wagered: Credits::ZERO,
            total_won: Credits::ZERO,
            open_bet: None,
        }
    }

    pub fn balance(&self) -> Credits {
        self.balance
    }

    pub fn open_bet(&self) -> Option<Credits> {
        self.open_bet
    }

    pub fn total_wagered(&self) -> Credits {
        self.total_wagered
    }

    pub fn total_won(&self) -> Credits {
        self.total_won
    }

    pub fn place_bet(&mut self, amount: Credits) -> SessionResult<()> {
        if self.open_bet.is_some() {
            return Err(ProtocolViolation::BetAlreadyOpen.into());
        }
        if amount.is_zero() {
            return Err(ProtocolViolation::ZeroBet.into());
        }
        let balance = self
            .balance
            .checked_sub(amount)
            .ok_or(SessionError::InsufficientFunds {
                bet: amount,
                balance: self.balance,
            })?;
        let wagered = self
            .total_wagered
            .checked_add(amount)
            .ok_or(SessionError::Overflow)?;
        self.balance = balance;
        self.total_wagered = wagered;
        self.open_bet = Some(amount);
        debug!(bet = %amount, balance = %self.balance, "bet placed");
        Ok(())
    }

    /// Credit the win for the open bet and close it.
    pub fn settle(&mut self, total_win: Credits) -> SessionResult<Credits> {
        if self.open_bet.is_none() {
            return Err(ProtocolViolation::SettleWithoutBet.into());
        }
        self.credit(total_win)?;
        self.open_bet = None;
        debug!(win = %total_win, balance = %self.balance, "round settled");
        Ok(self.balance)
    }

    /// Void the open bet, returning the stake. Used when no result could be
    /// produced for it.
    pub fn refund(&mut self) -> SessionResult<Credits> {
        let Some(bet) = self.open_bet else {
            return Err(ProtocolViolation::SettleWithoutBet.into());
        };
        let balance = self.balance.checked_add(bet).ok_or(SessionError::Overflow)?;
        let wagered = self
            .total_wagered
            .checked_sub(bet)
            .ok_or(SessionError::Overflow)?;
        self.balance = balance;
        self.total_wagered = wagered;
        self.open_bet = None;
        debug!(bet = %bet, balance = %self.balance, "bet refunded");
        Ok(bet)
    }

    /// Credit a bonus prize, which is not tied to a bet.
    pub fn credit_bonus(&mut self, prize: Credits) -> SessionResult<Credits> {
        self.credit(prize)?;
        debug!(prize = %prize, balance = %self.balance, "bonus credited");
        Ok(self.balance)
    }

    fn credit(&mut self, amount: Credits) -> SessionResult<()> {
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(SessionError::Overflow)?;
        let won = self
            .total_won
            .checked_add(amount)
            .ok_or(SessionError::Overflow)?;
        self.balance = balance;
        self.total_won = won;
        Ok(())
    }

    /// `balance == initial - wagered + won`, computed without underflow.
    pub fn audit(&self) -> bool {
        let inflow = self.initial.get() as u128 + self.total_won.get() as u128;
        let outflow = self.total_wagered.get() as u128 + self.balance.get() as u128;
        inflow == outflow
    }
}
