use crate::{mode::GameMode, money::Credits, symbols::Symbol};

/// Problems with the static math sheet. Any of these stops the engine from
/// starting.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("math sheet has no reels")]
    NoReels,
    #[error("reel {reel} has an empty strip")]
    EmptyReelStrip { reel: usize },
    #[error("math sheet has no paylines")]
    NoPaylines,
    #[error("payline {line} covers {len} reels, expected {reels}")]
    PaylineLength { line: usize, len: usize, reels: usize },
    #[error("payline {line} uses row {row} on reel {reel}, only {rows} rows are visible")]
    PaylineRow {
        line: usize,
        reel: usize,
        row: u8,
        rows: usize,
    },
    #[error("no payout for {symbol} x{count}")]
    MissingPayout { symbol: Symbol, count: usize },
    #[error("payout for {symbol} x{count} overflows at bet {bet}")]
    PayoutOverflow {
        symbol: Symbol,
        count: usize,
        bet: Credits,
    },
    #[error("prize table is empty")]
    EmptyPrizeTable,
    #[error("prize table weights sum to zero")]
    ZeroPrizeWeight,
    #[error("no allowed bet amounts")]
    NoAllowedBets,
    #[error("allowed bet amounts contain zero")]
    ZeroBet,
    #[error("initial stops cover {len} reels, expected {reels}")]
    InitialStopsLength { len: usize, reels: usize },
    #[error("initial stop {stop} on reel {reel} is past the strip length {len}")]
    InitialStopOutOfRange { reel: usize, stop: usize, len: usize },
    #[error("cannot read math sheet: {0}")]
    Io(String),
    #[error("cannot parse math sheet: {0}")]
    Parse(String),
}

/// Caller broke the engine's call protocol. Distinct from a recoverable
/// refusal such as insufficient funds.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("a bet is already open for this round")]
    BetAlreadyOpen,
    #[error("bet amount must be positive")]
    ZeroBet,
    #[error("bet {0} is not one of the allowed stakes")]
    BetNotAllowed(Credits),
    #[error("spin requested without an open bet")]
    SpinWithoutBet,
    #[error("settlement requested without an open bet")]
    SettleWithoutBet,
    #[error("settlement requested before the reels were spun")]
    SettleBeforeSpin,
    #[error("settlement of {offered} does not match the computed win {expected}")]
    SettlementMismatch { expected: Credits, offered: Credits },
    #[error("operation requires {expected:?} but the game is in {actual:?}")]
    WrongMode { expected: GameMode, actual: GameMode },
    #[error("a spin is still waiting for settlement")]
    SpinInFlight,
    #[error("the awarded bonus prize has not been credited")]
    PrizeNotCredited,
    #[error("no bonus prize is waiting to be credited")]
    NoPrizeAwarded,
    #[error("a prize override is already set")]
    OverrideAlreadySet,
    #[error("prize override {index} is outside the {len} wheel slots")]
    OverrideOutOfRange { index: usize, len: usize },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("insufficient funds: bet {bet}, balance {balance}")]
    InsufficientFunds { bet: Credits, balance: Credits },
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),
    #[error("balance overflow")]
    Overflow,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type SessionResult<T> = Result<T, SessionError>;
