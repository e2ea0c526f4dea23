pub mod bet;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod mode;
pub mod money;
pub mod paytable;
pub mod rng;
pub mod session;
pub mod simulation;
pub mod symbols;
pub mod wheel;

pub use crate::bet::{BetSelector, FixedBet, RandomBet};
pub use crate::config::{GameConfig, MathSheet};
pub use crate::engine::{
    evaluate, evaluate_window, sample_stops, spin_once, spin_with_seeds, verify_stops, Evaluation,
    SpinOutcome, WinEntry,
};
pub use crate::error::{ConfigError, ProtocolViolation, SessionError, SessionResult};
pub use crate::ledger::Ledger;
pub use crate::mode::{GameMode, ModeMachine};
pub use crate::money::Credits;
pub use crate::paytable::{reference_paylines, Payline, Paytable, MIN_MATCH};
pub use crate::rng::{derive_hash_hex, ProvablyFairRng, RandomSource, ScriptedRng, SeededRng};
pub use crate::session::GameSession;
pub use crate::simulation::{simulate_spins, simulate_wheel, SpinReport, WheelReport};
pub use crate::symbols::{ReelSet, Symbol, VisibleWindow, VISIBLE_ROWS};
pub use crate::wheel::{reference_prizes, PrizeEntry, WeightedIndex, WheelDraw};
