use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use spinwheel_core::{Credits, GameMode, Symbol, WinEntry};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CreateSessionRequest {
    pub client_seed: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionView {
    pub session_id: Uuid,
    pub server_seed_hash: String,
    pub client_seed: String,
    pub nonce: u64,
    pub mode: GameMode,
    pub balance: Credits,
    pub selected_bet: Credits,
    pub open_bet: Option<Credits>,
    pub stops: Vec<usize>,
    pub window: Vec<Vec<Symbol>>, // window[reel][row]
    pub prize_values: Vec<Credits>,
    pub created_at: DateTime<Utc>,
}

/// Omitting `amount` lets the server's bet policy choose the stake.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct BetRequest {
    pub amount: Option<Credits>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BetResponse {
    pub bet: Credits,
    pub balance: Credits,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpinResponse {
    pub server_seed_hash: String,
    pub nonce: u64,
    pub stops: Vec<usize>,
    pub window: Vec<Vec<Symbol>>,
    pub bet: Credits,
    pub wins: Vec<WinEntry>,
    pub total_win: Credits,
    pub balance: Credits,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SettleRequest {
    pub total_win: Credits,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BalanceResponse {
    pub balance: Credits,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModeResponse {
    pub mode: GameMode,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WheelDrawResponse {
    pub server_seed_hash: String,
    pub nonce: Option<u64>, // None when an override decided the draw
    pub prize_index: usize,
    pub prize_value: Credits,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreditPrizeRequest {
    pub prize_value: Credits,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PrizeOverrideRequest {
    pub index: usize,
}

/// Returned when a session is closed; the revealed seed lets the player
/// re-derive every logged spin.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CloseSessionResponse {
    pub server_seed: String,
    pub server_seed_hash: String,
    pub client_seed: String,
    pub final_balance: Credits,
    pub history: Vec<SpinLogEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundKind {
    Spin {
        stops: Vec<usize>,
        bet: Credits,
        total_win: Credits,
    },
    Wheel {
        prize_index: usize,
        prize_value: Credits,
        forced: bool,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpinLogEntry {
    pub ts: DateTime<Utc>,
    pub nonce: Option<u64>,
    pub round: RoundKind,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("session not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("protocol violation: {0}")]
    Conflict(String),
    #[error("internal server error")]
    Internal,
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_kind_is_tagged() {
        let round = RoundKind::Wheel {
            prize_index: 2,
            prize_value: Credits::new(1000),
            forced: false,
        };
        let json = serde_json::to_value(&round).unwrap();
        assert_eq!(json["kind"], "wheel");
        assert_eq!(json["prize_value"], 1000);
    }

    #[test]
    fn bet_request_amount_is_optional() {
        let req: BetRequest = serde_json::from_str("{}").unwrap();
        assert!(req.amount.is_none());
        let req: BetRequest = serde_json::from_str(r#"{"amount": 5}"#).unwrap();
        assert_eq!(req.amount, Some(Credits::new(5)));
    }

    #[test]
    fn modes_use_snake_case() {
        assert_eq!(
            serde_json::to_string(&GameMode::BonusGame).unwrap(),
            "\"bonus_game\""
        );
    }
}
