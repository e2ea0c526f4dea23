use serde::{Deserialize, Serialize};

use crate::error::ProtocolViolation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Before the first activation only; never re-entered.
    #[default]
    Init,
    BaseGame,
    BonusGame,
}

/// Tracks which of the two games is live. The machine never decides when to
/// switch; the caller toggles once its feature entry/exit has finished.
#[derive(Debug, Clone, Default)]
pub struct ModeMachine {
    mode: GameMode,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn toggle(&mut self) -> GameMode {
        self.mode = match self.mode {
            GameMode::Init | GameMode::BonusGame => GameMode::BaseGame,
            GameMode::BaseGame => GameMode::BonusGame,
        };
        self.mode
    }

    pub fn require(&self, expected: GameMode) -> Result<(), ProtocolViolation> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(ProtocolViolation::WrongMode {
                expected,
                actual: self.mode,
            })
        }
    }
}
