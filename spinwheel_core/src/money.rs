use std::fmt;

use serde::{Deserialize, Serialize};

/// Exact amount of money in the smallest unit the game knows about.
///
/// All balance, stake, payout and prize arithmetic goes through this type so
/// repeated bet/settle cycles never drift.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Credits(u64);

impl Credits {
    pub const ZERO: Credits = Credits(0);

    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Credits) -> Option<Credits> {
        self.0.checked_add(other.0).map(Credits)
    }

    pub fn checked_sub(self, other: Credits) -> Option<Credits> {
        self.0.checked_sub(other.0).map(Credits)
    }

    /// Scale by an integer multiplier (payout table entries are bet multiples).
    pub fn checked_mul(self, multiplier: u64) -> Option<Credits> {
        self.0.checked_mul(multiplier).map(Credits)
    }
}

impl From<u64> for Credits {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_ops_refuse_to_wrap() {
        let max = Credits::new(u64::MAX);
        assert_eq!(max.checked_add(Credits::new(1)), None);
        assert_eq!(Credits::ZERO.checked_sub(Credits::new(1)), None);
        assert_eq!(max.checked_mul(2), None);
        assert_eq!(Credits::new(7).checked_mul(3), Some(Credits::new(21)));
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&Credits::new(250)).unwrap();
        assert_eq!(json, "250");
        let back: Credits = serde_json::from_str("250").unwrap();
        assert_eq!(back, Credits::new(250));
    }
}
