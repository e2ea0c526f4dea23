use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    money::Credits,
    symbols::{Symbol, VISIBLE_ROWS},
};

/// Shortest run on a payline that pays. Two of a kind never pays.
pub const MIN_MATCH: usize = 3;

/// Bet multipliers keyed by symbol, then by match count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Paytable(pub BTreeMap<Symbol, BTreeMap<usize, u64>>);

impl Paytable {
    pub fn multiplier(&self, symbol: Symbol, count: usize) -> Option<u64> {
        self.0.get(&symbol)?.get(&count).copied()
    }

    pub fn payout(&self, symbol: Symbol, count: usize, bet: Credits) -> Result<Credits, ConfigError> {
        let multiplier = self
            .multiplier(symbol, count)
            .ok_or(ConfigError::MissingPayout { symbol, count })?;
        bet.checked_mul(multiplier)
            .ok_or(ConfigError::PayoutOverflow { symbol, count, bet })
    }

    /// Every symbol that can land must pay for every count from
    /// [`MIN_MATCH`] up to the reel count.
    pub fn validate(&self, symbols: &[Symbol], reel_count: usize) -> Result<(), ConfigError> {
        for &symbol in symbols {
            for count in MIN_MATCH..=reel_count {
                if self.multiplier(symbol, count).is_none() {
                    return Err(ConfigError::MissingPayout { symbol, count });
                }
            }
        }
        Ok(())
    }

    pub fn reference() -> Self {
        let rows: [(Symbol, [u64; 3]); 8] = [
            (Symbol::Lv1, [2, 5, 10]),
            (Symbol::Lv2, [1, 2, 5]),
            (Symbol::Lv3, [1, 2, 3]),
            (Symbol::Lv4, [1, 2, 3]),
            (Symbol::Hv1, [10, 20, 50]),
            (Symbol::Hv2, [5, 10, 20]),
            (Symbol::Hv3, [5, 10, 15]),
            (Symbol::Hv4, [5, 10, 15]),
        ];
        Self(
            rows.into_iter()
                .map(|(symbol, pays)| {
                    let by_count = (MIN_MATCH..).zip(pays).collect();
                    (symbol, by_count)
                })
                .collect(),
        )
    }
}

/// Row to read on each reel, left to right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payline {
    pub rows: Vec<u8>,
}

impl Payline {
    pub fn new(rows: Vec<u8>) -> Self {
        Self { rows }
    }

    pub fn straight(row: u8, reel_count: usize) -> Self {
        Self {
            rows: vec![row; reel_count],
        }
    }
}

/// The seven lines of the reference 5x3 game, in display order.
pub fn reference_paylines() -> Vec<Payline> {
    vec![
        Payline::straight(1, 5),
        Payline::straight(0, 5),
        Payline::straight(2, 5),
        Payline::new(vec![0, 0, 1, 2, 2]),
        Payline::new(vec![2, 2, 1, 0, 0]),
        Payline::new(vec![0, 1, 2, 1, 0]),
        Payline::new(vec![2, 1, 0, 1, 2]),
    ]
}

pub fn validate_paylines(paylines: &[Payline], reel_count: usize) -> Result<(), ConfigError> {
    if paylines.is_empty() {
        return Err(ConfigError::NoPaylines);
    }
    for (line, payline) in paylines.iter().enumerate() {
        if payline.rows.len() != reel_count {
            return Err(ConfigError::PaylineLength {
                line,
                len: payline.rows.len(),
                reels: reel_count,
            });
        }
        if let Some((reel, &row)) = payline
            .rows
            .iter()
            .enumerate()
            .find(|&(_, &row)| usize::from(row) >= VISIBLE_ROWS)
        {
            return Err(ConfigError::PaylineRow {
                line,
                reel,
                row,
                rows: VISIBLE_ROWS,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_table_matches_math_sheet() {
        let table = Paytable::reference();
        assert_eq!(table.multiplier(Symbol::Hv1, 5), Some(50));
        assert_eq!(table.multiplier(Symbol::Lv1, 3), Some(2));
        assert_eq!(table.multiplier(Symbol::Lv1, 2), None);
        assert!(table.validate(&Symbol::ALL, 5).is_ok());
    }

    #[test]
    fn missing_entry_is_an_error_not_zero() {
        let mut table = Paytable::reference();
        table.0.get_mut(&Symbol::Hv4).unwrap().remove(&4);
        assert_eq!(
            table.validate(&Symbol::ALL, 5),
            Err(ConfigError::MissingPayout {
                symbol: Symbol::Hv4,
                count: 4
            })
        );
        assert!(table.payout(Symbol::Hv4, 4, Credits::new(1)).is_err());
    }

    #[test]
    fn paytable_reads_from_json_with_string_counts() {
        let table: Paytable =
            serde_json::from_str(r#"{"lv1": {"3": 2, "4": 5, "5": 10}}"#).unwrap();
        assert_eq!(table.payout(Symbol::Lv1, 4, Credits::new(3)), Ok(Credits::new(15)));
    }

    #[test]
    fn payline_shape_is_checked() {
        let lines = reference_paylines();
        assert!(validate_paylines(&lines, 5).is_ok());
        assert!(matches!(
            validate_paylines(&lines, 4),
            Err(ConfigError::PaylineLength { line: 0, .. })
        ));
        let bad = vec![Payline::new(vec![0, 1, 3, 1, 0])];
        assert_eq!(
            validate_paylines(&bad, 5),
            Err(ConfigError::PaylineRow {
                line: 0,
                reel: 2,
                row: 3,
                rows: 3
            })
        );
        assert_eq!(validate_paylines(&[], 5), Err(ConfigError::NoPaylines));
    }
}
