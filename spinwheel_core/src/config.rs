use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    money::Credits,
    paytable::{reference_paylines, validate_paylines, Payline, Paytable},
    symbols::ReelSet,
    wheel::{reference_prizes, PrizeEntry, WeightedIndex},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathSheet {
    pub reels: ReelSet,
    pub paylines: Vec<Payline>,
    pub payouts: Paytable,
    pub prizes: Vec<PrizeEntry>,
    pub bets: Vec<Credits>,
    pub starting_balance: Credits,
    /// Stops shown before the first spin.
    #[serde(default)]
    pub initial_stops: Option<Vec<usize>>,
}

impl MathSheet {
    pub fn reference() -> Self {
        Self {
            reels: ReelSet::reference(),
            paylines: reference_paylines(),
            payouts: Paytable::reference(),
            prizes: reference_prizes(),
            bets: [1, 2, 3, 5, 10].into_iter().map(Credits::new).collect(),
            starting_balance: Credits::new(10_000),
            initial_stops: Some(vec![18, 9, 2, 0, 12]),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Validated, immutable game tables. Shared read-only by every session.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub reels: ReelSet,
    pub paylines: Vec<Payline>,
    pub payouts: Paytable,
    pub wheel: WeightedIndex,
    pub bets: Vec<Credits>,
    pub starting_balance: Credits,
    pub initial_stops: Vec<usize>,
}

impl GameConfig {
    pub fn load(sheet: MathSheet) -> Result<Self, ConfigError> {
        sheet.reels.validate()?;
        let reel_count = sheet.reels.reel_count();
        validate_paylines(&sheet.paylines, reel_count)?;
        sheet
            .payouts
            .validate(&sheet.reels.distinct_symbols(), reel_count)?;
        let wheel = WeightedIndex::build(sheet.prizes)?;
        if sheet.bets.is_empty() {
            return Err(ConfigError::NoAllowedBets);
        }
        if sheet.bets.iter().any(|b| b.is_zero()) {
            return Err(ConfigError::ZeroBet);
        }
        let lengths = sheet.reels.strip_lengths();
        let initial_stops = match sheet.initial_stops {
            Some(stops) => {
                if stops.len() != reel_count {
                    return Err(ConfigError::InitialStopsLength {
                        len: stops.len(),
                        reels: reel_count,
                    });
                }
                if let Some((reel, (&stop, &len))) = stops
                    .iter()
                    .zip(&lengths)
                    .enumerate()
                    .find(|&(_, (&stop, &len))| stop >= len)
                {
                    return Err(ConfigError::InitialStopOutOfRange { reel, stop, len });
                }
                stops
            }
            None => vec![0; reel_count],
        };
        Ok(Self {
            reels: sheet.reels,
            paylines: sheet.paylines,
            payouts: sheet.payouts,
            wheel,
            bets: sheet.bets,
            starting_balance: sheet.starting_balance,
            initial_stops,
        })
    }

    pub fn reference() -> Self {
        Self::load(MathSheet::reference()).expect("reference math sheet is valid")
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load(MathSheet::from_path(path)?)
    }

    pub fn is_allowed_bet(&self, amount: Credits) -> bool {
        self.bets.contains(&amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Symbol;

    #[test]
    fn reference_sheet_loads() {
        let config = GameConfig::reference();
        assert_eq!(config.reels.reel_count(), 5);
        assert_eq!(config.paylines.len(), 7);
        assert_eq!(config.initial_stops, vec![18, 9, 2, 0, 12]);
        assert!(config.is_allowed_bet(Credits::new(5)));
        assert!(!config.is_allowed_bet(Credits::new(4)));
    }

    #[test]
    fn sheet_survives_json() {
        let json = MathSheet::reference().to_json_pretty().unwrap();
        let back = MathSheet::from_json_str(&json).unwrap();
        assert_eq!(back, MathSheet::reference());
    }

    #[test]
    fn empty_strip_stops_loading() {
        let mut sheet = MathSheet::reference();
        sheet.reels.reels[3].clear();
        assert_eq!(
            GameConfig::load(sheet).unwrap_err(),
            ConfigError::EmptyReelStrip { reel: 3 }
        );
    }

    #[test]
    fn symbol_without_payouts_stops_loading() {
        let mut sheet = MathSheet::reference();
        sheet.payouts.0.remove(&Symbol::Lv4);
        assert_eq!(
            GameConfig::load(sheet).unwrap_err(),
            ConfigError::MissingPayout {
                symbol: Symbol::Lv4,
                count: 3
            }
        );
    }

    #[test]
    fn zero_weight_wheel_stops_loading() {
        let mut sheet = MathSheet::reference();
        for prize in &mut sheet.prizes {
            prize.weight = 0;
        }
        assert_eq!(GameConfig::load(sheet).unwrap_err(), ConfigError::ZeroPrizeWeight);
    }

    #[test]
    fn bet_list_is_checked() {
        let mut sheet = MathSheet::reference();
        sheet.bets.clear();
        assert_eq!(GameConfig::load(sheet).unwrap_err(), ConfigError::NoAllowedBets);
        let mut sheet = MathSheet::reference();
        sheet.bets.push(Credits::ZERO);
        assert_eq!(GameConfig::load(sheet).unwrap_err(), ConfigError::ZeroBet);
    }

    #[test]
    fn unreadable_sheet_is_reported() {
        assert!(matches!(
            MathSheet::from_path("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
        assert!(matches!(
            MathSheet::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_initial_stops_default_to_zero() {
        let mut sheet = MathSheet::reference();
        sheet.initial_stops = None;
        assert_eq!(GameConfig::load(sheet).unwrap().initial_stops, vec![0; 5]);
    }

    #[test]
    fn malformed_initial_stops_stop_loading() {
        let mut sheet = MathSheet::reference();
        sheet.initial_stops = Some(vec![1, 2, 3]);
        assert_eq!(
            GameConfig::load(sheet).unwrap_err(),
            ConfigError::InitialStopsLength { len: 3, reels: 5 }
        );
        let mut sheet = MathSheet::reference();
        sheet.initial_stops = Some(vec![18, 9, 20, 0, 12]);
        assert_eq!(
            GameConfig::load(sheet).unwrap_err(),
            ConfigError::InitialStopOutOfRange {
                reel: 2,
                stop: 20,
                len: 20
            }
        );
    }
}
