use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Rows in view on every reel.
pub const VISIBLE_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Lv1,
    Lv2,
    Lv3,
    Lv4,
    Hv1,
    Hv2,
    Hv3,
    Hv4,
}

impl Symbol {
    pub const ALL: [Symbol; 8] = [
        Symbol::Lv1,
        Symbol::Lv2,
        Symbol::Lv3,
        Symbol::Lv4,
        Symbol::Hv1,
        Symbol::Hv2,
        Symbol::Hv3,
        Symbol::Hv4,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Symbol::Lv1 => "lv1",
            Symbol::Lv2 => "lv2",
            Symbol::Lv3 => "lv3",
            Symbol::Lv4 => "lv4",
            Symbol::Hv1 => "hv1",
            Symbol::Hv2 => "hv2",
            Symbol::Hv3 => "hv3",
            Symbol::Hv4 => "hv4",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Visible symbols per reel, `window[reel][row]`.
pub type VisibleWindow = Vec<[Symbol; VISIBLE_ROWS]>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReelSet {
    pub reels: Vec<Vec<Symbol>>, // one strip per reel
}

impl ReelSet {
    pub fn new(reels: Vec<Vec<Symbol>>) -> Result<Self, ConfigError> {
        let set = Self { reels };
        set.validate()?;
        Ok(set)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reels.is_empty() {
            return Err(ConfigError::NoReels);
        }
        if let Some(reel) = self.reels.iter().position(|strip| strip.is_empty()) {
            return Err(ConfigError::EmptyReelStrip { reel });
        }
        Ok(())
    }

    pub fn reel_count(&self) -> usize {
        self.reels.len()
    }

    pub fn strip_lengths(&self) -> Vec<usize> {
        self.reels.iter().map(Vec::len).collect()
    }

    /// Symbols in view for the given stops: `stop`, `stop + 1`, `stop + 2`,
    /// wrapping around each strip.
    pub fn window(&self, stops: &[usize]) -> VisibleWindow {
        self.reels
            .iter()
            .zip(stops)
            .map(|(strip, &stop)| {
                let mut column = [strip[stop % strip.len()]; VISIBLE_ROWS];
                for (row, slot) in column.iter_mut().enumerate() {
                    *slot = strip[(stop + row) % strip.len()];
                }
                column
            })
            .collect()
    }

    /// Every distinct symbol printed on any strip.
    pub fn distinct_symbols(&self) -> Vec<Symbol> {
        let mut seen: Vec<Symbol> = self.reels.iter().flatten().copied().collect();
        seen.sort();
        seen.dedup();
        seen
    }

    pub fn reference() -> Self {
        use Symbol::*;
        Self {
            reels: vec![
                vec![
                    Hv2, Lv3, Lv3, Hv1, Hv1, Lv1, Hv1, Hv4, Lv1, Hv3, Hv2, Hv3, Lv4, Hv4, Lv1, Hv2,
                    Lv4, Lv1, Lv3, Hv2,
                ],
                vec![
                    Hv1, Lv2, Lv3, Lv2, Lv1, Lv1, Lv4, Lv1, Lv1, Hv4, Lv3, Hv2, Lv1, Lv3, Hv1, Lv1,
                    Lv2, Lv4, Lv3, Lv2,
                ],
                vec![
                    Lv1, Hv2, Lv3, Lv4, Hv3, Hv2, Lv2, Hv2, Hv2, Lv1, Hv3, Lv1, Hv1, Lv2, Hv3, Hv2,
                    Hv4, Hv1, Lv2, Lv4,
                ],
                vec![
                    Hv2, Lv2, Hv3, Lv2, Lv4, Lv4, Hv3, Lv2, Lv4, Hv1, Lv1, Hv1, Lv2, Hv3, Lv2, Lv3,
                    Hv2, Lv1, Hv3, Lv2,
                ],
                vec![
                    Lv3, Lv4, Hv2, Hv3, Hv4, Hv1, Hv3, Hv2, Hv2, Hv4, Hv4, Hv2, Lv2, Hv4, Hv1, Lv2,
                    Hv1, Lv2, Hv4, Lv4,
                ],
            ],
        }
    }
}
