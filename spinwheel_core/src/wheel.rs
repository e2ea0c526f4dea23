use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::ConfigError, money::Credits, rng::RandomSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeEntry {
    pub value: Credits,
    pub weight: u32,
}

impl PrizeEntry {
    pub const fn new(value: u64, weight: u32) -> Self {
        Self {
            value: Credits::new(value),
            weight,
        }
    }
}

/// The eight slices of the reference wheel, clockwise from the pointer.
pub fn reference_prizes() -> Vec<PrizeEntry> {
    vec![
        PrizeEntry::new(5000, 4),
        PrizeEntry::new(200, 100),
        PrizeEntry::new(1000, 20),
        PrizeEntry::new(400, 50),
        PrizeEntry::new(2000, 10),
        PrizeEntry::new(200, 100),
        PrizeEntry::new(1000, 20),
        PrizeEntry::new(400, 50),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelDraw {
    pub index: usize,
    pub value: Credits,
    /// Came from an injected override rather than the random source.
    pub forced: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedIndex {
    entries: Vec<PrizeEntry>,
    cumulative: Vec<u64>,
    total: u64,
}

impl WeightedIndex {
    pub fn build(entries: Vec<PrizeEntry>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyPrizeTable);
        }
        let cumulative: Vec<u64> = entries
            .iter()
            .scan(0u64, |running, entry| {
                *running += u64::from(entry.weight);
                Some(*running)
            })
            .collect();
        let total = cumulative.last().copied().unwrap_or(0);
        if total == 0 {
            return Err(ConfigError::ZeroPrizeWeight);
        }
        Ok(Self {
            entries,
            cumulative,
            total,
        })
    }

    pub fn total_weight(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PrizeEntry] {
        &self.entries
    }

    pub fn cumulative(&self) -> &[u64] {
        &self.cumulative
    }

    /// Slice values in table order, for drawing the wheel.
    pub fn values(&self) -> Vec<Credits> {
        self.entries.iter().map(|e| e.value).collect()
    }

    pub fn value_at(&self, index: usize) -> Option<Credits> {
        self.entries.get(index).map(|e| e.value)
    }

    /// First slot with non-zero weight whose cumulative weight is `>= unit`.
    /// Units past the total land on the last live slot.
    pub fn select(&self, unit: u64) -> usize {
        let mut last_live = 0;
        for (index, (&cumulative, entry)) in self.cumulative.iter().zip(&self.entries).enumerate() {
            if entry.weight == 0 {
                continue;
            }
            if cumulative >= unit {
                return index;
            }
            last_live = index;
        }
        last_live
    }

    /// Resolve one wheel spin. A pending override wins and is consumed.
    /// Otherwise a raw value `r` in `[0, total)` becomes unit `r + 1` for
    /// [`WeightedIndex::select`], so every slot gets exactly `weight / total`
    /// of the outcomes.
    pub fn draw<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        override_index: &mut Option<usize>,
    ) -> WheelDraw {
        if let Some(index) = override_index.take().filter(|&i| i < self.entries.len()) {
            debug!(index, "prize override consumed");
            return WheelDraw {
                index,
                value: self.entries[index].value,
                forced: true,
            };
        }
        let unit = rng.below(self.total) + 1;
        let index = self.select(unit);
        debug!(index, unit, total = self.total, "awarding prize");
        WheelDraw {
            index,
            value: self.entries[index].value,
            forced: false,
        }
    }
}
