use serde::{Deserialize, Serialize};

use crate::{
    config::GameConfig,
    engine::{spin_once, SpinOutcome},
    error::ConfigError,
    money::Credits,
    rng::RandomSource,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinReport {
    pub spins: u64,
    pub wagered: u128,
    pub won: u128,
    pub hits: u64,
    /// Wins per payline, table order.
    pub line_hits: Vec<u64>,
}

impl SpinReport {
    /// Return to player in per-mille, rounded down.
    pub fn rtp_per_mille(&self) -> u128 {
        if self.wagered == 0 {
            0
        } else {
            self.won * 1000 / self.wagered
        }
    }

    pub fn hit_rate_per_mille(&self) -> u64 {
        if self.spins == 0 {
            0
        } else {
            self.hits * 1000 / self.spins
        }
    }

    fn record(&mut self, outcome: &SpinOutcome) {
        self.spins += 1;
        self.wagered += u128::from(outcome.bet.get());
        self.won += u128::from(outcome.total_win.get());
        if !outcome.wins.is_empty() {
            self.hits += 1;
        }
        for win in &outcome.wins {
            self.line_hits[win.payline] += 1;
        }
    }
}

/// Spin `spins` times at a flat bet, calling `observe` with every outcome.
/// No balance is involved; this measures the math sheet alone.
pub fn simulate_spins<R, F>(
    config: &GameConfig,
    rng: &mut R,
    spins: u64,
    bet: Credits,
    mut observe: F,
) -> Result<SpinReport, ConfigError>
where
    R: RandomSource + ?Sized,
    F: FnMut(u64, &SpinOutcome),
{
    let mut report = SpinReport {
        line_hits: vec![0; config.paylines.len()],
        ..SpinReport::default()
    };
    for round in 0..spins {
        let outcome = spin_once(rng, config, bet)?;
        report.record(&outcome);
        observe(round, &outcome);
    }
    Ok(report)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelReport {
    pub draws: u64,
    pub counts: Vec<u64>, // per wheel slot
    pub paid: u128,
}

pub fn simulate_wheel<R: RandomSource + ?Sized>(
    config: &GameConfig,
    rng: &mut R,
    draws: u64,
) -> WheelReport {
    let mut report = WheelReport {
        draws,
        counts: vec![0; config.wheel.len()],
        paid: 0,
    };
    for _ in 0..draws {
        let draw = config.wheel.draw(rng, &mut None);
        report.counts[draw.index] += 1;
        report.paid += u128::from(draw.value.get());
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRng;

    #[test]
    fn rtp_simulation_smoke() {
        let config = GameConfig::reference();
        let mut rng = SeededRng::new(7);
        let mut seen = 0;
        let report = simulate_spins(&config, &mut rng, 20_000, Credits::new(1), |_, _| seen += 1)
            .unwrap();
        assert_eq!(seen, 20_000);
        assert_eq!(report.wagered, 20_000);
        assert!(report.line_hits.iter().sum::<u64>() >= report.hits);
        // exhaustive enumeration of the reference sheet gives ~393 and ~104
        let rtp = report.rtp_per_mille();
        assert!((300..=500).contains(&rtp), "rtp {rtp}");
        let hit_rate = report.hit_rate_per_mille();
        assert!((80..=130).contains(&hit_rate), "hit rate {hit_rate}");
    }

    #[test]
    fn same_seed_same_report() {
        let config = GameConfig::reference();
        let a = simulate_spins(&config, &mut SeededRng::new(11), 500, Credits::new(2), |_, _| {})
            .unwrap();
        let b = simulate_spins(&config, &mut SeededRng::new(11), 500, Credits::new(2), |_, _| {})
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn wheel_counts_cover_every_draw() {
        let config = GameConfig::reference();
        let report = simulate_wheel(&config, &mut SeededRng::new(3), 10_000);
        assert_eq!(report.counts.iter().sum::<u64>(), 10_000);
        // the two 200 slices carry 200 of 354 weight units
        let share = (report.counts[1] + report.counts[5]) as f64 / 10_000.0;
        assert!((share - 200.0 / 354.0).abs() < 0.03);
    }
}
