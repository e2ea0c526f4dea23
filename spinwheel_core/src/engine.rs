use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::GameConfig,
    error::ConfigError,
    money::Credits,
    paytable::{validate_paylines, Payline, Paytable, MIN_MATCH},
    rng::{ProvablyFairRng, RandomSource},
    symbols::{ReelSet, Symbol, VisibleWindow},
};

/// One paying line. `payline` is the 0-based position in the payline table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinEntry {
    pub payline: usize,
    pub symbol: Symbol,
    pub count: usize,
    pub payout: Credits,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub wins: Vec<WinEntry>, // payline table order
    pub total_win: Credits,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub stops: Vec<usize>,
    pub window: VisibleWindow,
    pub bet: Credits,
    pub wins: Vec<WinEntry>,
    pub total_win: Credits,
}

/// Draw one stop per reel, each uniform over its own strip.
pub fn sample_stops<R: RandomSource + ?Sized>(reels: &ReelSet, rng: &mut R) -> Vec<usize> {
    reels
        .reels
        .iter()
        .map(|strip| rng.below(strip.len() as u64) as usize)
        .collect()
}

/// Number of leading reels showing the first reel's symbol on this line.
fn run_length(window: &VisibleWindow, payline: &Payline) -> Option<(Symbol, usize)> {
    let mut cells = window
        .iter()
        .zip(&payline.rows)
        .map(|(column, &row)| column[usize::from(row)]);
    let seed = cells.next()?;
    let count = 1 + cells.take_while(|&symbol| symbol == seed).count();
    Some((seed, count))
}

/// Score every payline for the given stops, left to right, in table order.
pub fn evaluate(
    stops: &[usize],
    reels: &ReelSet,
    paylines: &[Payline],
    paytable: &Paytable,
    bet: Credits,
) -> Result<Evaluation, ConfigError> {
    let window = reels.window(stops);
    evaluate_window(&window, paylines, paytable, bet)
}

/// Paylines are checked against the window first, so a table that was never
/// loaded through [`GameConfig::load`] fails instead of indexing out of range.
pub fn evaluate_window(
    window: &VisibleWindow,
    paylines: &[Payline],
    paytable: &Paytable,
    bet: Credits,
) -> Result<Evaluation, ConfigError> {
    validate_paylines(paylines, window.len())?;
    let mut wins = Vec::new();
    let mut total_win = Credits::ZERO;
    for (index, payline) in paylines.iter().enumerate() {
        let Some((symbol, count)) = run_length(window, payline) else {
            continue;
        };
        if count < MIN_MATCH {
            continue;
        }
        let payout = paytable.payout(symbol, count, bet)?;
        total_win = total_win
            .checked_add(payout)
            .ok_or(ConfigError::PayoutOverflow { symbol, count, bet })?;
        wins.push(WinEntry {
            payline: index,
            symbol,
            count,
            payout,
        });
    }
    Ok(Evaluation { wins, total_win })
}

/// Sample and score one base-game spin. Pure: touches no balance.
pub fn spin_once<R: RandomSource + ?Sized>(
    rng: &mut R,
    config: &GameConfig,
    bet: Credits,
) -> Result<SpinOutcome, ConfigError> {
    let stops = sample_stops(&config.reels, rng);
    let window = config.reels.window(&stops);
    let Evaluation { wins, total_win } =
        evaluate_window(&window, &config.paylines, &config.payouts, bet)?;
    debug!(?stops, bet = %bet, win = %total_win, lines = wins.len(), "spin evaluated");
    Ok(SpinOutcome {
        stops,
        window,
        bet,
        wins,
        total_win,
    })
}

/// Convenience: perform a spin creating the RNG from seeds.
pub fn spin_with_seeds(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    config: &GameConfig,
    bet: Credits,
) -> Result<SpinOutcome, ConfigError> {
    let mut rng = ProvablyFairRng::new(server_seed, client_seed, nonce);
    spin_once(&mut rng, config, bet)
}

/// Verify that the given stops are what the seeds produce for these reels.
pub fn verify_stops(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    reels: &ReelSet,
    expected_stops: &[usize],
) -> bool {
    let mut rng = ProvablyFairRng::new(server_seed, client_seed, nonce);
    sample_stops(reels, &mut rng) == expected_stops
}
