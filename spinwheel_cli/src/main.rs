use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use spinwheel_core::{
    simulate_spins, simulate_wheel, verify_stops, Credits, FixedBet, GameConfig, GameSession,
    MathSheet, SeededRng,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spinwheel-cli", about = "Play, simulate and verify spinwheel rounds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Math sheet JSON; the built-in reference sheet when omitted
    #[arg(long, global = true, env = "MATH_SHEET")]
    math_sheet: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play base-game rounds against a fresh session
    Spin {
        #[arg(long)]
        seed: Option<u64>,
        /// Fixed stake; the random bet policy is used otherwise
        #[arg(long)]
        bet: Option<u64>,
        #[arg(long, default_value_t = 1)]
        rounds: u32,
    },
    /// Measure RTP and hit rate over many spins
    Simulate {
        #[arg(long, default_value_t = 100_000)]
        spins: u64,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[arg(long, default_value_t = 1)]
        bet: u64,
        /// Write every spin to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Draw the bonus wheel repeatedly and print slot frequencies
    Wheel {
        #[arg(long, default_value_t = 10_000)]
        draws: u64,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// Check that revealed seeds reproduce a logged set of stops
    Verify {
        #[arg(long)]
        server_seed: String,
        #[arg(long)]
        client_seed: String,
        #[arg(long)]
        nonce: u64,
        /// Comma separated, e.g. 18,9,2,0,12
        #[arg(long, value_delimiter = ',')]
        stops: Vec<usize>,
    },
    /// Print the reference math sheet as JSON
    Sheet,
}

#[derive(Serialize)]
struct SpinRow {
    round: u64,
    stops: String,
    bet: u64,
    total_win: u64,
    lines: usize,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<GameConfig> {
    match path {
        Some(path) => GameConfig::from_path(path)
            .with_context(|| format!("loading math sheet {}", path.display())),
        None => Ok(GameConfig::reference()),
    }
}

fn rng_for(seed: Option<u64>) -> SeededRng {
    match seed {
        Some(seed) => SeededRng::new(seed),
        None => SeededRng::from_entropy(),
    }
}

fn per_mille(value: u128) -> String {
    format!("{}.{}%", value / 10, value % 10)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Spin { seed, bet, rounds } => {
            let config = Arc::new(load_config(cli.math_sheet.as_ref())?);
            let mut session = GameSession::new(config);
            if let Some(bet) = bet {
                session = session.with_bet_selector(FixedBet(Credits::new(bet)));
            }
            session.toggle_game_mode()?;
            let mut rng = rng_for(seed);
            for round in 1..=rounds {
                let outcome = session.play_base_round(&mut rng)?;
                println!(
                    "#{:>4} stops={:?} bet={} win={} balance={}",
                    round,
                    outcome.stops,
                    outcome.bet,
                    outcome.total_win,
                    session.current_balance()
                );
                for win in &outcome.wins {
                    println!(
                        "      line {} {} x{} pays {}",
                        win.payline + 1,
                        win.symbol,
                        win.count,
                        win.payout
                    );
                }
            }
            let ledger = session.ledger();
            println!(
                "wagered={} won={} balance={}",
                ledger.total_wagered(),
                ledger.total_won(),
                session.current_balance()
            );
        }
        Commands::Simulate {
            spins,
            seed,
            bet,
            csv,
        } => {
            let config = load_config(cli.math_sheet.as_ref())?;
            let bet = Credits::new(bet);
            if !config.is_allowed_bet(bet) {
                bail!("bet {bet} is not on the math sheet");
            }
            let mut rng = SeededRng::new(seed);
            let mut writer = match &csv {
                Some(path) => Some(csv::Writer::from_path(path)?),
                None => None,
            };
            let mut write_error = None;
            let report = simulate_spins(&config, &mut rng, spins, bet, |round, outcome| {
                let Some(writer) = writer.as_mut() else {
                    return;
                };
                if write_error.is_some() {
                    return;
                }
                let row = SpinRow {
                    round,
                    stops: outcome
                        .stops
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(" "),
                    bet: outcome.bet.get(),
                    total_win: outcome.total_win.get(),
                    lines: outcome.wins.len(),
                };
                if let Err(err) = writer.serialize(row) {
                    write_error = Some(err);
                }
            })?;
            if let Some(err) = write_error {
                return Err(err.into());
            }
            if let (Some(mut writer), Some(path)) = (writer, csv) {
                writer.flush()?;
                info!(path = %path.display(), rows = spins, "spins exported");
                println!("Exported {} rows to {}", spins, path.display());
            }
            println!(
                "spins={} wagered={} won={} rtp={} hit_rate={}",
                report.spins,
                report.wagered,
                report.won,
                per_mille(report.rtp_per_mille()),
                per_mille(u128::from(report.hit_rate_per_mille()))
            );
            for (index, hits) in report.line_hits.iter().enumerate() {
                println!("line {}: {hits} wins", index + 1);
            }
        }
        Commands::Wheel { draws, seed } => {
            let config = load_config(cli.math_sheet.as_ref())?;
            let mut rng = SeededRng::new(seed);
            let report = simulate_wheel(&config, &mut rng, draws);
            let total = config.wheel.total_weight();
            for (index, count) in report.counts.iter().enumerate() {
                let entry = &config.wheel.entries()[index];
                println!(
                    "slot {index}: value={} weight={}/{} drawn={}",
                    entry.value, entry.weight, total, count
                );
            }
            println!("draws={} paid={}", report.draws, report.paid);
        }
        Commands::Verify {
            server_seed,
            client_seed,
            nonce,
            stops,
        } => {
            let config = load_config(cli.math_sheet.as_ref())?;
            if verify_stops(&server_seed, &client_seed, nonce, &config.reels, &stops) {
                println!("OK: stops {stops:?} match nonce {nonce}");
            } else {
                bail!("stops {stops:?} do not match nonce {nonce}");
            }
        }
        Commands::Sheet => {
            let sheet = match &cli.math_sheet {
                Some(path) => MathSheet::from_path(path)?,
                None => MathSheet::reference(),
            };
            println!("{}", sheet.to_json_pretty()?);
        }
    }

    Ok(())
}
