use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use ledger_inflation::*;
use serde_json::json;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "inflation-cli")]
#[command(about = "Apply and inspect weekly inflation runs on a ledger snapshot")]
#[command(version = "1.0.0")]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply one or more weekly inflation runs to a ledger snapshot
    Run {
        /// Ledger snapshot (JSON)
        #[arg(short, long)]
        ledger: PathBuf,

        /// Override the snapshot's ledger protocol version
        #[arg(long)]
        ledger_version: Option<u32>,

        /// Close time of the first run (RFC 3339); defaults to the next window
        #[arg(long)]
        close_time: Option<String>,

        /// Number of runs, one week apart
        #[arg(short, long, default_value = "1")]
        runs: u32,

        /// Write the resulting snapshot here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the earliest close time for a given inflation sequence
    NextWindow {
        #[arg(long)]
        inflation_seq: u64,
    },

    /// Show ranked vote totals and the winners of the next run without applying it
    Winners {
        /// Ledger snapshot (JSON)
        #[arg(short, long)]
        ledger: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result = match cli.command {
        Commands::Run {
            ledger,
            ledger_version,
            close_time,
            runs,
            output,
        } => handle_run(ledger, ledger_version, close_time, runs, output),
        Commands::NextWindow { inflation_seq } => handle_next_window(inflation_seq),
        Commands::Winners { ledger } => handle_winners(ledger),
    };

    if let Err(e) = result {
        if let Some(inner) = e.downcast_ref::<InflationError>() {
            if inner.is_fatal() {
                error!(error = %inner, "fatal inflation error, halting");
            }
        }
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_close_time(raw: &str) -> anyhow::Result<u64> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("invalid close time {:?}, expected RFC 3339", raw))?;
    u64::try_from(parsed.timestamp()).context("close time before the unix epoch")
}

fn format_time(unix: u64) -> String {
    i64::try_from(unix)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "out of range".to_string())
}

fn handle_run(
    ledger: PathBuf,
    ledger_version: Option<u32>,
    close_time: Option<String>,
    runs: u32,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let snapshot = LedgerSnapshotFile::load(&ledger)
        .with_context(|| format!("loading {}", ledger.display()))?;
    let core = Core::new(snapshot.into_store()?);

    let start = core.header();
    let version = ledger_version.unwrap_or(start.ledger_version);
    let mut close = match close_time {
        Some(raw) => parse_close_time(&raw)?,
        None => next_inflation_time(start.inflation_seq).max(start.close_time),
    };

    let mut results = Vec::new();
    for _ in 0..runs {
        let outcome = core.close_with_inflation(close, version)?;
        if !outcome.is_success() {
            bail!(
                "inflation not due at {} (next window {})",
                format_time(close),
                format_time(next_inflation_time(core.header().inflation_seq))
            );
        }
        let header = core.header();
        results.push(json!({
            "inflation_seq": header.inflation_seq,
            "close_time": format_time(close),
            "payouts": outcome.payouts,
            "total_coins": header.total_coins,
            "fee_pool": header.fee_pool,
        }));
        close = close.saturating_add(INFLATION_FREQUENCY);
    }

    let snapshot = core.snapshot();
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "runs": results,
            "header": snapshot.header(),
            "state_root": snapshot.state_root(),
        }))?
    );

    if let Some(path) = output {
        LedgerSnapshotFile::from_snapshot(&snapshot)
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn handle_next_window(inflation_seq: u64) -> anyhow::Result<()> {
    let next = next_inflation_time(inflation_seq);
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "inflation_seq": inflation_seq,
            "close_time": next,
            "close_time_utc": format_time(next),
        }))?
    );
    Ok(())
}

fn handle_winners(ledger: PathBuf) -> anyhow::Result<()> {
    let snapshot = LedgerSnapshotFile::load(&ledger)
        .with_context(|| format!("loading {}", ledger.display()))?;
    let store = snapshot.into_store()?;
    let txn = store.open();

    let header = txn.header().clone();
    let policy = ProtocolPolicy::for_version(header.ledger_version);
    let tally = VoteTally::collect(&txn)?;
    let winners = select_winners(&tally, header.total_coins);
    let plan = InflationCalculator::new(policy).plan(&txn, &winners)?;

    let ranked: Vec<_> = rank_candidates(&tally)
        .into_iter()
        .map(|e| json!({ "destination": e.destination, "votes": e.votes }))
        .collect();
    if winners.is_empty() && !tally.is_empty() {
        eprintln!("No destination reaches {} votes", min_winning_votes(header.total_coins));
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "policy": policy,
            "min_votes": min_winning_votes(header.total_coins),
            "candidates": ranked,
            "plan": plan,
            "leftover": plan.leftover()?,
        }))?
    );
    txn.rollback();
    Ok(())
}
