use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use walletscore::config::Config;
use walletscore::core::WalletScore;
use walletscore::core::pipeline::run_batch;
use walletscore::db::{self, Database};
use walletscore::report::ScoreSummary;
use walletscore::signals::ScoringEngine;
use walletscore::{ingest, output};

/// Score lending-protocol wallets (0-1000) from a raw transaction export.
#[derive(Debug, Parser)]
#[command(name = "walletscore", version)]
struct Cli {
    /// TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Raw transaction JSON (overrides config).
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output CSV path (overrides config).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also append the scored batch to this SQLite database (overrides config).
    #[arg(long)]
    sqlite: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("walletscore=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("⚡ walletscore starting...");

    let config = Config::load(&cli.config);
    tracing::info!("Config: {:?}", config);

    let input = cli.input.unwrap_or_else(|| PathBuf::from(&config.input.path));
    let output = cli.output.unwrap_or_else(|| PathBuf::from(&config.output.csv_path));
    let sqlite = cli.sqlite.or_else(|| config.output.sqlite_path.as_ref().map(PathBuf::from));

    tracing::info!("🔄 Step 1: Loading raw transactions...");
    let ingested = ingest::load_transactions(&input, config.input.amount_scale)
        .with_context(|| format!("loading transactions from {}", input.display()))?;

    tracing::info!("🔄 Step 2: Aggregating and scoring wallets...");
    let engine = ScoringEngine::with_weights(&config.scoring.weights);
    let scores = run_batch(&ingested.transactions, &engine).context("scoring batch")?;

    ScoreSummary::from_scores(&scores).log();

    tracing::info!("💾 Step 3: Saving results...");
    output::write_csv(&output, &scores)
        .with_context(|| format!("writing {}", output.display()))?;

    // History is best-effort: the CSV is the primary sink and is already written.
    if let Some(db_path) = sqlite {
        if let Err(e) = store_history(&db_path, &scores) {
            tracing::warn!("Failed to store score history in {}: {e:#}", db_path.display());
        }
    }

    tracing::info!("🎉 Done");
    Ok(())
}

fn store_history(path: &Path, scores: &[WalletScore]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let db = Database::open(path).with_context(|| format!("opening {}", path.display()))?;
    let run_id = db::run_id(chrono::Utc::now());
    db.store_run(&run_id, scores)
        .with_context(|| format!("storing run {run_id}"))?;
    tracing::info!("Stored run {run_id} ({} wallets) in {}", scores.len(), path.display());
    Ok(())
}
