use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::WalletScore;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One flat output row. Column order is the CSV header order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub wallet: String,
    pub n_txns: u64,
    pub n_deposit: u64,
    pub n_borrow: u64,
    pub n_repay: u64,
    pub n_redeem: u64,
    pub n_liquidation: u64,
    pub n_other: u64,
    pub total_deposit_amount: f64,
    pub total_borrow_amount: f64,
    pub total_repay_amount: f64,
    pub avg_txn_amount: f64,
    pub active_days: u64,
    pub asset_diversity: u64,
    pub borrow_to_repay_ratio: f64,
    pub rule_score: f64,
}

impl From<&WalletScore> for ScoreRecord {
    fn from(score: &WalletScore) -> Self {
        let f = &score.features;
        Self {
            wallet: f.wallet.clone(),
            n_txns: f.n_txns,
            n_deposit: f.n_deposit,
            n_borrow: f.n_borrow,
            n_repay: f.n_repay,
            n_redeem: f.n_redeem,
            n_liquidation: f.n_liquidation,
            n_other: f.n_other,
            total_deposit_amount: f.total_deposit_amount,
            total_borrow_amount: f.total_borrow_amount,
            total_repay_amount: f.total_repay_amount,
            avg_txn_amount: f.avg_txn_amount,
            active_days: f.active_days,
            asset_diversity: f.asset_diversity,
            borrow_to_repay_ratio: score.borrow_to_repay_ratio,
            rule_score: score.rule_score,
        }
    }
}

/// Write the scored table as CSV, creating parent directories as needed.
pub fn write_csv(path: impl AsRef<Path>, scores: &[WalletScore]) -> Result<(), OutputError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_csv_to(file, scores)?;
    tracing::info!("Saved {} wallet scores to {}", scores.len(), path.display());
    Ok(())
}

/// Write the scored table as CSV (header row, one line per wallet) to any writer.
pub fn write_csv_to<W: Write>(writer: W, scores: &[WalletScore]) -> Result<(), OutputError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for score in scores {
        csv_writer.serialize(ScoreRecord::from(score))?;
    }
    csv_writer.flush()?;
    Ok(())
}
