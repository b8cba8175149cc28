use thiserror::Error;
use tracing::info;

use crate::core::aggregate::aggregate;
use crate::core::{NormalizedTransaction, WalletScore};
use crate::signals::ScoringEngine;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("batch contains no wallets to score")]
    EmptyBatch,
}

/// Run the batch: aggregate transactions per wallet, then score the population.
///
/// Either every wallet gets a score or the batch fails as a whole.
pub fn run_batch(
    txns: &[NormalizedTransaction],
    engine: &ScoringEngine,
) -> Result<Vec<WalletScore>, PipelineError> {
    info!("Aggregating {} transactions...", txns.len());
    let features = aggregate(txns);
    if features.is_empty() {
        return Err(PipelineError::EmptyBatch);
    }
    info!("Generated features for {} wallets", features.len());

    let scored = engine.score_batch(&features);
    info!("Scored {} wallets", scored.len());
    Ok(scored)
}
