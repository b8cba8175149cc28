use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::{ActionType, NormalizedTransaction};

/// Raw protocol amounts are integers in 18-decimal base units.
pub const DEFAULT_AMOUNT_SCALE: f64 = 1e18;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of transaction records")]
    NotAnArray,
}

/// Parsed transactions plus the number of records that could not be attributed to a wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub transactions: Vec<NormalizedTransaction>,
    pub skipped: usize,
}

/// Load and flatten a raw transaction export.
pub fn load_transactions(
    path: impl AsRef<Path>,
    amount_scale: f64,
) -> Result<IngestOutcome, IngestError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let outcome = parse_transactions(&contents, amount_scale)?;
    info!(
        "Loaded {} transactions from {} ({} skipped)",
        outcome.transactions.len(),
        path.display(),
        outcome.skipped
    );
    Ok(outcome)
}

/// Parse a JSON array of raw records. Malformed fields become `None`.
pub fn parse_transactions(json: &str, amount_scale: f64) -> Result<IngestOutcome, IngestError> {
    let root: Value = serde_json::from_str(json)?;
    let records = root.as_array().ok_or(IngestError::NotAnArray)?;

    let mut transactions = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for (idx, record) in records.iter().enumerate() {
        match normalize_record(record, amount_scale) {
            Some(tx) => transactions.push(tx),
            None => {
                debug!("Record {idx} has no wallet, skipping");
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        warn!("Skipped {skipped} records without a wallet id");
    }

    Ok(IngestOutcome { transactions, skipped })
}

/// Flatten one raw record. Returns `None` only when the wallet is missing.
fn normalize_record(record: &Value, amount_scale: f64) -> Option<NormalizedTransaction> {
    let wallet = record.get("userWallet")?.as_str()?.trim();
    if wallet.is_empty() {
        return None;
    }
    let data = record.get("actionData");
    let field = |name: &str| data.and_then(|d| d.get(name));

    let action = field("type")
        .and_then(Value::as_str)
        .map(ActionType::from_label)
        .unwrap_or_else(|| ActionType::Other(String::new()));
    if let ActionType::Other(_) = action {
        debug!("Unrecognized action type {:?} for {wallet}", action.label());
    }

    let amount = field("amount")
        .and_then(coerce_f64)
        .map(|raw| raw / amount_scale)
        .filter(|a| a.is_finite() && *a >= 0.0);

    let asset_symbol = field("assetSymbol")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    Some(NormalizedTransaction {
        wallet: wallet.to_string(),
        timestamp: record.get("timestamp").and_then(coerce_timestamp),
        action,
        amount,
        asset_symbol,
    })
}

/// Numbers or numeric strings. Anything else is unusable.
fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Unix seconds as number or numeric string.
fn coerce_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let secs = coerce_f64(value)?;
    DateTime::from_timestamp(secs.trunc() as i64, 0)
}
