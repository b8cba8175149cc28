pub mod aggregate;
pub mod pipeline;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lending-protocol operation kind, matched exactly against the protocol labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Deposit,
    Borrow,
    Repay,
    RedeemUnderlying,
    LiquidationCall,
    /// Any other label. Counted in `n_txns` and `n_other`, never scored.
    Other(String),
}

impl ActionType {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Deposit" => ActionType::Deposit,
            "Borrow" => ActionType::Borrow,
            "Repay" => ActionType::Repay,
            "RedeemUnderlying" => ActionType::RedeemUnderlying,
            "LiquidationCall" => ActionType::LiquidationCall,
            other => ActionType::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ActionType::Deposit => "Deposit",
            ActionType::Borrow => "Borrow",
            ActionType::Repay => "Repay",
            ActionType::RedeemUnderlying => "RedeemUnderlying",
            ActionType::LiquidationCall => "LiquidationCall",
            ActionType::Other(label) => label,
        }
    }
}

/// A single protocol event after flattening and unit scaling.
///
/// Malformed fields are carried as `None` rather than failing the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTransaction {
    pub wallet: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub action: ActionType,
    /// Display units (base units divided by the configured scale).
    pub amount: Option<f64>,
    pub asset_symbol: Option<String>,
}

/// Behavioural profile of one wallet over the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletFeatures {
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
}

impl WalletFeatures {
    /// A wallet with no activity at all. Every count and sum is zero.
    pub fn empty(wallet: impl Into<String>) -> Self {
        Self {
            wallet: wallet.into(),
            n_txns: 0,
            n_deposit: 0,
            n_borrow: 0,
            n_repay: 0,
            n_redeem: 0,
            n_liquidation: 0,
            n_other: 0,
            total_deposit_amount: 0.0,
            total_borrow_amount: 0.0,
            total_repay_amount: 0.0,
            avg_txn_amount: 0.0,
            active_days: 0,
            asset_diversity: 0,
        }
    }
}

/// A wallet with its derived ratio and final score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletScore {
    pub features: WalletFeatures,
    /// Repaid over borrowed, before clipping. 0 when undefined.
    pub borrow_to_repay_ratio: f64,
    pub rule_score: f64, // 0-1000
}
