use crate::core::WalletFeatures;

/// Added to the borrowed total so a wallet that never borrowed has a defined ratio.
pub const RATIO_EPSILON: f64 = 1e-6;

/// Upper bound applied to the repay/borrow ratio before the log transform.
pub const RATIO_CLIP: f64 = 5.0;

/// A scoring rule that extracts one transformed feature from a wallet profile.
/// Values are standardized across the batch before the weight is applied, so
/// a negative weight turns the rule into a penalty.
pub trait Rule {
    fn name(&self) -> &str;
    fn default_weight(&self) -> f64;
    fn evaluate(&self, wallet: &WalletFeatures) -> f64;
}

/// Return all default rules with initial weights.
pub fn default_rules() -> Vec<Box<dyn Rule + Send + Sync>> {
    vec![
        Box::new(RepayCountRule),
        Box::new(RepayRatioRule),
        Box::new(ActiveDaysRule),
        Box::new(DepositVolumeRule),
        Box::new(LiquidationRule),
    ]
}

/// `total_repay / (total_borrow + ε)`, 0 when the division is undefined.
pub fn borrow_to_repay_ratio(wallet: &WalletFeatures) -> f64 {
    let ratio = wallet.total_repay_amount / (wallet.total_borrow_amount + RATIO_EPSILON);
    if ratio.is_finite() { ratio } else { 0.0 }
}

/// `ln(1 + x)`, 0 for negative or non-finite input.
pub fn safe_log1p(x: f64) -> f64 {
    if x.is_finite() && x >= 0.0 { x.ln_1p() } else { 0.0 }
}

// --- Individual Rules ---

struct RepayCountRule;
impl Rule for RepayCountRule {
    fn name(&self) -> &str { "n_repay" }
    fn default_weight(&self) -> f64 { 1.5 }
    fn evaluate(&self, wallet: &WalletFeatures) -> f64 {
        wallet.n_repay as f64
    }
}

/// Heavy repayers are capped at 5x so they don't dominate the batch.
struct RepayRatioRule;
impl Rule for RepayRatioRule {
    fn name(&self) -> &str { "borrow_to_repay_ratio" }
    fn default_weight(&self) -> f64 { 2.0 }
    fn evaluate(&self, wallet: &WalletFeatures) -> f64 {
        safe_log1p(borrow_to_repay_ratio(wallet).clamp(0.0, RATIO_CLIP))
    }
}

struct ActiveDaysRule;
impl Rule for ActiveDaysRule {
    fn name(&self) -> &str { "active_days" }
    fn default_weight(&self) -> f64 { 1.0 }
    fn evaluate(&self, wallet: &WalletFeatures) -> f64 {
        wallet.active_days as f64
    }
}

/// Deposit size only nudges the score; log-compressed.
struct DepositVolumeRule;
impl Rule for DepositVolumeRule {
    fn name(&self) -> &str { "total_deposit_amount" }
    fn default_weight(&self) -> f64 { 0.5 }
    fn evaluate(&self, wallet: &WalletFeatures) -> f64 {
        safe_log1p(wallet.total_deposit_amount)
    }
}

/// Liquidations are the strongest penalty.
struct LiquidationRule;
impl Rule for LiquidationRule {
    fn name(&self) -> &str { "n_liquidation" }
    fn default_weight(&self) -> f64 { -2.0 }
    fn evaluate(&self, wallet: &WalletFeatures) -> f64 {
        wallet.n_liquidation as f64
    }
}
