pub mod rules;
pub mod score;

use std::collections::HashMap;

use crate::core::{WalletFeatures, WalletScore};
use rules::Rule;
use score::ColumnStats;

/// The scoring engine applies all rules across a batch and computes a
/// population-relative score per wallet.
///
/// Scoring is two-pass: per-rule column statistics are fitted over the whole
/// batch first, then each wallet is standardized, weighted and rescaled.
pub struct ScoringEngine {
    rules: Vec<Box<dyn Rule + Send + Sync>>,
    weights: Vec<f64>,
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self::with_weights(&HashMap::new())
    }

    /// Build the engine with per-rule weight overrides keyed by rule name.
    pub fn with_weights(overrides: &HashMap<String, f64>) -> Self {
        let rules = rules::default_rules();
        let weights = rules
            .iter()
            .map(|rule| match overrides.get(rule.name()) {
                Some(w) if w.is_finite() => {
                    tracing::info!("Weight override: {} = {w}", rule.name());
                    *w
                }
                Some(w) => {
                    tracing::warn!("Ignoring non-finite weight {w} for {}", rule.name());
                    rule.default_weight()
                }
                None => rule.default_weight(),
            })
            .collect();

        for name in overrides.keys() {
            if !rules.iter().any(|r| r.name() == name) {
                tracing::warn!("Unknown scoring rule in weights: {name}");
            }
        }

        Self { rules, weights }
    }

    /// (rule name, weight) pairs in evaluation order.
    pub fn weights(&self) -> Vec<(&str, f64)> {
        self.rules
            .iter()
            .map(|r| r.name())
            .zip(self.weights.iter().copied())
            .collect()
    }

    /// Weighted sum of standardized rule values for every wallet, before rescaling.
    pub fn raw_scores(&self, wallets: &[WalletFeatures]) -> Vec<f64> {
        let columns: Vec<Vec<f64>> = self
            .rules
            .iter()
            .map(|rule| wallets.iter().map(|w| rule.evaluate(w)).collect())
            .collect();
        let stats: Vec<ColumnStats> = columns.iter().map(|c| ColumnStats::fit(c)).collect();

        (0..wallets.len())
            .map(|i| {
                let z: Vec<f64> = columns
                    .iter()
                    .zip(&stats)
                    .map(|(column, s)| s.standardize(column[i]))
                    .collect();
                score::weighted_sum(&z, &self.weights)
            })
            .collect()
    }

    /// Score the whole batch. Output has the same wallets in the same order.
    pub fn score_batch(&self, wallets: &[WalletFeatures]) -> Vec<WalletScore> {
        let raw = self.raw_scores(wallets);
        let scaled = score::rescale(&raw);

        wallets
            .iter()
            .zip(scaled)
            .map(|(features, rule_score)| WalletScore {
                borrow_to_repay_ratio: rules::borrow_to_repay_ratio(features),
                features: features.clone(),
                rule_score,
            })
            .collect()
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}
