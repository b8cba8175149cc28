use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use super::{ActionType, NormalizedTransaction, WalletFeatures};

/// Running per-wallet totals. Order of `add` calls does not matter.
///
/// Missing dates and symbols are not collected. A wallet whose rows all
/// lack a timestamp still reports one active day.
#[derive(Debug, Default, Clone)]
pub struct WalletAccumulator {
    n_txns: u64,
    n_deposit: u64,
    n_borrow: u64,
    n_repay: u64,
    n_redeem: u64,
    n_liquidation: u64,
    n_other: u64,
    total_deposit: f64,
    total_borrow: f64,
    total_repay: f64,
    amount_sum: f64,
    amount_count: u64,
    days: HashSet<NaiveDate>,
    assets: HashSet<String>,
}

impl WalletAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tx: &NormalizedTransaction) {
        self.n_txns += 1;
        let amount = tx.amount.filter(|a| a.is_finite());

        match &tx.action {
            ActionType::Deposit => {
                self.n_deposit += 1;
                self.total_deposit += amount.unwrap_or(0.0);
            }
            ActionType::Borrow => {
                self.n_borrow += 1;
                self.total_borrow += amount.unwrap_or(0.0);
            }
            ActionType::Repay => {
                self.n_repay += 1;
                self.total_repay += amount.unwrap_or(0.0);
            }
            ActionType::RedeemUnderlying => self.n_redeem += 1,
            ActionType::LiquidationCall => self.n_liquidation += 1,
            ActionType::Other(_) => self.n_other += 1,
        }

        if let Some(a) = amount {
            self.amount_sum += a;
            self.amount_count += 1;
        }
        if let Some(ts) = tx.timestamp {
            self.days.insert(ts.date_naive());
        }
        if let Some(symbol) = &tx.asset_symbol {
            self.assets.insert(symbol.clone());
        }
    }

    /// Combine two partial accumulators for the same wallet.
    pub fn merge(&mut self, other: WalletAccumulator) {
        self.n_txns += other.n_txns;
        self.n_deposit += other.n_deposit;
        self.n_borrow += other.n_borrow;
        self.n_repay += other.n_repay;
        self.n_redeem += other.n_redeem;
        self.n_liquidation += other.n_liquidation;
        self.n_other += other.n_other;
        self.total_deposit += other.total_deposit;
        self.total_borrow += other.total_borrow;
        self.total_repay += other.total_repay;
        self.amount_sum += other.amount_sum;
        self.amount_count += other.amount_count;
        self.days.extend(other.days);
        self.assets.extend(other.assets);
    }

    pub fn finish(self, wallet: String) -> WalletFeatures {
        let avg_txn_amount = if self.amount_count == 0 {
            0.0
        } else {
            self.amount_sum / self.amount_count as f64
        };

        // Any activity means at least one day and one asset, known or not.
        let floor = u64::from(self.n_txns > 0);

        WalletFeatures {
            wallet,
            n_txns: self.n_txns,
            n_deposit: self.n_deposit,
            n_borrow: self.n_borrow,
            n_repay: self.n_repay,
            n_redeem: self.n_redeem,
            n_liquidation: self.n_liquidation,
            n_other: self.n_other,
            total_deposit_amount: self.total_deposit,
            total_borrow_amount: self.total_borrow,
            total_repay_amount: self.total_repay,
            avg_txn_amount,
            active_days: (self.days.len() as u64).max(floor),
            asset_diversity: (self.assets.len() as u64).max(floor),
        }
    }
}

/// Reduce a transaction stream to one feature record per wallet, ordered by wallet id.
pub fn aggregate(txns: &[NormalizedTransaction]) -> Vec<WalletFeatures> {
    let mut groups: BTreeMap<&str, WalletAccumulator> = BTreeMap::new();
    for tx in txns {
        groups.entry(tx.wallet.as_str()).or_default().add(tx);
    }

    let features: Vec<WalletFeatures> = groups
        .into_iter()
        .map(|(wallet, acc)| acc.finish(wallet.to_string()))
        .collect();

    tracing::debug!(
        "Aggregated {} transactions into {} wallets",
        txns.len(),
        features.len()
    );
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_tx(
        wallet: &str,
        action: ActionType,
        amount: Option<f64>,
        ts: i64,
        asset: &str,
    ) -> NormalizedTransaction {
        NormalizedTransaction {
            wallet: wallet.to_string(),
            timestamp: Utc.timestamp_opt(ts, 0).single(),
            action,
            amount,
            asset_symbol: Some(asset.to_string()),
        }
    }

    const DAY: i64 = 86_400;
    const T0: i64 = 1_629_178_166; // 2021-08-17

    #[test]
    fn one_row_per_wallet_sorted() {
        let txns = vec![
            make_tx("0xb", ActionType::Deposit, Some(1.0), T0, "USDC"),
            make_tx("0xa", ActionType::Deposit, Some(2.0), T0, "USDC"),
            make_tx("0xb", ActionType::Borrow, Some(3.0), T0, "DAI"),
        ];
        let features = aggregate(&txns);
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].wallet, "0xa");
        assert_eq!(features[1].wallet, "0xb");
        assert_eq!(features[1].n_txns, 2);
    }

    #[test]
    fn counts_and_sums_by_action() {
        let txns = vec![
            make_tx("w", ActionType::Deposit, Some(100.0), T0, "USDC"),
            make_tx("w", ActionType::Deposit, Some(50.0), T0, "USDC"),
            make_tx("w", ActionType::Borrow, Some(40.0), T0 + DAY, "DAI"),
            make_tx("w", ActionType::Repay, Some(30.0), T0 + 2 * DAY, "DAI"),
            make_tx("w", ActionType::RedeemUnderlying, Some(20.0), T0 + 2 * DAY, "USDC"),
            make_tx("w", ActionType::LiquidationCall, Some(10.0), T0 + 3 * DAY, "WETH"),
        ];
        let f = &aggregate(&txns)[0];
        assert_eq!(f.n_txns, 6);
        assert_eq!(f.n_deposit, 2);
        assert_eq!(f.n_borrow, 1);
        assert_eq!(f.n_repay, 1);
        assert_eq!(f.n_redeem, 1);
        assert_eq!(f.n_liquidation, 1);
        assert_eq!(f.n_other, 0);
        assert_eq!(f.total_deposit_amount, 150.0);
        assert_eq!(f.total_borrow_amount, 40.0);
        assert_eq!(f.total_repay_amount, 30.0);
        assert!((f.avg_txn_amount - 250.0 / 6.0).abs() < 1e-9);
        assert_eq!(f.active_days, 4);
        assert_eq!(f.asset_diversity, 3);
    }

    #[test]
    fn other_actions_count_and_feed_mean_and_diversity() {
        let txns = vec![
            make_tx("w", ActionType::Deposit, Some(10.0), T0, "USDC"),
            make_tx("w", ActionType::Other("FlashLoan".into()), Some(30.0), T0, "WBTC"),
        ];
        let f = &aggregate(&txns)[0];
        assert_eq!(f.n_txns, 2);
        assert_eq!(f.n_other, 1);
        assert_eq!(f.total_deposit_amount, 10.0);
        assert_eq!(f.avg_txn_amount, 20.0);
        assert_eq!(f.asset_diversity, 2);
    }

    #[test]
    fn count_identity_holds() {
        let txns = vec![
            make_tx("w", ActionType::Deposit, Some(1.0), T0, "A"),
            make_tx("w", ActionType::Other("Swap".into()), None, T0, "B"),
            make_tx("w", ActionType::LiquidationCall, None, T0, "C"),
            make_tx("w", ActionType::Repay, Some(2.0), T0, "A"),
        ];
        let f = &aggregate(&txns)[0];
        assert_eq!(
            f.n_txns,
            f.n_deposit + f.n_borrow + f.n_repay + f.n_redeem + f.n_liquidation + f.n_other
        );
    }

    #[test]
    fn missing_amounts_give_zero_not_nan() {
        let txns = vec![
            make_tx("w", ActionType::Deposit, None, T0, "USDC"),
            make_tx("w", ActionType::Borrow, None, T0, "USDC"),
        ];
        let f = &aggregate(&txns)[0];
        assert_eq!(f.n_txns, 2);
        assert_eq!(f.total_deposit_amount, 0.0);
        assert_eq!(f.total_borrow_amount, 0.0);
        assert_eq!(f.avg_txn_amount, 0.0);
    }

    #[test]
    fn missing_amount_excluded_from_mean() {
        let txns = vec![
            make_tx("w", ActionType::Deposit, Some(10.0), T0, "USDC"),
            make_tx("w", ActionType::Deposit, None, T0, "USDC"),
        ];
        let f = &aggregate(&txns)[0];
        assert_eq!(f.avg_txn_amount, 10.0);
        assert_eq!(f.n_deposit, 2);
    }

    #[test]
    fn single_transaction_wallet() {
        let txns = vec![make_tx("w", ActionType::Repay, Some(5.0), T0, "DAI")];
        let f = &aggregate(&txns)[0];
        assert_eq!(f.active_days, 1);
        assert_eq!(f.asset_diversity, 1);
    }

    #[test]
    fn missing_timestamp_and_symbol_still_count() {
        let txns = vec![NormalizedTransaction {
            wallet: "w".into(),
            timestamp: None,
            action: ActionType::Deposit,
            amount: Some(1.0),
            asset_symbol: None,
        }];
        let f = &aggregate(&txns)[0];
        assert_eq!(f.active_days, 1);
        assert_eq!(f.asset_diversity, 1);
    }

    #[test]
    fn missing_values_ignored_next_to_real_ones() {
        let txns = vec![
            make_tx("w", ActionType::Deposit, Some(1.0), T0, "USDC"),
            NormalizedTransaction {
                wallet: "w".into(),
                timestamp: None,
                action: ActionType::Repay,
                amount: Some(1.0),
                asset_symbol: None,
            },
        ];
        let f = &aggregate(&txns)[0];
        assert_eq!(f.n_txns, 2);
        assert_eq!(f.active_days, 1);
        assert_eq!(f.asset_diversity, 1);
    }

    #[test]
    fn merged_missing_values_ignored() {
        let mut dated = WalletAccumulator::new();
        dated.add(&make_tx("w", ActionType::Deposit, Some(1.0), T0, "USDC"));
        let mut undated = WalletAccumulator::new();
        undated.add(&NormalizedTransaction {
            wallet: "w".into(),
            timestamp: None,
            action: ActionType::Borrow,
            amount: None,
            asset_symbol: None,
        });
        dated.merge(undated);
        let f = dated.finish("w".into());
        assert_eq!(f.active_days, 1);
        assert_eq!(f.asset_diversity, 1);
    }

    #[test]
    fn same_day_collapses() {
        let txns = vec![
            make_tx("w", ActionType::Deposit, Some(1.0), T0, "USDC"),
            make_tx("w", ActionType::Deposit, Some(1.0), T0 + 60, "USDC"),
        ];
        assert_eq!(aggregate(&txns)[0].active_days, 1);
    }

    #[test]
    fn order_does_not_matter() {
        let mut txns = vec![
            make_tx("a", ActionType::Deposit, Some(1.0), T0, "USDC"),
            make_tx("b", ActionType::Borrow, Some(2.0), T0 + DAY, "DAI"),
            make_tx("a", ActionType::Repay, Some(3.0), T0 + DAY, "DAI"),
        ];
        let forward = aggregate(&txns);
        txns.reverse();
        assert_eq!(forward, aggregate(&txns));
    }

    #[test]
    fn merge_matches_single_pass() {
        let txns = vec![
            make_tx("w", ActionType::Deposit, Some(4.0), T0, "USDC"),
            make_tx("w", ActionType::Borrow, Some(2.0), T0 + DAY, "DAI"),
            make_tx("w", ActionType::Repay, None, T0 + DAY, "DAI"),
        ];
        let mut left = WalletAccumulator::new();
        left.add(&txns[0]);
        let mut right = WalletAccumulator::new();
        right.add(&txns[1]);
        right.add(&txns[2]);
        left.merge(right);
        assert_eq!(left.finish("w".into()), aggregate(&txns)[0]);
    }

    #[test]
    fn empty_input() {
        assert!(aggregate(&[]).is_empty());
    }
}
