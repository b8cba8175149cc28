pub mod schema;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;

use crate::core::{WalletFeatures, WalletScore};

/// Run identifier with microsecond resolution, e.g. `20261016T093015.123456Z`.
pub fn run_id(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%S%.6fZ").to_string()
}

/// Append-only store of scored batches. Nothing here is read back into scoring.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        schema::migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Store a whole scored batch in a single transaction.
    pub fn store_run(&self, run_id: &str, scores: &[WalletScore]) -> Result<(), rusqlite::Error> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO scoring_runs (run_id, wallet_count, created_at) VALUES (?1, ?2, datetime('now'))",
            rusqlite::params![run_id, scores.len() as i64],
        )?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO wallet_scores (run_id, wallet, n_txns, n_deposit, n_borrow, n_repay, n_redeem, n_liquidation, n_other,
                    total_deposit_amount, total_borrow_amount, total_repay_amount, avg_txn_amount, active_days, asset_diversity,
                    borrow_to_repay_ratio, rule_score)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)"
            )?;
            for s in scores {
                let f = &s.features;
                stmt.execute(rusqlite::params![
                    run_id, f.wallet, f.n_txns as i64, f.n_deposit as i64, f.n_borrow as i64,
                    f.n_repay as i64, f.n_redeem as i64, f.n_liquidation as i64, f.n_other as i64,
                    f.total_deposit_amount, f.total_borrow_amount, f.total_repay_amount,
                    f.avg_txn_amount, f.active_days as i64, f.asset_diversity as i64,
                    s.borrow_to_repay_ratio, s.rule_score
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn row_to_score(row: &rusqlite::Row) -> rusqlite::Result<WalletScore> {
        let count = |idx: usize| row.get::<_, i64>(idx).map(|v| v as u64);
        Ok(WalletScore {
            features: WalletFeatures {
                wallet: row.get(0)?,
                n_txns: count(1)?,
                n_deposit: count(2)?,
                n_borrow: count(3)?,
                n_repay: count(4)?,
                n_redeem: count(5)?,
                n_liquidation: count(6)?,
                n_other: count(7)?,
                total_deposit_amount: row.get(8)?,
                total_borrow_amount: row.get(9)?,
                total_repay_amount: row.get(10)?,
                avg_txn_amount: row.get(11)?,
                active_days: count(12)?,
                asset_diversity: count(13)?,
            },
            borrow_to_repay_ratio: row.get(14)?,
            rule_score: row.get(15)?,
        })
    }

    /// All scores of a run, ordered by wallet.
    pub fn get_run_scores(&self, run_id: &str) -> Result<Vec<WalletScore>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT wallet, n_txns, n_deposit, n_borrow, n_repay, n_redeem, n_liquidation, n_other,
                    total_deposit_amount, total_borrow_amount, total_repay_amount, avg_txn_amount,
                    active_days, asset_diversity, borrow_to_repay_ratio, rule_score
             FROM wallet_scores WHERE run_id = ?1 ORDER BY wallet"
        )?;
        let rows = stmt.query_map(rusqlite::params![run_id], Self::row_to_score)?;
        rows.collect()
    }

    /// Highest-scoring wallets of a run.
    pub fn top_scores(
        &self,
        run_id: &str,
        limit: usize,
    ) -> Result<Vec<WalletScore>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT wallet, n_txns, n_deposit, n_borrow, n_repay, n_redeem, n_liquidation, n_other,
                    total_deposit_amount, total_borrow_amount, total_repay_amount, avg_txn_amount,
                    active_days, asset_diversity, borrow_to_repay_ratio, rule_score
             FROM wallet_scores WHERE run_id = ?1 ORDER BY rule_score DESC, wallet LIMIT ?2"
        )?;
        let rows = stmt.query_map(rusqlite::params![run_id, limit as i64], Self::row_to_score)?;
        rows.collect()
    }

    /// Total stored wallet rows across all runs.
    pub fn score_count(&self) -> Result<usize, rusqlite::Error> {
        self.conn.query_row("SELECT COUNT(*) FROM wallet_scores", [], |row| {
            row.get::<_, i64>(0).map(|c| c as usize)
        })
    }
}
