use rusqlite::Connection;

pub fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS scoring_runs (
            run_id       TEXT PRIMARY KEY,
            wallet_count INTEGER NOT NULL,
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS wallet_scores (
            run_id                TEXT NOT NULL REFERENCES scoring_runs(run_id),
            wallet                TEXT NOT NULL,
            n_txns                INTEGER NOT NULL,
            n_deposit             INTEGER NOT NULL,
            n_borrow              INTEGER NOT NULL,
            n_repay               INTEGER NOT NULL,
            n_redeem              INTEGER NOT NULL,
            n_liquidation         INTEGER NOT NULL,
            n_other               INTEGER NOT NULL,
            total_deposit_amount  REAL NOT NULL,
            total_borrow_amount   REAL NOT NULL,
            total_repay_amount    REAL NOT NULL,
            avg_txn_amount        REAL NOT NULL,
            active_days           INTEGER NOT NULL,
            asset_diversity       INTEGER NOT NULL,
            borrow_to_repay_ratio REAL NOT NULL,
            rule_score            REAL NOT NULL,
            PRIMARY KEY (run_id, wallet)
        );

        CREATE INDEX IF NOT EXISTS idx_wallet_scores_score ON wallet_scores(run_id, rule_score DESC);
        CREATE INDEX IF NOT EXISTS idx_wallet_scores_wallet ON wallet_scores(wallet);
        ",
    )?;
    Ok(())
}
