//! Batch credit scoring for lending-protocol wallets.
//!
//! Raw protocol events are flattened by [`ingest`], reduced to one
//! [`core::WalletFeatures`] per wallet by [`core::aggregate`], and scored
//! against the rest of the batch by [`signals::ScoringEngine`].

pub mod config;
pub mod core;
pub mod db;
pub mod ingest;
pub mod output;
pub mod report;
pub mod signals;
