use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::ingest::DEFAULT_AMOUNT_SCALE;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub scoring: ScoringConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub path: String,
    /// Divisor turning raw base-unit amounts into display units.
    pub amount_scale: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub csv_path: String,
    pub sqlite_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ScoringConfig {
    /// Per-rule weight overrides keyed by rule name.
    pub weights: HashMap<String, f64>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: "data/user-wallet-transactions.json".into(),
            amount_scale: DEFAULT_AMOUNT_SCALE,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "outputs/wallet_scores.csv".into(),
            sqlite_path: None,
        }
    }
}

impl Config {
    /// Load config from a TOML file. Falls back to defaults if file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    tracing::info!("Config loaded from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(contents)?;
        if !(config.input.amount_scale.is_finite() && config.input.amount_scale > 0.0) {
            tracing::warn!(
                "amount_scale must be positive, got {}; using {DEFAULT_AMOUNT_SCALE}",
                config.input.amount_scale
            );
            config.input.amount_scale = DEFAULT_AMOUNT_SCALE;
        }
        Ok(config)
    }
}
