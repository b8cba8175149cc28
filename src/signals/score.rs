/// Upper end of the published score range.
pub const SCORE_SCALE: f64 = 1000.0;

/// Batch statistics for one feature column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub mean: f64,
    pub std_dev: f64, // population
    pub min: f64,
    pub max: f64,
}

impl ColumnStats {
    /// First pass: collect mean, population std dev and range.
    /// Non-finite inputs are treated as 0.
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self { mean: 0.0, std_dev: 0.0, min: 0.0, max: 0.0 };
        }

        let n = values.len() as f64;
        let clean = values.iter().map(|v| if v.is_finite() { *v } else { 0.0 });
        let mean = clean.clone().sum::<f64>() / n;
        let variance = clean.clone().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = clean.clone().fold(f64::INFINITY, f64::min);
        let max = clean.fold(f64::NEG_INFINITY, f64::max);

        Self {
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        }
    }

    /// True when every value in the column was identical.
    pub fn is_constant(&self) -> bool {
        self.max <= self.min || self.std_dev == 0.0 || !self.std_dev.is_finite()
    }

    /// Second pass: z-score of one value. A constant column maps to 0.
    pub fn standardize(&self, value: f64) -> f64 {
        if self.is_constant() || !value.is_finite() {
            return 0.0;
        }
        (value - self.mean) / self.std_dev
    }

    /// Position of `value` within `[min, max]` as `[0, 1]`. A zero range maps to 0.
    pub fn min_max(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range <= 0.0 || !range.is_finite() || !value.is_finite() {
            return 0.0;
        }
        ((value - self.min) / range).clamp(0.0, 1.0)
    }
}

/// Weighted sum of standardized feature values.
pub fn weighted_sum(z_values: &[f64], weights: &[f64]) -> f64 {
    z_values.iter().zip(weights).map(|(z, w)| z * w).sum()
}

/// Rescale raw scores to the published 0-1000 range, rounded to 2 decimals.
pub fn rescale(raw: &[f64]) -> Vec<f64> {
    let stats = ColumnStats::fit(raw);
    raw.iter()
        .map(|r| round2(stats.min_max(*r) * SCORE_SCALE).clamp(0.0, SCORE_SCALE))
        .collect()
}

/// Round half to even at 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
