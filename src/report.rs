use serde::Serialize;

use crate::core::WalletScore;

/// 100-point score band, `0` covers `[0, 100)` and `9` covers `[900, 1000]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ScoreBand(pub u8);

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        let band = (score.clamp(0.0, 1000.0) / 100.0).floor() as u8;
        ScoreBand(band.min(9))
    }

    pub fn label(&self) -> String {
        let lo = self.0 as u32 * 100;
        if self.0 == 9 {
            format!("{lo}-1000")
        } else {
            format!("{lo}-{}", lo + 99)
        }
    }
}

/// Distribution of a scored batch, for the run log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub wallets: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub bands: [usize; 10],
}

impl ScoreSummary {
    pub fn from_scores(scores: &[WalletScore]) -> Self {
        let mut values: Vec<f64> = scores.iter().map(|s| s.rule_score).collect();
        values.sort_by(|a, b| a.total_cmp(b));

        let mut bands = [0usize; 10];
        for v in &values {
            bands[ScoreBand::from_score(*v).0 as usize] += 1;
        }

        let n = values.len();
        let median = match n {
            0 => 0.0,
            _ if n % 2 == 1 => values[n / 2],
            _ => (values[n / 2 - 1] + values[n / 2]) / 2.0,
        };

        Self {
            wallets: n,
            mean: if n == 0 { 0.0 } else { values.iter().sum::<f64>() / n as f64 },
            median,
            min: values.first().copied().unwrap_or(0.0),
            max: values.last().copied().unwrap_or(0.0),
            bands,
        }
    }

    pub fn log(&self) {
        tracing::info!(
            "📊 {} wallets scored: mean={:.2} median={:.2} min={:.2} max={:.2}",
            self.wallets,
            self.mean,
            self.median,
            self.min,
            self.max
        );
        for (i, count) in self.bands.iter().enumerate() {
            tracing::info!("  {:>8}: {count}", ScoreBand(i as u8).label());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WalletFeatures;

    fn scored(rule_score: f64) -> WalletScore {
        WalletScore {
            features: WalletFeatures::empty("w"),
            borrow_to_repay_ratio: 0.0,
            rule_score,
        }
    }

    #[test]
    fn band_edges() {
        assert_eq!(ScoreBand::from_score(0.0), ScoreBand(0));
        assert_eq!(ScoreBand::from_score(99.99), ScoreBand(0));
        assert_eq!(ScoreBand::from_score(100.0), ScoreBand(1));
        assert_eq!(ScoreBand::from_score(1000.0), ScoreBand(9));
    }

    #[test]
    fn band_labels() {
        assert_eq!(ScoreBand(0).label(), "0-99");
        assert_eq!(ScoreBand(9).label(), "900-1000");
    }

    #[test]
    fn summary_stats() {
        let scores: Vec<WalletScore> =
            [0.0, 250.0, 500.0, 1000.0].iter().map(|s| scored(*s)).collect();
        let summary = ScoreSummary::from_scores(&scores);
        assert_eq!(summary.wallets, 4);
        assert_eq!(summary.mean, 437.5);
        assert_eq!(summary.median, 375.0);
        assert_eq!(summary.min, 0.0);
        assert_eq!(summary.max, 1000.0);
        assert_eq!(summary.bands, [1, 0, 1, 0, 0, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn summary_empty() {
        let summary = ScoreSummary::from_scores(&[]);
        assert_eq!(summary.wallets, 0);
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.bands.iter().sum::<usize>(), 0);
    }
}
