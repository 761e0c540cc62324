use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Holding-time and rate limits used by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Holding ceiling (seconds) for a scalp.
    pub scalp_seconds: f64,
    /// Holding ceiling (seconds) for the HFT band and the HFT-suspect mean test.
    pub hft_hold_seconds: f64,
    /// Trades inside one calendar minute needed for HFT suspicion.
    pub hft_trades_per_minute: usize,
    /// Holding ceiling (seconds) for an arbitrage-short trade.
    pub arb_hold_seconds: f64,
    /// Minimum arbitrage-short winrate (0–1) for arbitrage suspicion.
    pub arb_winrate_threshold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            scalp_seconds: 180.0,
            hft_hold_seconds: 60.0,
            hft_trades_per_minute: 5,
            arb_hold_seconds: 10.0,
            arb_winrate_threshold: 0.8,
        }
    }
}

/// Blend weights for the 0–100 toxic score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub scalp: f64,
    pub hft: f64,
    pub arb: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self { scalp: 0.4, hft: 0.3, arb: 0.3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub thresholds: Thresholds,
    pub weights: ScoreWeights,
}

impl AnalyzerConfig {
    /// Load a JSON config. Fields left out of the file keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: AnalyzerConfig = serde_json::from_str(&raw)?;
        log::debug!("Loaded analyzer config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        for (name, value) in [
            ("scalp_seconds", t.scalp_seconds),
            ("hft_hold_seconds", t.hft_hold_seconds),
            ("arb_hold_seconds", t.arb_hold_seconds),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalyzerError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if t.hft_trades_per_minute == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "hft_trades_per_minute must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&t.arb_winrate_threshold) {
            return Err(AnalyzerError::InvalidConfig(format!(
                "arb_winrate_threshold must be within [0, 1], got {}",
                t.arb_winrate_threshold
            )));
        }

        let w = &self.weights;
        for (name, value) in [("scalp", w.scalp), ("hft", w.hft), ("arb", w.arb)] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalyzerError::InvalidConfig(format!(
                    "{name} weight must be a non-negative number, got {value}"
                )));
            }
        }
        let sum = w.scalp + w.hft + w.arb;
        if sum > 1.0 + WEIGHT_SUM_TOLERANCE {
            return Err(AnalyzerError::InvalidConfig(format!(
                "score weights must sum to at most 1.0, got {sum:.4}"
            )));
        }
        Ok(())
    }
}
