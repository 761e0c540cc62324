use chrono::NaiveDateTime;
use serde::Serialize;

use crate::alerts::RiskTier;

// ── Input Types (produced by the ingest adapter) ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
    Other(String),
}

impl Direction {
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        if lowered.starts_with("buy") {
            Direction::Buy
        } else if lowered.starts_with("sell") {
            Direction::Sell
        } else {
            Direction::Other(raw.trim().to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
            Direction::Other(s) => s,
        }
    }
}

/// One closed position as handed over by the ingest adapter.
///
/// A timestamp that could not be parsed is `None`; such records are dropped
/// by the engine rather than reported.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub ticket: String,
    pub account: String,
    pub symbol: String,
    pub volume: f64,
    pub open_time: Option<NaiveDateTime>,
    pub close_time: Option<NaiveDateTime>,
    pub direction: Direction,
    pub profit: f64,
}

// ── Output Types (returned by detection::analyze) ──

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedTrade {
    pub ticket: String,
    pub account: String,
    pub symbol: String,
    pub volume: f64,
    pub open_time: NaiveDateTime,
    pub close_time: NaiveDateTime,
    pub direction: Direction,
    pub profit: f64,
    pub holding_secs: f64,
    pub is_scalp: bool,
    pub is_hft: bool,
    pub is_arb: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_trades: usize,
    pub total_profit: f64,
    pub scalping_trades: usize,
    /// Share of surviving trades flagged as scalps, 0–100.
    pub scalping_trades_pct: f64,
    pub scalping_profit: f64,
    pub hft_band_trades: usize,
    pub avg_holding_sec: f64,
    pub max_trades_per_minute: usize,
    pub is_hft_suspect: bool,
    pub arb_trades_count: usize,
    pub arb_profit: f64,
    /// `None` when no trade was short enough to count as arbitrage.
    pub arb_winrate: Option<f64>,
    pub arb_suspect: bool,
    pub toxic_score: f64,
}

impl Summary {
    pub fn risk_tier(&self) -> RiskTier {
        RiskTier::from_score(self.toxic_score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub trades: Vec<AnalyzedTrade>,
    pub summary: Summary,
}
