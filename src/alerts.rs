use serde::Serialize;

use crate::config::AnalyzerConfig;
use crate::types::Summary;

const SCALPING_ALERT_PCT: f64 = 50.0;
const NEAR_PERFECT_WINRATE: f64 = 0.95;
const ARB_CRITICAL_MIN_TRADES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Lower bounds are inclusive: 70 is High, 40 is Medium.
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            RiskTier::High
        } else if score >= 40.0 {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low risk",
            RiskTier::Medium => "Medium risk",
            RiskTier::High => "High risk",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AlertSeverity {
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertType {
    Scalping,
    HighFrequency,
    Arbitrage,
}

impl AlertType {
    pub fn label(&self) -> &'static str {
        match self {
            AlertType::Scalping => "Scalping",
            AlertType::HighFrequency => "HighFrequency",
            AlertType::Arbitrage => "Arbitrage",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub description: String,
}

/// Alerts raised by one analysis run, in detector order.
pub fn alerts_for(summary: &Summary, config: &AnalyzerConfig) -> Vec<Alert> {
    [
        evaluate_scalping(summary),
        evaluate_hft(summary, config),
        evaluate_arbitrage(summary),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn evaluate_scalping(summary: &Summary) -> Option<Alert> {
    let pct = summary.scalping_trades_pct;
    if pct < SCALPING_ALERT_PCT {
        return None;
    }
    let severity = if pct >= 90.0 {
        AlertSeverity::Critical
    } else if pct >= 75.0 {
        AlertSeverity::High
    } else {
        AlertSeverity::Medium
    };
    Some(Alert {
        alert_type: AlertType::Scalping,
        severity,
        description: format!(
            "{}/{} trades scalped ({:.1}%) pnl={:.2}",
            summary.scalping_trades, summary.total_trades, pct, summary.scalping_profit
        ),
    })
}

fn evaluate_hft(summary: &Summary, config: &AnalyzerConfig) -> Option<Alert> {
    if !summary.is_hft_suspect {
        return None;
    }
    let min_rate = config.thresholds.hft_trades_per_minute.max(1);
    let severity = if summary.max_trades_per_minute >= min_rate * 4 {
        AlertSeverity::Critical
    } else if summary.max_trades_per_minute >= min_rate * 2 {
        AlertSeverity::High
    } else {
        AlertSeverity::Medium
    };
    Some(Alert {
        alert_type: AlertType::HighFrequency,
        severity,
        description: format!(
            "peak {} trades/min, avg hold {:.1}s",
            summary.max_trades_per_minute, summary.avg_holding_sec
        ),
    })
}

fn evaluate_arbitrage(summary: &Summary) -> Option<Alert> {
    if !summary.arb_suspect {
        return None;
    }
    let winrate = summary.arb_winrate.unwrap_or(0.0);
    let severity = if winrate >= NEAR_PERFECT_WINRATE
        && summary.arb_trades_count >= ARB_CRITICAL_MIN_TRADES
    {
        AlertSeverity::Critical
    } else if winrate >= NEAR_PERFECT_WINRATE {
        AlertSeverity::High
    } else {
        AlertSeverity::Medium
    };
    Some(Alert {
        alert_type: AlertType::Arbitrage,
        severity,
        description: format!(
            "{} ultra-short trades, winrate {:.1}% pnl={:.2}",
            summary.arb_trades_count,
            winrate * 100.0,
            summary.arb_profit
        ),
    })
}
