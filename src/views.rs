//! Chart-ready data derived from analyzed trades. Nothing here renders.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::detection::count_per_minute;
use crate::types::AnalyzedTrade;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub close_time: NaiveDateTime,
    pub ticket: String,
    pub cumulative_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinuteBucket {
    pub minute: NaiveDateTime,
    pub count: usize,
}

/// Running profit ordered by close time. Ties keep input order.
pub fn equity_curve(trades: &[AnalyzedTrade]) -> Vec<EquityPoint> {
    let mut ordered: Vec<&AnalyzedTrade> = trades.iter().collect();
    ordered.sort_by_key(|t| t.close_time);

    let mut running = 0.0;
    ordered
        .into_iter()
        .map(|t| {
            running += t.profit;
            EquityPoint {
                close_time: t.close_time,
                ticket: t.ticket.clone(),
                cumulative_profit: running,
            }
        })
        .collect()
}

/// Equal-width histogram of holding seconds between the observed min and max.
pub fn holding_histogram(trades: &[AnalyzedTrade], bins: usize) -> Vec<HistogramBin> {
    if trades.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (min, max) = trades.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| {
        (lo.min(t.holding_secs), hi.max(t.holding_secs))
    });

    if max == min {
        return vec![HistogramBin { lower: min, upper: max, count: trades.len() }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for t in trades {
        let idx = (((t.holding_secs - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

pub fn trades_per_minute(trades: &[AnalyzedTrade]) -> Vec<MinuteBucket> {
    count_per_minute(trades)
        .into_iter()
        .map(|(minute, count)| MinuteBucket { minute, count })
        .collect()
}
