use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Timelike};

use crate::config::AnalyzerConfig;
use crate::types::*;

/// Truncate a timestamp to the start of its calendar minute.
pub fn minute_bucket(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_nanosecond(0)
        .and_then(|t| t.with_second(0))
        .unwrap_or(ts)
}

/// Trade count per calendar minute of the open time, built in one pass.
pub fn count_per_minute(trades: &[AnalyzedTrade]) -> BTreeMap<NaiveDateTime, usize> {
    let mut buckets = BTreeMap::new();
    for trade in trades {
        *buckets.entry(minute_bucket(trade.open_time)).or_insert(0) += 1;
    }
    buckets
}

/// Classify every record and aggregate the run summary.
///
/// Records with a missing open or close time are dropped. Inverted records
/// (close before open) are kept with a negative holding time.
pub fn analyze(records: &[TradeRecord], config: &AnalyzerConfig) -> Analysis {
    let t = &config.thresholds;

    let trades: Vec<AnalyzedTrade> = records
        .iter()
        .filter_map(|r| {
            let (open_time, close_time) = (r.open_time?, r.close_time?);
            let holding_secs = holding_seconds(open_time, close_time);
            Some(AnalyzedTrade {
                ticket: r.ticket.clone(),
                account: r.account.clone(),
                symbol: r.symbol.clone(),
                volume: r.volume,
                open_time,
                close_time,
                direction: r.direction.clone(),
                profit: r.profit,
                holding_secs,
                is_scalp: holding_secs <= t.scalp_seconds,
                is_hft: holding_secs <= t.hft_hold_seconds,
                is_arb: holding_secs <= t.arb_hold_seconds,
            })
        })
        .collect();

    let dropped = records.len() - trades.len();
    if dropped > 0 {
        log::debug!("Dropped {} records with unparseable timestamps", dropped);
    }

    let summary = summarize(&trades, config);
    log::debug!(
        "Analyzed {} trades: score={:.1} hft={} arb={}",
        summary.total_trades, summary.toxic_score, summary.is_hft_suspect, summary.arb_suspect
    );

    Analysis { trades, summary }
}

/// Aggregate already-classified trades. Pure in `trades` and `config`.
pub fn summarize(trades: &[AnalyzedTrade], config: &AnalyzerConfig) -> Summary {
    let t = &config.thresholds;
    let w = &config.weights;
    let total_trades = trades.len();

    let mut total_profit = 0.0;
    let mut holding_sum = 0.0;
    let mut scalping_trades = 0usize;
    let mut scalping_profit = 0.0;
    let mut hft_band_trades = 0usize;
    let mut arb_trades_count = 0usize;
    let mut arb_wins = 0usize;
    let mut arb_profit = 0.0;

    for trade in trades {
        total_profit += trade.profit;
        holding_sum += trade.holding_secs;
        if trade.is_scalp {
            scalping_trades += 1;
            scalping_profit += trade.profit;
        }
        if trade.is_hft {
            hft_band_trades += 1;
        }
        if trade.is_arb {
            arb_trades_count += 1;
            arb_profit += trade.profit;
            if trade.profit > 0.0 {
                arb_wins += 1;
            }
        }
    }

    let max_trades_per_minute = count_per_minute(trades).values().copied().max().unwrap_or(0);

    let avg_holding_sec = ratio(holding_sum, total_trades);
    let scalp_fraction = ratio(scalping_trades as f64, total_trades);

    let is_hft_suspect = avg_holding_sec <= t.hft_hold_seconds
        && max_trades_per_minute >= t.hft_trades_per_minute;

    let arb_winrate = (arb_trades_count > 0).then(|| arb_wins as f64 / arb_trades_count as f64);
    let arb_suspect = arb_winrate.is_some_and(|rate| rate >= t.arb_winrate_threshold);

    let hft_component = if is_hft_suspect { 1.0 } else { 0.0 };
    let arb_component = arb_winrate.unwrap_or(0.0);
    let toxic_score = (100.0
        * (w.scalp * scalp_fraction + w.hft * hft_component + w.arb * arb_component))
        .clamp(0.0, 100.0);

    Summary {
        total_trades,
        total_profit,
        scalping_trades,
        scalping_trades_pct: scalp_fraction * 100.0,
        scalping_profit,
        hft_band_trades,
        avg_holding_sec,
        max_trades_per_minute,
        is_hft_suspect,
        arb_trades_count,
        arb_profit,
        arb_winrate,
        arb_suspect,
        toxic_score,
    }
}

fn holding_seconds(open: NaiveDateTime, close: NaiveDateTime) -> f64 {
    let delta = close - open;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        // out of microsecond range (~292k years)
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}

fn ratio(numerator: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        numerator / count as f64
    }
}
