//! Correctness tests for the classifier and aggregator.
//!
//! Builds small deterministic trade sets with known holding times and
//! asserts exact per-trade flags and summary values.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use toxic_trade_detect::alerts::{alerts_for, AlertSeverity, AlertType, RiskTier};
use toxic_trade_detect::config::{AnalyzerConfig, ScoreWeights, Thresholds};
use toxic_trade_detect::detection::{self, analyze};
use toxic_trade_detect::generator::TradeGenerator;
use toxic_trade_detect::types::*;

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 6).unwrap().and_hms_opt(9, 30, 0).unwrap()
}

/// Trade opened `open_offset` seconds after base and held `hold` seconds.
fn trade(ticket: &str, open_offset: i64, hold: i64, profit: f64) -> TradeRecord {
    let open = base() + TimeDelta::seconds(open_offset);
    TradeRecord {
        ticket: ticket.into(),
        account: "100201".into(),
        symbol: "EURUSD".into(),
        volume: 0.1,
        open_time: Some(open),
        close_time: Some(open + TimeDelta::seconds(hold)),
        direction: Direction::Buy,
        profit,
    }
}

fn defaults() -> AnalyzerConfig {
    AnalyzerConfig::default()
}

// ── Scenario A: mixed holdings [30, 200, 5] ──
#[test]
fn test_mixed_holdings_scenario() {
    let records = vec![
        trade("1", 0, 30, 10.0),
        trade("2", 120, 200, -5.0),
        trade("3", 600, 5, 8.0),
    ];
    let Analysis { trades, summary } = analyze(&records, &defaults());

    assert_eq!(trades.len(), 3);
    assert_eq!(trades.iter().map(|t| t.is_scalp).collect::<Vec<_>>(), vec![true, false, true]);
    assert_eq!(trades.iter().map(|t| t.is_hft).collect::<Vec<_>>(), vec![true, false, true]);
    assert_eq!(trades.iter().map(|t| t.is_arb).collect::<Vec<_>>(), vec![false, false, true]);

    assert_eq!(summary.total_trades, 3);
    assert!((summary.total_profit - 13.0).abs() < 1e-9);
    assert_eq!(summary.scalping_trades, 2);
    assert!((summary.scalping_trades_pct - 66.666_666).abs() < 1e-3, "got {}", summary.scalping_trades_pct);
    assert!((summary.scalping_profit - 18.0).abs() < 1e-9);
    assert_eq!(summary.arb_trades_count, 1);
    assert_eq!(summary.arb_winrate, Some(1.0));
    assert!(summary.arb_suspect);
    assert!((summary.avg_holding_sec - 235.0 / 3.0).abs() < 1e-9);
    assert!(!summary.is_hft_suspect, "avg hold above 60s must not be HFT");

    // 100 * (0.4 * 2/3 + 0.3 * 0 + 0.3 * 1.0)
    assert!((summary.toxic_score - 56.666_666).abs() < 1e-3, "got {}", summary.toxic_score);
    assert_eq!(summary.risk_tier(), RiskTier::Medium);
}

// ── Scenario B: empty input ──
#[test]
fn test_empty_input() {
    let Analysis { trades, summary } = analyze(&[], &defaults());

    assert!(trades.is_empty());
    assert_eq!(summary.total_trades, 0);
    assert_eq!(summary.total_profit, 0.0);
    assert_eq!(summary.avg_holding_sec, 0.0);
    assert_eq!(summary.scalping_trades_pct, 0.0);
    assert_eq!(summary.max_trades_per_minute, 0);
    assert!(!summary.is_hft_suspect);
    assert_eq!(summary.arb_winrate, None);
    assert!(!summary.arb_suspect);
    assert_eq!(summary.toxic_score, 0.0);
    assert_eq!(summary.risk_tier(), RiskTier::Low);
}

#[test]
fn test_zero_trades_per_minute_rejected() {
    let mut config = defaults();
    config.thresholds.hft_trades_per_minute = 0;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("hft_trades_per_minute"));

    config.thresholds.hft_trades_per_minute = 1;
    assert!(config.validate().is_ok());
    // one trade per minute suffices once both conditions hold
    let summary = analyze(&[trade("1", 0, 2, 1.0)], &config).summary;
    assert!(summary.is_hft_suspect);
    assert!(!analyze(&[], &config).summary.is_hft_suspect);
}

// ── Scenario C: six 2-second trades inside one minute ──
#[test]
fn test_hft_burst_in_one_minute() {
    let records: Vec<_> = (0..6).map(|i| trade(&i.to_string(), i * 5, 2, 1.5)).collect();
    let summary = analyze(&records, &defaults()).summary;

    assert_eq!(summary.max_trades_per_minute, 6);
    assert!((summary.avg_holding_sec - 2.0).abs() < 1e-9);
    assert!(summary.is_hft_suspect);
    assert_eq!(summary.hft_band_trades, 6);
    // all scalps, HFT, arb winrate 1.0 → 100
    assert!((summary.toxic_score - 100.0).abs() < 1e-9);
    assert_eq!(summary.risk_tier(), RiskTier::High);
}

#[test]
fn test_hft_requires_both_conditions() {
    // Burst of 6 in one minute but long holds → not HFT
    let slow: Vec<_> = (0..6).map(|i| trade(&i.to_string(), i, 600, 1.0)).collect();
    let summary = analyze(&slow, &defaults()).summary;
    assert_eq!(summary.max_trades_per_minute, 6);
    assert!(!summary.is_hft_suspect);

    // Short holds but spread one per minute → not HFT
    let sparse: Vec<_> = (0..6).map(|i| trade(&i.to_string(), i * 60, 2, 1.0)).collect();
    let summary = analyze(&sparse, &defaults()).summary;
    assert_eq!(summary.max_trades_per_minute, 1);
    assert!(!summary.is_hft_suspect);
}

#[test]
fn test_minute_buckets_are_calendar_aligned() {
    // 09:30:50 .. 09:31:10 straddles a minute boundary: 3 + 3
    let records: Vec<_> = (0..6).map(|i| trade(&i.to_string(), 50 + i * 4, 1, 1.0)).collect();
    let summary = analyze(&records, &defaults()).summary;
    assert_eq!(summary.max_trades_per_minute, 3);
    assert!(!summary.is_hft_suspect);
}

// ── Scenario D: malformed timestamp is dropped ──
#[test]
fn test_unparseable_timestamp_is_filtered() {
    let mut broken = trade("bad", 0, 30, 100.0);
    broken.open_time = None;
    let mut no_close = trade("bad-close", 10, 30, 100.0);
    no_close.close_time = None;
    let records = vec![trade("1", 0, 30, 1.0), broken, no_close, trade("2", 90, 400, -2.0)];

    let Analysis { trades, summary } = analyze(&records, &defaults());

    assert_eq!(summary.total_trades, 2);
    assert_eq!(trades.len(), 2);
    assert!(trades.iter().all(|t| !t.ticket.starts_with("bad")));
    assert!((summary.total_profit + 1.0).abs() < 1e-9);
}

#[test]
fn test_order_preserved_among_survivors() {
    let mut broken = trade("x", 0, 30, 0.0);
    broken.close_time = None;
    let records = vec![trade("c", 300, 1, 0.0), broken, trade("a", 0, 1, 0.0), trade("b", 100, 1, 0.0)];
    let tickets: Vec<_> = analyze(&records, &defaults()).trades.into_iter().map(|t| t.ticket).collect();
    assert_eq!(tickets, vec!["c", "a", "b"]);
}

// ── Arbitrage edge cases ──
#[test]
fn test_no_arbitrage_trades_leaves_winrate_undefined() {
    let records = vec![trade("1", 0, 11, 50.0), trade("2", 30, 3600, 20.0)];
    let summary = analyze(&records, &defaults()).summary;
    assert_eq!(summary.arb_trades_count, 0);
    assert_eq!(summary.arb_winrate, None);
    assert!(!summary.arb_suspect);
}

#[test]
fn test_all_losing_arbitrage_is_zero_not_undefined() {
    let records = vec![trade("1", 0, 2, -1.0), trade("2", 30, 4, -3.0)];
    let summary = analyze(&records, &defaults()).summary;
    assert_eq!(summary.arb_trades_count, 2);
    assert_eq!(summary.arb_winrate, Some(0.0));
    assert!(!summary.arb_suspect);
    assert!((summary.arb_profit + 4.0).abs() < 1e-9);
}

#[test]
fn test_zero_profit_is_not_a_win() {
    let records = vec![
        trade("1", 0, 2, 1.0),
        trade("2", 60, 2, 0.0),
        trade("3", 120, 2, 1.0),
        trade("4", 180, 2, 1.0),
        trade("5", 240, 2, 1.0),
    ];
    let summary = analyze(&records, &defaults()).summary;
    assert_eq!(summary.arb_winrate, Some(0.8));
    // 0.8 >= 0.8 inclusive
    assert!(summary.arb_suspect);
}

#[test]
fn test_thresholds_are_inclusive() {
    let t = Thresholds::default();
    let records = vec![
        trade("scalp-edge", 0, 180, 1.0),
        trade("hft-edge", 600, 60, 1.0),
        trade("arb-edge", 1200, 10, 1.0),
    ];
    let trades = analyze(&records, &defaults()).trades;
    assert!(trades[0].is_scalp && !trades[0].is_hft);
    assert!(trades[1].is_hft && trades[1].holding_secs == t.hft_hold_seconds);
    assert!(trades[2].is_arb);
}

// ── Inverted timestamps pass through with negative holding ──
#[test]
fn test_close_before_open_is_kept_as_negative_holding() {
    let records = vec![trade("inverted", 0, -30, 5.0)];
    let Analysis { trades, summary } = analyze(&records, &defaults());

    assert_eq!(summary.total_trades, 1);
    assert!((trades[0].holding_secs + 30.0).abs() < 1e-9);
    assert!(trades[0].is_scalp && trades[0].is_hft && trades[0].is_arb);
    assert_eq!(summary.arb_winrate, Some(1.0));
}

#[test]
fn test_fractional_holding_seconds() {
    let open = base();
    let record = TradeRecord {
        open_time: Some(open),
        close_time: Some(open + TimeDelta::milliseconds(10_500)),
        ..trade("frac", 0, 0, 1.0)
    };
    let trades = analyze(&[record], &defaults()).trades;
    assert!((trades[0].holding_secs - 10.5).abs() < 1e-9);
    assert!(!trades[0].is_arb, "10.5s exceeds the 10s arbitrage ceiling");
}

// ── Properties ──
#[test]
fn test_summary_reconciles_with_flags() {
    let records = TradeGenerator::new(0.4, 11).generate(2_000);
    let Analysis { trades, summary } = analyze(&records, &defaults());

    assert_eq!(summary.total_trades, trades.len());
    assert_eq!(summary.scalping_trades, trades.iter().filter(|t| t.is_scalp).count());
    assert_eq!(summary.hft_band_trades, trades.iter().filter(|t| t.is_hft).count());
    assert_eq!(summary.arb_trades_count, trades.iter().filter(|t| t.is_arb).count());

    let per_minute = detection::count_per_minute(&trades);
    assert_eq!(per_minute.values().sum::<usize>(), trades.len());
    assert_eq!(summary.max_trades_per_minute, per_minute.values().copied().max().unwrap_or(0));

    // summary is a function of the annotated trades alone
    assert_eq!(detection::summarize(&trades, &defaults()), summary);
}

#[test]
fn test_scalp_flag_monotonic_in_threshold() {
    let records = TradeGenerator::new(0.5, 23).generate(1_000);
    let mut previous: Option<Vec<bool>> = None;

    for scalp_seconds in [0.0, 10.0, 60.0, 180.0, 600.0, 3_600.0, 86_400.0] {
        let mut config = defaults();
        config.thresholds.scalp_seconds = scalp_seconds;
        let trades = analyze(&records, &config).trades;

        for t in &trades {
            assert_eq!(t.is_scalp, t.holding_secs <= scalp_seconds);
        }
        let flags: Vec<bool> = trades.iter().map(|t| t.is_scalp).collect();
        if let Some(prev) = &previous {
            for (before, after) in prev.iter().zip(&flags) {
                assert!(!before || *after, "raising scalp_seconds removed a scalp");
            }
        }
        previous = Some(flags);
    }
}

#[test]
fn test_idempotent() {
    let records = TradeGenerator::new(0.3, 5).generate(1_500);
    let first = analyze(&records, &defaults());
    let second = analyze(&records, &defaults());
    assert_eq!(first, second);
    assert_eq!(first.summary.toxic_score.to_bits(), second.summary.toxic_score.to_bits());
}

#[test]
fn test_score_stays_in_range() {
    let weight_sets = [
        ScoreWeights::default(),
        ScoreWeights { scalp: 1.0, hft: 0.0, arb: 0.0 },
        ScoreWeights { scalp: 0.0, hft: 0.0, arb: 0.0 },
        ScoreWeights { scalp: 0.2, hft: 0.5, arb: 0.3 },
    ];
    for (seed, rate) in [(1, 0.0), (2, 0.5), (3, 1.0)] {
        let records = TradeGenerator::new(rate, seed).generate(800);
        for weights in weight_sets {
            let config = AnalyzerConfig { thresholds: Thresholds::default(), weights };
            assert!(config.validate().is_ok());
            let score = analyze(&records, &config).summary.toxic_score;
            assert!((0.0..=100.0).contains(&score), "score {score} out of range");
        }
    }
}

#[test]
fn test_custom_weights_change_score() {
    let records = vec![trade("1", 0, 30, 10.0), trade("2", 120, 200, -5.0), trade("3", 600, 5, 8.0)];
    let config = AnalyzerConfig {
        thresholds: Thresholds::default(),
        weights: ScoreWeights { scalp: 0.0, hft: 0.0, arb: 1.0 },
    };
    let summary = analyze(&records, &config).summary;
    assert!((summary.toxic_score - 100.0).abs() < 1e-9);
}

#[test]
fn test_generated_toxic_history_scores_higher() {
    let clean = analyze(&TradeGenerator::new(0.0, 9).generate(1_000), &defaults()).summary;
    let toxic = analyze(&TradeGenerator::new(0.9, 9).generate(1_000), &defaults()).summary;
    assert!(toxic.toxic_score > clean.toxic_score);
    assert_eq!(clean.scalping_trades, 0);
    assert!(toxic.is_hft_suspect || toxic.max_trades_per_minute >= 6);
}

// ── Risk tiers & alerts ──
#[test]
fn test_risk_tier_boundaries() {
    assert_eq!(RiskTier::from_score(0.0), RiskTier::Low);
    assert_eq!(RiskTier::from_score(39.999), RiskTier::Low);
    assert_eq!(RiskTier::from_score(40.0), RiskTier::Medium);
    assert_eq!(RiskTier::from_score(69.999), RiskTier::Medium);
    assert_eq!(RiskTier::from_score(70.0), RiskTier::High);
    assert_eq!(RiskTier::from_score(100.0), RiskTier::High);
    assert_eq!(RiskTier::High.label(), "High risk");
}

#[test]
fn test_alerts_follow_suspect_flags() {
    let records: Vec<_> = (0..12).map(|i| trade(&i.to_string(), i * 4, 2, 1.0)).collect();
    let config = defaults();
    let summary = analyze(&records, &config).summary;
    let alerts = alerts_for(&summary, &config);

    let types: Vec<_> = alerts.iter().map(|a| a.alert_type).collect();
    assert_eq!(types, vec![AlertType::Scalping, AlertType::HighFrequency, AlertType::Arbitrage]);
    // 100% scalps
    assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    // 12 trades/min vs minimum 5 → at least 2x
    assert_eq!(alerts[1].severity, AlertSeverity::High);
    // perfect winrate on fewer than 20 trades
    assert_eq!(alerts[2].severity, AlertSeverity::High);

    let calm = analyze(&[trade("1", 0, 3_600, 1.0)], &config).summary;
    assert!(alerts_for(&calm, &config).is_empty());
}

// ── Config ──
#[test]
fn test_config_validation() {
    assert!(defaults().validate().is_ok());

    let mut bad = defaults();
    bad.thresholds.arb_winrate_threshold = 1.5;
    assert!(bad.validate().is_err());

    let mut bad = defaults();
    bad.thresholds.scalp_seconds = -1.0;
    assert!(bad.validate().is_err());

    let mut bad = defaults();
    bad.thresholds.hft_hold_seconds = f64::NAN;
    assert!(bad.validate().is_err());

    let mut bad = defaults();
    bad.weights = ScoreWeights { scalp: 0.5, hft: 0.5, arb: 0.5 };
    let err = bad.validate().unwrap_err();
    assert!(err.to_string().contains("sum to at most 1.0"));
    assert!(!err.is_structural());
}

#[test]
fn test_config_partial_json_keeps_defaults() {
    let config: AnalyzerConfig =
        serde_json::from_str(r#"{ "thresholds": { "scalp_seconds": 120 }, "weights": { "arb": 0.1 } }"#).unwrap();
    assert_eq!(config.thresholds.scalp_seconds, 120.0);
    assert_eq!(config.thresholds.hft_trades_per_minute, 5);
    assert_eq!(config.thresholds.arb_winrate_threshold, 0.8);
    assert_eq!(config.weights.scalp, 0.4);
    assert_eq!(config.weights.arb, 0.1);
}
