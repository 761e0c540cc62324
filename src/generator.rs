use chrono::{NaiveDateTime, TimeDelta};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{Direction, TradeRecord};

pub const SYMBOLS: &[&str] = &["EURUSD", "GBPUSD", "USDJPY", "XAUUSD", "US30"];

const NORMAL_ACCOUNTS: &[&str] = &["100201", "100202", "100203", "100204"];
const TOXIC_ACCOUNTS: &[&str] = &["900001", "900002"];

#[derive(Debug, Clone, Copy)]
enum ToxicScenario {
    Scalping,
    HftBurst,
    LatencyArbitrage,
}

const ALL_SCENARIOS: &[ToxicScenario] = &[
    ToxicScenario::Scalping,
    ToxicScenario::HftBurst,
    ToxicScenario::LatencyArbitrage,
];

/// Reproducible synthetic trade histories with injected toxic patterns.
pub struct TradeGenerator {
    rng: StdRng,
    ticket_seq: u64,
    clock: NaiveDateTime,
    pub toxic_rate: f64,
}

impl TradeGenerator {
    pub fn new(toxic_rate: f64, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ticket_seq: 0,
            clock: NaiveDateTime::UNIX_EPOCH + TimeDelta::days(19_723),
            toxic_rate: if toxic_rate.is_finite() { toxic_rate.clamp(0.0, 1.0) } else { 0.0 },
        }
    }

    pub fn with_start(mut self, start: NaiveDateTime) -> Self {
        self.clock = start;
        self
    }

    /// Generate exactly `count` trades in open-time order.
    pub fn generate(&mut self, count: usize) -> Vec<TradeRecord> {
        let mut trades = Vec::with_capacity(count);
        while trades.len() < count {
            let inject = self.rng.gen_bool(self.toxic_rate);
            let batch = if inject {
                let scenario = ALL_SCENARIOS[self.rng.gen_range(0..ALL_SCENARIOS.len())];
                match scenario {
                    ToxicScenario::Scalping => self.scalping_run(),
                    ToxicScenario::HftBurst => self.hft_burst(),
                    ToxicScenario::LatencyArbitrage => self.latency_arbitrage(),
                }
            } else {
                vec![self.normal_trade()]
            };
            trades.extend(batch);
        }
        trades.truncate(count);
        trades
    }

    fn normal_trade(&mut self) -> TradeRecord {
        self.advance(60..1_800);
        let account = NORMAL_ACCOUNTS[self.rng.gen_range(0..NORMAL_ACCOUNTS.len())];
        let holding = self.rng.gen_range(300..14_400);
        let profit = self.rng.gen_range(-80.0..90.0);
        self.trade(account, 0, holding * 1_000, profit)
    }

    fn scalping_run(&mut self) -> Vec<TradeRecord> {
        self.advance(30..300);
        let account = self.toxic_account();
        let n = self.rng.gen_range(3..8);
        (0..n)
            .map(|_| {
                let gap = self.rng.gen_range(20..120);
                self.clock += TimeDelta::seconds(gap);
                let holding = self.rng.gen_range(30_000..=180_000);
                let profit = self.rng.gen_range(-6.0..10.0);
                self.trade(account, 0, holding, profit)
            })
            .collect()
    }

    fn hft_burst(&mut self) -> Vec<TradeRecord> {
        self.advance(60..600);
        // start of a fresh minute so the burst lands in a single bucket
        self.clock = crate::detection::minute_bucket(self.clock) + TimeDelta::minutes(1);
        let account = self.toxic_account();
        let n = self.rng.gen_range(6..=12);
        (0..n)
            .map(|i| {
                let offset_ms = i * 4_000 + self.rng.gen_range(0..3_000);
                let holding = self.rng.gen_range(1_000..=5_000);
                let profit = self.rng.gen_range(-2.0..3.0);
                self.trade(account, offset_ms, holding, profit)
            })
            .collect()
    }

    fn latency_arbitrage(&mut self) -> Vec<TradeRecord> {
        self.advance(30..600);
        let account = self.toxic_account();
        let n = self.rng.gen_range(2..6);
        (0..n)
            .map(|_| {
                let gap = self.rng.gen_range(5..90);
                self.clock += TimeDelta::seconds(gap);
                let holding = self.rng.gen_range(1_000..=8_000);
                let profit = if self.rng.gen_bool(0.9) {
                    self.rng.gen_range(0.5..15.0)
                } else {
                    self.rng.gen_range(-5.0..0.0)
                };
                self.trade(account, 0, holding, profit)
            })
            .collect()
    }

    fn toxic_account(&mut self) -> &'static str {
        TOXIC_ACCOUNTS[self.rng.gen_range(0..TOXIC_ACCOUNTS.len())]
    }

    fn advance(&mut self, secs: std::ops::Range<i64>) {
        let gap = self.rng.gen_range(secs);
        self.clock += TimeDelta::seconds(gap);
    }

    fn trade(&mut self, account: &str, offset_ms: i64, holding_ms: i64, profit: f64) -> TradeRecord {
        self.ticket_seq += 1;
        let open_time = self.clock + TimeDelta::milliseconds(offset_ms);
        let close_time = open_time + TimeDelta::milliseconds(holding_ms);
        let symbol = SYMBOLS[self.rng.gen_range(0..SYMBOLS.len())];
        let direction = if self.rng.gen_bool(0.5) { Direction::Buy } else { Direction::Sell };
        let volume = f64::from(self.rng.gen_range(1..=100u32)) / 100.0;

        TradeRecord {
            ticket: format!("{}", 5_000_000 + self.ticket_seq),
            account: account.to_string(),
            symbol: symbol.to_string(),
            volume,
            open_time: Some(open_time),
            close_time: Some(close_time),
            direction,
            profit: (profit * 100.0_f64).round() / 100.0,
        }
    }
}
