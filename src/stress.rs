use std::time::Instant;

use crate::config::AnalyzerConfig;
use crate::detection;
use crate::generator::TradeGenerator;
use crate::latency::{LatencyStats, LatencyTracker};

const LEVELS: &[usize] = &[1_000, 10_000, 50_000, 100_000, 500_000, 1_000_000];

struct LevelResult {
    level: usize,
    trades: usize,
    iterations: usize,
    trades_per_sec: u64,
    latency: LatencyStats,
    toxic_score: f64,
    duration_secs: f64,
}

pub fn run(iterations: usize, toxic_rate: f64, seed: u64, config: &AnalyzerConfig) {
    let iterations = iterations.max(1);
    println!("=== STRESS TEST ===");
    println!("Levels: {}, Iterations per level: {}, Toxic rate: {:.0}%",
        LEVELS.len(), iterations, toxic_rate * 100.0);
    println!();

    let mut latency = LatencyTracker::new();
    let mut results: Vec<LevelResult> = Vec::new();

    for (idx, &size) in LEVELS.iter().enumerate() {
        let level_num = idx + 1;
        print!("Level {}/{}: {} trades x {} ... ", level_num, LEVELS.len(), size, iterations);

        let records = TradeGenerator::new(toxic_rate, seed).generate(size);
        latency.reset();

        let level_start = Instant::now();
        let mut toxic_score = 0.0;
        for _ in 0..iterations {
            let analysis = latency.measure(|| detection::analyze(&records, config));
            toxic_score = analysis.summary.toxic_score;
        }
        let elapsed = level_start.elapsed().as_secs_f64();
        let trades_per_sec = ((size * iterations) as f64 / elapsed.max(f64::EPSILON)) as u64;
        let stats = latency.stats();

        println!("{} trades/sec (p99={})", trades_per_sec, format_latency(stats.p99_us));

        results.push(LevelResult {
            level: level_num,
            trades: size,
            iterations,
            trades_per_sec,
            latency: stats,
            toxic_score,
            duration_secs: elapsed,
        });
    }

    println!();
    print_results_table(&results);
}

fn format_latency(us: u64) -> String {
    if us >= 1_000_000 {
        format!("{:.1}s", us as f64 / 1_000_000.0)
    } else if us >= 1_000 {
        format!("{:.1}ms", us as f64 / 1_000.0)
    } else {
        format!("{}us", us)
    }
}

fn print_results_table(results: &[LevelResult]) {
    println!("{}", "=".repeat(90));
    println!("{:^90}", "STRESS TEST RESULTS");
    println!("{}", "=".repeat(90));
    println!(
        " {:<5} {:>10} {:>6} {:>12} {:>10} {:>10} {:>10} {:>8} {:>8}",
        "Level", "Trades", "Runs", "Trades/s", "p50", "p95", "p99", "Score", "Time"
    );
    println!("{}", "-".repeat(90));

    for r in results {
        println!(
            " {:<5} {:>10} {:>6} {:>12} {:>10} {:>10} {:>10} {:>8.1} {:>7.1}s",
            r.level,
            r.trades,
            r.iterations,
            r.trades_per_sec,
            format_latency(r.latency.p50_us),
            format_latency(r.latency.p95_us),
            format_latency(r.latency.p99_us),
            r.toxic_score,
            r.duration_secs,
        );
    }

    println!("{}", "=".repeat(90));

    if let Some(peak) = results.iter().max_by_key(|r| r.trades_per_sec) {
        println!("Peak throughput: ~{} trades/sec (Level {}, {} trades)",
            peak.trades_per_sec, peak.level, peak.trades);
    }
}
