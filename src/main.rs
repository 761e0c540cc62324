use std::path::PathBuf;

use clap::Parser;

use toxic_trade_detect::alerts::alerts_for;
use toxic_trade_detect::config::AnalyzerConfig;
use toxic_trade_detect::detection;
use toxic_trade_detect::export::{self, ExportFilter};
use toxic_trade_detect::generator::TradeGenerator;
use toxic_trade_detect::ingest;
use toxic_trade_detect::stress;
use toxic_trade_detect::types::Analysis;
use toxic_trade_detect::views;

#[derive(Parser)]
#[command(name = "toxic-trade-detect", about = "Scalping, HFT and arbitrage detection for MT5 trade histories")]
struct Cli {
    /// Run mode: report, demo, or stress
    #[arg(long, default_value = "report")]
    mode: String,

    /// Trade history CSV (report mode)
    #[arg(long)]
    input: Option<PathBuf>,

    /// CSV field delimiter
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// JSON file with thresholds and score weights
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    scalp_seconds: Option<f64>,

    #[arg(long)]
    hft_hold_seconds: Option<f64>,

    #[arg(long)]
    hft_trades_per_minute: Option<usize>,

    #[arg(long)]
    arb_hold_seconds: Option<f64>,

    #[arg(long)]
    arb_winrate_threshold: Option<f64>,

    #[arg(long)]
    scalp_weight: Option<f64>,

    #[arg(long)]
    hft_weight: Option<f64>,

    #[arg(long)]
    arb_weight: Option<f64>,

    /// Print the summary and alerts as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Write analyzed trades to this CSV file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Which trades to export
    #[arg(long, value_enum, default_value = "all")]
    filter: ExportFilter,

    /// Generated trades (demo mode)
    #[arg(long, default_value = "500")]
    trades: usize,

    /// Toxic pattern injection rate (0.0-1.0, demo and stress modes)
    #[arg(long, default_value = "0.1")]
    toxic_rate: f64,

    /// Generator seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Engine runs per stress level
    #[arg(long, default_value = "20")]
    iterations: usize,
}

impl Cli {
    fn analyzer_config(&self) -> toxic_trade_detect::Result<AnalyzerConfig> {
        let mut config = match &self.config {
            Some(path) => AnalyzerConfig::from_json_file(path)?,
            None => AnalyzerConfig::default(),
        };

        let t = &mut config.thresholds;
        if let Some(v) = self.scalp_seconds { t.scalp_seconds = v; }
        if let Some(v) = self.hft_hold_seconds { t.hft_hold_seconds = v; }
        if let Some(v) = self.hft_trades_per_minute { t.hft_trades_per_minute = v; }
        if let Some(v) = self.arb_hold_seconds { t.arb_hold_seconds = v; }
        if let Some(v) = self.arb_winrate_threshold { t.arb_winrate_threshold = v; }

        let w = &mut config.weights;
        if let Some(v) = self.scalp_weight { w.scalp = v; }
        if let Some(v) = self.hft_weight { w.hft = v; }
        if let Some(v) = self.arb_weight { w.arb = v; }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if !cli.toxic_rate.is_finite() || !(0.0..=1.0).contains(&cli.toxic_rate) {
        return Err(format!("--toxic-rate must be within [0, 1], got {}", cli.toxic_rate).into());
    }
    let config = cli.analyzer_config()?;

    match cli.mode.as_str() {
        "report" => run_report(&cli, &config)?,
        "demo" => run_demo(&cli, &config)?,
        "stress" => stress::run(cli.iterations, cli.toxic_rate, cli.seed, &config),
        other => eprintln!("Unknown mode: {other}. Use --mode report|demo|stress"),
    }

    Ok(())
}

fn run_report(cli: &Cli, config: &AnalyzerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let Some(input) = &cli.input else {
        return Err("report mode needs --input <CSV>".into());
    };
    if !cli.delimiter.is_ascii() {
        return Err(format!("delimiter must be a single ASCII character, got {:?}", cli.delimiter).into());
    }

    let records = ingest::load_trades(input, cli.delimiter as u8)?;
    let analysis = detection::analyze(&records, config);
    render(cli, config, &analysis)
}

fn run_demo(cli: &Cli, config: &AnalyzerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let records = TradeGenerator::new(cli.toxic_rate, cli.seed).generate(cli.trades);
    log::info!("Generated {} synthetic trades (toxic rate {:.0}%)", records.len(), cli.toxic_rate * 100.0);
    let analysis = detection::analyze(&records, config);
    render(cli, config, &analysis)
}

fn render(cli: &Cli, config: &AnalyzerConfig, analysis: &Analysis) -> Result<(), Box<dyn std::error::Error>> {
    let summary = &analysis.summary;
    let alerts = alerts_for(summary, config);

    if cli.json {
        let out = serde_json::json!({
            "summary": summary,
            "risk_tier": summary.risk_tier().label(),
            "alerts": alerts,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("=== Toxic Trading Report ===");
        println!("  Total trades:        {}", summary.total_trades);
        println!("  Total P&L:           {:.2}", summary.total_profit);
        println!("  Scalping trades:     {} ({:.1}%), P&L {:.2}",
            summary.scalping_trades, summary.scalping_trades_pct, summary.scalping_profit);
        println!("  HFT-band trades:     {}", summary.hft_band_trades);
        println!("  Avg holding:         {:.1}s", summary.avg_holding_sec);
        println!("  Max trades/minute:   {}", summary.max_trades_per_minute);
        println!("  HFT suspect:         {}", if summary.is_hft_suspect { "YES" } else { "no" });
        let winrate = summary
            .arb_winrate
            .map_or_else(|| "n/a".to_string(), |w| format!("{:.1}%", w * 100.0));
        println!("  Arbitrage trades:    {} (winrate {})", summary.arb_trades_count, winrate);
        println!("  Arbitrage suspect:   {}", if summary.arb_suspect { "YES" } else { "no" });
        println!();
        println!("  Toxic score:         {:.1} / 100  [{}]", summary.toxic_score, summary.risk_tier().label());
        println!();

        for alert in &alerts {
            println!("  ALERT | {:?} | {} | {}", alert.severity, alert.alert_type.label(), alert.description);
        }
        if !alerts.is_empty() {
            println!();
        }

        let mut busiest = views::trades_per_minute(&analysis.trades);
        busiest.sort_by(|a, b| b.count.cmp(&a.count).then(a.minute.cmp(&b.minute)));
        if !busiest.is_empty() {
            println!("  Busiest minutes:");
            for bucket in busiest.iter().take(5) {
                println!("    {}  {}", bucket.minute.format("%Y-%m-%d %H:%M"), bucket.count);
            }
        }

        if let Some(last) = views::equity_curve(&analysis.trades).last() {
            println!("  Final equity:        {:.2} (at {})", last.cumulative_profit, last.close_time);
        }
    }

    if let Some(path) = &cli.export {
        let written = export::export_trades(path, &analysis.trades, cli.filter)?;
        if !cli.json {
            println!("  Exported {} trades to {}", written, path.display());
        }
    }

    Ok(())
}
