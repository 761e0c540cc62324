use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;

use crate::error::Result;
use crate::types::AnalyzedTrade;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFilter {
    #[default]
    All,
    Scalping,
    Hft,
    Arbitrage,
}

impl ExportFilter {
    pub fn matches(&self, trade: &AnalyzedTrade) -> bool {
        match self {
            ExportFilter::All => true,
            ExportFilter::Scalping => trade.is_scalp,
            ExportFilter::Hft => trade.is_hft,
            ExportFilter::Arbitrage => trade.is_arb,
        }
    }
}

#[derive(Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Ticket")]
    ticket: &'a str,
    #[serde(rename = "Account")]
    account: &'a str,
    #[serde(rename = "Symbol")]
    symbol: &'a str,
    #[serde(rename = "Type")]
    direction: &'a str,
    #[serde(rename = "Volume")]
    volume: f64,
    #[serde(rename = "Open Time")]
    open_time: String,
    #[serde(rename = "Close Time")]
    close_time: String,
    #[serde(rename = "Holding Seconds")]
    holding_secs: f64,
    #[serde(rename = "Profit")]
    profit: f64,
    #[serde(rename = "Scalping")]
    is_scalp: bool,
    #[serde(rename = "HFT")]
    is_hft: bool,
    #[serde(rename = "Arbitrage")]
    is_arb: bool,
}

impl<'a> From<&'a AnalyzedTrade> for ExportRow<'a> {
    fn from(t: &'a AnalyzedTrade) -> Self {
        Self {
            ticket: &t.ticket,
            account: &t.account,
            symbol: &t.symbol,
            direction: t.direction.label(),
            volume: t.volume,
            open_time: t.open_time.format(TIME_FORMAT).to_string(),
            close_time: t.close_time.format(TIME_FORMAT).to_string(),
            holding_secs: t.holding_secs,
            profit: t.profit,
            is_scalp: t.is_scalp,
            is_hft: t.is_hft,
            is_arb: t.is_arb,
        }
    }
}

/// Write the trades selected by `filter`; returns the number of data rows.
pub fn write_trades<W: Write>(writer: W, trades: &[AnalyzedTrade], filter: ExportFilter) -> Result<usize> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);

    let mut written = 0;
    for trade in trades.iter().filter(|t| filter.matches(t)) {
        writer.serialize(ExportRow::from(trade))?;
        written += 1;
    }
    if written == 0 {
        // serializer only emits the header alongside the first row
        writer.write_record(HEADER)?;
    }
    writer.flush()?;
    Ok(written)
}

pub fn export_trades(path: impl AsRef<Path>, trades: &[AnalyzedTrade], filter: ExportFilter) -> Result<usize> {
    let file = File::create(path.as_ref())?;
    let written = write_trades(file, trades, filter)?;
    log::info!("Exported {} trades to {}", written, path.as_ref().display());
    Ok(written)
}

const HEADER: [&str; 12] = [
    "Ticket",
    "Account",
    "Symbol",
    "Type",
    "Volume",
    "Open Time",
    "Close Time",
    "Holding Seconds",
    "Profit",
    "Scalping",
    "HFT",
    "Arbitrage",
];
