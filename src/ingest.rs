//! CSV ingestion for MT5-style trade history exports.
//!
//! Terminal reports carry a preamble (account name, server, period) above
//! the actual table, so the header row is located by content rather than
//! assumed to be the first line.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{AnalyzerError, Result};
use crate::types::{Direction, TradeRecord};

/// Required columns, by canonical name, with accepted normalized aliases.
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("ticket", &["ticket", "position", "deal", "order"]),
    ("opentime", &["opentime", "timeopen"]),
    ("closetime", &["closetime", "timeclose"]),
    ("symbol", &["symbol"]),
    ("volume", &["volume"]),
    ("profit", &["profit"]),
];

const ACCOUNT_ALIASES: &[&str] = &["login", "account"];
const DIRECTION_ALIASES: &[&str] = &["type", "direction"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y.%m.%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S%.f",
    "%Y.%m.%d %H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y.%m.%d", "%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    ticket: usize,
    open_time: usize,
    close_time: usize,
    symbol: usize,
    volume: usize,
    profit: usize,
    account: Option<usize>,
    direction: Option<usize>,
}

pub fn load_trades(path: impl AsRef<Path>, delimiter: u8) -> Result<Vec<TradeRecord>> {
    let file = File::open(path.as_ref())?;
    let trades = read_trades(file, delimiter)?;
    log::info!("Loaded {} trade rows from {}", trades.len(), path.as_ref().display());
    Ok(trades)
}

/// Read every data row below the detected header.
///
/// Fails with a structural error when no row carries all required columns.
/// Row-level problems never fail: bad timestamps become `None`, bad numbers
/// become 0.
pub fn read_trades<R: Read>(reader: R, delimiter: u8) -> Result<Vec<TradeRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(delimiter)
        .from_reader(reader);

    let rows = reader.records().collect::<std::result::Result<Vec<StringRecord>, _>>()?;

    let (header_idx, columns) = detect_header(&rows)?;
    log::debug!("Detected trade table header at row {}", header_idx);

    let mut malformed_numbers = 0usize;
    let trades: Vec<TradeRecord> = rows[header_idx + 1..]
        .iter()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .map(|row| to_record(row, &columns, &mut malformed_numbers))
        .collect();

    if malformed_numbers > 0 {
        log::warn!("{} volume/profit cells could not be parsed and were set to 0", malformed_numbers);
    }
    Ok(trades)
}

fn normalize(cell: &str) -> String {
    cell.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn find_column(normalized: &[String], aliases: &[&str]) -> Option<usize> {
    normalized.iter().position(|cell| aliases.contains(&cell.as_str()))
}

fn detect_header(rows: &[StringRecord]) -> Result<(usize, ColumnMap)> {
    let mut best_missing: Option<Vec<String>> = None;

    for (idx, row) in rows.iter().enumerate() {
        let normalized: Vec<String> = row.iter().map(normalize).collect();
        let found: Vec<Option<usize>> = REQUIRED_COLUMNS
            .iter()
            .map(|(_, aliases)| find_column(&normalized, aliases))
            .collect();

        if let [Some(ticket), Some(open_time), Some(close_time), Some(symbol), Some(volume), Some(profit)] =
            found[..]
        {
            let columns = ColumnMap {
                ticket,
                open_time,
                close_time,
                symbol,
                volume,
                profit,
                account: find_column(&normalized, ACCOUNT_ALIASES),
                direction: find_column(&normalized, DIRECTION_ALIASES),
            };
            return Ok((idx, columns));
        }

        let matched = found.iter().filter(|f| f.is_some()).count();
        if matched == 0 {
            continue;
        }
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .zip(&found)
            .filter(|(_, f)| f.is_none())
            .map(|((name, _), _)| name.to_string())
            .collect();
        if best_missing.as_ref().map_or(true, |best| missing.len() < best.len()) {
            best_missing = Some(missing);
        }
    }

    match best_missing {
        Some(missing) => Err(AnalyzerError::MissingColumns(missing)),
        None => Err(AnalyzerError::HeaderNotFound),
    }
}

fn to_record(row: &StringRecord, columns: &ColumnMap, malformed: &mut usize) -> TradeRecord {
    let cell = move |idx: usize| row.get(idx).unwrap_or("");
    let mut number = |idx: usize| {
        let raw = cell(idx);
        parse_number(raw).unwrap_or_else(|| {
            if !raw.is_empty() {
                *malformed += 1;
            }
            0.0
        })
    };

    let volume = number(columns.volume);
    let profit = number(columns.profit);

    TradeRecord {
        ticket: cell(columns.ticket).to_string(),
        account: columns.account.map(|i| cell(i).to_string()).unwrap_or_default(),
        symbol: cell(columns.symbol).to_string(),
        volume,
        open_time: parse_timestamp(cell(columns.open_time)),
        close_time: parse_timestamp(cell(columns.close_time)),
        direction: columns
            .direction
            .map(|i| Direction::parse(cell(i)))
            .unwrap_or(Direction::Other(String::new())),
        profit,
    }
}

/// Best-effort timestamp parsing. `None` means the value is unusable.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a numeric cell, tolerating spaces and thousands separators.
///
/// With both `,` and `.` present the comma is a thousands separator. Without
/// a dot, a single comma followed by one or two digits is a decimal
/// separator and commas between groups of three digits are thousands
/// separators. Any other comma placement is rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    let cleaned = if compact.contains('.') {
        compact.replace(',', "")
    } else if let Some((int_part, frac)) = compact
        .split_once(',')
        .filter(|(_, frac)| (1..=2).contains(&frac.len()) && frac.bytes().all(|b| b.is_ascii_digit()))
    {
        format!("{int_part}.{frac}")
    } else if compact.contains(',') {
        if !is_thousands_grouped(&compact) {
            return None;
        }
        compact.replace(',', "")
    } else {
        compact
    };
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_thousands_grouped(s: &str) -> bool {
    let mut groups = s.split(',');
    let lead = groups.next().unwrap_or("").trim_start_matches(['-', '+']);
    (1..=3).contains(&lead.len())
        && lead.bytes().all(|b| b.is_ascii_digit())
        && groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}
