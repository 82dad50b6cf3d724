// =============================================================================
// Price History Loader — CSV replay input
// =============================================================================
//
// Reads a recorded price history into `PricePoint`s.  Accepts a plain
// `timestamp,price` file as well as the usual daily-bar export
// (`Date,Open,High,Low,Close,Volume,...`).
//
// Column lookup is case-insensitive:
//   timestamp : timestamp | date | datetime | time
//   price     : price | close | adj close
//
// Timestamps may be integers (kept as-is), RFC 3339, `YYYY-MM-DD HH:MM:SS`
// with or without a `+HH:MM` offset, or `YYYY-MM-DD` (midnight UTC).  Dated
// values become epoch milliseconds.
//
// The loader does not judge prices: `nan` parses and is left for the engine
// to reject, so nothing is dropped silently here.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::info;

use crate::types::PricePoint;

const TIMESTAMP_COLUMNS: &[&str] = &["timestamp", "date", "datetime", "time"];
const PRICE_COLUMNS: &[&str] = &["price", "close", "adj close"];

/// Load a CSV price history from disk.
pub fn load_history(path: impl AsRef<Path>) -> Result<Vec<PricePoint>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open price history {}", path.display()))?;

    let points = parse_history(file)
        .with_context(|| format!("failed to parse price history {}", path.display()))?;

    info!(path = %path.display(), points = points.len(), "price history loaded");
    Ok(points)
}

/// Parse a CSV price history with a header row.
pub fn parse_history<R: Read>(reader: R) -> Result<Vec<PricePoint>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let header = reader.headers().context("failed to read header")?.clone();
    if header.iter().all(str::is_empty) {
        bail!("price history is empty");
    }

    let columns: Vec<String> = header
        .iter()
        .map(|c| c.trim_start_matches('\u{feff}').trim().to_ascii_lowercase())
        .collect();
    let ts_idx = find_column(&columns, TIMESTAMP_COLUMNS)
        .with_context(|| format!("no timestamp column in header: {}", join(&header)))?;
    let price_idx = find_column(&columns, PRICE_COLUMNS)
        .with_context(|| format!("no price column in header: {}", join(&header)))?;

    let mut points = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("failed to read record {}", idx + 1))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line_no = record.position().map_or(idx as u64 + 2, |p| p.line());

        let raw_ts = record
            .get(ts_idx)
            .with_context(|| format!("line {line_no}: missing timestamp field"))?;
        let raw_price = record
            .get(price_idx)
            .with_context(|| format!("line {line_no}: missing price field"))?;

        let timestamp =
            parse_timestamp(raw_ts).with_context(|| format!("line {line_no}: bad timestamp"))?;
        let price = parse_price(raw_price)
            .with_context(|| format!("line {line_no}: failed to parse price as f64: {raw_price}"))?;

        points.push(PricePoint { timestamp, price });
    }

    Ok(points)
}

/// Prices may carry thousands separators when the field is quoted
/// (`"21,665.80"`).
fn parse_price(raw: &str) -> Result<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    Ok(cleaned.parse::<f64>()?)
}

/// Turn a timestamp field into an ordinal (epoch milliseconds for dates).
pub fn parse_timestamp(raw: &str) -> Result<i64> {
    let raw = raw.trim();

    if let Ok(n) = raw.parse::<i64>() {
        return Ok(n);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.timestamp_millis());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive).timestamp_millis());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive).timestamp_millis());
        }
    }

    bail!("unrecognised timestamp format: {raw}")
}

/// Render an epoch-millisecond timestamp as RFC 3339, falling back to the
/// raw number for values outside chrono's range.
pub fn render_timestamp(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.to_rfc3339(),
        None => millis.to_string(),
    }
}

fn join(record: &StringRecord) -> String {
    record.iter().collect::<Vec<_>>().join(",")
}

fn find_column(columns: &[String], candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|want| columns.iter().position(|c| c == want))
}
