use chrono::{DateTime, NaiveDateTime, Utc};
use quantlens_core::{Bar, DataError};
use std::io::Read;
use std::path::Path;

/// Load OHLCV bars from a CSV file, oldest first.
///
/// Expected columns (case-insensitive, flexible ordering):
/// `timestamp` (or `date`, `datetime`, `time`), `open`, `high`, `low`, `close`, `volume`.
/// A missing volume column reads as zero volume.
pub fn load_bars_from_csv(path: &Path) -> Result<Vec<Bar>, DataError> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::Parse(format!("Failed to open CSV: {}", e)))?;
    read_bars(reader)
}

/// Parse bars from any CSV source with a header row.
pub fn parse_bars<R: Read>(source: R) -> Result<Vec<Bar>, DataError> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);
    read_bars(reader)
}

fn read_bars<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<Bar>, DataError> {
    let headers = reader
        .headers()
        .map_err(|e| DataError::Parse(format!("Failed to read headers: {}", e)))?
        .clone();

    let col_map = resolve_bar_columns(&headers)?;

    let mut bars = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| DataError::Parse(format!("CSV record error: {}", e)))?;
        let field = |idx: usize| {
            record.get(idx).ok_or_else(|| {
                DataError::Parse(format!("Row {} is missing column {}", line + 1, idx + 1))
            })
        };

        let timestamp = parse_timestamp(field(col_map.timestamp)?)?;
        let open = parse_number(field(col_map.open)?, "open")?;
        let high = parse_number(field(col_map.high)?, "high")?;
        let low = parse_number(field(col_map.low)?, "low")?;
        let close = parse_number(field(col_map.close)?, "close")?;
        let volume = match col_map.volume {
            Some(idx) => parse_number(field(idx)?, "volume")?,
            None => 0.0,
        };

        bars.push(Bar::new(timestamp, open, high, low, close, volume));
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

struct BarColumnMap {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

fn resolve_bar_columns(headers: &csv::StringRecord) -> Result<BarColumnMap, DataError> {
    let required = |names: &[&str], label: &str| {
        find_column(headers, names)
            .ok_or_else(|| DataError::Parse(format!("No {} column found", label)))
    };

    Ok(BarColumnMap {
        timestamp: required(&["timestamp", "date", "datetime", "time"], "timestamp")?,
        open: required(&["open", "o"], "open")?,
        high: required(&["high", "h"], "high")?,
        low: required(&["low", "l"], "low")?,
        close: required(&["close", "c"], "close")?,
        volume: find_column(headers, &["volume", "vol", "v"]),
    })
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let h = header.trim().to_lowercase();
        names.iter().any(|name| h == *name)
    })
}

fn parse_number(s: &str, field: &str) -> Result<f64, DataError> {
    s.trim()
        .parse::<f64>()
        .map_err(|e| DataError::Parse(format!("Failed to parse {} '{}': {}", field, s, e)))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DataError> {
    let s = s.trim();

    // RFC 3339 / ISO 8601 with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Common formats (without timezone, assume UTC)
    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%Y%m%d %H:%M:%S",
    ];

    for fmt in &formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }

    // Date-only
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Some(naive) = chrono::NaiveDate::parse_from_str(s, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(naive.and_utc());
        }
    }

    // Unix timestamp (seconds)
    if let Some(dt) = s.parse::<i64>().ok().and_then(|ts| DateTime::from_timestamp(ts, 0)) {
        return Ok(dt);
    }

    Err(DataError::Parse(format!("Unable to parse timestamp: '{}'", s)))
}
