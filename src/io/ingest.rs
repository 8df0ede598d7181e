//! CSV ingest for the historical traffic table.
//!
//! This module turns a traffic-count CSV into a clean list of `TrafficRecord`s.
//!
//! Design goals:
//! - **Strict schema**: `DateTime`, `Junction`, `Vehicles` must be present in the
//!   header, checked before any row is read (`Format` error)
//! - **Strict rows**: the first unparseable field aborts the load with its line
//!   number (`Parse` error); there is no partial dataset
//! - **Separation of concerns**: no aggregation logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::debug;

use crate::domain::TrafficRecord;
use crate::error::AppError;

const COL_DATETIME: &str = "datetime";
const COL_JUNCTION: &str = "junction";
const COL_VEHICLES: &str = "vehicles";

/// Column positions resolved from the header.
#[derive(Debug, Clone, Copy)]
struct Columns {
    datetime: usize,
    junction: usize,
    vehicles: usize,
}

/// Open `path` and read every record.
pub fn load_records(path: &Path) -> Result<Vec<TrafficRecord>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_records(file)
}

/// Read every record from an in-memory or streamed CSV source.
pub fn read_records<R: Read>(source: R) -> Result<Vec<TrafficRecord>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::format(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let columns = resolve_columns(&build_header_map(&headers))?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;

        let row = result.map_err(|e| AppError::parse(format!("CSV parse error on line {line}: {e}")))?;
        let record = parse_row(&row, columns).map_err(|e| AppError::parse(format!("Line {line}: {e}")))?;
        records.push(record);
    }

    debug!(rows = records.len(), "parsed traffic CSV");
    Ok(records)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_columns(header_map: &HashMap<String, usize>) -> Result<Columns, AppError> {
    let require = |name: &str, display: &str| {
        header_map
            .get(name)
            .copied()
            .ok_or_else(|| AppError::format(format!("Missing required column: `{display}`")))
    };

    Ok(Columns {
        datetime: require(COL_DATETIME, "DateTime")?,
        junction: require(COL_JUNCTION, "Junction")?,
        vehicles: require(COL_VEHICLES, "Vehicles")?,
    })
}

fn parse_row(record: &StringRecord, columns: Columns) -> Result<TrafficRecord, String> {
    let timestamp = parse_timestamp(get_required(record, columns.datetime, "DateTime")?)?;

    let junction_raw = get_required(record, columns.junction, "Junction")?;
    let junction = junction_raw
        .parse::<i64>()
        .map_err(|_| format!("Invalid `Junction` '{junction_raw}' (expected an integer id)."))?;

    let vehicles_raw = get_required(record, columns.vehicles, "Vehicles")?;
    let vehicles = vehicles_raw
        .parse::<u64>()
        .map_err(|_| format!("Invalid `Vehicles` '{vehicles_raw}' (expected a non-negative integer)."))?;

    Ok(TrafficRecord {
        timestamp,
        junction,
        vehicles,
    })
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

/// Parse a timestamp in one of the accepted layouts.
///
/// A bare date is taken as midnight.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    // `%.f` also matches an absent fraction. Slash dates are month-first.
    const FMTS: [&str; 6] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    for fmt in FMTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ts);
        }
    }
    if let Some(ts) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(ts);
    }
    Err(format!(
        "Invalid `DateTime` '{s}'. Expected YYYY-MM-DD HH:MM[:SS], YYYY-MM-DDTHH:MM[:SS], MM/DD/YYYY HH:MM[:SS], or YYYY-MM-DD."
    ))
}
