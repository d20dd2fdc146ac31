//! CSV ingestion for the trigger and validation tables.
//!
//! RULE: Only the loader reads input files. Every later stage works on
//! the in-memory records it returns, in source row order.

use crate::{
    config::InsightsConfig,
    error::{InsightsError, InsightsResult},
    record::{RawTriggerRecord, ValidationRecord},
    types::{RunDateTime, SourceTable},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::{fs::File, io::Read};

pub const TRIGGER_COLUMNS: [&str; 5] = [
    "account_canonical_id",
    "run_datetime",
    "trigger",
    "tripped",
    "excess_cash_amount",
];

pub const VALIDATION_COLUMNS: [&str; 4] = [
    "account_canonical_id",
    "run_datetime",
    "account_tradeable",
    "validation_category",
];

/// Cell values read as a missing amount.
const NULL_TOKENS: [&str; 7] = ["", "nan", "na", "n/a", "null", "none", "<na>"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone, Default)]
pub struct LoadedTables {
    pub triggers: Vec<RawTriggerRecord>,
    pub validations: Vec<ValidationRecord>,
}

/// Load both tables named in the config. Fails on the first ingest error.
pub fn load_tables(config: &InsightsConfig) -> InsightsResult<LoadedTables> {
    let delimiter = config.delimiter_byte().map_err(InsightsError::InvalidConfig)?;
    let triggers = load_triggers(&config.trigger_path, delimiter)?;
    let validations = load_validations(&config.validation_path, delimiter)?;
    log::info!(
        "loaded {} trigger row(s) from {}, {} validation row(s) from {}",
        triggers.len(),
        config.trigger_path,
        validations.len(),
        config.validation_path,
    );
    Ok(LoadedTables {
        triggers,
        validations,
    })
}

pub fn load_triggers(path: &str, delimiter: u8) -> InsightsResult<Vec<RawTriggerRecord>> {
    let file = open_source(SourceTable::Trigger, path)?;
    read_triggers(file, delimiter)
}

pub fn load_validations(path: &str, delimiter: u8) -> InsightsResult<Vec<ValidationRecord>> {
    let file = open_source(SourceTable::Validation, path)?;
    read_validations(file, delimiter)
}

pub fn read_triggers<R: Read>(source: R, delimiter: u8) -> InsightsResult<Vec<RawTriggerRecord>> {
    let table = SourceTable::Trigger;
    let mut reader = csv_reader(source, delimiter);
    let headers = reader.headers()?.clone();
    let [account, run_dt, trigger, tripped, excess] = locate_columns(table, &headers, TRIGGER_COLUMNS)?;

    let mut out = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 1;
        out.push(RawTriggerRecord {
            row,
            account_canonical_id: cell(&record, account).to_string(),
            run_datetime: parse_cell_datetime(table, row, cell(&record, run_dt))?,
            trigger: cell(&record, trigger).to_string(),
            tripped: cell(&record, tripped).to_string(),
            excess_cash_amount: parse_amount(table, row, cell(&record, excess))?,
        });
    }
    Ok(out)
}

pub fn read_validations<R: Read>(
    source: R,
    delimiter: u8,
) -> InsightsResult<Vec<ValidationRecord>> {
    let table = SourceTable::Validation;
    let mut reader = csv_reader(source, delimiter);
    let headers = reader.headers()?.clone();
    let [account, run_dt, tradeable, category] =
        locate_columns(table, &headers, VALIDATION_COLUMNS)?;

    let mut out = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 1;
        out.push(ValidationRecord {
            row,
            account_canonical_id: cell(&record, account).to_string(),
            run_datetime: parse_cell_datetime(table, row, cell(&record, run_dt))?,
            account_tradeable: non_empty(cell(&record, tradeable)),
            validation_category: non_empty(cell(&record, category)),
        });
    }
    Ok(out)
}

/// Parse a `run_datetime` cell. Accepts space- or T-separated date-times
/// with optional seconds and fraction, RFC 3339 (taken as UTC), and a
/// bare date (midnight).
pub fn parse_run_datetime(value: &str) -> Option<RunDateTime> {
    let value = value.trim();
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn open_source(table: SourceTable, path: &str) -> InsightsResult<File> {
    File::open(path).map_err(|source| InsightsError::SourceUnreadable {
        table,
        path: path.to_string(),
        source,
    })
}

fn csv_reader<R: Read>(source: R, delimiter: u8) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(source)
}

fn locate_columns<const N: usize>(
    table: SourceTable,
    headers: &StringRecord,
    required: [&'static str; N],
) -> InsightsResult<[usize; N]> {
    let mut indices = [0usize; N];
    for (slot, column) in indices.iter_mut().zip(required) {
        *slot = headers
            .iter()
            .position(|h| h == column)
            .ok_or(InsightsError::MissingColumn { table, column })?;
    }
    let extra: Vec<&str> = headers
        .iter()
        .filter(|h| !required.iter().any(|c| c == h))
        .collect();
    if !extra.is_empty() {
        log::debug!("{table} table: ignoring extra column(s) {extra:?}");
    }
    Ok(indices)
}

fn cell(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_cell_datetime(table: SourceTable, row: usize, value: &str) -> InsightsResult<RunDateTime> {
    parse_run_datetime(value).ok_or_else(|| InsightsError::InvalidValue {
        table,
        row,
        column: "run_datetime",
        value: value.to_string(),
    })
}

fn parse_amount(table: SourceTable, row: usize, value: &str) -> InsightsResult<Option<f64>> {
    let lowered = value.to_ascii_lowercase();
    if NULL_TOKENS.iter().any(|t| *t == lowered) {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(InsightsError::InvalidValue {
            table,
            row,
            column: "excess_cash_amount",
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn datetime_formats() {
        let a = parse_run_datetime("2024-03-01 14:05:00").unwrap();
        let b = parse_run_datetime("2024-03-01T14:05:00").unwrap();
        let c = parse_run_datetime("2024-03-01 14:05").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.hour(), 14);

        let frac = parse_run_datetime("2024-03-01 14:05:00.250").unwrap();
        assert_eq!(frac.nanosecond(), 250_000_000);

        let rfc = parse_run_datetime("2024-03-01T16:05:00+02:00").unwrap();
        assert_eq!(rfc, a);

        let midnight = parse_run_datetime("2024-03-01").unwrap();
        assert_eq!(midnight.hour(), 0);

        assert!(parse_run_datetime("yesterday").is_none());
    }

    #[test]
    fn amount_null_tokens() {
        let t = SourceTable::Trigger;
        assert_eq!(parse_amount(t, 1, "").unwrap(), None);
        assert_eq!(parse_amount(t, 1, "NaN").unwrap(), None);
        assert_eq!(parse_amount(t, 1, "null").unwrap(), None);
        assert_eq!(parse_amount(t, 1, "12.5").unwrap(), Some(12.5));
        assert!(parse_amount(t, 1, "twelve").is_err());
    }
}
