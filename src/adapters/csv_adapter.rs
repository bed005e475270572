//! CSV file data adapter.
//!
//! One file per symbol, `<dir>/<SYMBOL>.csv`, with the header
//! `date,open,high,low,close,volume`. Dates are `YYYY-MM-DD` or
//! `YYYY-MM-DD HH:MM:SS`. Volumes may carry a zero fraction (`1000000.0`).

use crate::domain::error::AnalysisError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn field<T: FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    line: u64,
) -> Result<T, AnalysisError>
where
    T::Err: std::fmt::Display,
{
    let raw = record.get(index).ok_or_else(|| AnalysisError::DataSource {
        reason: format!("line {}: missing {} column", line, name),
    })?;
    raw.trim().parse().map_err(|e| AnalysisError::DataSource {
        reason: format!("line {}: invalid {} value {:?}: {}", line, name, raw, e),
    })
}

/// Volume as a whole number. Provider dumps often write `1000000.0`, so an
/// integral float is accepted; a fractional one is not.
fn volume_field(record: &csv::StringRecord, line: u64) -> Result<i64, AnalysisError> {
    if let Ok(volume) = field::<i64>(record, 5, "volume", line) {
        return Ok(volume);
    }
    let raw = field::<f64>(record, 5, "volume", line)?;
    if raw.is_finite() && raw.fract() == 0.0 && raw.abs() < i64::MAX as f64 {
        Ok(raw as i64)
    } else {
        Err(AnalysisError::DataSource {
            reason: format!("line {}: volume {} is not a whole number", line, raw),
        })
    }
}

impl DataPort for CsvAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, AnalysisError> {
        let path = self.csv_path(symbol);
        if !path.is_file() {
            return Err(AnalysisError::DataUnavailable {
                symbol: symbol.to_string(),
            });
        }
        let content = fs::read_to_string(&path).map_err(|e| AnalysisError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| AnalysisError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;
            let line = record.position().map_or(0, |p| p.line());

            let date_str = record.get(0).ok_or_else(|| AnalysisError::DataSource {
                reason: format!("line {}: missing date column", line),
            })?;
            let timestamp = parse_timestamp(date_str).ok_or_else(|| AnalysisError::DataSource {
                reason: format!("line {}: invalid date {:?}", line, date_str),
            })?;

            let date = timestamp.date();
            if start.is_some_and(|s| date < s) || end.is_some_and(|e| date > e) {
                continue;
            }

            bars.push(OhlcvBar {
                timestamp,
                open: field(&record, 1, "open", line)?,
                high: field(&record, 2, "high", line)?,
                low: field(&record, 3, "low", line)?,
                close: field(&record, 4, "close", line)?,
                volume: volume_field(&record, line)?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        let before = bars.len();
        bars.dedup_by_key(|b| b.timestamp);
        if bars.len() < before {
            warn!(
                symbol,
                dropped = before - bars.len(),
                "dropped rows with duplicate timestamps"
            );
        }

        debug!(symbol, bars = bars.len(), path = %path.display(), "loaded series");
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, AnalysisError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| AnalysisError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| AnalysisError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
