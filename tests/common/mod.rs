#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use marketlens::domain::error::AnalysisError;
pub use marketlens::domain::ohlcv::OhlcvBar;
use marketlens::domain::series::Series;
use marketlens::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, AnalysisError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(AnalysisError::DataSource {
                reason: reason.clone(),
            });
        }
        let bars = self
            .data
            .get(symbol)
            .ok_or_else(|| AnalysisError::DataUnavailable {
                symbol: symbol.to_string(),
            })?;
        Ok(bars
            .iter()
            .filter(|b| start.is_none_or(|s| b.timestamp.date() >= s))
            .filter(|b| end.is_none_or(|e| b.timestamp.date() <= e))
            .cloned()
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, AnalysisError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Bars at daily steps with a 1% high/low envelope around each close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            timestamp: start() + Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000,
        })
        .collect()
}

/// Bars whose high equals the close: every bar closes at its top.
pub fn bars_closing_at_high(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            timestamp: start() + Duration::days(i as i64),
            open: close * 0.995,
            high: close,
            low: close * 0.99,
            close,
            volume: 1_000 + i as i64,
        })
        .collect()
}

pub fn bars_with_volumes(closes: &[f64], volumes: &[i64]) -> Vec<OhlcvBar> {
    bars_from_closes(closes)
        .into_iter()
        .zip(volumes)
        .map(|(bar, &volume)| OhlcvBar { volume, ..bar })
        .collect()
}

pub fn series(closes: &[f64]) -> Series {
    Series::new("TEST", bars_from_closes(closes)).unwrap()
}

pub fn constant_closes(value: f64, len: usize) -> Vec<f64> {
    vec![value; len]
}

pub fn rising_closes(len: usize) -> Vec<f64> {
    (0..len).map(|i| 100.0 + i as f64).collect()
}

pub fn wavy_closes(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0 + (i as f64 * 0.05).cos() * 3.0)
        .collect()
}

/// 30 closes: flat at 100 for 20 bars, a steady slide to 82, then a jump to
/// 160 on the last bar. With MACD(12,26,3) the line sits below its signal on
/// bar 28 and above it on bar 29.
pub fn macd_crossover_closes() -> Vec<f64> {
    let mut closes = vec![100.0; 20];
    closes.extend((0..9).map(|i| 98.0 - 2.0 * i as f64));
    closes.push(160.0);
    closes
}
