//! Delimited export of a series joined with its indicator columns.
//!
//! Rendered tables are memoized per series fingerprint, column list and row
//! order. A series with different bars has a different fingerprint, so a
//! cached table is never served for changed input. Rendering a new series
//! evicts every table kept for the previous one.

use crate::domain::error::AnalysisError;
use crate::domain::indicator::{IndicatorSet, IndicatorValue};
use crate::domain::series::Series;
use crate::ports::export_port::{ExportPort, RowOrder};
use chrono::{NaiveDateTime, NaiveTime};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

const PRICE_HEADER: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    fingerprint: u64,
    columns: Vec<String>,
    order: RowOrder,
}

#[derive(Debug, Default)]
pub struct CsvExporter {
    cache: Mutex<HashMap<CacheKey, Arc<str>>>,
}

impl CsvExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the table, reusing an earlier rendering of the same input.
    pub fn render(
        &self,
        series: &Series,
        indicators: &IndicatorSet,
        order: RowOrder,
    ) -> Result<Arc<str>, AnalysisError> {
        let key = CacheKey {
            fingerprint: series.fingerprint(),
            columns: indicators.names().into_iter().map(String::from).collect(),
            order,
        };

        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(hit) = cache.get(&key) {
            debug!(symbol = series.symbol(), ?order, "export cache hit");
            return Ok(Arc::clone(hit));
        }

        let before = cache.len();
        cache.retain(|cached, _| cached.fingerprint == key.fingerprint);
        if cache.len() < before {
            debug!(
                symbol = series.symbol(),
                evicted = before - cache.len(),
                "series changed, export cache invalidated"
            );
        }

        let table: Arc<str> = render_table(series, indicators, order)?.into();
        cache.insert(key, Arc::clone(&table));
        Ok(table)
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn clear(&self) {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl ExportPort for CsvExporter {
    fn export(
        &self,
        series: &Series,
        indicators: &IndicatorSet,
        order: RowOrder,
        path: &Path,
    ) -> Result<(), AnalysisError> {
        let table = self.render(series, indicators, order)?;
        fs::write(path, table.as_bytes()).map_err(|e| AnalysisError::Export {
            reason: format!("failed to write {}: {}", path.display(), e),
        })?;
        info!(
            symbol = series.symbol(),
            rows = series.len(),
            columns = indicators.len(),
            path = %path.display(),
            "exported table"
        );
        Ok(())
    }
}

fn render_table(
    series: &Series,
    indicators: &IndicatorSet,
    order: RowOrder,
) -> Result<String, AnalysisError> {
    let export_err = |e: csv::Error| AnalysisError::Export {
        reason: e.to_string(),
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    let header = PRICE_HEADER
        .iter()
        .copied()
        .chain(indicators.names());
    writer.write_record(header).map_err(export_err)?;

    let rows: Box<dyn Iterator<Item = usize>> = match order {
        RowOrder::OldestFirst => Box::new(0..series.len()),
        RowOrder::NewestFirst => Box::new((0..series.len()).rev()),
    };

    let columns = indicators.columns();
    for i in rows {
        let bar = &series.bars()[i];
        let mut record = Vec::with_capacity(PRICE_HEADER.len() + columns.len());
        record.push(format_timestamp(bar.timestamp));
        record.push(bar.open.to_string());
        record.push(bar.high.to_string());
        record.push(bar.low.to_string());
        record.push(bar.close.to_string());
        record.push(bar.volume.to_string());
        record.extend(columns.iter().map(|c| format_value(c.get(i))));
        writer.write_record(&record).map_err(export_err)?;
    }

    let bytes = writer.into_inner().map_err(|e| AnalysisError::Export {
        reason: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| AnalysisError::Export {
        reason: e.to_string(),
    })
}

fn format_timestamp(ts: NaiveDateTime) -> String {
    if ts.time() == NaiveTime::MIN {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn format_value(value: IndicatorValue) -> String {
    match value {
        IndicatorValue::Defined(v) => v.to_string(),
        IndicatorValue::Undefined => String::new(),
    }
}
