//! Validated, immutable price series.
//!
//! A `Series` can only be built through [`Series::new`], so every indicator
//! may assume: at least one bar, finite positive prices, non-negative volume,
//! a consistent high/low envelope and strictly increasing timestamps.

use crate::domain::error::AnalysisError;
use crate::domain::ohlcv::OhlcvBar;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub struct Series {
    symbol: String,
    bars: Vec<OhlcvBar>,
    fingerprint: u64,
}

impl Series {
    pub fn new(symbol: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, AnalysisError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(AnalysisError::DataUnavailable { symbol });
        }

        for (i, bar) in bars.iter().enumerate() {
            validate_bar(i, bar)?;
            if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
                return Err(AnalysisError::malformed(
                    i,
                    format!(
                        "timestamp {} does not follow {}",
                        bar.timestamp,
                        bars[i - 1].timestamp
                    ),
                ));
            }
        }

        let fingerprint = fingerprint(&symbol, &bars);
        Ok(Self {
            symbol,
            bars,
            fingerprint,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false; an empty series is rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> &OhlcvBar {
        // Non-empty by construction.
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Identity of the series contents, stable across runs for equal input.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

fn validate_bar(position: usize, bar: &OhlcvBar) -> Result<(), AnalysisError> {
    let fields = [
        ("open", bar.open),
        ("high", bar.high),
        ("low", bar.low),
        ("close", bar.close),
    ];
    for (name, value) in fields {
        if !value.is_finite() {
            return Err(AnalysisError::malformed(
                position,
                format!("{name} is not finite ({value})"),
            ));
        }
        if value <= 0.0 {
            return Err(AnalysisError::malformed(
                position,
                format!("{name} must be positive ({value})"),
            ));
        }
    }

    if bar.volume < 0 {
        return Err(AnalysisError::malformed(
            position,
            format!("volume must be non-negative ({})", bar.volume),
        ));
    }

    if bar.high < bar.low {
        return Err(AnalysisError::malformed(
            position,
            format!("high {} is below low {}", bar.high, bar.low),
        ));
    }

    for (name, value) in [("open", bar.open), ("close", bar.close)] {
        if value > bar.high || value < bar.low {
            return Err(AnalysisError::malformed(
                position,
                format!(
                    "{name} {value} outside high/low range [{}, {}]",
                    bar.low, bar.high
                ),
            ));
        }
    }

    Ok(())
}

fn fingerprint(symbol: &str, bars: &[OhlcvBar]) -> u64 {
    let mut hasher = DefaultHasher::new();
    symbol.hash(&mut hasher);
    bars.len().hash(&mut hasher);
    for bar in bars {
        bar.timestamp.hash(&mut hasher);
        bar.open.to_bits().hash(&mut hasher);
        bar.high.to_bits().hash(&mut hasher);
        bar.low.to_bits().hash(&mut hasher);
        bar.close.to_bits().hash(&mut hasher);
        bar.volume.hash(&mut hasher);
    }
    hasher.finish()
}
