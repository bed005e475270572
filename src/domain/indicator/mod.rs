//! Technical indicator implementations.
//!
//! This module provides types for representing indicator output:
//! - `IndicatorValue`: a single aligned value, either defined or undefined
//! - `IndicatorColumn`: a named, position-aligned column plus its status
//! - `IndicatorRequest`: indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSet`: every column produced by one [`compute`] run
//!
//! Each indicator family lives in its own file and returns raw aligned values;
//! [`engine::compute`] applies the minimum-history policy and attaches names.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod ema;
pub mod engine;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod williams_r;

pub use engine::compute;

use crate::domain::error::AnalysisError;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndicatorValue {
    Defined(f64),
    Undefined,
}

impl IndicatorValue {
    pub fn value(self) -> Option<f64> {
        match self {
            IndicatorValue::Defined(v) => Some(v),
            IndicatorValue::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, IndicatorValue::Defined(_))
    }
}

impl From<Option<f64>> for IndicatorValue {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => IndicatorValue::Defined(v),
            None => IndicatorValue::Undefined,
        }
    }
}

pub(crate) fn to_values(raw: Vec<Option<f64>>) -> Vec<IndicatorValue> {
    raw.into_iter().map(IndicatorValue::from).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnStatus {
    Computed,
    /// The series was shorter than the request's minimum history; every
    /// value in the column is undefined.
    InsufficientHistory { bars: usize, minimum: usize },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorColumn {
    pub name: String,
    pub values: Vec<IndicatorValue>,
    pub status: ColumnStatus,
}

impl IndicatorColumn {
    pub fn computed(name: impl Into<String>, values: Vec<IndicatorValue>) -> Self {
        Self {
            name: name.into(),
            values,
            status: ColumnStatus::Computed,
        }
    }

    pub fn insufficient(name: impl Into<String>, bars: usize, minimum: usize) -> Self {
        Self {
            name: name.into(),
            values: vec![IndicatorValue::Undefined; bars],
            status: ColumnStatus::InsufficientHistory { bars, minimum },
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> IndicatorValue {
        self.values
            .get(index)
            .copied()
            .unwrap_or(IndicatorValue::Undefined)
    }

    pub fn last(&self) -> IndicatorValue {
        self.values
            .last()
            .copied()
            .unwrap_or(IndicatorValue::Undefined)
    }

    /// Number of undefined values before the first defined one (the warm-up).
    pub fn leading_undefined(&self) -> usize {
        self.values.iter().take_while(|v| !v.is_defined()).count()
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_defined()).count()
    }

    pub fn is_fully_undefined(&self) -> bool {
        self.values.iter().all(|v| !v.is_defined())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndicatorRequest {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
    Stochastic {
        k_period: usize,
        d_period: usize,
        smooth: usize,
    },
    Adx(usize),
    Cci(usize),
    WilliamsR(usize),
    Atr(usize),
    Obv,
}

impl IndicatorRequest {
    /// Bars required before any output value can be defined. A series shorter
    /// than this yields fully undefined columns for the request. Saturates at
    /// `usize::MAX` for periods no series can satisfy.
    pub fn min_history(&self) -> usize {
        match *self {
            IndicatorRequest::Sma(n)
            | IndicatorRequest::Ema(n)
            | IndicatorRequest::Cci(n)
            | IndicatorRequest::WilliamsR(n) => n,
            IndicatorRequest::Rsi(n) | IndicatorRequest::Atr(n) => n.saturating_add(1),
            IndicatorRequest::Macd { slow, signal, .. } => {
                slow.saturating_add(signal).saturating_sub(1)
            }
            IndicatorRequest::Bollinger { period, .. } => period,
            IndicatorRequest::Stochastic {
                k_period, smooth, ..
            } => k_period.saturating_add(smooth).saturating_sub(1),
            IndicatorRequest::Adx(n) => n.saturating_mul(2),
            IndicatorRequest::Obv => 1,
        }
    }

    /// Canonical output column names, in the order the request produces them.
    pub fn column_names(&self) -> Vec<String> {
        match *self {
            IndicatorRequest::Sma(n) => vec![format!("SMA_{n}")],
            IndicatorRequest::Ema(n) => vec![format!("EMA_{n}")],
            IndicatorRequest::Rsi(n) => vec![format!("RSI_{n}")],
            IndicatorRequest::Macd { fast, slow, signal } => {
                let suffix = format!("{fast}_{slow}_{signal}");
                vec![
                    format!("MACD_{suffix}"),
                    format!("MACDs_{suffix}"),
                    format!("MACDh_{suffix}"),
                ]
            }
            IndicatorRequest::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let suffix = format!("{period}_{:?}", multiplier(stddev_mult_x100));
                vec![
                    format!("BBL_{suffix}"),
                    format!("BBM_{suffix}"),
                    format!("BBU_{suffix}"),
                ]
            }
            IndicatorRequest::Stochastic {
                k_period,
                d_period,
                smooth,
            } => {
                let suffix = format!("{k_period}_{d_period}_{smooth}");
                vec![format!("STOCHk_{suffix}"), format!("STOCHd_{suffix}")]
            }
            IndicatorRequest::Adx(n) => {
                vec![format!("ADX_{n}"), format!("DMP_{n}"), format!("DMN_{n}")]
            }
            IndicatorRequest::Cci(n) => vec![format!("CCI_{n}_{:?}", cci::CONSTANT)],
            IndicatorRequest::WilliamsR(n) => vec![format!("WILLR_{n}")],
            IndicatorRequest::Atr(n) => vec![format!("ATRr_{n}")],
            IndicatorRequest::Obv => vec!["OBV".to_string()],
        }
    }

    /// Reject parameters no indicator can be computed with.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let invalid = |reason: &str| {
            Err(AnalysisError::ConfigInvalid {
                section: "indicators".into(),
                key: self.to_string(),
                reason: reason.into(),
            })
        };

        match *self {
            IndicatorRequest::Sma(n)
            | IndicatorRequest::Ema(n)
            | IndicatorRequest::Rsi(n)
            | IndicatorRequest::Adx(n)
            | IndicatorRequest::Cci(n)
            | IndicatorRequest::WilliamsR(n)
            | IndicatorRequest::Atr(n)
                if n == 0 =>
            {
                invalid("period must be positive")
            }
            IndicatorRequest::Macd { fast, slow, signal }
                if fast == 0 || slow == 0 || signal == 0 =>
            {
                invalid("periods must be positive")
            }
            IndicatorRequest::Macd { fast, slow, .. } if fast >= slow => {
                invalid("fast period must be below slow period")
            }
            IndicatorRequest::Bollinger { period: 0, .. } => invalid("period must be positive"),
            IndicatorRequest::Bollinger {
                stddev_mult_x100: 0,
                ..
            } => invalid("standard deviation multiplier must be positive"),
            IndicatorRequest::Stochastic {
                k_period,
                d_period,
                smooth,
            } if k_period == 0 || d_period == 0 || smooth == 0 => {
                invalid("periods must be positive")
            }
            _ => Ok(()),
        }
    }

    /// The battery computed when the configuration names no indicators.
    pub fn default_battery() -> Vec<IndicatorRequest> {
        vec![
            IndicatorRequest::Sma(50),
            IndicatorRequest::Sma(200),
            IndicatorRequest::Ema(20),
            IndicatorRequest::Rsi(rsi::DEFAULT_PERIOD),
            IndicatorRequest::Macd {
                fast: macd::DEFAULT_FAST,
                slow: macd::DEFAULT_SLOW,
                signal: macd::DEFAULT_SIGNAL,
            },
            IndicatorRequest::Bollinger {
                period: bollinger::DEFAULT_PERIOD,
                stddev_mult_x100: bollinger::DEFAULT_MULT_X100,
            },
            IndicatorRequest::Stochastic {
                k_period: stochastic::DEFAULT_K_PERIOD,
                d_period: stochastic::DEFAULT_D_PERIOD,
                smooth: stochastic::DEFAULT_SMOOTH,
            },
            IndicatorRequest::Adx(adx::DEFAULT_PERIOD),
            IndicatorRequest::Cci(cci::DEFAULT_PERIOD),
            IndicatorRequest::WilliamsR(williams_r::DEFAULT_PERIOD),
            IndicatorRequest::Atr(atr::DEFAULT_PERIOD),
            IndicatorRequest::Obv,
        ]
    }
}

pub(crate) fn multiplier(stddev_mult_x100: u32) -> f64 {
    stddev_mult_x100 as f64 / 100.0
}

impl fmt::Display for IndicatorRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorRequest::Sma(period) => write!(f, "SMA({})", period),
            IndicatorRequest::Ema(period) => write!(f, "EMA({})", period),
            IndicatorRequest::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorRequest::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorRequest::Bollinger {
                period,
                stddev_mult_x100,
            } => write!(f, "BOLLINGER({},{})", period, multiplier(*stddev_mult_x100)),
            IndicatorRequest::Stochastic {
                k_period,
                d_period,
                smooth,
            } => write!(f, "STOCHASTIC({},{},{})", k_period, d_period, smooth),
            IndicatorRequest::Adx(period) => write!(f, "ADX({})", period),
            IndicatorRequest::Cci(period) => write!(f, "CCI({})", period),
            IndicatorRequest::WilliamsR(period) => write!(f, "WILLR({})", period),
            IndicatorRequest::Atr(period) => write!(f, "ATR({})", period),
            IndicatorRequest::Obv => write!(f, "OBV"),
        }
    }
}

/// Every column produced by one analysis run, in request order.
///
/// Lookups by name never fail: a column that was never requested reads as
/// [`IndicatorValue::Undefined`], the same as a warm-up position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSet {
    columns: Vec<IndicatorColumn>,
    index: HashMap<String, usize>,
}

impl IndicatorSet {
    pub(crate) fn insert(&mut self, column: IndicatorColumn) {
        if self.index.contains_key(&column.name) {
            return;
        }
        self.index.insert(column.name.clone(), self.columns.len());
        self.columns.push(column);
    }

    pub fn get(&self, name: &str) -> Option<&IndicatorColumn> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn value_at(&self, name: &str, index: usize) -> IndicatorValue {
        self.get(name)
            .map(|c| c.get(index))
            .unwrap_or(IndicatorValue::Undefined)
    }

    pub fn last(&self, name: &str) -> IndicatorValue {
        self.get(name)
            .map(IndicatorColumn::last)
            .unwrap_or(IndicatorValue::Undefined)
    }

    pub fn columns(&self) -> &[IndicatorColumn] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
