//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{to_values, IndicatorValue};
use crate::domain::indicator_helpers::{defined, ema_over};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> Vec<IndicatorValue> {
    to_values(ema_of_closes(bars, period))
}

/// Raw EMA of closes; MACD builds on this directly rather than on a column.
pub(crate) fn ema_of_closes(bars: &[OhlcvBar], period: usize) -> Vec<Option<f64>> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    ema_over(&defined(&closes), period)
}
