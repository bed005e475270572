//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{to_values, IndicatorValue};
use crate::domain::indicator_helpers::{defined, rolling_mean};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> Vec<IndicatorValue> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    to_values(rolling_mean(&defined(&closes), period))
}
