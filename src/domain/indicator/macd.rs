//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: the line is defined from bar slow-1, signal and histogram from
//! bar slow-1 + signal-1.

use crate::domain::indicator::ema::ema_of_closes;
use crate::domain::indicator::{to_values, IndicatorValue};
use crate::domain::indicator_helpers::ema_over;
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdValues {
    pub line: Vec<IndicatorValue>,
    pub signal: Vec<IndicatorValue>,
    pub histogram: Vec<IndicatorValue>,
}

pub fn calculate_macd(
    bars: &[OhlcvBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdValues {
    let ema_fast = ema_of_closes(bars, fast);
    let ema_slow = ema_of_closes(bars, slow);

    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let signal = ema_over(&line, signal_period);

    let histogram: Vec<Option<f64>> = line
        .iter()
        .zip(&signal)
        .map(|(l, s)| Some((*l)? - (*s)?))
        .collect();

    MacdValues {
        line: to_values(line),
        signal: to_values(signal),
        histogram: to_values(histogram),
    }
}

pub fn calculate_macd_default(bars: &[OhlcvBar]) -> MacdValues {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
