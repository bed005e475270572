//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use crate::domain::indicator::{multiplier, to_values, IndicatorValue};
use crate::domain::indicator_helpers::{defined, rolling_mean, rolling_stddev};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULT_X100: u32 = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerValues {
    pub lower: Vec<IndicatorValue>,
    pub middle: Vec<IndicatorValue>,
    pub upper: Vec<IndicatorValue>,
}

pub fn calculate_bollinger(
    bars: &[OhlcvBar],
    period: usize,
    stddev_mult_x100: u32,
) -> BollingerValues {
    let mult = multiplier(stddev_mult_x100);
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let middle = rolling_mean(&defined(&closes), period);
    let stddev = rolling_stddev(&closes, period);

    let band = |sign: f64| -> Vec<Option<f64>> {
        middle
            .iter()
            .zip(&stddev)
            .map(|(m, sd)| Some((*m)? + sign * mult * (*sd)?))
            .collect()
    };

    BollingerValues {
        lower: to_values(band(-1.0)),
        upper: to_values(band(1.0)),
        middle: to_values(middle),
    }
}
