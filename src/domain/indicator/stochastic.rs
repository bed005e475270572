//! Stochastic Oscillator.
//!
//! raw %K = 100 × (C - LL(k)) / (HH(k) - LL(k)), clamped to [0, 100].
//! A flat window (HH == LL) has no range to compare against and reads 50.
//! %K = SMA(smooth) of raw %K (smooth = 1 leaves it raw), %D = SMA(d) of %K.

use crate::domain::indicator::{to_values, IndicatorValue};
use crate::domain::indicator_helpers::{rolling_max, rolling_mean, rolling_min};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_D_PERIOD: usize = 3;
pub const DEFAULT_SMOOTH: usize = 1;

pub(crate) const FLAT_RANGE_FALLBACK: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticValues {
    pub k: Vec<IndicatorValue>,
    pub d: Vec<IndicatorValue>,
}

pub fn calculate_stochastic(
    bars: &[OhlcvBar],
    k_period: usize,
    d_period: usize,
    smooth: usize,
) -> StochasticValues {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let highest = rolling_max(&highs, k_period);
    let lowest = rolling_min(&lows, k_period);

    let raw: Vec<Option<f64>> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let (hh, ll) = (highest[i]?, lowest[i]?);
            let range = hh - ll;
            if range == 0.0 {
                Some(FLAT_RANGE_FALLBACK)
            } else {
                Some((100.0 * (bar.close - ll) / range).clamp(0.0, 100.0))
            }
        })
        .collect();

    let k = rolling_mean(&raw, smooth);
    let d = rolling_mean(&k, d_period);

    StochasticValues {
        k: to_values(k),
        d: to_values(d),
    }
}
