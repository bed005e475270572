//! Average True Range.
//!
//! TR[i] = max(H - L, |H - C[i-1]|, |L - C[i-1]|), defined from bar 1.
//! ATR seed = mean of TR[1..=n] at bar n, then Wilder's smoothing:
//! ATR[i] = (ATR[i-1] * (n-1) + TR[i]) / n.

use crate::domain::indicator::{to_values, IndicatorValue};
use crate::domain::indicator_helpers::wilder_over;
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> Vec<IndicatorValue> {
    let mut tr = vec![None; bars.len()];
    for i in 1..bars.len() {
        tr[i] = Some(bars[i].true_range(bars[i - 1].close));
    }
    to_values(wilder_over(&tr, period))
}
