//! OBV (On-Balance Volume) indicator implementation.

use crate::domain::indicator::IndicatorValue;
use crate::domain::ohlcv::OhlcvBar;

/// Calculate OBV (On-Balance Volume) indicator.
///
/// OBV[0] = 0 (no previous close to compare against)
/// If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
/// If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
/// If close[i] == close[i-1]: OBV[i] = OBV[i-1]
///
/// No warmup period; every bar is defined.
pub fn calculate_obv(bars: &[OhlcvBar]) -> Vec<IndicatorValue> {
    let mut values = Vec::with_capacity(bars.len());
    let mut obv: f64 = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            let prev_close = bars[i - 1].close;
            if bar.close > prev_close {
                obv += bar.volume as f64;
            } else if bar.close < prev_close {
                obv -= bar.volume as f64;
            }
        }
        values.push(IndicatorValue::Defined(obv));
    }

    values
}
