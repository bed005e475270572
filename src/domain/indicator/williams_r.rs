//! Williams %R.
//!
//! %R = -100 × (HH(n) - C) / (HH(n) - LL(n)), in [-100, 0].
//! A flat window reads -50, the midpoint of the scale.

use crate::domain::indicator::{to_values, IndicatorValue};
use crate::domain::indicator_helpers::{rolling_max, rolling_min};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 14;

pub(crate) const FLAT_RANGE_FALLBACK: f64 = -50.0;

pub fn calculate_williams_r(bars: &[OhlcvBar], period: usize) -> Vec<IndicatorValue> {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let highest = rolling_max(&highs, period);
    let lowest = rolling_min(&lows, period);

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let (hh, ll) = (highest[i]?, lowest[i]?);
            let range = hh - ll;
            if range == 0.0 {
                Some(FLAT_RANGE_FALLBACK)
            } else {
                Some((-100.0 * (hh - bar.close) / range).clamp(-100.0, 0.0))
            }
        })
        .collect();

    to_values(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn make_bar(i: usize, high: f64, low: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                + Duration::days(i as i64),
            open: close,
            high,
            low,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn willr_close_at_high_is_zero() {
        let bars: Vec<OhlcvBar> = (0..5)
            .map(|i| {
                let c = 10.0 + i as f64;
                make_bar(i, c, c - 1.0, c)
            })
            .collect();
        let values = calculate_williams_r(&bars, 3);
        assert!(!values[1].is_defined());
        assert_eq!(values[4].value().unwrap(), 0.0);
    }

    #[test]
    fn willr_close_at_low_is_minus_100() {
        let bars = vec![
            make_bar(0, 12.0, 8.0, 10.0),
            make_bar(1, 11.0, 7.0, 7.0),
        ];
        let values = calculate_williams_r(&bars, 2);
        assert_relative_eq!(values[1].value().unwrap(), -100.0);
    }

    #[test]
    fn willr_known_value() {
        let bars = vec![
            make_bar(0, 12.0, 8.0, 10.0),
            make_bar(1, 14.0, 9.0, 11.0),
            make_bar(2, 13.0, 10.0, 11.0),
        ];
        let values = calculate_williams_r(&bars, 3);
        // HH = 14, LL = 8 → -100 × 3 / 6
        assert_relative_eq!(values[2].value().unwrap(), -50.0);
    }

    #[test]
    fn willr_flat_range_falls_back() {
        let bars: Vec<OhlcvBar> = (0..3).map(|i| make_bar(i, 5.0, 5.0, 5.0)).collect();
        let values = calculate_williams_r(&bars, 2);
        assert_eq!(values[2], IndicatorValue::Defined(FLAT_RANGE_FALLBACK));
    }
}
