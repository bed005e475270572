//! Commodity Channel Index.
//!
//! TP = (H + L + C) / 3
//! CCI = (TP - SMA(TP, n)) / (0.015 × MAD(TP, n))
//! where MAD is the mean absolute deviation of TP from its SMA. A window with
//! zero deviation reads 0.

use crate::domain::indicator::{to_values, IndicatorValue};
use crate::domain::indicator_helpers::{defined, rolling_mean, rolling_mean_deviation};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 20;
pub const CONSTANT: f64 = 0.015;

pub fn calculate_cci(bars: &[OhlcvBar], period: usize) -> Vec<IndicatorValue> {
    let typical: Vec<f64> = bars.iter().map(OhlcvBar::typical_price).collect();
    let mean = rolling_mean(&defined(&typical), period);
    let deviation = rolling_mean_deviation(&typical, period);

    let values = typical
        .iter()
        .enumerate()
        .map(|(i, tp)| {
            let (m, mad) = (mean[i]?, deviation[i]?);
            if mad == 0.0 {
                Some(0.0)
            } else {
                Some((tp - m) / (CONSTANT * mad))
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
    fn cci_known_value() {
        // typical prices 1, 2, 3 → mean 2, MAD 2/3
        let bars = vec![
            make_bar(0, 1.0, 1.0, 1.0),
            make_bar(1, 2.0, 2.0, 2.0),
            make_bar(2, 3.0, 3.0, 3.0),
        ];
        let values = calculate_cci(&bars, 3);
        assert!(!values[1].is_defined());
        assert_relative_eq!(values[2].value().unwrap(), 1.0 / (0.015 * (2.0 / 3.0)));
    }

    #[test]
    fn cci_flat_window_is_zero() {
        let bars: Vec<OhlcvBar> = (0..4).map(|i| make_bar(i, 11.0, 9.0, 10.0)).collect();
        let values = calculate_cci(&bars, 3);
        assert_eq!(values[3], IndicatorValue::Defined(0.0));
    }

    #[test]
    fn cci_flat_window_is_zero_at_inexact_prices() {
        for close in [0.1, 0.3, 101.7] {
            let bars: Vec<OhlcvBar> = (0..25)
                .map(|i| make_bar(i, close * 1.01, close * 0.99, close))
                .collect();
            let values = calculate_cci(&bars, 20);
            assert_eq!(values[24], IndicatorValue::Defined(0.0), "close {close}");
        }
    }

    #[test]
    fn cci_sign_follows_price() {
        let falling: Vec<OhlcvBar> = (0..5)
            .map(|i| {
                let c = 20.0 - i as f64;
                make_bar(i, c + 0.5, c - 0.5, c)
            })
            .collect();
        let values = calculate_cci(&falling, 5);
        assert!(values[4].value().unwrap() < 0.0);
    }
}
