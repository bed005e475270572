//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over the first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100, unless avg_gain is also 0 (a flat window),
//! which reads as the neutral midpoint 50.
//!
//! Warmup: first n bars are undefined (need n price changes).

use crate::domain::indicator::{to_values, IndicatorValue};
use crate::domain::indicator_helpers::wilder_over;
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> Vec<IndicatorValue> {
    let mut gains = vec![None; bars.len()];
    let mut losses = vec![None; bars.len()];
    for i in 1..bars.len() {
        let change = bars[i].close - bars[i - 1].close;
        gains[i] = Some(change.max(0.0));
        losses[i] = Some((-change).max(0.0));
    }

    let avg_gain = wilder_over(&gains, period);
    let avg_loss = wilder_over(&losses, period);

    let rsi = avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(g), Some(l)) => Some(rsi_from_averages(*g, *l)),
            _ => None,
        })
        .collect();

    to_values(rsi)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        (100.0 - (100.0 / (1.0 + avg_gain / avg_loss))).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bar(date: &str, close: f64) -> OhlcvBar {
        OhlcvBar {
            timestamp: NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000,
        }
    }

    fn rsi_at(values: &[IndicatorValue], i: usize) -> f64 {
        values[i].value().expect("expected defined RSI")
    }

    #[test]
    fn rsi_empty_bars() {
        let values = calculate_rsi(&[], 14);
        assert_eq!(values.len(), 0);
    }

    #[test]
    fn rsi_single_bar() {
        let bars = vec![make_bar("2024-01-01", 100.0)];
        let values = calculate_rsi(&bars, 14);
        assert_eq!(values.len(), 1);
        assert!(!values[0].is_defined());
    }

    #[test]
    fn rsi_warmup_period() {
        let bars: Vec<OhlcvBar> = (1..=15)
            .map(|i| {
                let date = format!("2024-01-{:02}", i);
                make_bar(&date, 100.0 + (i as f64 % 5.0) * 2.0)
            })
            .collect();

        let values = calculate_rsi(&bars, 14);

        assert_eq!(values.len(), 15);
        for (i, value) in values.iter().enumerate().take(14) {
            assert!(!value.is_defined(), "Bar {} should be undefined", i);
        }
        assert!(values[14].is_defined(), "Bar 14 should be defined");
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let bars: Vec<OhlcvBar> = (0..15)
            .map(|i| make_bar(&format!("2024-01-{:02}", i + 1), 100.0 + i as f64))
            .collect();

        let values = calculate_rsi(&bars, 14);
        assert!(
            (rsi_at(&values, 14) - 100.0).abs() < f64::EPSILON,
            "RSI should be 100 when all gains"
        );
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let bars: Vec<OhlcvBar> = (0..15)
            .map(|i| make_bar(&format!("2024-01-{:02}", i + 1), 100.0 - i as f64))
            .collect();

        let values = calculate_rsi(&bars, 14);
        assert!(
            rsi_at(&values, 14).abs() < f64::EPSILON,
            "RSI should be 0 when all losses"
        );
    }

    #[test]
    fn rsi_flat_prices_are_neutral() {
        let bars: Vec<OhlcvBar> = (0..20)
            .map(|i| make_bar(&format!("2024-01-{:02}", i + 1), 100.0))
            .collect();

        let values = calculate_rsi(&bars, 14);
        for i in 14..20 {
            assert!((rsi_at(&values, i) - 50.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn rsi_in_range() {
        let bars: Vec<OhlcvBar> = (1..=20)
            .map(|i| {
                let close = 100.0 + (i as f64 % 7.0 - 3.0) * 2.0;
                make_bar(&format!("2024-01-{:02}", i), close)
            })
            .collect();

        let values = calculate_rsi(&bars, 14);
        for rsi in values.iter().filter_map(|v| v.value()) {
            assert!((0.0..=100.0).contains(&rsi), "RSI {} out of range", rsi);
        }
    }

    #[test]
    fn rsi_zero_period() {
        let bars = vec![make_bar("2024-01-01", 100.0), make_bar("2024-01-02", 101.0)];
        let values = calculate_rsi(&bars, 0);
        assert_eq!(values.len(), 2);
        assert!(values.iter().all(|v| !v.is_defined()));
    }

    #[test]
    fn rsi_known_calculation() {
        let closes = [
            44.0, 44.25, 44.50, 43.75, 44.50, 44.25, 44.75, 45.25, 45.50, 45.25, 45.50, 46.0,
            46.25, 46.0, 46.50,
        ];
        let bars: Vec<OhlcvBar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| make_bar(&format!("2024-01-{:02}", i + 1), c))
            .collect();

        let values = calculate_rsi(&bars, 14);
        assert!(values[14].is_defined());

        // gains sum 4.0, losses sum 1.5 over 14 changes
        let expected = 100.0 - 100.0 / (1.0 + 4.0 / 1.5);
        assert!((rsi_at(&values, 14) - expected).abs() < 1e-9);
    }
}
