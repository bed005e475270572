//! ADX (Average Directional Index) indicator
//!
//! ADX measures trend strength regardless of direction. From bar 1 onward:
//! - +DM = H[i] - H[i-1] when that exceeds L[i-1] - L[i] and is positive, else 0
//! - -DM = L[i-1] - L[i] when that exceeds H[i] - H[i-1] and is positive, else 0
//! - TR  = true range against the previous close
//!
//! TR, +DM and -DM are Wilder-smoothed over n; +DI/-DI = 100 × DM / TR,
//! DX = 100 × |+DI - -DI| / (+DI + -DI), and ADX is the Wilder average of DX.
//! Zero denominators read 0, so a flat series has ADX 0.
//!
//! Warmup: DI defined from bar n, ADX from bar 2n - 1.

use crate::domain::indicator::{to_values, IndicatorValue};
use crate::domain::indicator_helpers::wilder_over;
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 14;

#[derive(Debug, Clone, PartialEq)]
pub struct AdxValues {
    pub adx: Vec<IndicatorValue>,
    pub plus_di: Vec<IndicatorValue>,
    pub minus_di: Vec<IndicatorValue>,
}

pub fn calculate_adx(bars: &[OhlcvBar], period: usize) -> AdxValues {
    let len = bars.len();
    let mut tr = vec![None; len];
    let mut plus_dm = vec![None; len];
    let mut minus_dm = vec![None; len];

    for i in 1..len {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        plus_dm[i] = Some(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm[i] = Some(if down > up && down > 0.0 { down } else { 0.0 });
        tr[i] = Some(bars[i].true_range(bars[i - 1].close));
    }

    let tr_avg = wilder_over(&tr, period);
    let plus_avg = wilder_over(&plus_dm, period);
    let minus_avg = wilder_over(&minus_dm, period);

    let plus_di = directional_index(&plus_avg, &tr_avg);
    let minus_di = directional_index(&minus_avg, &tr_avg);

    let dx: Vec<Option<f64>> = plus_di
        .iter()
        .zip(&minus_di)
        .map(|(p, m)| {
            let (p, m) = ((*p)?, (*m)?);
            let sum = p + m;
            Some(if sum > 0.0 { 100.0 * (p - m).abs() / sum } else { 0.0 })
        })
        .collect();

    let adx = wilder_over(&dx, period);

    AdxValues {
        adx: to_values(adx),
        plus_di: to_values(plus_di),
        minus_di: to_values(minus_di),
    }
}

fn directional_index(dm_avg: &[Option<f64>], tr_avg: &[Option<f64>]) -> Vec<Option<f64>> {
    dm_avg
        .iter()
        .zip(tr_avg)
        .map(|(dm, tr)| {
            let (dm, tr) = ((*dm)?, (*tr)?);
            Some(if tr > 0.0 { 100.0 * dm / tr } else { 0.0 })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn adx_warmup_boundaries() {
        let bars: Vec<OhlcvBar> = (0..30)
            .map(|i| {
                let c = 100.0 + i as f64;
                make_bar(i, c + 1.0, c - 1.0, c)
            })
            .collect();
        let out = calculate_adx(&bars, 5);

        assert!(!out.plus_di[4].is_defined());
        assert!(out.plus_di[5].is_defined());
        assert!(!out.adx[8].is_defined());
        assert!(out.adx[9].is_defined());
    }

    #[test]
    fn adx_strong_uptrend() {
        let bars: Vec<OhlcvBar> = (0..40)
            .map(|i| {
                let c = 100.0 + 2.0 * i as f64;
                make_bar(i, c + 1.0, c - 1.0, c)
            })
            .collect();
        let out = calculate_adx(&bars, 14);

        let plus = out.plus_di[39].value().unwrap();
        let minus = out.minus_di[39].value().unwrap();
        assert!(plus > minus);
        assert_eq!(minus, 0.0);
        // Every DX is 100 when only +DM is ever positive.
        assert!((out.adx[39].value().unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn adx_flat_series_is_zero() {
        let bars: Vec<OhlcvBar> = (0..40).map(|i| make_bar(i, 101.0, 99.0, 100.0)).collect();
        let out = calculate_adx(&bars, 14);
        for value in out.adx.iter().filter_map(|v| v.value()) {
            assert_eq!(value, 0.0);
        }
        assert!(out.adx[27].is_defined());
    }

    #[test]
    fn adx_short_series_undefined() {
        let bars: Vec<OhlcvBar> = (0..3).map(|i| make_bar(i, 2.0, 1.0, 1.5)).collect();
        let out = calculate_adx(&bars, 14);
        assert!(out.adx.iter().all(|v| !v.is_defined()));
        assert_eq!(out.adx.len(), 3);
    }
}
