//! Shared numeric kernels for indicator calculations.
//!
//! Inputs and outputs are position-aligned `Option<f64>` slices: `None` marks
//! a position with no value yet. Kernels that seed from a window require the
//! defined values to be contiguous once they start, which holds for every
//! series the indicators feed through here.

/// Rolling arithmetic mean; defined where the whole trailing window is.
/// A flat window yields its value exactly rather than the rounded sum.
pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        let mut sum = 0.0;
        let mut complete = true;
        for value in window {
            match value {
                Some(v) => sum += v,
                None => {
                    complete = false;
                    break;
                }
            }
        }
        if complete {
            out[i] = match window[0] {
                Some(first) if window.iter().all(|v| *v == Some(first)) => Some(first),
                _ => Some(sum / period as f64),
            };
        }
    }
    out
}

/// Exponential average, k = 2/(n+1), seeded with the SMA of the first `period`
/// defined values.
pub fn ema_over(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let k = 2.0 / (period as f64 + 1.0);
    seeded_smoothing(values, period, |prev, v| v * k + prev * (1.0 - k))
}

/// Wilder's smoothing: avg = (prev_avg * (n-1) + current) / n, seeded with the
/// simple mean of the first `period` defined values.
pub fn wilder_over(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let n = period as f64;
    seeded_smoothing(values, period, |prev, v| (prev * (n - 1.0) + v) / n)
}

fn seeded_smoothing(
    values: &[Option<f64>],
    period: usize,
    step: impl Fn(f64, f64) -> f64,
) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }
    let Some(start) = values.iter().position(Option::is_some) else {
        return out;
    };

    let mut sum = 0.0;
    let mut prev = 0.0;
    for (offset, value) in values[start..].iter().enumerate() {
        let Some(v) = *value else {
            break;
        };
        let i = start + offset;
        if offset + 1 < period {
            sum += v;
        } else if offset + 1 == period {
            sum += v;
            prev = sum / period as f64;
            out[i] = Some(prev);
        } else {
            prev = step(prev, v);
            out[i] = Some(prev);
        }
    }
    out
}

/// Highest value over the trailing window; defined from `period - 1`.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling_fold(values, period, f64::max)
}

/// Lowest value over the trailing window; defined from `period - 1`.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling_fold(values, period, f64::min)
}

fn rolling_fold(values: &[f64], period: usize, pick: fn(f64, f64) -> f64) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        out[i] = window.iter().copied().reduce(pick);
    }
    out
}

/// Population standard deviation (divides by N) over the trailing window.
pub fn rolling_stddev(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling_dispersion(values, period, |diff| diff * diff)
        .into_iter()
        .map(|variance| variance.map(f64::sqrt))
        .collect()
}

/// Mean absolute deviation from the window mean.
pub fn rolling_mean_deviation(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling_dispersion(values, period, f64::abs)
}

fn rolling_dispersion(values: &[f64], period: usize, measure: fn(f64) -> f64) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        if is_flat(window) {
            out[i] = Some(0.0);
            continue;
        }
        let mean = window.iter().sum::<f64>() / period as f64;
        let total: f64 = window.iter().map(|v| measure(v - mean)).sum();
        out[i] = Some(total / period as f64);
    }
    out
}

/// Every value in the window is identical. Compared exactly, since a summed
/// mean of equal values can still land one ulp away from them.
fn is_flat(window: &[f64]) -> bool {
    window.iter().all(|v| *v == window[0])
}

pub fn defined(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}
