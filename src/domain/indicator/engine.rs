//! Indicator computation over a validated series.
//!
//! Each request is checked against its minimum history first. A series too
//! short for a request yields fully undefined columns marked
//! `InsufficientHistory`; every other request is still computed.

use crate::domain::indicator::adx::calculate_adx;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::indicator::cci::calculate_cci;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::macd::calculate_macd;
use crate::domain::indicator::obv::calculate_obv;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::stochastic::calculate_stochastic;
use crate::domain::indicator::williams_r::calculate_williams_r;
use crate::domain::indicator::{IndicatorColumn, IndicatorRequest, IndicatorSet, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::series::Series;
use std::collections::HashSet;
use tracing::{debug, warn};

pub fn compute(series: &Series, requests: &[IndicatorRequest]) -> IndicatorSet {
    let bars = series.bars();
    let mut set = IndicatorSet::default();
    let mut seen = HashSet::new();

    for request in requests {
        if !seen.insert(*request) {
            continue;
        }
        if let Err(e) = request.validate() {
            warn!(indicator = %request, error = %e, "skipping invalid indicator request");
            continue;
        }

        let names = request.column_names();
        let minimum = request.min_history();
        if bars.len() < minimum {
            debug!(
                indicator = %request,
                bars = bars.len(),
                minimum,
                "insufficient history, column left undefined"
            );
            for name in names {
                set.insert(IndicatorColumn::insufficient(name, bars.len(), minimum));
            }
            continue;
        }

        for (name, values) in names.into_iter().zip(calculate(bars, request)) {
            set.insert(IndicatorColumn::computed(name, values));
        }
    }

    debug!(symbol = series.symbol(), columns = set.len(), "indicators computed");
    set
}

/// Output columns of one request, in `column_names` order.
fn calculate(bars: &[OhlcvBar], request: &IndicatorRequest) -> Vec<Vec<IndicatorValue>> {
    match *request {
        IndicatorRequest::Sma(n) => vec![calculate_sma(bars, n)],
        IndicatorRequest::Ema(n) => vec![calculate_ema(bars, n)],
        IndicatorRequest::Rsi(n) => vec![calculate_rsi(bars, n)],
        IndicatorRequest::Macd { fast, slow, signal } => {
            let macd = calculate_macd(bars, fast, slow, signal);
            vec![macd.line, macd.signal, macd.histogram]
        }
        IndicatorRequest::Bollinger {
            period,
            stddev_mult_x100,
        } => {
            let bands = calculate_bollinger(bars, period, stddev_mult_x100);
            vec![bands.lower, bands.middle, bands.upper]
        }
        IndicatorRequest::Stochastic {
            k_period,
            d_period,
            smooth,
        } => {
            let stoch = calculate_stochastic(bars, k_period, d_period, smooth);
            vec![stoch.k, stoch.d]
        }
        IndicatorRequest::Adx(n) => {
            let adx = calculate_adx(bars, n);
            vec![adx.adx, adx.plus_di, adx.minus_di]
        }
        IndicatorRequest::Cci(n) => vec![calculate_cci(bars, n)],
        IndicatorRequest::WilliamsR(n) => vec![calculate_williams_r(bars, n)],
        IndicatorRequest::Atr(n) => vec![calculate_atr(bars, n)],
        IndicatorRequest::Obv => vec![calculate_obv(bars)],
    }
}
