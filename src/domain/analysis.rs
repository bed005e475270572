//! One-shot analysis pass: indicators, then signals, then the summary.

use crate::domain::indicator::{self, IndicatorRequest, IndicatorSet};
use crate::domain::series::Series;
use crate::domain::signal::{Signal, SignalEvaluator, SignalSummary};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub indicators: IndicatorSet,
    pub signals: Vec<Signal>,
    pub summary: SignalSummary,
}

/// Compute `requests` plus whatever the evaluator's rules read, then evaluate.
///
/// Requested columns come first, in request order; columns added for the
/// evaluator follow.
pub fn analyze(
    series: &Series,
    requests: &[IndicatorRequest],
    evaluator: &SignalEvaluator,
) -> Analysis {
    let mut all = requests.to_vec();
    all.extend(evaluator.required_requests());

    let indicators = indicator::compute(series, &all);
    let signals = evaluator.evaluate(series, &indicators);
    let summary = SignalSummary::from_signals(&signals);

    info!(
        symbol = series.symbol(),
        bars = series.len(),
        columns = indicators.len(),
        bias = %summary.bias,
        "analysis complete"
    );

    Analysis {
        indicators,
        signals,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use crate::domain::signal::{Bias, SignalCategory, SignalTopic};
    use chrono::{Duration, NaiveDate};

    fn make_series(closes: &[f64]) -> Series {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 1000,
            })
            .collect();
        Series::new("TEST", bars).unwrap()
    }

    #[test]
    fn requested_columns_lead_the_set() {
        let series = make_series(&(0..60).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let analysis = analyze(&series, &[IndicatorRequest::Obv], &SignalEvaluator::default());

        assert_eq!(analysis.indicators.names()[0], "OBV");
        assert!(analysis.indicators.contains("RSI_14"));
        assert!(analysis.indicators.contains("SMA_200"));
        assert_eq!(analysis.signals.len(), 8);
    }

    #[test]
    fn short_uptrend_reads_trend_insufficient() {
        let series = make_series(&(0..50).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let analysis = analyze(&series, &[], &SignalEvaluator::default());

        let trend = analysis
            .signals
            .iter()
            .find(|s| s.topic == SignalTopic::Trend)
            .unwrap();
        assert_eq!(trend.category, SignalCategory::InsufficientData);

        let rsi = analysis
            .signals
            .iter()
            .find(|s| s.topic == SignalTopic::Rsi)
            .unwrap();
        assert_eq!(rsi.category, SignalCategory::Sell);
        assert_ne!(analysis.summary.bias, Bias::Undetermined);
    }
}
