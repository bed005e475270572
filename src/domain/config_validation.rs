//! Analysis configuration: parsing and validation.
//!
//! Layout:
//!
//! ```ini
//! [data]
//! dir = prices
//! symbol = BHP
//! start_date = 2023-01-01
//! end_date = 2024-12-31
//!
//! [indicators]
//! sma = 50,200
//! macd = 12,26,9
//! bollinger = 20,2.0
//! stochastic = 14,3,1
//! obv = true
//!
//! [signals]
//! rsi_oversold = 30
//! rsi_overbought = 70
//!
//! [export]
//! path = bhp.csv
//! newest_first = false
//! ```
//!
//! An `[indicators]` section with none of the known keys selects the default
//! battery. Evaluator parameters follow the first configured request of each
//! family so the rules read columns that were actually computed.

use crate::domain::error::AnalysisError;
use crate::domain::indicator::IndicatorRequest;
use crate::domain::signal::{SignalEvaluator, SignalThresholds};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

const INDICATOR_KEYS: [&str; 11] = [
    "sma",
    "ema",
    "rsi",
    "macd",
    "bollinger",
    "stochastic",
    "adx",
    "cci",
    "willr",
    "atr",
    "obv",
];

/// Check everything the `analyze` command reads before any data is loaded.
pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), AnalysisError> {
    validate_data_dir(config)?;
    date_window(config)?;
    for request in indicator_requests(config)? {
        request.validate()?;
    }
    let evaluator = signal_evaluator(config)?;
    for request in evaluator.required_requests() {
        request.validate()?;
    }
    validate_thresholds(&evaluator.thresholds)?;
    Ok(())
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), AnalysisError> {
    match config.get_string("data", "dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(AnalysisError::ConfigMissing {
            section: "data".to_string(),
            key: "dir".to_string(),
        }),
    }
}

/// Optional `[data]` start/end dates; both given means start must precede end.
pub fn date_window(
    config: &dyn ConfigPort,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), AnalysisError> {
    let start = parse_date(config, "start_date")?;
    let end = parse_date(config, "end_date")?;

    if let (Some(s), Some(e)) = (start, end) {
        if s >= e {
            return Err(invalid("data", "start_date", "start_date must be before end_date"));
        }
    }
    Ok((start, end))
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, AnalysisError> {
    match config.get_string("data", key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                invalid(
                    "data",
                    key,
                    &format!("invalid {} format, expected YYYY-MM-DD", key),
                )
            }),
    }
}

/// Requests named in `[indicators]`, in battery order, or the default battery
/// when the section names none.
pub fn indicator_requests(config: &dyn ConfigPort) -> Result<Vec<IndicatorRequest>, AnalysisError> {
    let configured = INDICATOR_KEYS
        .iter()
        .any(|key| config.get_string("indicators", key).is_some());
    if !configured {
        return Ok(IndicatorRequest::default_battery());
    }

    let mut requests = Vec::new();
    let periods = |key: &str| period_list(config, key);

    requests.extend(periods("sma")?.into_iter().map(IndicatorRequest::Sma));
    requests.extend(periods("ema")?.into_iter().map(IndicatorRequest::Ema));
    requests.extend(periods("rsi")?.into_iter().map(IndicatorRequest::Rsi));
    if let Some(macd) = macd_request(config)? {
        requests.push(macd);
    }
    if let Some(bands) = bollinger_request(config)? {
        requests.push(bands);
    }
    if let Some(stoch) = stochastic_request(config)? {
        requests.push(stoch);
    }
    requests.extend(periods("adx")?.into_iter().map(IndicatorRequest::Adx));
    requests.extend(periods("cci")?.into_iter().map(IndicatorRequest::Cci));
    requests.extend(periods("willr")?.into_iter().map(IndicatorRequest::WilliamsR));
    requests.extend(periods("atr")?.into_iter().map(IndicatorRequest::Atr));
    if config.get_bool("indicators", "obv", false) {
        requests.push(IndicatorRequest::Obv);
    }

    Ok(requests)
}

/// Evaluator built from `[signals]`, keyed on the configured indicators.
pub fn signal_evaluator(config: &dyn ConfigPort) -> Result<SignalEvaluator, AnalysisError> {
    let mut evaluator = SignalEvaluator::default();

    // Reversed so the first configured request of each family wins.
    for request in indicator_requests(config)?.into_iter().rev() {
        match request {
            IndicatorRequest::Rsi(n) => evaluator.rsi_period = n,
            IndicatorRequest::Macd { fast, slow, signal } => evaluator.macd = (fast, slow, signal),
            IndicatorRequest::Bollinger {
                period,
                stddev_mult_x100,
            } => evaluator.bollinger = (period, stddev_mult_x100),
            IndicatorRequest::Stochastic {
                k_period,
                d_period,
                smooth,
            } => evaluator.stochastic = (k_period, d_period, smooth),
            IndicatorRequest::Adx(n) => evaluator.adx_period = n,
            IndicatorRequest::Cci(n) => evaluator.cci_period = n,
            IndicatorRequest::WilliamsR(n) => evaluator.willr_period = n,
            _ => {}
        }
    }

    if let Some(n) = single_period(config, "signals", "rsi_period")? {
        evaluator.rsi_period = n;
    }
    if let Some(n) = single_period(config, "signals", "trend_sma")? {
        evaluator.trend_sma = n;
    }

    let d = SignalThresholds::default();
    evaluator.thresholds = SignalThresholds {
        rsi_oversold: config.get_double("signals", "rsi_oversold", d.rsi_oversold),
        rsi_overbought: config.get_double("signals", "rsi_overbought", d.rsi_overbought),
        stoch_oversold: config.get_double("signals", "stoch_oversold", d.stoch_oversold),
        stoch_overbought: config.get_double("signals", "stoch_overbought", d.stoch_overbought),
        adx_trend: config.get_double("signals", "adx_trend", d.adx_trend),
        cci_limit: config.get_double("signals", "cci_limit", d.cci_limit),
        willr_oversold: config.get_double("signals", "willr_oversold", d.willr_oversold),
        willr_overbought: config.get_double("signals", "willr_overbought", d.willr_overbought),
    };

    Ok(evaluator)
}

fn validate_thresholds(t: &SignalThresholds) -> Result<(), AnalysisError> {
    let ordered = [
        ("rsi_oversold", t.rsi_oversold, t.rsi_overbought, 0.0, 100.0),
        ("stoch_oversold", t.stoch_oversold, t.stoch_overbought, 0.0, 100.0),
        ("willr_oversold", t.willr_oversold, t.willr_overbought, -100.0, 0.0),
    ];
    for (key, low, high, min, max) in ordered {
        if low < min || high > max {
            return Err(invalid(
                "signals",
                key,
                &format!("thresholds must lie within [{}, {}]", min, max),
            ));
        }
        if low >= high {
            return Err(invalid(
                "signals",
                key,
                "oversold level must be below overbought level",
            ));
        }
    }
    if t.adx_trend <= 0.0 || t.adx_trend > 100.0 {
        return Err(invalid("signals", "adx_trend", "adx_trend must be in (0, 100]"));
    }
    if t.cci_limit <= 0.0 {
        return Err(invalid("signals", "cci_limit", "cci_limit must be positive"));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> AnalysisError {
    AnalysisError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_numbers<T: std::str::FromStr>(
    raw: &str,
    section: &str,
    key: &str,
) -> Result<Vec<T>, AnalysisError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| invalid(section, key, &format!("{:?} is not a valid number", s)))
        })
        .collect()
}

fn period_list(config: &dyn ConfigPort, key: &str) -> Result<Vec<usize>, AnalysisError> {
    match config.get_string("indicators", key) {
        None => Ok(Vec::new()),
        Some(raw) => parse_numbers(&raw, "indicators", key),
    }
}

fn single_period(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<usize>, AnalysisError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(None);
    };
    match parse_numbers::<usize>(&raw, section, key)?.as_slice() {
        [n] if *n > 0 => Ok(Some(*n)),
        _ => Err(invalid(section, key, "expected one positive period")),
    }
}

fn macd_request(config: &dyn ConfigPort) -> Result<Option<IndicatorRequest>, AnalysisError> {
    let Some(raw) = config.get_string("indicators", "macd") else {
        return Ok(None);
    };
    match parse_numbers::<usize>(&raw, "indicators", "macd")?.as_slice() {
        &[fast, slow, signal] => Ok(Some(IndicatorRequest::Macd { fast, slow, signal })),
        _ => Err(invalid("indicators", "macd", "expected fast,slow,signal")),
    }
}

fn bollinger_request(config: &dyn ConfigPort) -> Result<Option<IndicatorRequest>, AnalysisError> {
    let Some(raw) = config.get_string("indicators", "bollinger") else {
        return Ok(None);
    };
    let (period, mult) = match parse_numbers::<f64>(&raw, "indicators", "bollinger")?.as_slice() {
        &[period, mult]
            if period >= 1.0 && period.fract() == 0.0 && mult.is_finite() && mult > 0.0 =>
        {
            (period, mult)
        }
        _ => {
            return Err(invalid(
                "indicators",
                "bollinger",
                "expected period,multiplier with a positive multiplier",
            ));
        }
    };

    // Multipliers are carried as hundredths; 2.3 * 100 is not exactly 230.
    let hundredths = mult * 100.0;
    let whole = hundredths.round();
    if (hundredths - whole).abs() > 1e-6 || whole < 1.0 || whole > f64::from(u32::MAX) {
        return Err(invalid(
            "indicators",
            "bollinger",
            &format!("multiplier {mult} must be a whole number of hundredths"),
        ));
    }

    Ok(Some(IndicatorRequest::Bollinger {
        period: period as usize,
        stddev_mult_x100: whole as u32,
    }))
}

fn stochastic_request(config: &dyn ConfigPort) -> Result<Option<IndicatorRequest>, AnalysisError> {
    let Some(raw) = config.get_string("indicators", "stochastic") else {
        return Ok(None);
    };
    let (k_period, d_period, smooth) =
        match parse_numbers::<usize>(&raw, "indicators", "stochastic")?.as_slice() {
            &[k, d] => (k, d, 1),
            &[k, d, s] => (k, d, s),
            _ => {
                return Err(invalid(
                    "indicators",
                    "stochastic",
                    "expected k,d or k,d,smooth",
                ));
            }
        };
    Ok(Some(IndicatorRequest::Stochastic {
        k_period,
        d_period,
        smooth,
    }))
}
