//! Signal evaluation over the last row of an indicator set.
//!
//! Rules run in a fixed order (RSI, Trend, MACD, Bollinger, Stochastic, ADX,
//! CCI, Williams %R) and each yields exactly one [`Signal`]. A rule whose
//! backing column is missing or undefined at the last bar reports
//! [`SignalCategory::InsufficientData`]; evaluation itself never fails.

use crate::domain::indicator::{
    IndicatorRequest, IndicatorSet, adx, bollinger, cci, macd, rsi, stochastic, williams_r,
};
use crate::domain::series::Series;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalCategory {
    Buy,
    Sell,
    Neutral,
    InsufficientData,
}

impl fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalCategory::Buy => write!(f, "BUY"),
            SignalCategory::Sell => write!(f, "SELL"),
            SignalCategory::Neutral => write!(f, "NEUTRAL"),
            SignalCategory::InsufficientData => write!(f, "N/A"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalTopic {
    Rsi,
    Trend,
    Macd,
    Bollinger,
    Stochastic,
    Adx,
    Cci,
    WilliamsR,
}

impl fmt::Display for SignalTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalTopic::Rsi => write!(f, "RSI"),
            SignalTopic::Trend => write!(f, "Trend"),
            SignalTopic::Macd => write!(f, "MACD"),
            SignalTopic::Bollinger => write!(f, "Bollinger"),
            SignalTopic::Stochastic => write!(f, "Stochastic"),
            SignalTopic::Adx => write!(f, "ADX"),
            SignalTopic::Cci => write!(f, "CCI"),
            SignalTopic::WilliamsR => write!(f, "Williams %R"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signal {
    pub category: SignalCategory,
    pub topic: SignalTopic,
    pub message: String,
    /// The value that drove the decision, absent for `InsufficientData`.
    pub magnitude: Option<f64>,
}

impl Signal {
    fn new(
        category: SignalCategory,
        topic: SignalTopic,
        message: impl Into<String>,
        magnitude: f64,
    ) -> Self {
        Self {
            category,
            topic,
            message: message.into(),
            magnitude: Some(magnitude),
        }
    }

    fn insufficient(topic: SignalTopic, column: &str) -> Self {
        Self {
            category: SignalCategory::InsufficientData,
            topic,
            message: format!("{column} not available"),
            magnitude: None,
        }
    }
}

/// Decision levels for the oscillator rules.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalThresholds {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub stoch_oversold: f64,
    pub stoch_overbought: f64,
    pub adx_trend: f64,
    /// CCI reads Buy below `-cci_limit` and Sell above `cci_limit`.
    pub cci_limit: f64,
    pub willr_oversold: f64,
    pub willr_overbought: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            stoch_oversold: 20.0,
            stoch_overbought: 80.0,
            adx_trend: 25.0,
            cci_limit: 100.0,
            willr_oversold: -80.0,
            willr_overbought: -20.0,
        }
    }
}

/// Evaluates the last row of an [`IndicatorSet`].
///
/// Each rule keys on the columns of one request; the request parameters here
/// must match what was computed or the rule reads `InsufficientData`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalEvaluator {
    pub rsi_period: usize,
    pub trend_sma: usize,
    pub macd: (usize, usize, usize),
    pub bollinger: (usize, u32),
    pub stochastic: (usize, usize, usize),
    pub adx_period: usize,
    pub cci_period: usize,
    pub willr_period: usize,
    pub thresholds: SignalThresholds,
}

impl Default for SignalEvaluator {
    fn default() -> Self {
        Self {
            rsi_period: rsi::DEFAULT_PERIOD,
            trend_sma: 200,
            macd: (macd::DEFAULT_FAST, macd::DEFAULT_SLOW, macd::DEFAULT_SIGNAL),
            bollinger: (bollinger::DEFAULT_PERIOD, bollinger::DEFAULT_MULT_X100),
            stochastic: (
                stochastic::DEFAULT_K_PERIOD,
                stochastic::DEFAULT_D_PERIOD,
                stochastic::DEFAULT_SMOOTH,
            ),
            adx_period: adx::DEFAULT_PERIOD,
            cci_period: cci::DEFAULT_PERIOD,
            willr_period: williams_r::DEFAULT_PERIOD,
            thresholds: SignalThresholds::default(),
        }
    }
}

impl SignalEvaluator {
    pub fn with_thresholds(thresholds: SignalThresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    /// Requests whose columns the rules read, in rule order.
    pub fn required_requests(&self) -> Vec<IndicatorRequest> {
        let (fast, slow, signal) = self.macd;
        let (period, stddev_mult_x100) = self.bollinger;
        let (k_period, d_period, smooth) = self.stochastic;
        vec![
            IndicatorRequest::Rsi(self.rsi_period),
            IndicatorRequest::Sma(self.trend_sma),
            IndicatorRequest::Macd { fast, slow, signal },
            IndicatorRequest::Bollinger {
                period,
                stddev_mult_x100,
            },
            IndicatorRequest::Stochastic {
                k_period,
                d_period,
                smooth,
            },
            IndicatorRequest::Adx(self.adx_period),
            IndicatorRequest::Cci(self.cci_period),
            IndicatorRequest::WilliamsR(self.willr_period),
        ]
    }

    pub fn evaluate(&self, series: &Series, indicators: &IndicatorSet) -> Vec<Signal> {
        let close = series.last().close;
        let row = LastRow { indicators };
        let columns: Vec<Vec<String>> = self
            .required_requests()
            .iter()
            .map(IndicatorRequest::column_names)
            .collect();

        vec![
            self.rsi_signal(&row, &columns[0]),
            self.trend_signal(&row, &columns[1], close),
            self.macd_signal(&row, &columns[2]),
            self.bollinger_signal(&row, &columns[3], close),
            self.stochastic_signal(&row, &columns[4]),
            self.adx_signal(&row, &columns[5]),
            self.cci_signal(&row, &columns[6]),
            self.williams_r_signal(&row, &columns[7]),
        ]
    }

    fn rsi_signal(&self, row: &LastRow, columns: &[String]) -> Signal {
        let topic = SignalTopic::Rsi;
        let value = match row.read(columns, 0) {
            Ok(v) => v,
            Err(name) => return Signal::insufficient(topic, name),
        };
        let t = &self.thresholds;
        if value < t.rsi_oversold {
            Signal::new(SignalCategory::Buy, topic, format!("RSI {value:.2} is oversold"), value)
        } else if value > t.rsi_overbought {
            Signal::new(SignalCategory::Sell, topic, format!("RSI {value:.2} is overbought"), value)
        } else {
            Signal::new(SignalCategory::Neutral, topic, format!("RSI {value:.2} is neutral"), value)
        }
    }

    fn trend_signal(&self, row: &LastRow, columns: &[String], close: f64) -> Signal {
        let topic = SignalTopic::Trend;
        let sma = match row.read(columns, 0) {
            Ok(v) => v,
            Err(name) => return Signal::insufficient(topic, name),
        };
        let distance = close - sma;
        if close > sma {
            Signal::new(
                SignalCategory::Buy,
                topic,
                format!("close is above long-term average {}", columns[0]),
                distance,
            )
        } else {
            Signal::new(
                SignalCategory::Sell,
                topic,
                format!("close is below long-term average {}", columns[0]),
                distance,
            )
        }
    }

    fn macd_signal(&self, row: &LastRow, columns: &[String]) -> Signal {
        let topic = SignalTopic::Macd;
        let (line, signal) = match (row.read(columns, 0), row.read(columns, 1)) {
            (Ok(l), Ok(s)) => (l, s),
            (Err(name), _) | (_, Err(name)) => return Signal::insufficient(topic, name),
        };
        let histogram = line - signal;
        if line > signal {
            Signal::new(SignalCategory::Buy, topic, "bullish crossover", histogram)
        } else {
            Signal::new(SignalCategory::Sell, topic, "bearish crossover", histogram)
        }
    }

    fn bollinger_signal(&self, row: &LastRow, columns: &[String], close: f64) -> Signal {
        let topic = SignalTopic::Bollinger;
        // columns: lower, middle, upper
        let (lower, upper) = match (row.read(columns, 0), row.read(columns, 2)) {
            (Ok(l), Ok(u)) => (l, u),
            (Err(name), _) | (_, Err(name)) => return Signal::insufficient(topic, name),
        };
        let width = upper - lower;
        let percent_b = if width > 0.0 {
            (close - lower) / width
        } else {
            0.5
        };
        if close < lower {
            Signal::new(SignalCategory::Buy, topic, "close is below the lower band", percent_b)
        } else if close > upper {
            Signal::new(SignalCategory::Sell, topic, "close is above the upper band", percent_b)
        } else {
            Signal::new(SignalCategory::Neutral, topic, "close is inside the bands", percent_b)
        }
    }

    fn stochastic_signal(&self, row: &LastRow, columns: &[String]) -> Signal {
        let topic = SignalTopic::Stochastic;
        let k = match row.read(columns, 0) {
            Ok(v) => v,
            Err(name) => return Signal::insufficient(topic, name),
        };
        let t = &self.thresholds;
        if k < t.stoch_oversold {
            Signal::new(SignalCategory::Buy, topic, format!("%K {k:.2} is oversold"), k)
        } else if k > t.stoch_overbought {
            Signal::new(SignalCategory::Sell, topic, format!("%K {k:.2} is overbought"), k)
        } else {
            Signal::new(SignalCategory::Neutral, topic, format!("%K {k:.2} is neutral"), k)
        }
    }

    fn adx_signal(&self, row: &LastRow, columns: &[String]) -> Signal {
        let topic = SignalTopic::Adx;
        let (adx, plus, minus) = match (
            row.read(columns, 0),
            row.read(columns, 1),
            row.read(columns, 2),
        ) {
            (Ok(a), Ok(p), Ok(m)) => (a, p, m),
            (Err(name), _, _) | (_, Err(name), _) | (_, _, Err(name)) => {
                return Signal::insufficient(topic, name);
            }
        };
        if adx < self.thresholds.adx_trend {
            Signal::new(
                SignalCategory::Neutral,
                topic,
                format!("weak trend (ADX {adx:.2})"),
                adx,
            )
        } else if plus > minus {
            Signal::new(
                SignalCategory::Buy,
                topic,
                format!("strong uptrend (ADX {adx:.2}, +DI above -DI)"),
                adx,
            )
        } else {
            Signal::new(
                SignalCategory::Sell,
                topic,
                format!("strong downtrend (ADX {adx:.2}, -DI above +DI)"),
                adx,
            )
        }
    }

    fn cci_signal(&self, row: &LastRow, columns: &[String]) -> Signal {
        let topic = SignalTopic::Cci;
        let value = match row.read(columns, 0) {
            Ok(v) => v,
            Err(name) => return Signal::insufficient(topic, name),
        };
        let limit = self.thresholds.cci_limit;
        if value < -limit {
            Signal::new(SignalCategory::Buy, topic, format!("CCI {value:.2} is oversold"), value)
        } else if value > limit {
            Signal::new(SignalCategory::Sell, topic, format!("CCI {value:.2} is overbought"), value)
        } else {
            Signal::new(SignalCategory::Neutral, topic, format!("CCI {value:.2} is neutral"), value)
        }
    }

    fn williams_r_signal(&self, row: &LastRow, columns: &[String]) -> Signal {
        let topic = SignalTopic::WilliamsR;
        let value = match row.read(columns, 0) {
            Ok(v) => v,
            Err(name) => return Signal::insufficient(topic, name),
        };
        let t = &self.thresholds;
        if value < t.willr_oversold {
            Signal::new(SignalCategory::Buy, topic, format!("%R {value:.2} is oversold"), value)
        } else if value > t.willr_overbought {
            Signal::new(SignalCategory::Sell, topic, format!("%R {value:.2} is overbought"), value)
        } else {
            Signal::new(SignalCategory::Neutral, topic, format!("%R {value:.2} is neutral"), value)
        }
    }
}

struct LastRow<'a> {
    indicators: &'a IndicatorSet,
}

impl LastRow<'_> {
    /// Last value of `columns[i]`, or the column name when it is undefined.
    fn read<'n>(&self, columns: &'n [String], i: usize) -> Result<f64, &'n str> {
        let name = columns[i].as_str();
        self.indicators.last(name).value().ok_or(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
    /// No rule had enough data to decide.
    Undetermined,
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bias::Bullish => write!(f, "Bullish"),
            Bias::Bearish => write!(f, "Bearish"),
            Bias::Neutral => write!(f, "Neutral"),
            Bias::Undetermined => write!(f, "Undetermined"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalSummary {
    pub buy: usize,
    pub sell: usize,
    pub neutral: usize,
    pub insufficient: usize,
    pub bias: Bias,
}

impl SignalSummary {
    pub fn from_signals(signals: &[Signal]) -> Self {
        let count = |category: SignalCategory| signals.iter().filter(|s| s.category == category).count();
        let buy = count(SignalCategory::Buy);
        let sell = count(SignalCategory::Sell);
        let neutral = count(SignalCategory::Neutral);
        let insufficient = count(SignalCategory::InsufficientData);

        let bias = if buy + sell + neutral == 0 {
            Bias::Undetermined
        } else if buy > sell {
            Bias::Bullish
        } else if sell > buy {
            Bias::Bearish
        } else {
            Bias::Neutral
        };

        Self {
            buy,
            sell,
            neutral,
            insufficient,
            bias,
        }
    }
}
