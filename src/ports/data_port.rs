//! Price-series source port.

use crate::domain::error::AnalysisError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `symbol` ordered oldest first, restricted to the inclusive
    /// date window when bounds are given. A symbol the source does not know
    /// is `DataUnavailable`; an empty window is an empty vector.
    fn fetch_series(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, AnalysisError>;

    fn list_symbols(&self) -> Result<Vec<String>, AnalysisError>;
}
