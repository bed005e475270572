//! Export port for the series joined with its indicator columns.

use crate::domain::error::AnalysisError;
use crate::domain::indicator::IndicatorSet;
use crate::domain::series::Series;
use std::path::Path;

/// Row order of an exported table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RowOrder {
    #[default]
    OldestFirst,
    NewestFirst,
}

pub trait ExportPort {
    fn export(
        &self,
        series: &Series,
        indicators: &IndicatorSet,
        order: RowOrder,
        path: &Path,
    ) -> Result<(), AnalysisError>;
}
