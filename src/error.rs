use thiserror::Error;

/// Configuration errors surfaced by the engine.
///
/// Empty data, unparsable dates and unparsable numbers are not errors; they degrade to
/// empty or zero-valued output instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashError {
    #[error("chart {chart_id}: unknown column '{column}'")]
    UnknownColumn { chart_id: String, column: String },

    #[error("unknown chart type: {0}")]
    UnknownChartType(String),

    #[error("unknown aggregation type: {0}")]
    UnknownAggregation(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}
