use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Unknown time window '{0}'. Expected one of 1W, 1M, 3M, 6M, 1Y, ALL.")]
    UnknownWindow(String),

    #[error("An unexpected error occurred during analytics calculation: {0}")]
    InternalError(String),
}
