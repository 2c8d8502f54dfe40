use thiserror::Error;

/// Failures of the estimation pipeline that are not "cannot estimate".
#[derive(Error, Debug)]
pub enum ValuationError {
    /// Every comparable is missing the named numeric column.
    #[error("Cannot impute column '{column}': no comparable has a value")]
    ImputationFailure { column: &'static str },

    /// The record store could not be reached or queried.
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Cannot fit a regression on an empty training set")]
    EmptyTrainingSet,

    #[error("Invalid valuation configuration: {0}")]
    InvalidConfig(String),
}
