//! Error types for the dataset model, the MCAR test and the imputers.

use thiserror::Error;

/// Convenience return type for dataset construction and lookups.
pub type DatasetResult<T> = std::result::Result<T, DatasetError>;

/// Convenience return type for the MCAR test.
pub type McarResult<T> = std::result::Result<T, McarError>;

/// Convenience return type for imputation.
pub type ImputationResult<T> = std::result::Result<T, ImputationError>;

/// Errors raised while building or querying a [`Dataset`](crate::dataset::Dataset).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("Column '{name}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),
}

/// Failures of the MCAR significance test.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum McarError {
    /// Fewer than two columns are partially missing, the test is undefined.
    #[error("Need at least two columns with missing values for MCAR test, found {found}")]
    InsufficientColumns { found: usize },

    /// Every pattern group was skipped, no degrees of freedom were accumulated.
    #[error("Insufficient complete data to perform MCAR test ({skipped} of {groups} pattern groups skipped)")]
    InsufficientData { groups: usize, skipped: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid MCAR test parameters: {0}")]
    InvalidParameters(String),
}

/// Failures while filling missing values in a column.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImputationError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Column '{column}' is {actual}, strategy expects {expected}")]
    ColumnKindMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Column '{0}' has no observed values to impute from")]
    NoObservedValues(String),

    #[error("Nearest-neighbor imputation needs at least one neighbor")]
    InvalidNeighborCount,

    /// The computed fill is `NaN`, e.g. the mean of `+inf` and `-inf`.
    #[error("Column '{0}' has no finite fill value for its missing cells")]
    NonFiniteFill(String),
}
