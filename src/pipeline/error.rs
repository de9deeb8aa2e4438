//! Error types for fitting and applying the feature pipeline.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by pipeline stages and the grid search.
///
/// `InvalidParameter`, `SingleClass` and `Solver` are configuration errors:
/// during a grid search they fail the offending candidate only.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A column the stage was configured with is not in the frame
    #[error("column '{0}' not found")]
    MissingColumn(String),

    /// A categorical value that was not seen when the encoder was fitted
    #[error("unknown category {value} in column '{column}'")]
    UnknownCategory { column: String, value: i64 },

    /// Nulls are not accepted anywhere in the feature matrix
    #[error("column '{0}' contains null values")]
    NullValues(String),

    /// Hyperparameter outside the range the data allows
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// Matrix width or column layout does not match what the stage was fitted on
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// Stage used before `fit`
    #[error("stage '{0}' has not been fitted")]
    NotFitted(&'static str),

    /// Training labels contain a single class
    #[error("training labels contain a single class; need both defaults and non-defaults")]
    SingleClass,

    /// Training set is empty
    #[error("cannot fit on an empty dataset")]
    EmptyDataset,

    /// The SMO solver rejected the problem
    #[error("SVM solver failed: {0}")]
    Solver(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PipelineError {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        PipelineError::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

/// Errors raised by the hyperparameter search as a whole.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid cross-validation setup: {0}")]
    InvalidFolds(String),

    #[error("parameter grid is empty")]
    EmptyGrid,

    /// Every candidate failed on at least one fold
    #[error("all {count} grid candidates failed; first error: {first_error}")]
    AllCandidatesFailed { count: usize, first_error: String },

    #[error("refitting the best candidate failed: {0}")]
    Refit(#[source] PipelineError),

    #[error("failed to build the worker pool: {0}")]
    ThreadPool(String),
}
