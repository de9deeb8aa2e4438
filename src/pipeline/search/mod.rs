//! Hyperparameter search over the classification pipeline
//!
//! The grid is an explicit list of `PipelineSpec`s. Each candidate is scored
//! by balanced accuracy averaged over stratified folds, candidates and folds
//! are evaluated in parallel, and the best candidate is refitted on the whole
//! training set.

mod folds;
mod grid;
mod grid_search;

pub use folds::{Fold, StratifiedKFold};
pub use grid::ParamGrid;
pub use grid_search::{
    concurrent_fits, kernel_matrix_bytes, CandidateResult, GridSearch, SearchConfig, SearchResult,
    DEFAULT_MEMORY_BUDGET_MB, SCORING,
};
