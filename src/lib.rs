//! credit-default: credit card default classification library
//!
//! Loading and cleaning of the credit card default data, a
//! preprocess -> PCA -> SelectKBest -> SVC pipeline, cross-validated grid
//! search, and the metrics and model reports.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
