//! Fit/transform interface shared by the matrix stages of the pipeline

use faer::Mat;
use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::pca::Pca;
use super::select::SelectKBest;

/// A pipeline stage that learns parameters from a training matrix and then
/// maps matrices of the same width to a new matrix.
pub trait Transform {
    /// Short stage name used in error messages and reports
    fn name(&self) -> &'static str;

    /// Learn the stage parameters. Labels are ignored by unsupervised stages.
    fn fit(&mut self, x: &Mat<f64>, y: &[bool]) -> Result<(), PipelineError>;

    /// Apply the learned parameters
    fn transform(&self, x: &Mat<f64>) -> Result<Mat<f64>, PipelineError>;

    fn fit_transform(&mut self, x: &Mat<f64>, y: &[bool]) -> Result<Mat<f64>, PipelineError> {
        self.fit(x, y)?;
        self.transform(x)
    }

    /// Output width once fitted
    fn n_features_out(&self) -> Option<usize>;
}

/// The matrix stages that sit between the column preprocessor and the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    Pca(Pca),
    SelectKBest(SelectKBest),
}

impl Transform for Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::Pca(s) => s.name(),
            Stage::SelectKBest(s) => s.name(),
        }
    }

    fn fit(&mut self, x: &Mat<f64>, y: &[bool]) -> Result<(), PipelineError> {
        match self {
            Stage::Pca(s) => s.fit(x, y),
            Stage::SelectKBest(s) => s.fit(x, y),
        }
    }

    fn transform(&self, x: &Mat<f64>) -> Result<Mat<f64>, PipelineError> {
        match self {
            Stage::Pca(s) => s.transform(x),
            Stage::SelectKBest(s) => s.transform(x),
        }
    }

    fn n_features_out(&self) -> Option<usize> {
        match self {
            Stage::Pca(s) => s.n_features_out(),
            Stage::SelectKBest(s) => s.n_features_out(),
        }
    }
}

/// Check the width of an input matrix against what a stage was fitted on
pub(crate) fn check_width(stage: &str, expected: usize, x: &Mat<f64>) -> Result<(), PipelineError> {
    if x.ncols() != expected {
        return Err(PipelineError::ShapeMismatch {
            expected: format!("{} input features for {}", expected, stage),
            actual: format!("{} features", x.ncols()),
        });
    }
    Ok(())
}
