//! The full classification pipeline:
//! column preprocessor -> PCA -> SelectKBest -> SVC

use std::fmt;

use faer::Mat;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::pca::{Pca, PcaComponents};
use super::preprocess::ColumnPreprocessor;
use super::select::SelectKBest;
use super::stage::{Stage, Transform};
use super::svc::{Kernel, SvcClassifier};
use super::table::FeatureTable;

/// One point of the hyperparameter grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub pca_components: PcaComponents,
    pub k: usize,
    pub gamma: f64,
    pub kernel: Kernel,
}

impl fmt::Display for PipelineSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pca={} k={} gamma={} kernel={}",
            self.pca_components, self.k, self.gamma, self.kernel
        )
    }
}

impl PipelineSpec {
    /// Fit every stage in order on the training table
    pub fn fit(&self, x: &FeatureTable, y: &[bool]) -> Result<FittedPipeline, PipelineError> {
        if x.n_rows() != y.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("{} labels", x.n_rows()),
                actual: format!("{} labels", y.len()),
            });
        }

        let mut preprocessor = ColumnPreprocessor::for_credit_data(x.names());
        let mut matrix = preprocessor.fit_transform(x)?;

        let mut stages = vec![
            Stage::Pca(Pca::new(self.pca_components)),
            Stage::SelectKBest(SelectKBest::new(self.k)),
        ];
        for stage in stages.iter_mut() {
            matrix = stage.fit_transform(&matrix, y)?;
        }

        let mut classifier = SvcClassifier::new(self.kernel, self.gamma);
        classifier.fit(&matrix, y)?;

        Ok(FittedPipeline {
            spec: *self,
            preprocessor,
            stages,
            classifier,
        })
    }
}

/// A pipeline with every stage fitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    pub spec: PipelineSpec,
    pub preprocessor: ColumnPreprocessor,
    pub stages: Vec<Stage>,
    pub classifier: SvcClassifier,
}

impl FittedPipeline {
    /// Run the preprocessor and matrix stages, returning the classifier input
    pub fn transform(&self, x: &FeatureTable) -> Result<Mat<f64>, PipelineError> {
        let mut matrix = self.preprocessor.transform(x)?;
        for stage in &self.stages {
            matrix = stage.transform(&matrix)?;
        }
        Ok(matrix)
    }

    pub fn decision_function(&self, x: &FeatureTable) -> Result<Vec<f64>, PipelineError> {
        self.classifier.decision_function(&self.transform(x)?)
    }

    /// `true` means the customer is predicted to default
    pub fn predict(&self, x: &FeatureTable) -> Result<Vec<bool>, PipelineError> {
        self.classifier.predict(&self.transform(x)?)
    }

    pub fn predict_frame(&self, df: &DataFrame) -> Result<Vec<bool>, PipelineError> {
        self.predict(&FeatureTable::from_frame(df)?)
    }

    /// Names of the columns the pipeline was fitted on
    pub fn feature_names(&self) -> Vec<String> {
        self.preprocessor
            .fitted()
            .map(|f| f.input_columns.clone())
            .unwrap_or_default()
    }
}
