//! Explicit hyperparameter grid

use serde::{Deserialize, Serialize};

use crate::pipeline::estimator::PipelineSpec;
use crate::pipeline::pca::PcaComponents;
use crate::pipeline::svc::Kernel;

/// Candidate values for each tunable parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub pca_components: Vec<PcaComponents>,
    pub k: Vec<usize>,
    pub gamma: Vec<f64>,
    pub kernel: Vec<Kernel>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            pca_components: vec![PcaComponents::All, PcaComponents::Fixed(20)],
            k: vec![12],
            gamma: vec![0.1],
            kernel: vec![Kernel::Rbf],
        }
    }
}

impl ParamGrid {
    /// Grid with a single candidate
    pub fn single(spec: PipelineSpec) -> Self {
        Self {
            pca_components: vec![spec.pca_components],
            k: vec![spec.k],
            gamma: vec![spec.gamma],
            kernel: vec![spec.kernel],
        }
    }

    /// Every combination, PCA outermost and kernel innermost.
    /// This order is the tie-break order of the search.
    pub fn candidates(&self) -> Vec<PipelineSpec> {
        let mut out = Vec::with_capacity(self.len());
        for &pca_components in &self.pca_components {
            for &k in &self.k {
                for &gamma in &self.gamma {
                    for &kernel in &self.kernel {
                        out.push(PipelineSpec {
                            pca_components,
                            k,
                            gamma,
                            kernel,
                        });
                    }
                }
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.pca_components.len() * self.k.len() * self.gamma.len() * self.kernel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
