//! Principal component analysis
//!
//! Components are the eigenvectors of the sample covariance matrix, ordered by
//! explained variance. With `PcaComponents::All` the transform is a pure
//! rotation of the centered data.

use std::fmt;
use std::str::FromStr;

use faer::{Mat, Side};
use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::stage::{check_width, Transform};

/// Number of principal components to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PcaComponents {
    /// min(n_samples, n_features)
    #[default]
    All,
    Fixed(usize),
}

impl fmt::Display for PcaComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PcaComponents::All => write!(f, "all"),
            PcaComponents::Fixed(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for PcaComponents {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(PcaComponents::All);
        }
        s.parse::<usize>()
            .map(PcaComponents::Fixed)
            .map_err(|_| format!("'{}' is not 'all' or a component count", s))
    }
}

/// Learned PCA parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPca {
    pub mean: Vec<f64>,
    /// One row per component, each of length n_features_in
    pub components: Vec<Vec<f64>>,
    pub explained_variance: Vec<f64>,
    pub explained_variance_ratio: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pca {
    pub n_components: PcaComponents,
    fitted: Option<FittedPca>,
}

impl Pca {
    pub fn new(n_components: PcaComponents) -> Self {
        Self {
            n_components,
            fitted: None,
        }
    }

    pub fn fitted(&self) -> Option<&FittedPca> {
        self.fitted.as_ref()
    }

    fn resolve_components(&self, n_samples: usize, n_features: usize) -> Result<usize, PipelineError> {
        let max = n_samples.min(n_features);
        match self.n_components {
            PcaComponents::All => Ok(max),
            PcaComponents::Fixed(n) if n == 0 || n > max => Err(PipelineError::invalid(
                "pca_components",
                format!(
                    "{} must be between 1 and min(n_samples, n_features) = {}",
                    n, max
                ),
            )),
            PcaComponents::Fixed(n) => Ok(n),
        }
    }
}

impl Transform for Pca {
    fn name(&self) -> &'static str {
        "pca"
    }

    fn fit(&mut self, x: &Mat<f64>, _y: &[bool]) -> Result<(), PipelineError> {
        let (n, p) = (x.nrows(), x.ncols());
        if n == 0 || p == 0 {
            return Err(PipelineError::EmptyDataset);
        }
        let n_components = self.resolve_components(n, p)?;

        let mean: Vec<f64> = (0..p)
            .map(|j| (0..n).map(|i| x[(i, j)]).sum::<f64>() / n as f64)
            .collect();
        let centered = Mat::<f64>::from_fn(n, p, |i, j| x[(i, j)] - mean[j]);

        // Sample covariance, as the explained variance is reported with ddof = 1
        let ddof = if n > 1 { (n - 1) as f64 } else { 1.0 };
        let mut covariance = centered.transpose() * &centered;
        for i in 0..p {
            for j in 0..p {
                covariance[(i, j)] /= ddof;
            }
        }

        let eigen = covariance.selfadjoint_eigendecomposition(Side::Lower);
        let eigenvalues = eigen.s().column_vector();
        let eigenvectors = eigen.u();

        // faer returns eigenvalues in ascending order; sort descending with a
        // stable tie order so repeated fits agree
        let mut order: Vec<usize> = (0..p).collect();
        order.sort_by(|&a, &b| {
            eigenvalues
                .read(b)
                .partial_cmp(&eigenvalues.read(a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let total_variance: f64 = (0..p).map(|i| eigenvalues.read(i).max(0.0)).sum();

        let mut components = Vec::with_capacity(n_components);
        let mut explained_variance = Vec::with_capacity(n_components);
        for &idx in order.iter().take(n_components) {
            let mut vector: Vec<f64> = (0..p).map(|r| eigenvectors.read(r, idx)).collect();

            // Sign convention: largest-magnitude loading is positive
            let pivot = vector
                .iter()
                .enumerate()
                .fold((0, 0.0f64), |(bi, bv), (i, v)| {
                    if v.abs() > bv.abs() {
                        (i, *v)
                    } else {
                        (bi, bv)
                    }
                })
                .1;
            if pivot < 0.0 {
                vector.iter_mut().for_each(|v| *v = -*v);
            }

            components.push(vector);
            explained_variance.push(eigenvalues.read(idx).max(0.0));
        }

        let explained_variance_ratio = explained_variance
            .iter()
            .map(|v| if total_variance > 0.0 { v / total_variance } else { 0.0 })
            .collect();

        self.fitted = Some(FittedPca {
            mean,
            components,
            explained_variance,
            explained_variance_ratio,
        });
        Ok(())
    }

    fn transform(&self, x: &Mat<f64>) -> Result<Mat<f64>, PipelineError> {
        let fitted = self.fitted.as_ref().ok_or(PipelineError::NotFitted("pca"))?;
        let p = fitted.mean.len();
        check_width("pca", p, x)?;

        let k = fitted.components.len();
        let centered = Mat::<f64>::from_fn(x.nrows(), p, |i, j| x[(i, j)] - fitted.mean[j]);
        let loadings = Mat::<f64>::from_fn(p, k, |j, c| fitted.components[c][j]);

        Ok(&centered * &loadings)
    }

    fn n_features_out(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.components.len())
    }
}
