//! Kernel support vector classifier
//!
//! Training is delegated to the SMO solver in `linfa-svm`. Only the support
//! vectors, their signed dual coefficients and the intercept are kept, so the
//! fitted model serializes on its own and predicts without linfa.

use std::fmt;
use std::str::FromStr;

use faer::Mat;
use linfa::prelude::*;
use linfa_svm::Svm;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::stage::check_width;

/// Stopping tolerance of the SMO solver
const SOLVER_TOLERANCE: f64 = 1e-3;
/// Degree of the polynomial kernel
const POLY_DEGREE: f64 = 3.0;
/// Independent term of the polynomial kernel
const POLY_COEF0: f64 = 0.0;

/// Kernel family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    /// exp(-gamma * |x - y|^2)
    #[default]
    Rbf,
    /// <x, y>
    Linear,
    /// (gamma * <x, y> + coef0)^degree
    Poly,
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kernel::Rbf => "rbf",
            Kernel::Linear => "linear",
            Kernel::Poly => "poly",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Kernel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rbf" | "gaussian" => Ok(Kernel::Rbf),
            "linear" => Ok(Kernel::Linear),
            "poly" | "polynomial" => Ok(Kernel::Poly),
            other => Err(format!(
                "unknown kernel '{}'. Options: rbf, linear, poly",
                other
            )),
        }
    }
}

/// Learned decision function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedSvc {
    pub n_features_in: usize,
    pub support_vectors: Vec<Vec<f64>>,
    /// alpha_i * y_i for each support vector
    pub dual_coef: Vec<f64>,
    /// Decision is sum(dual_coef_i * K(sv_i, x)) - rho
    pub rho: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvcClassifier {
    pub kernel: Kernel,
    pub gamma: f64,
    /// Box constraint, same for both classes
    pub c: f64,
    fitted: Option<FittedSvc>,
}

impl SvcClassifier {
    pub fn new(kernel: Kernel, gamma: f64) -> Self {
        Self {
            kernel,
            gamma,
            c: 1.0,
            fitted: None,
        }
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn fitted(&self) -> Option<&FittedSvc> {
        self.fitted.as_ref()
    }

    pub fn fit(&mut self, x: &Mat<f64>, y: &[bool]) -> Result<(), PipelineError> {
        let (n, p) = (x.nrows(), x.ncols());
        if n == 0 {
            return Err(PipelineError::EmptyDataset);
        }
        if p == 0 {
            return Err(PipelineError::invalid("n_features", "classifier needs at least one feature"));
        }
        if y.len() != n {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("{} labels", n),
                actual: format!("{} labels", y.len()),
            });
        }
        if y.iter().all(|&v| v) || y.iter().all(|&v| !v) {
            return Err(PipelineError::SingleClass);
        }
        if !(self.gamma > 0.0 && self.gamma.is_finite()) && self.kernel != Kernel::Linear {
            return Err(PipelineError::invalid("gamma", format!("{} must be positive", self.gamma)));
        }
        if !(self.c > 0.0) {
            return Err(PipelineError::invalid("c", format!("{} must be positive", self.c)));
        }

        let scale = self.input_scale();
        let records = Array2::from_shape_fn((n, p), |(i, j)| x[(i, j)] * scale);
        let targets = Array1::from_vec(y.to_vec());
        let dataset = Dataset::new(records.clone(), targets);

        let params = Svm::<f64, bool>::params()
            .pos_neg_weights(self.c, self.c)
            .eps(SOLVER_TOLERANCE);

        let model = match self.kernel {
            // linfa's gaussian kernel is exp(-|x - y|^2 / eps)
            Kernel::Rbf => params.gaussian_kernel(1.0 / self.gamma).fit(&dataset),
            Kernel::Linear => params.linear_kernel().fit(&dataset),
            Kernel::Poly => params.polynomial_kernel(POLY_COEF0, POLY_DEGREE).fit(&dataset),
        }
        .map_err(|e| PipelineError::Solver(e.to_string()))?;

        let mut support_vectors = Vec::new();
        let mut dual_coef = Vec::new();
        for (i, &alpha) in model.alpha.iter().enumerate() {
            if alpha != 0.0 {
                support_vectors.push(records.row(i).to_vec());
                dual_coef.push(alpha);
            }
        }

        self.fitted = Some(FittedSvc {
            n_features_in: p,
            support_vectors,
            dual_coef,
            rho: model.rho,
        });
        Ok(())
    }

    /// Signed distance to the separating surface; positive means default
    pub fn decision_function(&self, x: &Mat<f64>) -> Result<Vec<f64>, PipelineError> {
        let fitted = self.fitted.as_ref().ok_or(PipelineError::NotFitted("svc"))?;
        check_width("svc", fitted.n_features_in, x)?;

        let scale = self.input_scale();
        let decisions = (0..x.nrows())
            .map(|i| {
                let row: Vec<f64> = (0..x.ncols()).map(|j| x[(i, j)] * scale).collect();
                let sum: f64 = fitted
                    .support_vectors
                    .iter()
                    .zip(&fitted.dual_coef)
                    .map(|(sv, coef)| coef * self.kernel_value(sv, &row))
                    .sum();
                sum - fitted.rho
            })
            .collect();

        Ok(decisions)
    }

    pub fn predict(&self, x: &Mat<f64>) -> Result<Vec<bool>, PipelineError> {
        Ok(self
            .decision_function(x)?
            .into_iter()
            .map(|d| d >= 0.0)
            .collect())
    }

    /// The polynomial kernel has no gamma in linfa, so inputs are scaled by
    /// sqrt(gamma) instead: <sx, sy> = gamma * <x, y>
    fn input_scale(&self) -> f64 {
        match self.kernel {
            Kernel::Poly => self.gamma.sqrt(),
            Kernel::Rbf | Kernel::Linear => 1.0,
        }
    }

    fn kernel_value(&self, a: &[f64], b: &[f64]) -> f64 {
        match self.kernel {
            Kernel::Rbf => {
                let sq_dist: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
                (-self.gamma * sq_dist).exp()
            }
            Kernel::Linear => a.iter().zip(b).map(|(x, y)| x * y).sum(),
            Kernel::Poly => {
                let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                (dot + POLY_COEF0).powf(POLY_DEGREE)
            }
        }
    }
}
