//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::search::{ParamGrid, SearchConfig, DEFAULT_MEMORY_BUDGET_MB};
use crate::pipeline::{Kernel, PcaComponents};

pub const DEFAULT_TRAIN_PATH: &str = "files/input/train_data.csv.zip";
pub const DEFAULT_TEST_PATH: &str = "files/input/test_data.csv.zip";
pub const DEFAULT_MODEL_PATH: &str = "files/models/model.json.gz";
pub const DEFAULT_METRICS_PATH: &str = "files/output/metrics.json";

/// Train a credit card default classifier and report its metrics.
///
/// Every flag defaults to the standard project layout, so running without
/// arguments from the project root reads `files/input/` and writes
/// `files/models/` and `files/output/`.
#[derive(Parser, Debug)]
#[command(name = "credit-default")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Training data (zipped CSV, CSV or Parquet)
    #[arg(long, default_value = DEFAULT_TRAIN_PATH)]
    pub train: PathBuf,

    /// Test data (zipped CSV, CSV or Parquet)
    #[arg(long, default_value = DEFAULT_TEST_PATH)]
    pub test: PathBuf,

    /// Where the gzip-compressed model artifact is written
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    pub model_output: PathBuf,

    /// Where the JSON-lines metrics file is written
    #[arg(long, default_value = DEFAULT_METRICS_PATH)]
    pub metrics_output: PathBuf,

    /// Number of stratified cross-validation folds (at least 2)
    #[arg(long, default_value = "10", value_parser = validate_cv_folds)]
    pub cv_folds: usize,

    /// PCA component counts to try (comma-separated, "all" keeps every component)
    #[arg(long, value_delimiter = ',', default_values = ["all", "20"])]
    pub pca_components: Vec<PcaComponents>,

    /// Number of features SelectKBest keeps (comma-separated)
    #[arg(long, value_delimiter = ',', default_values = ["12"])]
    pub k: Vec<usize>,

    /// Kernel coefficient values to try (comma-separated)
    #[arg(long, value_delimiter = ',', default_values = ["0.1"], value_parser = validate_gamma)]
    pub gamma: Vec<f64>,

    /// SVC kernels to try (comma-separated: rbf, linear, poly)
    #[arg(long, value_delimiter = ',', default_values = ["rbf"])]
    pub kernel: Vec<Kernel>,

    /// Worker threads for cross-validation (0 uses all cores)
    #[arg(long, default_value = "0")]
    pub jobs: usize,

    /// Memory the concurrent SVC kernel matrices may use, in MB.
    /// Lowers the worker count on large data; 0 disables the cap.
    #[arg(long, default_value_t = DEFAULT_MEMORY_BUDGET_MB)]
    pub memory_budget_mb: u64,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Hide progress bars
    #[arg(long, default_value = "false")]
    pub no_progress: bool,
}

impl Cli {
    pub fn param_grid(&self) -> ParamGrid {
        ParamGrid {
            pca_components: self.pca_components.clone(),
            k: self.k.clone(),
            gamma: self.gamma.clone(),
            kernel: self.kernel.clone(),
        }
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            cv_folds: self.cv_folds,
            jobs: self.jobs,
            memory_budget_mb: self.memory_budget_mb,
            show_progress: !self.no_progress,
        }
    }
}

/// Validator for cv_folds parameter
fn validate_cv_folds(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value < 2 {
        Err(format!("cv_folds must be at least 2, got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for gamma values
fn validate_gamma(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(value.is_finite() && value > 0.0) {
        Err(format!("gamma must be a positive number, got {}", value))
    } else {
        Ok(value)
    }
}
