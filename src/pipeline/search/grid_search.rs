//! Exhaustive grid search with stratified cross-validation

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::folds::{Fold, StratifiedKFold};
use super::grid::ParamGrid;
use crate::pipeline::error::{PipelineError, SearchError};
use crate::pipeline::estimator::{FittedPipeline, PipelineSpec};
use crate::pipeline::table::{select_labels, FeatureTable};
use crate::report::metrics::balanced_accuracy;
use crate::utils::progress::{cv_progress, finish_cv_progress};

/// Name of the scoring function, recorded in the model artifact
pub const SCORING: &str = "balanced_accuracy";

/// Default cap on the memory held by concurrent kernel matrices
pub const DEFAULT_MEMORY_BUDGET_MB: u64 = 8192;

/// Cross-validation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub cv_folds: usize,
    /// Worker threads; 0 uses every available core
    pub jobs: usize,
    /// Upper bound for the kernel matrices of fits running at once; 0 is unbounded
    pub memory_budget_mb: u64,
    pub show_progress: bool,
}

impl SearchConfig {
    /// Fits to run at once when each trains on `n_fit_rows` rows
    pub fn workers(&self, n_fit_rows: usize) -> usize {
        concurrent_fits(
            self.jobs,
            rayon::current_num_threads(),
            n_fit_rows,
            self.memory_budget_mb.saturating_mul(1024 * 1024),
        )
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cv_folds: 10,
            jobs: 0,
            memory_budget_mb: DEFAULT_MEMORY_BUDGET_MB,
            show_progress: true,
        }
    }
}

/// Cross-validation outcome of one grid point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub spec: PipelineSpec,
    /// Empty when the candidate failed
    pub fold_scores: Vec<f64>,
    pub mean_score: Option<f64>,
    pub std_score: Option<f64>,
    /// 1 is best; failed candidates rank after every successful one
    pub rank: usize,
    pub error: Option<String>,
}

impl CandidateResult {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything the search learned, including the refitted best pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub scoring: String,
    pub cv_folds: usize,
    pub best_index: usize,
    pub best_spec: PipelineSpec,
    pub best_score: f64,
    pub candidates: Vec<CandidateResult>,
    pub best_pipeline: FittedPipeline,
}

impl SearchResult {
    pub fn predict(&self, x: &FeatureTable) -> Result<Vec<bool>, PipelineError> {
        self.best_pipeline.predict(x)
    }
}

#[derive(Debug, Clone)]
pub struct GridSearch {
    pub grid: ParamGrid,
    pub config: SearchConfig,
}

impl GridSearch {
    pub fn new(grid: ParamGrid, config: SearchConfig) -> Self {
        Self { grid, config }
    }

    /// Score every candidate on every fold, pick the best mean score and
    /// refit it on all of `x`.
    pub fn fit(&self, x: &FeatureTable, y: &[bool]) -> Result<SearchResult, SearchError> {
        let candidates = self.grid.candidates();
        if candidates.is_empty() {
            return Err(SearchError::EmptyGrid);
        }
        let folds = StratifiedKFold::new(self.config.cv_folds).split(y)?;

        let tasks: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
            .collect();

        let largest_fit = folds.iter().map(|f| f.train.len()).max().unwrap_or(0);
        let workers = self.config.workers(largest_fit);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| SearchError::ThreadPool(e.to_string()))?;

        let pb = cv_progress(tasks.len() as u64, workers, self.config.show_progress);

        // Collecting an indexed parallel iterator keeps task order, so the
        // merge below does not depend on scheduling
        let evaluate = || -> Vec<Result<f64, PipelineError>> {
            tasks
                .par_iter()
                .map(|&(c, f)| {
                    let score = evaluate_fold(&candidates[c], x, y, &folds[f]);
                    pb.inc(1);
                    score
                })
                .collect()
        };

        let fold_results = pool.install(evaluate);

        let mut results = summarize(&candidates, fold_results, folds.len());
        assign_ranks(&mut results);

        let n_failed = results.iter().filter(|r| !r.succeeded()).count();
        finish_cv_progress(&pb, candidates.len(), folds.len(), n_failed);

        let (best_index, best_score) = results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.mean_score.map(|m| (i, m)))
            .fold(None, |best: Option<(usize, f64)>, (i, score)| match best {
                Some((_, best_score)) if score <= best_score => best,
                _ => Some((i, score)),
            })
            .ok_or_else(|| SearchError::AllCandidatesFailed {
                count: results.len(),
                first_error: results
                    .iter()
                    .find_map(|r| r.error.clone())
                    .unwrap_or_default(),
            })?;

        let best_spec = candidates[best_index];
        let best_pipeline = best_spec.fit(x, y).map_err(SearchError::Refit)?;

        Ok(SearchResult {
            scoring: SCORING.to_string(),
            cv_folds: folds.len(),
            best_index,
            best_spec,
            best_score,
            candidates: results,
            best_pipeline,
        })
    }
}

/// Bytes of the dense `f64` kernel matrix an SVC fit on `n_rows` rows holds
pub fn kernel_matrix_bytes(n_rows: usize) -> u64 {
    let n = n_rows as u64;
    n.saturating_mul(n).saturating_mul(8)
}

/// Number of fits that may run at once.
///
/// `jobs` (0 means `cores`) is lowered until that many kernel matrices of
/// `n_fit_rows` rows fit in `memory_budget_bytes`. A budget of 0 disables
/// the cap. The result is never below 1.
pub fn concurrent_fits(jobs: usize, cores: usize, n_fit_rows: usize, memory_budget_bytes: u64) -> usize {
    let requested = if jobs == 0 { cores } else { jobs }.max(1);
    if memory_budget_bytes == 0 {
        return requested;
    }

    let affordable = memory_budget_bytes / kernel_matrix_bytes(n_fit_rows).max(1);
    requested.min(usize::try_from(affordable).unwrap_or(usize::MAX)).max(1)
}

/// Fit on the fold's training rows and score balanced accuracy on the held-out rows
fn evaluate_fold(
    spec: &PipelineSpec,
    x: &FeatureTable,
    y: &[bool],
    fold: &Fold,
) -> Result<f64, PipelineError> {
    let x_train = x.select_rows(&fold.train);
    let y_train = select_labels(y, &fold.train);
    let x_test = x.select_rows(&fold.test);
    let y_test = select_labels(y, &fold.test);

    let fitted = spec.fit(&x_train, &y_train)?;
    let predictions = fitted.predict(&x_test)?;
    Ok(balanced_accuracy(&y_test, &predictions))
}

/// Group task results per candidate; the first fold error fails the candidate
fn summarize(
    candidates: &[PipelineSpec],
    fold_results: Vec<Result<f64, PipelineError>>,
    n_folds: usize,
) -> Vec<CandidateResult> {
    let mut fold_results = fold_results.into_iter();

    candidates
        .iter()
        .map(|spec| {
            // Take the whole chunk first so an early error leaves no folds behind
            let chunk: Vec<_> = fold_results.by_ref().take(n_folds).collect();
            match chunk.into_iter().collect::<Result<Vec<f64>, PipelineError>>() {
                Ok(fold_scores) => {
                    let n = fold_scores.len() as f64;
                    let mean = fold_scores.iter().sum::<f64>() / n;
                    let std = (fold_scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n).sqrt();
                    CandidateResult {
                        spec: *spec,
                        fold_scores,
                        mean_score: Some(mean),
                        std_score: Some(std),
                        rank: 0,
                        error: None,
                    }
                }
                Err(e) => CandidateResult {
                    spec: *spec,
                    fold_scores: Vec::new(),
                    mean_score: None,
                    std_score: None,
                    rank: 0,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect()
}

/// Rank by mean score, equal scores sharing the lowest rank
fn assign_ranks(results: &mut [CandidateResult]) {
    let scores: Vec<Option<f64>> = results.iter().map(|r| r.mean_score).collect();
    let n_succeeded = scores.iter().filter(|s| s.is_some()).count();

    for (result, score) in results.iter_mut().zip(&scores) {
        result.rank = match score {
            Some(s) => 1 + scores.iter().flatten().filter(|&&other| other > *s).count(),
            None => n_succeeded + 1,
        };
    }
}
