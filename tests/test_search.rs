//! Integration tests for cross-validated grid search

use credit_default::pipeline::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

fn quiet(cv_folds: usize) -> SearchConfig {
    SearchConfig {
        cv_folds,
        jobs: 2,
        memory_budget_mb: DEFAULT_MEMORY_BUDGET_MB,
        show_progress: false,
    }
}

fn grid(pca_components: Vec<PcaComponents>, k: Vec<usize>) -> ParamGrid {
    ParamGrid {
        pca_components,
        k,
        gamma: vec![0.1],
        kernel: vec![Kernel::Rbf],
    }
}

#[test]
fn test_search_scores_every_candidate() {
    let (x, y) = features_and_labels(create_credit_dataframe(90, 21));
    let search = GridSearch::new(grid(vec![PcaComponents::All, PcaComponents::Fixed(20)], vec![12]), quiet(3));
    let result = search.fit(&x, &y).unwrap();

    assert_eq!(result.candidates.len(), 2);
    assert_eq!(result.cv_folds, 3);
    for candidate in &result.candidates {
        assert!(candidate.succeeded());
        assert_eq!(candidate.fold_scores.len(), 3);
        let mean = candidate.mean_score.unwrap();
        assert_unit_interval(mean, "mean_score");
        assert!(candidate.std_score.unwrap() >= 0.0);
    }

    let best = &result.candidates[result.best_index];
    assert_eq!(best.rank, 1);
    assert_eq!(best.spec, result.best_spec);
    assert_eq!(best.mean_score, Some(result.best_score));
    assert!(result
        .candidates
        .iter()
        .all(|c| c.mean_score.unwrap() <= result.best_score));
    assert_eq!(result.best_pipeline.spec, result.best_spec);
}

#[test]
fn test_oversized_k_fails_only_that_candidate() {
    let (x, y) = features_and_labels(create_credit_dataframe(60, 22));
    // Fixed(5) leaves 5 features, so k = 8 cannot be satisfied there
    let search = GridSearch::new(grid(vec![PcaComponents::Fixed(5), PcaComponents::Fixed(10)], vec![8]), quiet(3));
    let result = search.fit(&x, &y).unwrap();

    assert!(!result.candidates[0].succeeded());
    assert!(result.candidates[0].error.as_deref().unwrap().contains("k"));
    assert_eq!(result.candidates[0].rank, 2);
    assert!(result.candidates[1].succeeded());
    assert_eq!(result.best_index, 1);
    assert_eq!(result.best_spec.pca_components, PcaComponents::Fixed(10));
}

#[test]
fn test_all_candidates_failing_fails_the_search() {
    let (x, y) = features_and_labels(create_credit_dataframe(60, 23));
    let search = GridSearch::new(grid(vec![PcaComponents::Fixed(5)], vec![6, 7]), quiet(3));

    let err = search.fit(&x, &y).unwrap_err();
    assert!(matches!(err, SearchError::AllCandidatesFailed { count: 2, .. }));
}

#[test]
fn test_identical_candidates_tie_to_the_first() {
    let (x, y) = features_and_labels(create_credit_dataframe(60, 24));
    let search = GridSearch::new(grid(vec![PcaComponents::Fixed(10)], vec![5, 5]), quiet(3));
    let result = search.fit(&x, &y).unwrap();

    assert_eq!(result.candidates[0].fold_scores, result.candidates[1].fold_scores);
    assert_eq!(result.best_index, 0);
    assert_eq!(result.candidates[0].rank, 1);
    assert_eq!(result.candidates[1].rank, 1);
}

#[test]
fn test_results_do_not_depend_on_thread_count() {
    let (x, y) = features_and_labels(create_credit_dataframe(60, 25));
    let grid = grid(vec![PcaComponents::All, PcaComponents::Fixed(8)], vec![3, 6]);

    let serial = GridSearch::new(grid.clone(), SearchConfig { jobs: 1, ..quiet(3) })
        .fit(&x, &y)
        .unwrap();
    let parallel = GridSearch::new(grid, SearchConfig { jobs: 4, ..quiet(3) })
        .fit(&x, &y)
        .unwrap();

    assert_eq!(serial.best_index, parallel.best_index);
    for (a, b) in serial.candidates.iter().zip(&parallel.candidates) {
        assert_eq!(a.fold_scores, b.fold_scores);
    }
}

#[test]
fn test_tight_memory_budget_runs_serially_with_same_scores() {
    let (x, y) = features_and_labels(create_credit_dataframe(400, 27));
    let grid = grid(vec![PcaComponents::All, PcaComponents::Fixed(8)], vec![6]);

    // About 267 training rows per fold: one 570 KB kernel matrix fits in 1 MB, two do not
    let capped = SearchConfig { jobs: 4, memory_budget_mb: 1, ..quiet(3) };
    assert_eq!(capped.workers(267), 1);

    let unbounded = GridSearch::new(grid.clone(), SearchConfig { jobs: 4, memory_budget_mb: 0, ..quiet(3) })
        .fit(&x, &y)
        .unwrap();
    let bounded = GridSearch::new(grid, capped).fit(&x, &y).unwrap();

    assert_eq!(unbounded.best_index, bounded.best_index);
    for (a, b) in unbounded.candidates.iter().zip(&bounded.candidates) {
        assert_eq!(a.fold_scores, b.fold_scores);
    }
}

#[test]
fn test_empty_grid_is_rejected() {
    let (x, y) = features_and_labels(create_credit_dataframe(30, 26));
    let search = GridSearch::new(grid(vec![], vec![5]), quiet(3));
    assert!(matches!(search.fit(&x, &y), Err(SearchError::EmptyGrid)));
}

#[test]
fn test_more_folds_than_rows_is_rejected() {
    let (x, y) = features_and_labels(create_credit_dataframe(4, 27));
    let search = GridSearch::new(ParamGrid::default(), quiet(10));
    assert!(matches!(search.fit(&x, &y), Err(SearchError::InvalidFolds(_))));
}

#[test]
fn test_default_grid() {
    let grid = ParamGrid::default();
    let candidates = grid.candidates();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].pca_components, PcaComponents::All);
    assert_eq!(candidates[1].pca_components, PcaComponents::Fixed(20));
    assert!(candidates.iter().all(|c| c.k == 12 && c.gamma == 0.1 && c.kernel == Kernel::Rbf));
}

#[test]
fn test_search_result_predicts_with_best_pipeline() {
    let (x, y) = features_and_labels(create_credit_dataframe(60, 28));
    let result = GridSearch::new(grid(vec![PcaComponents::Fixed(10)], vec![5]), quiet(2))
        .fit(&x, &y)
        .unwrap();
    assert_eq!(result.predict(&x).unwrap(), result.best_pipeline.predict(&x).unwrap());
}
