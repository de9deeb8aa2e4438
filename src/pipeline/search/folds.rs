//! Stratified k-fold splitting without shuffling

use serde::{Deserialize, Serialize};

use crate::pipeline::error::SearchError;

/// One train/validation split, as row indices in ascending order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Splits rows into `n_splits` folds that preserve the class balance.
///
/// Labels are sorted by class and dealt round-robin to the folds, so each
/// fold's share of a class differs by at most one row. Rows of a class keep
/// their original order when assigned, which makes the split deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StratifiedKFold {
    pub n_splits: usize,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn split(&self, y: &[bool]) -> Result<Vec<Fold>, SearchError> {
        let k = self.n_splits;
        if k < 2 {
            return Err(SearchError::InvalidFolds(format!(
                "n_splits must be at least 2, got {}",
                k
            )));
        }
        if y.len() < k {
            return Err(SearchError::InvalidFolds(format!(
                "cannot split {} rows into {} folds",
                y.len(),
                k
            )));
        }

        // Class order follows first appearance
        let first = y[0];
        let classes: Vec<bool> = if y.iter().any(|&v| v != first) {
            vec![first, !first]
        } else {
            vec![first]
        };
        let counts: Vec<usize> = classes
            .iter()
            .map(|&c| y.iter().filter(|&&v| v == c).count())
            .collect();

        if counts.iter().all(|&c| c < k) {
            return Err(SearchError::InvalidFolds(format!(
                "n_splits = {} is greater than the number of members in every class ({:?})",
                k, counts
            )));
        }

        // Deal the class-sorted labels round-robin: fold f takes positions f, f + k, ...
        let mut allocation = vec![vec![0usize; classes.len()]; k];
        let sorted: Vec<usize> = counts
            .iter()
            .enumerate()
            .flat_map(|(class, &count)| std::iter::repeat(class).take(count))
            .collect();
        for (pos, &class) in sorted.iter().enumerate() {
            allocation[pos % k][class] += 1;
        }

        let mut test_fold = vec![0usize; y.len()];
        for (class_idx, &class) in classes.iter().enumerate() {
            let folds_for_class = (0..k).flat_map(|f| std::iter::repeat(f).take(allocation[f][class_idx]));
            let rows = y.iter().enumerate().filter(|&(_, &v)| v == class).map(|(i, _)| i);
            for (row, fold) in rows.zip(folds_for_class) {
                test_fold[row] = fold;
            }
        }

        Ok((0..k)
            .map(|f| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..y.len()).partition(|&i| test_fold[i] == f);
                Fold { train, test }
            })
            .collect())
    }
}
