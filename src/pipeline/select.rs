//! Univariate feature selection with the ANOVA F-test

use faer::Mat;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use super::error::PipelineError;
use super::stage::{check_width, Transform};

/// ANOVA F-statistic and p-value of each column against the class labels.
///
/// Constant columns (and label vectors with a single class) give a NaN score.
pub fn f_classif(x: &Mat<f64>, y: &[bool]) -> (Vec<f64>, Vec<f64>) {
    let n = x.nrows();
    let n_pos = y.iter().filter(|&&v| v).count();
    let n_neg = n - n_pos;
    let n_groups = (n_pos > 0) as usize + (n_neg > 0) as usize;

    let df_between = n_groups as f64 - 1.0;
    let df_within = n as f64 - n_groups as f64;
    let distribution = FisherSnedecor::new(df_between, df_within).ok();

    (0..x.ncols())
        .map(|j| {
            let (mut sum_pos, mut sum_neg) = (0.0, 0.0);
            for (i, &label) in y.iter().enumerate() {
                if label {
                    sum_pos += x[(i, j)];
                } else {
                    sum_neg += x[(i, j)];
                }
            }
            let mean = (sum_pos + sum_neg) / n as f64;
            let mean_pos = if n_pos > 0 { sum_pos / n_pos as f64 } else { 0.0 };
            let mean_neg = if n_neg > 0 { sum_neg / n_neg as f64 } else { 0.0 };

            let ss_between = n_pos as f64 * (mean_pos - mean).powi(2)
                + n_neg as f64 * (mean_neg - mean).powi(2);
            let ss_within: f64 = y
                .iter()
                .enumerate()
                .map(|(i, &label)| {
                    let group_mean = if label { mean_pos } else { mean_neg };
                    (x[(i, j)] - group_mean).powi(2)
                })
                .sum();

            let f = (ss_between / df_between) / (ss_within / df_within);
            let p = match (&distribution, f) {
                (_, f) if f.is_nan() => f64::NAN,
                (_, f) if f.is_infinite() => 0.0,
                (Some(dist), f) => 1.0 - dist.cdf(f),
                (None, _) => f64::NAN,
            };
            (f, p)
        })
        .unzip()
}

/// Learned selection state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedSelection {
    pub n_features_in: usize,
    #[serde(with = "non_finite")]
    pub scores: Vec<f64>,
    #[serde(with = "non_finite")]
    pub p_values: Vec<f64>,
    /// Selected column indices, ascending
    pub selected: Vec<usize>,
}

/// JSON has no NaN or infinity, so those scores are written as strings
mod non_finite {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|&v| {
            if v.is_finite() {
                Repr::Number(v)
            } else {
                Repr::Text(v.to_string())
            }
        }))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let raw = Vec::<Repr>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|r| match r {
                Repr::Number(v) => v,
                Repr::Text(t) => t.parse().unwrap_or(f64::NAN),
            })
            .collect())
    }
}

/// Keep the `k` columns with the highest F-scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectKBest {
    pub k: usize,
    fitted: Option<FittedSelection>,
}

impl SelectKBest {
    pub fn new(k: usize) -> Self {
        Self { k, fitted: None }
    }

    pub fn fitted(&self) -> Option<&FittedSelection> {
        self.fitted.as_ref()
    }
}

impl Transform for SelectKBest {
    fn name(&self) -> &'static str {
        "select_k_best"
    }

    fn fit(&mut self, x: &Mat<f64>, y: &[bool]) -> Result<(), PipelineError> {
        let p = x.ncols();
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyDataset);
        }
        if y.len() != x.nrows() {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("{} labels", x.nrows()),
                actual: format!("{} labels", y.len()),
            });
        }
        if self.k == 0 || self.k > p {
            return Err(PipelineError::invalid(
                "k",
                format!("{} must be between 1 and n_features = {}", self.k, p),
            ));
        }

        let (scores, p_values) = f_classif(x, y);

        // NaN ranks lowest. A stable ascending sort keeps the last k, so among
        // tied scores the later column wins.
        let rank_score = |i: usize| if scores[i].is_nan() { f64::NEG_INFINITY } else { scores[i] };
        let mut order: Vec<usize> = (0..p).collect();
        order.sort_by(|&a, &b| {
            rank_score(a)
                .partial_cmp(&rank_score(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut selected: Vec<usize> = order[p - self.k..].to_vec();
        selected.sort_unstable();

        self.fitted = Some(FittedSelection {
            n_features_in: p,
            scores,
            p_values,
            selected,
        });
        Ok(())
    }

    fn transform(&self, x: &Mat<f64>) -> Result<Mat<f64>, PipelineError> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or(PipelineError::NotFitted("select_k_best"))?;
        check_width("select_k_best", fitted.n_features_in, x)?;

        Ok(Mat::from_fn(x.nrows(), fitted.selected.len(), |i, c| {
            x[(i, fitted.selected[c])]
        }))
    }

    fn n_features_out(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.selected.len())
    }
}
