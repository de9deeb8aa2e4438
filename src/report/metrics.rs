//! Classification metrics for the positive (default) class

use serde::{Deserialize, Serialize};

/// Which rows a metric was computed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Train,
    Test,
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Partition::Train => write!(f, "train"),
            Partition::Test => write!(f, "test"),
        }
    }
}

/// 2x2 counts with `true` as the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionMatrix {
    pub fn compute(y_true: &[bool], y_pred: &[bool]) -> Self {
        let mut cm = Self::default();
        for (&actual, &predicted) in y_true.iter().zip(y_pred) {
            match (actual, predicted) {
                (false, false) => cm.tn += 1,
                (false, true) => cm.fp += 1,
                (true, false) => cm.fn_ += 1,
                (true, true) => cm.tp += 1,
            }
        }
        cm
    }

    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Mean recall over the classes present in `y_true`.
///
/// Returns 0.0 for empty input.
pub fn balanced_accuracy(y_true: &[bool], y_pred: &[bool]) -> f64 {
    let cm = ConfusionMatrix::compute(y_true, y_pred);
    let recalls: Vec<f64> = [(cm.tp, cm.tp + cm.fn_), (cm.tn, cm.tn + cm.fp)]
        .into_iter()
        .filter(|&(_, support)| support > 0)
        .map(|(hits, support)| ratio(hits, support))
        .collect();

    if recalls.is_empty() {
        0.0
    } else {
        recalls.iter().sum::<f64>() / recalls.len() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub balanced_accuracy: f64,
}

impl ClassificationMetrics {
    /// Zero denominators score 0.0 instead of failing
    pub fn compute(y_true: &[bool], y_pred: &[bool]) -> Self {
        let cm = ConfusionMatrix::compute(y_true, y_pred);
        let precision = ratio(cm.tp, cm.tp + cm.fp);
        let recall = ratio(cm.tp, cm.tp + cm.fn_);
        let f1_score = ratio(2 * cm.tp, 2 * cm.tp + cm.fp + cm.fn_);

        Self {
            precision,
            recall,
            f1_score,
            balanced_accuracy: balanced_accuracy(y_true, y_pred),
        }
    }
}

/// Counts for one actual class, keyed by predicted class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictedCounts {
    pub predicted_0: usize,
    pub predicted_1: usize,
}

/// One line of the metrics file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetricsRecord {
    Metrics {
        dataset: Partition,
        precision: f64,
        balanced_accuracy: f64,
        recall: f64,
        f1_score: f64,
    },
    CmMatrix {
        dataset: Partition,
        true_0: PredictedCounts,
        true_1: PredictedCounts,
    },
}

impl MetricsRecord {
    pub fn metrics(dataset: Partition, m: &ClassificationMetrics) -> Self {
        MetricsRecord::Metrics {
            dataset,
            precision: m.precision,
            balanced_accuracy: m.balanced_accuracy,
            recall: m.recall,
            f1_score: m.f1_score,
        }
    }

    pub fn confusion(dataset: Partition, cm: &ConfusionMatrix) -> Self {
        MetricsRecord::CmMatrix {
            dataset,
            true_0: PredictedCounts {
                predicted_0: cm.tn,
                predicted_1: cm.fp,
            },
            true_1: PredictedCounts {
                predicted_0: cm.fn_,
                predicted_1: cm.tp,
            },
        }
    }

    pub fn dataset(&self) -> Partition {
        match self {
            MetricsRecord::Metrics { dataset, .. } | MetricsRecord::CmMatrix { dataset, .. } => {
                *dataset
            }
        }
    }
}
