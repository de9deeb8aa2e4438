//! Integration tests for the classification pipeline

use credit_default::pipeline::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

fn spec(pca_components: PcaComponents, k: usize) -> PipelineSpec {
    PipelineSpec {
        pca_components,
        k,
        gamma: 0.1,
        kernel: Kernel::Rbf,
    }
}

#[test]
fn test_fit_is_deterministic() {
    let (x, y) = features_and_labels(create_credit_dataframe(90, 11));

    let first = spec(PcaComponents::All, 12).fit(&x, &y).unwrap();
    let second = spec(PcaComponents::All, 12).fit(&x, &y).unwrap();

    assert_eq!(first.predict(&x).unwrap(), second.predict(&x).unwrap());
    assert_eq!(
        first.decision_function(&x).unwrap(),
        second.decision_function(&x).unwrap()
    );
}

#[test]
fn test_fitted_pipeline_learns_payment_status() {
    let (x, y) = features_and_labels(create_credit_dataframe(120, 12));
    let fitted = spec(PcaComponents::Fixed(20), 12).fit(&x, &y).unwrap();

    let predictions = fitted.predict(&x).unwrap();
    assert_eq!(predictions.len(), x.n_rows());

    let correct = predictions.iter().zip(&y).filter(|(p, t)| p == t).count();
    assert!(
        correct as f64 / y.len() as f64 > 0.8,
        "training accuracy too low: {}/{}",
        correct,
        y.len()
    );
}

#[test]
fn test_stage_shapes() {
    let (x, y) = features_and_labels(create_credit_dataframe(60, 13));
    let fitted = spec(PcaComponents::Fixed(10), 4).fit(&x, &y).unwrap();

    // 2 sex + 4 education + 3 marriage one-hot columns, 20 scaled numerics
    assert_eq!(fitted.preprocessor.output_names().len(), 29);
    assert_eq!(fitted.stages[0].n_features_out(), Some(10));
    assert_eq!(fitted.stages[1].n_features_out(), Some(4));
    assert_eq!(fitted.transform(&x).unwrap().ncols(), 4);
    assert_eq!(fitted.feature_names(), x.names().to_vec());
}

#[test]
fn test_unknown_category_at_predict_time_errors() {
    let (x, y) = features_and_labels(create_credit_dataframe(40, 14));
    let fitted = spec(PcaComponents::All, 5).fit(&x, &y).unwrap();

    let mut rows: Vec<Vec<i64>> = Vec::new();
    let raw = create_credit_dataframe(3, 15);
    for i in 0..raw.height() {
        rows.push(
            raw_column_names()
                .iter()
                .map(|name| column_values(&raw, name)[i])
                .collect(),
        );
    }
    rows[1][4] = 3;
    rows[2][4] = 9; // MARRIAGE code never seen in training
    let (x_new, _) = features_and_labels(raw_frame_from_rows(&rows));

    let err = fitted.predict(&x_new).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::UnknownCategory { ref column, value: 9 } if column == MARRIAGE_COLUMN
    ));
}

#[test]
fn test_column_mismatch_errors() {
    let (x, y) = features_and_labels(create_credit_dataframe(40, 16));
    let fitted = spec(PcaComponents::All, 5).fit(&x, &y).unwrap();

    let names: Vec<String> = x.names().iter().rev().cloned().collect();
    let columns: Vec<Vec<f64>> = names.iter().map(|n| x.column(n).unwrap().to_vec()).collect();
    let reordered = FeatureTable::new(names, columns).unwrap();

    assert!(matches!(
        fitted.predict(&reordered),
        Err(PipelineError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_k_larger_than_features_is_invalid() {
    let (x, y) = features_and_labels(create_credit_dataframe(40, 17));
    let err = spec(PcaComponents::Fixed(5), 6).fit(&x, &y).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidParameter { name: "k", .. }));
}

#[test]
fn test_too_many_components_is_invalid() {
    let (x, y) = features_and_labels(create_credit_dataframe(15, 18));
    // 15 rows cap the component count at 15
    let err = spec(PcaComponents::Fixed(20), 5).fit(&x, &y).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidParameter { .. }));
}

#[test]
fn test_single_class_training_set_errors() {
    let (x, _) = features_and_labels(create_credit_dataframe(20, 19));
    let y = vec![false; x.n_rows()];
    let err = spec(PcaComponents::All, 5).fit(&x, &y).unwrap_err();
    assert!(matches!(err, PipelineError::SingleClass));
}

#[test]
fn test_each_kernel_fits() {
    let (x, y) = features_and_labels(create_credit_dataframe(60, 20));
    for kernel in [Kernel::Rbf, Kernel::Linear, Kernel::Poly] {
        let fitted = PipelineSpec {
            kernel,
            ..spec(PcaComponents::Fixed(10), 5)
        }
        .fit(&x, &y)
        .unwrap();
        assert_eq!(fitted.predict(&x).unwrap().len(), 60);
    }
}
