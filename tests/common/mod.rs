//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use credit_default::pipeline::{clean_dataset, split_features_target, FeatureTable};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ::zip::write::SimpleFileOptions;

pub const PAY_STATUS_COLUMNS: [&str; 6] = ["PAY_0", "PAY_2", "PAY_3", "PAY_4", "PAY_5", "PAY_6"];

/// Column names of a raw credit file, in file order
pub fn raw_column_names() -> Vec<String> {
    let mut names: Vec<String> = ["ID", "LIMIT_BAL", "SEX", "EDUCATION", "MARRIAGE", "AGE"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    names.extend(PAY_STATUS_COLUMNS.iter().map(|s| s.to_string()));
    names.extend((1..=6).map(|i| format!("BILL_AMT{}", i)));
    names.extend((1..=6).map(|i| format!("PAY_AMT{}", i)));
    names.push("default payment next month".to_string());
    names
}

/// Build a raw frame from per-row values in `raw_column_names` order
pub fn raw_frame_from_rows(rows: &[Vec<i64>]) -> DataFrame {
    let names = raw_column_names();
    let columns: Vec<Column> = names
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let values: Vec<i64> = rows.iter().map(|r| r[j]).collect();
            Column::new(name.as_str().into(), values)
        })
        .collect();
    DataFrame::new(columns).unwrap()
}

/// One raw row. Defaults follow late payment status, so the label is learnable.
fn synthetic_row(id: i64, rng: &mut StdRng, sex: i64, education: i64, marriage: i64, default: bool) -> Vec<i64> {
    let pay_0 = if default {
        rng.gen_range(1..=3)
    } else {
        rng.gen_range(-1..=0)
    };
    let limit = if default {
        rng.gen_range(10..=150) * 1000
    } else {
        rng.gen_range(100..=500) * 1000
    };

    let mut row = vec![id, limit, sex, education, marriage, rng.gen_range(21..=65), pay_0];
    row.extend((0..5).map(|_| rng.gen_range(-2..=2)));
    row.extend((0..6).map(|_| rng.gen_range(0..=200_000)));
    row.extend((0..6).map(|_| rng.gen_range(0..=20_000)));
    row.push(default as i64);
    row
}

/// Raw credit frame with every categorical code present many times.
///
/// Every third row defaults; codes cycle so cross-validation folds see all of them.
pub fn create_credit_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<Vec<i64>> = (0..rows)
        .map(|i| {
            let sex = 1 + (i % 2) as i64;
            let education = 1 + (i % 4) as i64;
            let marriage = 1 + ((i / 2) % 3) as i64;
            synthetic_row(i as i64 + 1, &mut rng, sex, education, marriage, i % 3 == 0)
        })
        .collect();
    raw_frame_from_rows(&data)
}

/// Four valid rows, two defaults, sharing the same categorical codes
pub fn create_tiny_credit_dataframe(seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<Vec<i64>> = [true, false, true, false]
        .iter()
        .enumerate()
        .map(|(i, &default)| synthetic_row(i as i64 + 1, &mut rng, 2, 2, 1, default))
        .collect();
    raw_frame_from_rows(&data)
}

/// Cleaned feature table and labels from a raw frame
pub fn features_and_labels(raw: DataFrame) -> (FeatureTable, Vec<bool>) {
    let cleaned = clean_dataset(raw).unwrap();
    let (features, labels) = split_features_target(&cleaned).unwrap();
    (FeatureTable::from_frame(&features).unwrap(), labels)
}

/// Write a frame as CSV into a single-entry zip archive
pub fn write_zipped_csv(dir: &Path, file_name: &str, df: &mut DataFrame) -> PathBuf {
    let mut csv = Vec::new();
    CsvWriter::new(&mut csv).finish(df).unwrap();

    let path = dir.join(file_name);
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = ::zip::ZipWriter::new(file);
    let entry = file_name.trim_end_matches(".zip");
    zip.start_file(entry, SimpleFileOptions::default()).unwrap();
    zip.write_all(&csv).unwrap();
    zip.finish().unwrap();
    path
}

/// Write a frame as a plain CSV file
pub fn write_csv(dir: &Path, file_name: &str, df: &mut DataFrame) -> PathBuf {
    let path = dir.join(file_name);
    let mut file = std::fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
    path
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}

/// Assert that a score lies in [0, 1]
pub fn assert_unit_interval(value: f64, name: &str) {
    assert!((0.0..=1.0).contains(&value), "{} = {} is outside [0, 1]", name, value);
}

/// Integer values of a column
pub fn column_values(df: &DataFrame, name: &str) -> Vec<i64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Int64)
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}
