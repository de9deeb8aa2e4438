//! Dataset loading and cleaning for the credit-default data
//!
//! Input files are zipped CSVs (`*.csv.zip`); plain CSV and Parquet are
//! accepted as well so fixtures and exported frames can be fed back in.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

/// Canonical name of the outcome column after cleaning
pub const TARGET_COLUMN: &str = "default";
/// Outcome column as it appears in the raw files
pub const RAW_TARGET_COLUMN: &str = "default payment next month";
/// Customer identifier, dropped during cleaning
pub const ID_COLUMN: &str = "ID";
pub const EDUCATION_COLUMN: &str = "EDUCATION";
pub const MARRIAGE_COLUMN: &str = "MARRIAGE";
pub const SEX_COLUMN: &str = "SEX";

/// Code used for "not available" in EDUCATION and MARRIAGE
pub const NOT_AVAILABLE_CODE: i64 = 0;
/// EDUCATION codes above this collapse into the "others" bucket
pub const EDUCATION_OTHERS_CODE: i64 = 4;

/// Load a dataset from a file (zipped CSV, CSV or Parquet based on extension)
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    // 0 means full table scan
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let df = match extension.as_str() {
        "zip" => read_zipped_csv(path, schema_length)?,
        "csv" => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
            CsvReadOptions::default()
                .with_has_header(true)
                .with_infer_schema_length(schema_length)
                .into_reader_with_file_handle(file)
                .finish()
                .with_context(|| format!("Failed to load CSV file: {}", path.display()))?
        }
        "parquet" => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open Parquet file: {}", path.display()))?;
            ParquetReader::new(file)
                .finish()
                .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?
        }
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: zip (zipped CSV), csv, parquet",
            extension
        ),
    };

    Ok(df)
}

/// Read the first file entry of a zip archive as a CSV with a header row
fn read_zipped_csv(path: &Path, schema_length: Option<usize>) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open zip archive: {}", path.display()))?;
    let mut archive = ::zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read zip archive: {}", path.display()))?;

    let index = (0..archive.len())
        .find(|&i| archive.by_index(i).map(|e| e.is_file()).unwrap_or(false))
        .ok_or_else(|| anyhow::anyhow!("Zip archive {} contains no files", path.display()))?;

    let mut entry = archive.by_index(index)?;
    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .with_context(|| format!("Failed to decompress {} from {}", entry.name(), path.display()))?;

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(schema_length)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .with_context(|| format!("Failed to parse CSV inside {}", path.display()))
}

/// Clean a raw frame:
/// - rename the outcome column to `default`
/// - drop `ID`
/// - drop rows where EDUCATION or MARRIAGE is the "not available" code
///   (null codes are kept, they are not the code)
/// - collapse EDUCATION codes above 4 into 4
///
/// Running it on an already-cleaned frame returns the same frame.
pub fn clean_dataset(mut df: DataFrame) -> Result<DataFrame> {
    let has_column = |df: &DataFrame, name: &str| df.get_column_names().iter().any(|c| c.as_str() == name);

    let already_clean = has_column(&df, TARGET_COLUMN)
        && !has_column(&df, RAW_TARGET_COLUMN)
        && !has_column(&df, ID_COLUMN);

    if !already_clean {
        df.rename(RAW_TARGET_COLUMN, TARGET_COLUMN.into())
            .with_context(|| format!("Outcome column '{}' not found", RAW_TARGET_COLUMN))?;
        df = df
            .drop(ID_COLUMN)
            .with_context(|| format!("Identifier column '{}' not found", ID_COLUMN))?;
    }

    let cleaned = df
        .lazy()
        .filter(
            // Missing codes are not the sentinel; FeatureTable rejects them by name
            col(EDUCATION_COLUMN)
                .neq_missing(lit(NOT_AVAILABLE_CODE))
                .and(col(MARRIAGE_COLUMN).neq_missing(lit(NOT_AVAILABLE_CODE))),
        )
        .with_column(
            when(col(EDUCATION_COLUMN).gt(lit(EDUCATION_OTHERS_CODE)))
                .then(lit(EDUCATION_OTHERS_CODE))
                .otherwise(col(EDUCATION_COLUMN))
                .alias(EDUCATION_COLUMN),
        )
        .collect()
        .context("Failed to filter and recode EDUCATION/MARRIAGE")?;

    Ok(cleaned)
}

/// Load a dataset and clean it in one step
pub fn load_clean_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let df = load_dataset(path, infer_schema_length)?;
    clean_dataset(df).with_context(|| format!("Failed to clean dataset: {}", path.display()))
}

/// Split a cleaned frame into the feature frame and the binary label vector.
///
/// Feature column order is preserved; labels are `true` for a default.
pub fn split_features_target(df: &DataFrame) -> Result<(DataFrame, Vec<bool>)> {
    let target = df
        .column(TARGET_COLUMN)
        .with_context(|| format!("Target column '{}' not found", TARGET_COLUMN))?
        .cast(&DataType::Int64)
        .with_context(|| format!("Target column '{}' must be numeric", TARGET_COLUMN))?;

    let labels = target
        .i64()?
        .iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            Some(other) => anyhow::bail!(
                "Target column '{}' must be binary 0/1, found {} at row {}",
                TARGET_COLUMN,
                other,
                row
            ),
            None => anyhow::bail!("Target column '{}' has a null at row {}", TARGET_COLUMN, row),
        })
        .collect::<Result<Vec<bool>>>()?;

    let features = df.drop(TARGET_COLUMN)?;

    Ok((features, labels))
}

/// Basic shape information about a loaded dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub rows: usize,
    pub columns: usize,
    pub memory_mb: f64,
    /// Share of rows labelled as default, when the target column is present
    pub default_rate: Option<f64>,
}

/// Collect row/column counts, estimated memory and default rate
pub fn dataset_stats(df: &DataFrame) -> DatasetStats {
    let (rows, columns) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);

    let default_rate = df
        .column(TARGET_COLUMN)
        .ok()
        .and_then(|c| c.cast(&DataType::Float64).ok())
        .and_then(|c| c.f64().ok().and_then(|ca| ca.mean()));

    DatasetStats {
        rows,
        columns,
        memory_mb,
        default_rate,
    }
}
