//! Dense numeric view of a feature frame
//!
//! The pipeline stages work on plain `f64` columns so that cross-validation
//! folds can be cut by row index without going back through polars.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::PipelineError;

/// Named `f64` columns of equal length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    n_rows: usize,
}

impl FeatureTable {
    /// Build a table from named columns. All columns must have the same length.
    pub fn new(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self, PipelineError> {
        if names.len() != columns.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("{} column names", columns.len()),
                actual: format!("{} names", names.len()),
            });
        }

        let n_rows = columns.first().map(Vec::len).unwrap_or(0);
        if let Some((name, col)) = names.iter().zip(&columns).find(|(_, c)| c.len() != n_rows) {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("{} rows", n_rows),
                actual: format!("{} rows in column '{}'", col.len(), name),
            });
        }

        Ok(Self {
            names,
            columns,
            n_rows,
        })
    }

    /// Cast every column of the frame to `f64`, keeping column order.
    pub fn from_frame(df: &DataFrame) -> Result<Self, PipelineError> {
        let mut names = Vec::with_capacity(df.width());
        let mut columns = Vec::with_capacity(df.width());

        for column in df.get_columns() {
            let name = column.name().to_string();
            if column.null_count() > 0 {
                return Err(PipelineError::NullValues(name));
            }

            let cast = column.cast(&DataType::Float64)?;
            let values: Vec<f64> = cast.f64()?.into_no_null_iter().collect();

            names.push(name);
            columns.push(values);
        }

        let mut table = Self::new(names, columns)?;
        table.n_rows = df.height();
        Ok(table)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Values of a column by name
    pub fn column(&self, name: &str) -> Result<&[f64], PipelineError> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    }

    /// New table holding the given rows, in the given order
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|col| rows.iter().map(|&r| col[r]).collect())
            .collect();

        Self {
            names: self.names.clone(),
            columns,
            n_rows: rows.len(),
        }
    }
}

/// Gather labels by row index
pub fn select_labels(labels: &[bool], rows: &[usize]) -> Vec<bool> {
    rows.iter().map(|&r| labels[r]).collect()
}
