//! Column-wise preprocessing: one-hot encoding of categorical codes and
//! standardization of numeric columns.
//!
//! Output layout is the categorical block, then the numeric block, then any
//! passthrough columns, each in the order the columns were configured or
//! found in the input.

use faer::Mat;
use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::loader::{EDUCATION_COLUMN, MARRIAGE_COLUMN, SEX_COLUMN};
use super::table::FeatureTable;

/// Categorical columns of the credit data, in encoding order
pub const CATEGORICAL_COLUMNS: [&str; 3] = [EDUCATION_COLUMN, MARRIAGE_COLUMN, SEX_COLUMN];

/// One-hot encoder for a single integer-coded column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub column: String,
    /// Sorted distinct codes seen during fit
    pub categories: Vec<i64>,
}

impl OneHotEncoder {
    pub fn fit(column: &str, values: &[f64]) -> Result<Self, PipelineError> {
        let mut categories = values
            .iter()
            .map(|&v| to_code(column, v))
            .collect::<Result<Vec<i64>, _>>()?;
        categories.sort_unstable();
        categories.dedup();

        Ok(Self {
            column: column.to_string(),
            categories,
        })
    }

    /// Position of each value's category; unseen codes are an error
    pub fn encode(&self, values: &[f64]) -> Result<Vec<usize>, PipelineError> {
        values
            .iter()
            .map(|&v| {
                let code = to_code(&self.column, v)?;
                self.categories
                    .binary_search(&code)
                    .map_err(|_| PipelineError::UnknownCategory {
                        column: self.column.clone(),
                        value: code,
                    })
            })
            .collect()
    }

    pub fn output_names(&self) -> impl Iterator<Item = String> + '_ {
        self.categories
            .iter()
            .map(move |c| format!("{}_{}", self.column, c))
    }
}

fn to_code(column: &str, value: f64) -> Result<i64, PipelineError> {
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(PipelineError::invalid(
            "categorical",
            format!("column '{}' holds non-integer code {}", column, value),
        ));
    }
    Ok(value as i64)
}

/// Zero-mean, unit-variance scaling with population statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub column: String,
    pub mean: f64,
    /// Population standard deviation, 1.0 for constant columns
    pub scale: f64,
}

impl StandardScaler {
    pub fn fit(column: &str, values: &[f64]) -> Self {
        let n = values.len().max(1) as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        Self {
            column: column.to_string(),
            mean,
            scale: if std > 0.0 { std } else { 1.0 },
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}

/// Parameters learned by `ColumnPreprocessor::fit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedColumns {
    /// Input layout seen at fit time; transform requires the same names in the same order
    pub input_columns: Vec<String>,
    pub encoders: Vec<OneHotEncoder>,
    pub scalers: Vec<StandardScaler>,
    pub passthrough: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPreprocessor {
    pub categorical: Vec<String>,
    pub numerical: Vec<String>,
    fitted: Option<FittedColumns>,
}

impl ColumnPreprocessor {
    pub fn new(categorical: Vec<String>, numerical: Vec<String>) -> Self {
        Self {
            categorical,
            numerical,
            fitted: None,
        }
    }

    /// EDUCATION, MARRIAGE and SEX one-hot encoded, every other column standardized
    pub fn for_credit_data(columns: &[String]) -> Self {
        let categorical: Vec<String> = CATEGORICAL_COLUMNS.iter().map(|c| c.to_string()).collect();
        let numerical = columns
            .iter()
            .filter(|c| !categorical.contains(*c))
            .cloned()
            .collect();
        Self::new(categorical, numerical)
    }

    pub fn fitted(&self) -> Option<&FittedColumns> {
        self.fitted.as_ref()
    }

    pub fn fit(&mut self, table: &FeatureTable) -> Result<(), PipelineError> {
        if table.n_rows() == 0 {
            return Err(PipelineError::EmptyDataset);
        }

        let encoders = self
            .categorical
            .iter()
            .map(|name| OneHotEncoder::fit(name, table.column(name)?))
            .collect::<Result<Vec<_>, _>>()?;

        let scalers = self
            .numerical
            .iter()
            .map(|name| Ok(StandardScaler::fit(name, table.column(name)?)))
            .collect::<Result<Vec<_>, PipelineError>>()?;

        let passthrough = table
            .names()
            .iter()
            .filter(|n| !self.categorical.contains(*n) && !self.numerical.contains(*n))
            .cloned()
            .collect();

        self.fitted = Some(FittedColumns {
            input_columns: table.names().to_vec(),
            encoders,
            scalers,
            passthrough,
        });
        Ok(())
    }

    pub fn transform(&self, table: &FeatureTable) -> Result<Mat<f64>, PipelineError> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or(PipelineError::NotFitted("preprocessor"))?;

        if table.names() != fitted.input_columns.as_slice() {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("columns {:?}", fitted.input_columns),
                actual: format!("columns {:?}", table.names()),
            });
        }

        let n = table.n_rows();
        let n_onehot: usize = fitted.encoders.iter().map(|e| e.categories.len()).sum();
        let width = n_onehot + fitted.scalers.len() + fitted.passthrough.len();
        let mut out = Mat::<f64>::zeros(n, width);

        let mut offset = 0;
        for encoder in &fitted.encoders {
            let positions = encoder.encode(table.column(&encoder.column)?)?;
            for (row, pos) in positions.into_iter().enumerate() {
                out[(row, offset + pos)] = 1.0;
            }
            offset += encoder.categories.len();
        }

        for scaler in &fitted.scalers {
            for (row, &value) in table.column(&scaler.column)?.iter().enumerate() {
                out[(row, offset)] = scaler.apply(value);
            }
            offset += 1;
        }

        for name in &fitted.passthrough {
            for (row, &value) in table.column(name)?.iter().enumerate() {
                out[(row, offset)] = value;
            }
            offset += 1;
        }

        Ok(out)
    }

    pub fn fit_transform(&mut self, table: &FeatureTable) -> Result<Mat<f64>, PipelineError> {
        self.fit(table)?;
        self.transform(table)
    }

    /// Names of the output columns, e.g. `EDUCATION_1`, `LIMIT_BAL`
    pub fn output_names(&self) -> Vec<String> {
        match &self.fitted {
            None => Vec::new(),
            Some(fitted) => fitted
                .encoders
                .iter()
                .flat_map(|e| e.output_names())
                .chain(fitted.scalers.iter().map(|s| s.column.clone()))
                .chain(fitted.passthrough.iter().cloned())
                .collect(),
        }
    }
}
