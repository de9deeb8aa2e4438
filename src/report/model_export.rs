//! Gzip-compressed JSON model artifact

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::pipeline::search::SearchResult;

/// Metadata about the training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Timestamp of the run (RFC 3339)
    pub timestamp: String,
    /// Crate version that produced the artifact
    pub version: String,
    pub train_rows: usize,
    /// Feature columns in the order the pipeline expects them
    pub feature_columns: Vec<String>,
    pub cv_folds: usize,
    pub scoring: String,
}

impl ModelMetadata {
    pub fn new(train_rows: usize, feature_columns: Vec<String>, search: &SearchResult) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            train_rows,
            feature_columns,
            cv_folds: search.cv_folds,
            scoring: search.scoring.clone(),
        }
    }
}

/// Everything written to the model file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub metadata: ModelMetadata,
    pub search: SearchResult,
}

/// Write the artifact, creating parent directories and replacing any existing file
pub fn save_model(artifact: &ModelArtifact, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create model file: {}", path.display()))?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    serde_json::to_writer(&mut encoder, artifact).context("Failed to serialize model to JSON")?;
    encoder
        .finish()
        .and_then(|mut w| w.flush())
        .with_context(|| format!("Failed to write model to {}", path.display()))?;

    Ok(())
}

pub fn load_model(path: &Path) -> Result<ModelArtifact> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open model file: {}", path.display()))?;
    let decoder = GzDecoder::new(BufReader::new(file));
    serde_json::from_reader(decoder)
        .with_context(|| format!("Failed to read model from {}", path.display()))
}
