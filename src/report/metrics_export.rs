//! JSON-lines metrics file

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use super::metrics::MetricsRecord;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

fn write_lines(file: File, records: &[MetricsRecord], path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(file);
    for record in records {
        let line = serde_json::to_string(record).context("Failed to serialize metrics record")?;
        writeln!(writer, "{}", line)
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush metrics to {}", path.display()))
}

/// Replace the file contents with one JSON object per record
pub fn write_metrics(path: &Path, records: &[MetricsRecord]) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path)
        .with_context(|| format!("Failed to create metrics file: {}", path.display()))?;
    write_lines(file, records, path)
}

/// Add records after whatever the file already holds
pub fn append_confusion_matrices(path: &Path, records: &[MetricsRecord]) -> Result<()> {
    ensure_parent(path)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open metrics file: {}", path.display()))?;
    write_lines(file, records, path)
}
