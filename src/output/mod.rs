// src/output/mod.rs
//! Writes an extraction to disk: the CSV table and an optional JSON report.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::Diagnostic;
use crate::schema::Record;
use crate::session::{Extraction, PartitionSummary};

/// Write through a temp file in the destination directory, then rename it
/// over `path`.
fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let dir: PathBuf = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).with_context(|| format!("creating {:?}", dir))?;

    let mut tmp =
        NamedTempFile::new_in(&dir).with_context(|| format!("creating temp file in {:?}", dir))?;
    write(&mut tmp)?;
    tmp.flush()?;
    tmp.persist(path)
        .with_context(|| format!("renaming temp file -> {:?}", path))?;
    Ok(())
}

/// Header row, then one row per record with values looked up by header.
/// Returns the number of data rows written; with no records nothing is
/// written at all.
pub fn write_csv<P: AsRef<Path>>(path: P, headers: &[String], records: &[Record]) -> Result<usize> {
    let path = path.as_ref();
    if records.is_empty() {
        warn!(?path, "No data to save");
        return Ok(0);
    }

    write_atomic(path, |tmp| {
        let mut wtr = csv::Writer::from_writer(tmp);
        wtr.write_record(headers)
            .with_context(|| format!("writing header to {:?}", path))?;
        for record in records {
            wtr.write_record(headers.iter().map(|h| record.get(h).unwrap_or("")))
                .with_context(|| format!("writing row to {:?}", path))?;
        }
        wtr.flush()?;
        Ok(())
    })?;

    info!(?path, rows = records.len(), columns = headers.len(), "CSV written");
    Ok(records.len())
}

/// Summary of one run, serialized as JSON.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub target_url: &'a str,
    pub partitions: &'a [PartitionSummary],
    pub header_count: usize,
    pub record_count: usize,
    pub diagnostics: &'a [Diagnostic],
}

impl<'a> RunReport<'a> {
    pub fn new(target_url: &'a str, extraction: &'a Extraction) -> Self {
        Self {
            generated_at: Utc::now(),
            target_url,
            partitions: &extraction.partitions,
            header_count: extraction.headers.len(),
            record_count: extraction.records.len(),
            diagnostics: &extraction.diagnostics,
        }
    }
}

pub fn write_report<P: AsRef<Path>>(path: P, report: &RunReport<'_>) -> Result<()> {
    let path = path.as_ref();
    write_atomic(path, |tmp| {
        serde_json::to_writer_pretty(&mut *tmp, report).context("serializing report")?;
        tmp.write_all(b"\n")?;
        Ok(())
    })?;
    info!(?path, diagnostics = report.diagnostics.len(), "report written");
    Ok(())
}
