// src/error.rs

use serde::Serialize;
use thiserror::Error;

/// A read failure at the snapshot boundary (a table or row that could not
/// be inspected).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct AccessError(pub String);

impl AccessError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Non-fatal problems recorded while extracting. None of these stop a run;
/// the affected partition, table or row is skipped and processing continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    #[error("no table found for partition {partition}")]
    ResolutionFailure { partition: String },

    #[error("row {row} of partition {partition} has {cells} cells (need at least 4), skipped")]
    RowTooShort {
        partition: String,
        row: usize,
        cells: usize,
    },

    #[error("table {table} unreadable while processing partition {partition}: {reason}")]
    TransientAccessFailure {
        partition: String,
        table: usize,
        reason: String,
    },
}

impl Diagnostic {
    pub fn partition(&self) -> &str {
        match self {
            Diagnostic::ResolutionFailure { partition }
            | Diagnostic::RowTooShort { partition, .. }
            | Diagnostic::TransientAccessFailure { partition, .. } => partition,
        }
    }
}
