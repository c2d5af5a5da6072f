// src/session.rs

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::ScraperConfig;
use crate::error::Diagnostic;
use crate::process::{RowExtractor, ShortRow};
use crate::resolve::{Method, TableResolver};
use crate::schema::{normalize_all, Record, SchemaRegistry};
use crate::snapshot::{PageSnapshot, RowHandle, TableHandle};

/// What happened to one partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionSummary {
    pub partition: String,
    /// Index among visible tables, when one was resolved.
    pub table: Option<usize>,
    pub method: Option<Method>,
    pub rows: usize,
    pub skipped_rows: usize,
}

impl PartitionSummary {
    fn new(partition: &str) -> Self {
        Self {
            partition: partition.to_string(),
            table: None,
            method: None,
            rows: 0,
            skipped_rows: 0,
        }
    }
}

/// Final output of a session: header list plus records normalized to it.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
    pub diagnostics: Vec<Diagnostic>,
    pub partitions: Vec<PartitionSummary>,
}

/// Drives resolution and extraction for one page, one partition at a time.
///
/// The session owns the schema registry and the output records; both only
/// grow until [`ExtractionSession::finish`] consumes the session.
pub struct ExtractionSession {
    resolver: TableResolver,
    extractor: RowExtractor,
    registry: SchemaRegistry,
    records: Vec<Record>,
    diagnostics: Vec<Diagnostic>,
    partitions: Vec<PartitionSummary>,
}

impl ExtractionSession {
    pub fn new(resolver: TableResolver, extractor: RowExtractor) -> Self {
        Self {
            resolver,
            extractor,
            registry: SchemaRegistry::new(),
            records: Vec::new(),
            diagnostics: Vec::new(),
            partitions: Vec::new(),
        }
    }

    pub fn from_config(cfg: &ScraperConfig) -> Result<Self> {
        Ok(Self::new(
            TableResolver::new(cfg.resolver.clone()),
            RowExtractor::new(cfg.base()?),
        ))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn report(&mut self, d: Diagnostic) {
        warn!(partition = d.partition(), diagnostic = %d, "skipped");
        self.diagnostics.push(d);
    }

    /// Process every partition in order against the page's current tables.
    pub fn run<S: PageSnapshot>(&mut self, snapshot: &S, partitions: &[String]) {
        for (i, partition) in partitions.iter().enumerate() {
            info!(
                section = i + 1,
                of = partitions.len(),
                partition = %partition,
                "processing partition"
            );
            let tables = snapshot.tables();
            let added = self.process_partition(&tables, partition);
            info!(
                partition = %partition,
                added,
                columns = self.registry.len(),
                "partition done"
            );
        }
        info!(
            records = self.records.len(),
            columns = self.registry.len(),
            diagnostics = self.diagnostics.len(),
            "all partitions processed"
        );
    }

    /// Resolve the table for `partition` and extract all of its data rows.
    /// Returns the number of records added.
    #[instrument(level = "info", skip(self, tables), fields(tables = tables.len()))]
    pub fn process_partition<T: TableHandle>(&mut self, tables: &[T], partition: &str) -> usize {
        let mut summary = PartitionSummary::new(partition);

        match self
            .resolver
            .resolve(tables, partition, &mut self.diagnostics)
        {
            Ok(res) => {
                summary.table = Some(res.index);
                summary.method = Some(res.method);
                self.extract_table(res.table, res.index, &mut summary);
            }
            Err(d) => self.report(d),
        }

        let added = summary.rows;
        if added == 0 {
            warn!("no data extracted");
        }
        self.partitions.push(summary);
        added
    }

    fn extract_table<T: TableHandle>(
        &mut self,
        table: &T,
        index: usize,
        summary: &mut PartitionSummary,
    ) {
        let partition = summary.partition.clone();
        let rows = match table.data_rows() {
            Ok(rows) => rows,
            Err(e) => {
                self.report(Diagnostic::TransientAccessFailure {
                    partition,
                    table: index,
                    reason: e.to_string(),
                });
                return;
            }
        };

        info!(rows = rows.len(), table = index, "extracting rows");
        for (i, row) in rows.iter().enumerate() {
            let cells = row.cells();
            match self
                .extractor
                .extract_row(&cells, &partition, &mut self.registry)
            {
                Ok(record) => {
                    self.records.push(record);
                    summary.rows += 1;
                }
                Err(ShortRow(n)) => {
                    summary.skipped_rows += 1;
                    self.report(Diagnostic::RowTooShort {
                        partition: partition.clone(),
                        row: i,
                        cells: n,
                    });
                }
            }
            if (i + 1) % 10 == 0 {
                debug!(done = i + 1, of = rows.len(), "rows processed");
            }
        }
    }

    /// Freeze the schema, derive headers and normalize every record to them.
    pub fn finish(self) -> Extraction {
        let headers = self.registry.derive_headers();
        let records = normalize_all(&self.records, &headers);
        info!(
            records = records.len(),
            headers = headers.len(),
            "extraction finished"
        );
        Extraction {
            headers,
            records,
            diagnostics: self.diagnostics,
            partitions: self.partitions,
        }
    }
}
