// src/process/row.rs

use url::Url;

use super::cells::{apply_text_override, extract_cell_links, store_group};
use super::utils::clean_text;
use crate::schema::{Prefix, Record, SchemaRegistry, DATE, YEAR};
use crate::snapshot::CellHandle;

/// Fewest cells a data row needs: date plus the two gazette columns plus
/// at least one trailing column.
pub const MIN_CELLS: usize = 4;

/// Cells 1 and 2 are link columns in every layout.
const LEADING: [(usize, Prefix); 2] = [(1, Prefix::AsicGazette), (2, Prefix::BusinessGazette)];

/// Row shapes found on the page, keyed by cell count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLayout {
    /// `Date | ASIC | Business | Other/Notes`
    Compact,
    /// `Date | ASIC | Business | Other | Notes [| ...]`
    Extended,
}

impl RowLayout {
    pub fn for_cell_count(cells: usize) -> Option<Self> {
        match cells {
            n if n < MIN_CELLS => None,
            MIN_CELLS => Some(RowLayout::Compact),
            _ => Some(RowLayout::Extended),
        }
    }

    /// Trailing columns whose full text takes precedence over the first
    /// link title.
    pub fn trailing(self) -> &'static [(usize, Prefix)] {
        match self {
            RowLayout::Compact => &[(3, Prefix::OtherNotes)],
            RowLayout::Extended => &[(3, Prefix::Other), (4, Prefix::Notes)],
        }
    }
}

/// A row with fewer than [`MIN_CELLS`] cells; carries the actual count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortRow(pub usize);

/// Turns grid rows into flat records.
#[derive(Debug, Clone)]
pub struct RowExtractor {
    base: Url,
}

impl RowExtractor {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Flatten one row of `partition`. Keys are registered only when the
    /// row is accepted, so a short row leaves no trace in the schema.
    pub fn extract_row<C: CellHandle>(
        &self,
        cells: &[C],
        partition: &str,
        registry: &mut SchemaRegistry,
    ) -> Result<Record, ShortRow> {
        let layout = RowLayout::for_cell_count(cells.len()).ok_or(ShortRow(cells.len()))?;

        let mut record = Record::new();
        record.insert(YEAR, partition);
        record.insert(DATE, clean_text(&cells[0].text()));
        registry.register(YEAR);
        registry.register(DATE);

        for &(idx, prefix) in LEADING.iter() {
            let group = extract_cell_links(&cells[idx], &self.base);
            store_group(&mut record, registry, prefix, &group);
        }

        for &(idx, prefix) in layout.trailing() {
            let cell = &cells[idx];
            let mut group = extract_cell_links(cell, &self.base);
            apply_text_override(&mut group, &clean_text(&cell.text()));
            store_group(&mut record, registry, prefix, &group);
        }

        Ok(record)
    }
}
