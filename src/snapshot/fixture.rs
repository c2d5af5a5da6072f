// src/snapshot/fixture.rs
// In-memory page used by tests.

use super::{CellHandle, LinkHandle, PageSnapshot, RowHandle, TableHandle};
use crate::error::AccessError;

#[derive(Debug, Clone, Default)]
pub struct FixtureLink {
    pub text: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FixtureCell {
    pub text: String,
    pub links: Vec<FixtureLink>,
}

#[derive(Debug, Clone, Default)]
pub struct FixtureRow {
    pub header: bool,
    pub cells: Vec<FixtureCell>,
}

#[derive(Debug, Clone)]
pub struct FixtureTable {
    pub visible: bool,
    pub rows: Vec<FixtureRow>,
    pub unreadable: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FixturePage {
    pub tables: Vec<FixtureTable>,
}

impl LinkHandle for FixtureLink {
    fn text(&self) -> String {
        self.text.clone()
    }
    fn href(&self) -> Option<String> {
        self.href.clone()
    }
}

impl CellHandle for FixtureCell {
    type Link = FixtureLink;

    fn links(&self) -> Vec<FixtureLink> {
        self.links.clone()
    }
    fn text(&self) -> String {
        self.text.clone()
    }
}

impl RowHandle for FixtureRow {
    type Cell = FixtureCell;

    fn cells(&self) -> Vec<FixtureCell> {
        self.cells.clone()
    }
    fn is_header(&self) -> bool {
        self.header
    }
}

impl TableHandle for FixtureTable {
    type Row = FixtureRow;

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn data_rows(&self) -> Result<Vec<FixtureRow>, AccessError> {
        if let Some(reason) = &self.unreadable {
            return Err(AccessError::new(reason.clone()));
        }
        Ok(self.rows.iter().filter(|r| !r.header).cloned().collect())
    }
}

impl PageSnapshot for FixturePage {
    type Table<'a> = FixtureTable;

    fn tables(&self) -> Vec<FixtureTable> {
        self.tables.clone()
    }
}

pub fn link(text: &str, href: &str) -> FixtureLink {
    FixtureLink {
        text: text.to_string(),
        href: Some(href.to_string()),
    }
}

pub fn text_cell(text: &str) -> FixtureCell {
    FixtureCell {
        text: text.to_string(),
        links: Vec::new(),
    }
}

/// A cell whose visible text is the concatenation of its link texts.
pub fn link_cell(links: Vec<FixtureLink>) -> FixtureCell {
    let text = links
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    FixtureCell { text, links }
}

pub fn row(cells: Vec<FixtureCell>) -> FixtureRow {
    FixtureRow {
        header: false,
        cells,
    }
}

pub fn header_row(labels: &[&str]) -> FixtureRow {
    FixtureRow {
        header: true,
        cells: labels.iter().map(|l| text_cell(l)).collect(),
    }
}

pub fn table(rows: Vec<FixtureRow>) -> FixtureTable {
    FixtureTable {
        visible: true,
        rows,
        unreadable: None,
    }
}

/// A gazette-style table: each row is
/// `date | NN/<asic> link | NN/<business> link | notes`.
pub fn gazette_table(asic_suffix: &str, business_suffix: &str, rows: usize) -> FixtureTable {
    let mut out = vec![header_row(&["Date", "ASIC", "Business", "Notes"])];
    for i in 0..rows {
        out.push(row(vec![
            text_cell(&format!("{:02}/01/20{}", i + 1, asic_suffix)),
            link_cell(vec![link(
                &format!("A{:02}/{}", i + 1, asic_suffix),
                &format!("/gaz/a{}", i + 1),
            )]),
            link_cell(vec![link(
                &format!("B{:02}/{}", i + 1, business_suffix),
                &format!("/gaz/b{}", i + 1),
            )]),
            text_cell(""),
        ]));
    }
    table(out)
}
