// src/snapshot/mod.rs
//! Read-only view of a rendered page: tables, rows, cells and links.
//!
//! The extraction core only talks to these traits. `html` implements them
//! over a parsed static document; tests use the in-memory `fixture` tables.

pub mod html;

#[cfg(test)]
pub(crate) mod fixture;

pub use html::HtmlSnapshot;

use crate::error::AccessError;

pub trait LinkHandle {
    /// Visible link text, uncleaned.
    fn text(&self) -> String;
    /// Raw `href`, possibly relative.
    fn href(&self) -> Option<String>;
}

pub trait CellHandle {
    type Link: LinkHandle;

    fn links(&self) -> Vec<Self::Link>;
    /// Full visible text of the cell, uncleaned.
    fn text(&self) -> String;
}

pub trait RowHandle {
    type Cell: CellHandle;

    /// Data cells in column order.
    fn cells(&self) -> Vec<Self::Cell>;
    /// True for rows made of header cells.
    fn is_header(&self) -> bool;
}

pub trait TableHandle {
    type Row: RowHandle;

    fn is_visible(&self) -> bool;
    /// Body rows of the table with header rows removed.
    fn data_rows(&self) -> Result<Vec<Self::Row>, AccessError>;
}

pub trait PageSnapshot {
    type Table<'a>: TableHandle
    where
        Self: 'a;

    /// Every table on the page, in document order.
    fn tables(&self) -> Vec<Self::Table<'_>>;
}
