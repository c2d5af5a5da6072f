// src/process/mod.rs
//! Row extraction: grid cells in, flat records out.

pub mod cells;
pub mod row;
pub mod utils;

pub use cells::{apply_text_override, extract_cell_links, store_group, CellLink, CellLinkGroup};
pub use row::{RowExtractor, RowLayout, ShortRow, MIN_CELLS};
