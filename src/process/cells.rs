// src/process/cells.rs

use tracing::debug;
use url::Url;

use super::utils::{clean_text, resolve_url};
use crate::schema::{field_key, Prefix, Record, Role, SchemaRegistry};
use crate::snapshot::{CellHandle, LinkHandle};

/// One linked item of a cell. Either side may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellLink {
    pub title: String,
    pub url: String,
}

impl CellLink {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Items of a single cell, in document order.
pub type CellLinkGroup = Vec<CellLink>;

/// Read every link of `cell` as a (title, absolute url) pair.
///
/// A cell without links yields its text as a single untitled-url item, or
/// nothing when the text is empty too.
pub fn extract_cell_links<C: CellHandle>(cell: &C, base: &Url) -> CellLinkGroup {
    let links = cell.links();

    if links.is_empty() {
        let text = clean_text(&cell.text());
        if text.is_empty() {
            return Vec::new();
        }
        return vec![CellLink::new(text, "")];
    }

    let group: CellLinkGroup = links
        .iter()
        .map(|link| {
            let title = clean_text(&link.text());
            let url = link
                .href()
                .map(|href| resolve_url(base, &href))
                .unwrap_or_default();
            CellLink { title, url }
        })
        .collect();

    if group.len() > 1 {
        debug!(
            links = group.len(),
            titles = ?group.iter().filter(|l| !l.title.is_empty()).map(|l| l.title.as_str()).collect::<Vec<_>>(),
            "multiple links in cell"
        );
    }
    group
}

/// Let the full cell text stand in for the first title.
///
/// With no items the text becomes the only title; otherwise only the first
/// item's title is replaced and later items are left alone.
pub fn apply_text_override(group: &mut CellLinkGroup, text: &str) {
    if text.is_empty() {
        return;
    }
    match group.first_mut() {
        Some(first) => first.title = text.to_string(),
        None => group.push(CellLink::new(text, "")),
    }
}

/// Write a group into `record` as `{prefix}_title`/`{prefix}_url` for the
/// first item and numbered variants for the rest, registering every key.
/// An empty group still writes both base keys as empty strings.
pub fn store_group(
    record: &mut Record,
    registry: &mut SchemaRegistry,
    prefix: Prefix,
    group: &[CellLink],
) {
    if group.is_empty() {
        for role in [Role::Title, Role::Url] {
            let key = field_key(prefix, role, 0);
            registry.register(&key);
            record.insert(key, "");
        }
        return;
    }

    for (i, item) in group.iter().enumerate() {
        let title_key = field_key(prefix, Role::Title, i);
        let url_key = field_key(prefix, Role::Url, i);
        registry.register(&title_key);
        registry.register(&url_key);
        record.insert(title_key, item.title.as_str());
        record.insert(url_key, item.url.as_str());
    }

    if group.len() > 1 {
        debug!(group = %prefix, items = group.len(), "stored multi-value cell");
    }
}
