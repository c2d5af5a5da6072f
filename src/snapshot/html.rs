// src/snapshot/html.rs

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, info, trace, warn};

use super::{CellHandle, LinkHandle, PageSnapshot, RowHandle, TableHandle};
use crate::error::AccessError;
use crate::process::utils::clean_text;

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("CSS selector for tables should be valid"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("CSS selector for rows should be valid"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("CSS selector for links should be valid"));

/// A parsed static HTML page.
pub struct HtmlSnapshot {
    document: Html,
}

impl HtmlSnapshot {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        debug!(errors = document.errors.len(), "parsed HTML document");
        Self { document }
    }

    /// Find the year sections of the page by scanning its collapsible
    /// section toggles.
    ///
    /// Selectors are tried in order; the first one matching at least one
    /// element whose text names a partition wins. With a non-empty `known`
    /// list an element contributes the first known key its text contains;
    /// with an empty list the first `pattern` match is used instead.
    /// Keys keep page order and are deduplicated.
    pub fn discover_partitions(
        &self,
        selectors: &[String],
        known: &[String],
        pattern: &Regex,
    ) -> Result<Vec<String>> {
        for raw in selectors {
            let selector = Selector::parse(raw)
                .map_err(|e| anyhow!("invalid section selector `{}`: {:?}", raw, e))?;

            let mut found: Vec<String> = Vec::new();
            for el in self.document.select(&selector) {
                let text = clean_text(&element_text(el));
                if let Some(key) = partition_in_text(&text, known, pattern) {
                    trace!(selector = %raw, text = %text, key = %key, "section toggle");
                    if !found.contains(&key) {
                        found.push(key);
                    }
                }
            }

            if !found.is_empty() {
                info!(selector = %raw, sections = found.len(), "found partition sections");
                return Ok(found);
            }
        }

        warn!("no partition sections found on page");
        Ok(Vec::new())
    }
}

fn partition_in_text(text: &str, known: &[String], pattern: &Regex) -> Option<String> {
    if known.is_empty() {
        return pattern.find(text).map(|m| m.as_str().to_string());
    }
    known.iter().find(|k| text.contains(k.as_str())).cloned()
}

impl PageSnapshot for HtmlSnapshot {
    type Table<'a> = HtmlTable<'a>;

    fn tables(&self) -> Vec<HtmlTable<'_>> {
        self.document
            .select(&TABLE_SELECTOR)
            .map(|element| HtmlTable { element })
            .collect()
    }
}

#[derive(Clone, Copy)]
pub struct HtmlTable<'a> {
    element: ElementRef<'a>,
}

impl<'a> HtmlTable<'a> {
    /// True when `row` belongs to this table rather than to a nested one.
    fn owns(&self, row: &ElementRef<'a>) -> bool {
        row.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "table")
            .map_or(false, |t| t.id() == self.element.id())
    }
}

impl<'a> TableHandle for HtmlTable<'a> {
    type Row = HtmlRow<'a>;

    fn is_visible(&self) -> bool {
        std::iter::once(self.element)
            .chain(self.element.ancestors().filter_map(ElementRef::wrap))
            .all(|e| !is_hidden(e))
    }

    fn data_rows(&self) -> Result<Vec<HtmlRow<'a>>, AccessError> {
        let scope = child_elements(self.element)
            .find(|e| e.value().name() == "tbody")
            .unwrap_or(self.element);

        Ok(scope
            .select(&ROW_SELECTOR)
            .filter(|r| self.owns(r))
            .map(|element| HtmlRow { element })
            .filter(|r| {
                let header = r.is_header();
                if header {
                    trace!(row = %clean_text(&element_text(r.element)), "skipping header row");
                }
                !header
            })
            .collect())
    }
}

#[derive(Clone, Copy)]
pub struct HtmlRow<'a> {
    element: ElementRef<'a>,
}

impl<'a> RowHandle for HtmlRow<'a> {
    type Cell = HtmlCell<'a>;

    fn cells(&self) -> Vec<HtmlCell<'a>> {
        child_elements(self.element)
            .filter(|e| e.value().name() == "td")
            .map(|element| HtmlCell { element })
            .collect()
    }

    /// Only `th` cells and no `td` cells. A row led by a `th` but carrying
    /// data cells is still a data row.
    fn is_header(&self) -> bool {
        let mut has_th = false;
        for e in child_elements(self.element) {
            match e.value().name() {
                "td" => return false,
                "th" => has_th = true,
                _ => {}
            }
        }
        has_th
    }
}

#[derive(Clone, Copy)]
pub struct HtmlCell<'a> {
    element: ElementRef<'a>,
}

impl<'a> CellHandle for HtmlCell<'a> {
    type Link = HtmlLink<'a>;

    fn links(&self) -> Vec<HtmlLink<'a>> {
        self.element
            .select(&LINK_SELECTOR)
            .map(|element| HtmlLink { element })
            .collect()
    }

    fn text(&self) -> String {
        element_text(self.element)
    }
}

#[derive(Clone, Copy)]
pub struct HtmlLink<'a> {
    element: ElementRef<'a>,
}

impl LinkHandle for HtmlLink<'_> {
    fn text(&self) -> String {
        element_text(self.element)
    }

    fn href(&self) -> Option<String> {
        self.element.value().attr("href").map(str::to_string)
    }
}

fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

/// Text content with `<br>` read as a line break.
fn element_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in el.descendants() {
        match node.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) if e.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}

fn is_hidden(el: ElementRef<'_>) -> bool {
    let v = el.value();
    if v.attr("hidden").is_some() {
        return true;
    }
    if v
        .attr("aria-hidden")
        .map_or(false, |a| a.trim().eq_ignore_ascii_case("true"))
    {
        return true;
    }
    v.attr("style").map_or(false, |style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        compact.contains("display:none") || compact.contains("visibility:hidden")
    })
}
