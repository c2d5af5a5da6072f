// src/schema/registry.rs

use std::collections::HashSet;
use tracing::{debug, info};

use super::types::{Prefix, DATE, YEAR};

/// Every column name seen during one extraction session.
///
/// Only the set is kept; header order is derived on demand so it never
/// depends on the order in which columns were discovered.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    keys: HashSet<String>,
}

/// Per-group column counts for a derived header list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBreakdown {
    pub groups: Vec<(Prefix, usize)>,
    pub max_items: Vec<(Prefix, usize)>,
    pub remaining: usize,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: &str) {
        if !self.keys.contains(key) {
            debug!(key, "new column");
            self.keys.insert(key.to_string());
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys of one prefix group, sorted. A key belongs to the most specific
    /// prefix it starts with, so `Other` never picks up `Other_Notes_*`.
    fn group(&self, prefix: Prefix) -> Vec<&str> {
        let p = prefix.as_str();
        let narrower: Vec<&str> = Prefix::ORDER
            .iter()
            .map(|q| q.as_str())
            .filter(|q| q.len() > p.len() && q.starts_with(p))
            .collect();

        let mut out: Vec<&str> = self
            .keys
            .iter()
            .map(String::as_str)
            .filter(|k| k.starts_with(p) && !narrower.iter().any(|n| k.starts_with(n)))
            .collect();
        out.sort_unstable();
        out
    }

    /// Ordered header list: `Year`, `Date`, then each prefix group sorted,
    /// then any other registered key sorted.
    pub fn derive_headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = vec![YEAR.to_string(), DATE.to_string()];
        let mut placed: HashSet<&str> = HashSet::from([YEAR, DATE]);

        for prefix in Prefix::ORDER {
            for key in self.group(prefix) {
                if placed.insert(key) {
                    headers.push(key.to_string());
                }
            }
        }

        let mut remaining: Vec<&str> = self
            .keys
            .iter()
            .map(String::as_str)
            .filter(|k| !placed.contains(k))
            .collect();
        remaining.sort_unstable();
        headers.extend(remaining.into_iter().map(str::to_string));

        let breakdown = self.breakdown();
        info!(headers = headers.len(), "derived dynamic headers");
        for (prefix, count) in &breakdown.groups {
            info!(group = %prefix, columns = count, "column breakdown");
        }
        for (prefix, max) in &breakdown.max_items {
            debug!(group = %prefix, max_items = max, "max items per cell");
        }

        headers
    }

    pub fn breakdown(&self) -> ColumnBreakdown {
        let mut groups = Vec::with_capacity(Prefix::ORDER.len());
        let mut max_items = Vec::with_capacity(Prefix::ORDER.len());
        let mut grouped = 0;

        for prefix in Prefix::ORDER {
            let keys = self.group(prefix);
            grouped += keys.len();
            let titles = keys.iter().filter(|k| k.contains("_title")).count();
            groups.push((prefix, keys.len()));
            max_items.push((prefix, titles));
        }

        let fixed = [YEAR, DATE].iter().filter(|k| self.contains(k)).count();
        ColumnBreakdown {
            groups,
            max_items,
            remaining: self.keys.len() - grouped - fixed,
        }
    }
}
