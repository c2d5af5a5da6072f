// src/schema/types.rs

use serde::Serialize;
use std::{collections::BTreeMap, fmt};

pub const YEAR: &str = "Year";
pub const DATE: &str = "Date";

/// Column families a gazette row is flattened into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    AsicGazette,
    BusinessGazette,
    Other,
    Notes,
    OtherNotes,
}

impl Prefix {
    /// Header grouping order after `Year` and `Date`.
    pub const ORDER: [Prefix; 5] = [
        Prefix::AsicGazette,
        Prefix::BusinessGazette,
        Prefix::Other,
        Prefix::Notes,
        Prefix::OtherNotes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Prefix::AsicGazette => "ASIC_Gazette",
            Prefix::BusinessGazette => "Business_Gazette",
            Prefix::Other => "Other",
            Prefix::Notes => "Notes",
            Prefix::OtherNotes => "Other_Notes",
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Title,
    Url,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Title => "title",
            Role::Url => "url",
        }
    }
}

/// Column name for item `index` (0-based) of a cell group.
/// The first item is unsuffixed; later items get `_2`, `_3`, ...
pub fn field_key(prefix: Prefix, role: Role, index: usize) -> String {
    if index == 0 {
        format!("{}_{}", prefix, role.as_str())
    } else {
        format!("{}_{}_{}", prefix, role.as_str(), index + 1)
    }
}

/// One flattened table row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, String>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
