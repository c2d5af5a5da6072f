// src/config.rs

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path, path::PathBuf};
use tracing::debug;
use url::Url;

pub const DEFAULT_TARGET_URL: &str =
    "https://asic.gov.au/about-asic/corporate-publications/asic-gazette/asic-gazettes-2011-2020/";

/// Top-level settings, loadable from YAML. Every field is optional in the
/// file and falls back to the values used for the ASIC 2011-2020 page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScraperConfig {
    pub target_url: String,
    /// Base for resolving relative links; the page URL when unset.
    pub base_url: Option<String>,
    pub csv_filename: PathBuf,
    pub report_filename: Option<PathBuf>,
    /// Known partition keys, in the order they are tried against section text.
    pub partitions: Vec<String>,
    /// Used to pull a partition key out of section text when `partitions` is empty.
    pub partition_pattern: String,
    /// CSS selectors for the page's collapsible year sections, tried in order.
    pub section_selectors: Vec<String>,
    pub fetch: FetchConfig,
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_ms: u64,
    pub user_agent: String,
}

/// Knobs of the table-matching heuristic. These describe one page's layout,
/// not the algorithm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// A table qualifies when its matched/total link ratio is above this.
    pub min_ratio: f64,
    /// ...and it has strictly more than this many links with a `/`.
    pub min_links: usize,
    /// Data rows sampled per table.
    pub sample_rows: usize,
    /// Zero-based columns whose links are sampled.
    pub link_columns: Vec<usize>,
    /// Partition key -> ordinal of the visible table to use when no table
    /// qualifies.
    pub fallback: BTreeMap<String, usize>,
}

const KNOWN_YEARS: [&str; 10] = [
    "2020", "2019", "2018", "2017", "2016", "2015", "2014", "2013", "2012", "2011",
];

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            base_url: None,
            csv_filename: PathBuf::from("asic_gazettes.csv"),
            report_filename: None,
            partitions: KNOWN_YEARS.iter().map(|y| y.to_string()).collect(),
            partition_pattern: r"\b(?:19|20)\d{2}\b".to_string(),
            section_selectors: [
                "button[aria-expanded]",
                ".accordion-button",
                "h2 button",
                "h3 button",
                "[data-bs-toggle='collapse']",
                "[data-toggle='collapse']",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            fetch: FetchConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            backoff_ms: 500,
            user_agent: concat!("gazscraper/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        // Observed table order on the page; 2018 sits after an extra table.
        let fallback = [
            ("2020", 0),
            ("2019", 1),
            ("2018", 3),
            ("2017", 4),
            ("2016", 5),
            ("2015", 6),
            ("2014", 7),
            ("2013", 8),
            ("2012", 9),
            ("2011", 10),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            min_ratio: 0.70,
            min_links: 5,
            sample_rows: 10,
            link_columns: vec![1, 2],
            fallback,
        }
    }
}

impl ScraperConfig {
    /// Read a YAML config file; missing fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        let cfg: ScraperConfig =
            serde_yaml::from_str(&text).with_context(|| format!("parsing config {:?}", path))?;
        debug!(?path, "loaded config");
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.target_url)
            .with_context(|| format!("target_url `{}` is not a URL", self.target_url))?;
        self.base()?;
        self.partition_regex()?;
        self.resolver.validate()
    }

    /// Base that relative hrefs are joined onto: `base_url` if set,
    /// otherwise the page itself, as a browser would resolve them.
    pub fn base(&self) -> Result<Url> {
        let raw = self.base_url.as_deref().unwrap_or(&self.target_url);
        Url::parse(raw).with_context(|| format!("link base `{}` is not a URL", raw))
    }

    pub fn partition_regex(&self) -> Result<Regex> {
        Regex::new(&self.partition_pattern)
            .with_context(|| format!("partition_pattern `{}`", self.partition_pattern))
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_ratio) {
            bail!("resolver.min_ratio must be within 0..=1, got {}", self.min_ratio);
        }
        if self.link_columns.is_empty() {
            bail!("resolver.link_columns must name at least one column");
        }
        if self.sample_rows == 0 {
            bail!("resolver.sample_rows must be at least 1");
        }
        Ok(())
    }
}
