// src/resolve.rs
//! Picks the table holding a given year out of several look-alike tables.
//!
//! Gazette links are labelled `NN/YY`, so a table belongs to a year when
//! most links in its gazette columns end in that year's two-digit suffix.

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::ResolverConfig;
use crate::error::{AccessError, Diagnostic};
use crate::process::utils::clean_text;
use crate::snapshot::{CellHandle, LinkHandle, RowHandle, TableHandle};

/// Link counts of one sampled table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableScore {
    /// Links ending in `/<suffix>`.
    pub matched_links: usize,
    /// Links containing a `/`.
    pub total_links: usize,
}

impl TableScore {
    pub fn ratio(&self) -> f64 {
        if self.total_links == 0 {
            0.0
        } else {
            self.matched_links as f64 / self.total_links as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Method {
    Scored(TableScore),
    Fallback,
}

/// The table picked for a partition. `index` counts visible tables only.
#[derive(Debug)]
pub struct Resolution<'t, T> {
    pub table: &'t T,
    pub index: usize,
    pub method: Method,
}

pub struct TableResolver {
    cfg: ResolverConfig,
}

/// Last two characters of the key: `"2018"` -> `"18"`.
pub fn partition_suffix(partition: &str) -> &str {
    let start = partition
        .char_indices()
        .rev()
        .nth(1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &partition[start..]
}

impl TableResolver {
    pub fn new(cfg: ResolverConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.cfg
    }

    /// Count year-labelled links in the first `sample_rows` data rows.
    pub fn score<T: TableHandle>(
        &self,
        table: &T,
        suffix: &str,
    ) -> Result<TableScore, AccessError> {
        let needle = format!("/{}", suffix);
        let mut score = TableScore::default();

        for row in table.data_rows()?.iter().take(self.cfg.sample_rows) {
            let cells = row.cells();
            if cells.len() < 2 {
                continue;
            }
            for &col in &self.cfg.link_columns {
                let Some(cell) = cells.get(col) else {
                    continue;
                };
                for link in cell.links() {
                    let text = clean_text(&link.text());
                    if !text.contains('/') {
                        continue;
                    }
                    score.total_links += 1;
                    if text.ends_with(&needle) {
                        score.matched_links += 1;
                    }
                }
            }
        }

        Ok(score)
    }

    fn qualifies(&self, score: &TableScore) -> bool {
        score.ratio() > self.cfg.min_ratio && score.total_links > self.cfg.min_links
    }

    /// Pick the table for `partition`.
    ///
    /// The first visible candidate, in input order, whose score qualifies
    /// wins. Otherwise the configured fallback ordinal is used if it is in
    /// range. Unreadable candidates are reported to `diagnostics` and
    /// left out.
    #[instrument(level = "info", skip(self, candidates, diagnostics), fields(candidates = candidates.len()))]
    pub fn resolve<'t, T: TableHandle>(
        &self,
        candidates: &'t [T],
        partition: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Resolution<'t, T>, Diagnostic> {
        let visible: Vec<&'t T> = candidates.iter().filter(|t| t.is_visible()).collect();
        let not_found = || Diagnostic::ResolutionFailure {
            partition: partition.to_string(),
        };
        if visible.is_empty() {
            warn!("no visible tables");
            return Err(not_found());
        }

        let suffix = partition_suffix(partition);
        info!(tables = visible.len(), suffix, "scoring tables");

        for (index, &table) in visible.iter().enumerate() {
            let score = match self.score(table, suffix) {
                Ok(s) => s,
                Err(e) => {
                    let d = Diagnostic::TransientAccessFailure {
                        partition: partition.to_string(),
                        table: index,
                        reason: e.to_string(),
                    };
                    warn!(table = index, error = %e, "skipping unreadable table");
                    diagnostics.push(d);
                    continue;
                }
            };

            info!(
                table = index,
                matched = score.matched_links,
                total = score.total_links,
                pct = score.ratio() * 100.0,
                "table score"
            );

            if self.qualifies(&score) {
                info!(table = index, "selected by score");
                return Ok(Resolution {
                    table,
                    index,
                    method: Method::Scored(score),
                });
            }
        }

        match self.cfg.fallback.get(partition) {
            Some(&index) if index < visible.len() => {
                info!(table = index, "selected by fallback ordinal");
                Ok(Resolution {
                    table: visible[index],
                    index,
                    method: Method::Fallback,
                })
            }
            Some(&index) => {
                warn!(table = index, visible = visible.len(), "fallback ordinal out of range");
                Err(not_found())
            }
            None => {
                warn!("no qualifying table and no fallback entry");
                Err(not_found())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::fixture::{
        gazette_table, link, link_cell, row, table, text_cell, FixtureTable,
    };

    fn resolver() -> TableResolver {
        TableResolver::new(ResolverConfig::default())
    }

    fn hidden(mut t: FixtureTable) -> FixtureTable {
        t.visible = false;
        t
    }

    fn unreadable(mut t: FixtureTable) -> FixtureTable {
        t.unreadable = Some("stale element".into());
        t
    }

    #[test]
    fn test_partition_suffix() {
        assert_eq!(partition_suffix("2018"), "18");
        assert_eq!(partition_suffix("7"), "7");
        assert_eq!(partition_suffix(""), "");
    }

    #[test]
    fn test_score_counts_both_link_columns() -> anyhow::Result<()> {
        // 4 rows: ASIC links end in /15, Business links end in /14
        let t = gazette_table("15", "14", 4);
        let s = resolver().score(&t, "15")?;
        assert_eq!(s.total_links, 8);
        assert_eq!(s.matched_links, 4);
        assert_eq!(s.ratio(), 0.5);
        Ok(())
    }

    #[test]
    fn test_score_samples_first_rows_only_and_ignores_plain_text() -> anyhow::Result<()> {
        let mut t = gazette_table("15", "15", 12);
        // first data row: a slash-less link and a slash in plain text
        t.rows.insert(
            1,
            row(vec![
                text_cell("x"),
                link_cell(vec![link("no slash", "/x")]),
                text_cell("1/15"),
                text_cell(""),
            ]),
        );
        let s = resolver().score(&t, "15")?;
        // that row plus 9 gazette rows x 2 columns
        assert_eq!(s.total_links, 18);
        assert_eq!(s.matched_links, 18);
        Ok(())
    }

    #[test]
    fn test_score_of_empty_table_is_zero() -> anyhow::Result<()> {
        let s = resolver().score(&table(vec![]), "15")?;
        assert_eq!(s, TableScore::default());
        assert_eq!(s.ratio(), 0.0);
        Ok(())
    }

    #[test]
    fn test_first_qualifying_candidate_wins() {
        let candidates = vec![
            gazette_table("19", "19", 6),
            gazette_table("18", "18", 6),
            gazette_table("18", "18", 8),
        ];
        let mut diags = Vec::new();
        let r = resolver()
            .resolve(&candidates, "2018", &mut diags)
            .expect("should resolve");
        assert_eq!(r.index, 1);
        assert!(std::ptr::eq(r.table, &candidates[1]));
        assert!(matches!(r.method, Method::Scored(s) if s.total_links == 12));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_thresholds_are_strict() {
        // 3 rows x 2 columns = 6 links, all matching: total must exceed 5
        let ok = vec![gazette_table("18", "18", 3)];
        assert!(resolver().resolve(&ok, "2018", &mut Vec::new()).is_ok());

        // exactly 5 links
        let mut five = gazette_table("18", "18", 3);
        five.rows.last_mut().unwrap().cells[2] = text_cell("");
        let cfg = ResolverConfig {
            fallback: Default::default(),
            ..ResolverConfig::default()
        };
        let strict = TableResolver::new(cfg);
        assert!(strict.resolve(&[five], "2018", &mut Vec::new()).is_err());

        // ratio exactly 0.70 does not qualify: 7 of 10
        let mut seventy = gazette_table("18", "17", 5);
        for r in seventy.rows.iter_mut().skip(1).take(2) {
            r.cells[2] = link_cell(vec![link("B/18", "/b")]);
        }
        let s = strict.score(&seventy, "18").unwrap();
        assert_eq!((s.matched_links, s.total_links), (7, 10));
        assert!(strict.resolve(&[seventy], "2018", &mut Vec::new()).is_err());
    }

    #[test]
    fn test_scenario_b_third_of_ten_tables() {
        let mut candidates: Vec<FixtureTable> = (0..10)
            .map(|i| gazette_table(&format!("{:02}", 10 + i), "99", 5))
            .collect();
        // Table 2: 8 of its 10 sampled links end in /16.
        let mut t = gazette_table("16", "16", 4);
        t.rows.push(row(vec![
            text_cell("x"),
            link_cell(vec![link("A/99", "/a")]),
            link_cell(vec![link("B/98", "/b")]),
            text_cell(""),
        ]));
        candidates[2] = t;
        // Table 6 would also qualify but comes later.
        candidates[6] = gazette_table("16", "16", 6);

        let r = resolver()
            .resolve(&candidates, "2016", &mut Vec::new())
            .expect("should resolve");
        assert_eq!(r.index, 2);
        match r.method {
            Method::Scored(s) => {
                assert_eq!((s.matched_links, s.total_links), (8, 10));
            }
            Method::Fallback => panic!("expected scored resolution"),
        }
    }

    #[test]
    fn test_scenario_c_fallback_ordinal() {
        let candidates: Vec<FixtureTable> = (0..5).map(|_| gazette_table("99", "99", 3)).collect();
        let r = resolver()
            .resolve(&candidates, "2018", &mut Vec::new())
            .expect("fallback should resolve");
        assert_eq!(r.index, 3);
        assert!(std::ptr::eq(r.table, &candidates[3]));
        assert_eq!(r.method, Method::Fallback);
    }

    #[test]
    fn test_fallback_out_of_range_or_missing() {
        let three: Vec<FixtureTable> = (0..3).map(|_| gazette_table("99", "99", 3)).collect();
        let err = resolver()
            .resolve(&three, "2018", &mut Vec::new())
            .unwrap_err();
        assert_eq!(
            err,
            Diagnostic::ResolutionFailure {
                partition: "2018".into()
            }
        );
        // no table carries "/90" links and 1990 has no fallback entry
        let err = resolver()
            .resolve(&three, "1990", &mut Vec::new())
            .unwrap_err();
        assert_eq!(
            err,
            Diagnostic::ResolutionFailure {
                partition: "1990".into()
            }
        );
    }

    #[test]
    fn test_fallback_counts_visible_tables_only() {
        let candidates = vec![
            hidden(gazette_table("99", "99", 1)),
            gazette_table("99", "99", 1),
            hidden(gazette_table("99", "99", 1)),
            gazette_table("99", "99", 1),
            gazette_table("99", "99", 1),
            gazette_table("99", "99", 1),
        ];
        let r = resolver()
            .resolve(&candidates, "2018", &mut Vec::new())
            .expect("fallback should resolve");
        assert_eq!(r.index, 3);
        assert!(std::ptr::eq(r.table, &candidates[5]));
    }

    #[test]
    fn test_no_visible_tables() {
        let candidates = vec![hidden(gazette_table("18", "18", 8))];
        assert!(resolver()
            .resolve(&candidates, "2018", &mut Vec::new())
            .is_err());
    }

    #[test]
    fn test_unreadable_candidate_skipped_and_reported() {
        let candidates = vec![
            unreadable(gazette_table("18", "18", 8)),
            gazette_table("18", "18", 8),
        ];
        let mut diags = Vec::new();
        let r = resolver()
            .resolve(&candidates, "2018", &mut diags)
            .expect("should resolve");
        assert_eq!(r.index, 1);
        assert_eq!(diags.len(), 1);
        assert!(matches!(
            &diags[0],
            Diagnostic::TransientAccessFailure { table: 0, .. }
        ));
    }
}
