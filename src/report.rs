//! Derived report queries over a snapshot.
//!
//! The external CSV writer (and the dashboard's report pages) consume
//! these. The core guarantees stable ordering — journal ascending, then
//! year ascending, then page id ascending — so exports are deterministic
//! across runs.
//!
//! The two per-target reports partition: a year with zero coverage
//! appears in [`missing_years`] and its pages are *not* repeated in
//! [`missing_pages`], which only lists the gaps of partially covered
//! years. A target unknown to the snapshot yields empty reports.

use crate::model::{DatasetSnapshot, Page};
use serde::Serialize;
use std::collections::BTreeSet;

/// A (journal, year) with no coverage at all for the queried target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingYear {
    pub journal: String,
    pub year: u16,
}

/// Years whose pages are entirely missing the target profile or group.
pub fn missing_years(snapshot: &DatasetSnapshot, target: &str) -> Vec<MissingYear> {
    let mut rows = Vec::new();
    for journal in &snapshot.journals {
        for year in &journal.years {
            if year.total_pages > 0 && year.tracks(target) && year.covered_for(target) == 0 {
                rows.push(MissingYear {
                    journal: journal.name.clone(),
                    year: year.year,
                });
            }
        }
    }
    rows
}

/// Uncovered pages of partially covered years, ordered (journal, year,
/// page id) ascending. Zero-coverage years are excluded — those belong
/// to [`missing_years`], and repeating every one of their pages here
/// would only pad the export.
pub fn missing_pages(snapshot: &DatasetSnapshot, target: &str) -> Vec<Page> {
    let mut rows = Vec::new();
    for journal in &snapshot.journals {
        for year in &journal.years {
            if year.covered_for(target) == 0 {
                continue;
            }
            for page_id in year.missing_for(target) {
                rows.push(Page {
                    journal: journal.name.clone(),
                    year: year.year,
                    page_id: page_id.to_string(),
                });
            }
        }
    }
    rows
}

/// Missing page ids for every target of one (journal, year) — the
/// per-year drill-down. Targets with nothing missing are omitted.
/// Returns `None` when the journal or year is not in the snapshot.
pub fn missing_files<'a>(
    snapshot: &'a DatasetSnapshot,
    journal: &str,
    year: u16,
) -> Option<Vec<(&'a str, &'a BTreeSet<String>)>> {
    let stats = snapshot.stats(journal, year)?;
    Some(
        stats
            .missing
            .iter()
            .filter(|(_, pages)| !pages.is_empty())
            .map(|(target, pages)| (target.as_str(), pages))
            .collect(),
    )
}
