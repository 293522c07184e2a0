//! Shared test utilities for the shelfcheck test suite.
//!
//! Archives are built programmatically — a fixture is a handful of empty
//! files in a `TempDir` laid out like a journal archive — and the helpers
//! here keep that terse:
//!
//! ```rust
//! let tmp = TempDir::new().unwrap();
//! write_page(tmp.path(), "AZ", &["images", "jpg"], "1890", "0001.jpg");
//! write_page(tmp.path(), "AZ", &["xml"], "1890", "0001.xml");
//!
//! let snapshot = coverage::resolve(tmp.path(), &stock_registry(), &Default::default()).unwrap();
//! assert_eq!(year_stats(&snapshot, "AZ", 1890).covered_for("xml"), 1);
//! ```

use crate::config::AuditConfig;
use crate::model::{DatasetSnapshot, Diagnostic, JournalStats, YearStats};
use crate::profiles::ProfileRegistry;
use chrono::{TimeZone, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Registry built from the stock configuration.
pub fn stock_registry() -> ProfileRegistry {
    ProfileRegistry::from_config(&AuditConfig::default())
        .unwrap_or_else(|e| panic!("stock config must validate: {e}"))
}

/// Create `<root>/<journal>/<segments...>/<year_folder>/<file_name>`
/// with placeholder content, creating directories as needed.
pub fn write_page(root: &Path, journal: &str, segments: &[&str], year_folder: &str, file_name: &str) {
    let mut dir = root.join(journal);
    for segment in segments {
        dir = dir.join(segment);
    }
    dir = dir.join(year_folder);
    std::fs::create_dir_all(&dir)
        .unwrap_or_else(|e| panic!("creating {}: {e}", dir.display()));
    std::fs::write(dir.join(file_name), "x")
        .unwrap_or_else(|e| panic!("writing {file_name}: {e}"));
}

/// Find a journal's stats for one year. Panics with context on a miss.
pub fn year_stats<'a>(snapshot: &'a DatasetSnapshot, journal: &str, year: u16) -> &'a YearStats {
    let stats = snapshot.journal(journal).unwrap_or_else(|| {
        let names: Vec<&str> = snapshot.journal_names().collect();
        panic!("journal '{journal}' not in snapshot. Available: {names:?}")
    });
    stats.year(year).unwrap_or_else(|| {
        let years: Vec<u16> = stats.years.iter().map(|y| y.year).collect();
        panic!("year {year} not in journal '{journal}'. Available: {years:?}")
    })
}

/// A small hand-built snapshot with known gaps, for tests that exercise
/// the model, reports, persistence, and output without touching a
/// filesystem:
///
/// - ArbeiterZeitung 1890 (2 pages): texts 1/2, xml 0/2
/// - ArbeiterZeitung 1891 (1 page): texts 0/1, xml 1/1
/// - Volksblatt 1900 (1 page, from range folder 1899-1901): fully covered
/// - one unparsed-folder diagnostic
pub fn sample_snapshot() -> DatasetSnapshot {
    fn counts(pairs: &[(&str, u32)]) -> BTreeMap<String, u32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }
    fn gaps(pairs: &[(&str, &[&str])]) -> BTreeMap<String, BTreeSet<String>> {
        pairs
            .iter()
            .map(|(k, pages)| {
                (
                    k.to_string(),
                    pages.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect()
    }

    DatasetSnapshot {
        root: "/archive/sample".into(),
        scanned_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
        journals: vec![
            JournalStats {
                name: "ArbeiterZeitung".into(),
                years: vec![
                    YearStats {
                        year: 1890,
                        source_folder: "1890".into(),
                        total_pages: 2,
                        covered: counts(&[("texts", 1), ("xml", 0)]),
                        missing: gaps(&[("texts", &["0002"]), ("xml", &["0001", "0002"])]),
                    },
                    YearStats {
                        year: 1891,
                        source_folder: "1891".into(),
                        total_pages: 1,
                        covered: counts(&[("texts", 0), ("xml", 1)]),
                        missing: gaps(&[("texts", &["0003"])]),
                    },
                ],
            },
            JournalStats {
                name: "Volksblatt".into(),
                years: vec![YearStats {
                    year: 1900,
                    source_folder: "1899-1901".into(),
                    total_pages: 1,
                    covered: counts(&[("texts", 1), ("xml", 1)]),
                    missing: BTreeMap::new(),
                }],
            },
        ],
        diagnostics: vec![Diagnostic::UnparsedFolder {
            journal: "ArbeiterZeitung".into(),
            profile: "images".into(),
            folder: "1890_fixup".into(),
        }],
    }
}
