//! Coverage resolution.
//!
//! Takes the pages the scanner enumerated and cross-references every one
//! of them against every derivative profile, accumulating per-year stats
//! and the snapshot. Journals are independent, so they resolve in
//! parallel; each worker returns its own stats and diagnostics and the
//! merge happens after the join — no shared mutable state, and a caller
//! never observes a partially assembled snapshot.
//!
//! Each profile's year folders resolve independently: the `xml` tree may
//! keep `1890-1892` where the images keep `1890`, `1891`, `1892`. The
//! resolver follows each profile's own index and flags the mismatch as a
//! [`Diagnostic::MixedOrganization`] instead of guessing a merge rule.

use crate::model::{DatasetSnapshot, Diagnostic, JournalStats, YearStats};
use crate::profiles::{Profile, ProfileRegistry};
use crate::scan::{self, IndexOutcome, JournalScan, ScanError};
use crate::yearspan::YearIndex;
use chrono::Utc;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Knobs for one scan invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Prefer range folders over single-year folders when both cover a
    /// year (applies to every profile, reference included).
    pub ranges_take_precedence: bool,
}

/// Cooperative cancellation flag for a long-running scan.
///
/// Checked between journals. A cancelled scan returns
/// [`ScanError::Cancelled`] and publishes nothing — whatever snapshot was
/// active before stays active.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Scan an archive root and resolve coverage for everything under it.
///
/// Pure with respect to the filesystem: an unchanged archive yields an
/// identical snapshot (modulo timestamp) on every run.
pub fn resolve(
    root: &Path,
    registry: &ProfileRegistry,
    options: &ScanOptions,
) -> Result<DatasetSnapshot, ScanError> {
    resolve_with_cancel(root, registry, options, &CancelToken::new())
}

/// [`resolve`], abortable through a [`CancelToken`].
pub fn resolve_with_cancel(
    root: &Path,
    registry: &ProfileRegistry,
    options: &ScanOptions,
    cancel: &CancelToken,
) -> Result<DatasetSnapshot, ScanError> {
    let journals = scan::list_journals(root)?;
    info!(root = %root.display(), journals = journals.len(), "scan started");

    // One worker per journal; results come back in journal order because
    // the parallel iterator is indexed.
    let resolved: Vec<Option<(JournalStats, Vec<Diagnostic>)>> = journals
        .par_iter()
        .map(|(name, dir)| {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            Ok(resolve_journal(name, dir, registry, options))
        })
        .collect::<Result<_, _>>()?;

    let mut stats = Vec::new();
    let mut diagnostics = Vec::new();
    for entry in resolved.into_iter().flatten() {
        let (journal, journal_diagnostics) = entry;
        stats.push(journal);
        diagnostics.extend(journal_diagnostics);
    }
    // Workers emit diagnostics in their own order; sort the merged list
    // so snapshots of an unchanged archive compare equal.
    diagnostics.sort();

    let snapshot = DatasetSnapshot {
        root: root.to_path_buf(),
        scanned_at: Utc::now(),
        journals: stats,
        diagnostics,
    };
    info!(
        journals = snapshot.journals.len(),
        pages = snapshot.total_pages(),
        diagnostics = snapshot.diagnostics.len(),
        "scan complete"
    );
    Ok(snapshot)
}

/// Resolve one journal: enumerate reference pages, probe every
/// derivative profile for each of them, accumulate stats.
fn resolve_journal(
    journal: &str,
    journal_dir: &Path,
    registry: &ProfileRegistry,
    options: &ScanOptions,
) -> Option<(JournalStats, Vec<Diagnostic>)> {
    let JournalScan {
        journal,
        years,
        mut diagnostics,
    } = scan::scan_journal(journal, journal_dir, registry, options.ranges_take_precedence)?;

    let indexes = index_derivatives(&journal, journal_dir, registry, &mut diagnostics);
    let targets = registry.coverage_targets();

    let mut year_stats = Vec::with_capacity(years.len());
    for year_pages in years {
        // Resolve each profile's folder for this year once, not per page.
        let probes: Vec<(&Profile, Option<PathBuf>)> = registry
            .derivatives()
            .map(|profile| {
                let (index, profile_dir) = &indexes[&profile.name];
                let folder = index
                    .pick(year_pages.year, options.ranges_take_precedence)
                    .map(|resolution| {
                        if resolution.is_ambiguous() {
                            diagnostics.push(Diagnostic::AmbiguousYearSpan {
                                journal: journal.clone(),
                                profile: profile.name.clone(),
                                year: year_pages.year,
                                chosen: resolution.chosen.folder.clone(),
                                contenders: resolution.contenders.clone(),
                            });
                        }
                        if resolution.chosen.folder != year_pages.source_folder {
                            diagnostics.push(Diagnostic::MixedOrganization {
                                journal: journal.clone(),
                                year: year_pages.year,
                                profile: profile.name.clone(),
                                reference_folder: year_pages.source_folder.clone(),
                                profile_folder: resolution.chosen.folder.clone(),
                            });
                        }
                        profile_dir.join(resolution.chosen.folder)
                    });
                (profile, folder)
            })
            .collect();

        let mut covered: BTreeMap<String, u32> =
            targets.iter().map(|t| (t.clone(), 0)).collect();
        let mut missing: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        // Groups without members are not tracked targets.
        let tracked_groups: Vec<&str> = registry
            .groups()
            .iter()
            .map(|g| g.as_str())
            .filter(|g| covered.contains_key(*g))
            .collect();

        for page in &year_pages.pages {
            let mut group_hit: BTreeMap<&str, bool> =
                tracked_groups.iter().map(|g| (*g, false)).collect();
            for (profile, folder) in &probes {
                let present = folder
                    .as_ref()
                    .is_some_and(|dir| dir.join(profile.file_name(page)).is_file());
                record(&mut covered, &mut missing, &profile.name, page, present);
                if let Some(group) = registry.group_of(&profile.name)
                    && let Some(hit) = group_hit.get_mut(group)
                {
                    *hit |= present;
                }
            }
            for (group, hit) in &group_hit {
                record(&mut covered, &mut missing, group, page, *hit);
            }
        }

        year_stats.push(YearStats {
            year: year_pages.year,
            source_folder: year_pages.source_folder,
            total_pages: year_pages.pages.len() as u32,
            covered,
            missing,
        });
    }

    Some((
        JournalStats {
            name: journal,
            years: year_stats,
        },
        diagnostics,
    ))
}

/// Tally one (target, page) probe into the accumulators.
fn record(
    covered: &mut BTreeMap<String, u32>,
    missing: &mut BTreeMap<String, BTreeSet<String>>,
    target: &str,
    page: &str,
    present: bool,
) {
    if present {
        if let Some(count) = covered.get_mut(target) {
            *count += 1;
        }
    } else {
        missing
            .entry(target.to_string())
            .or_default()
            .insert(page.to_string());
    }
}

/// Build every derivative profile's year-folder index for one journal.
/// Missing trees become empty indexes (everything under them is missing);
/// unreadable ones additionally record a diagnostic.
fn index_derivatives(
    journal: &str,
    journal_dir: &Path,
    registry: &ProfileRegistry,
    diagnostics: &mut Vec<Diagnostic>,
) -> BTreeMap<String, (YearIndex, PathBuf)> {
    registry
        .derivatives()
        .map(|profile| {
            let profile_dir = profile.dir(journal_dir);
            let index = match scan::index_profile_dir(&profile_dir) {
                IndexOutcome::Missing => YearIndex::default(),
                IndexOutcome::Unreadable(detail) => {
                    diagnostics.push(Diagnostic::PathAccess {
                        path: profile_dir.display().to_string(),
                        detail,
                    });
                    YearIndex::default()
                }
                IndexOutcome::Indexed(index, unparsed) => {
                    for folder in unparsed {
                        diagnostics.push(Diagnostic::UnparsedFolder {
                            journal: journal.to_string(),
                            profile: profile.name.clone(),
                            folder,
                        });
                    }
                    index
                }
            };
            (profile.name.clone(), (index, profile_dir))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{stock_registry, write_page, year_stats};
    use tempfile::TempDir;

    #[test]
    fn covered_and_missing_accumulate_per_profile() {
        let tmp = TempDir::new().unwrap();
        write_page(tmp.path(), "AZ", &["images", "jpg"], "1890", "0001.jpg");
        write_page(tmp.path(), "AZ", &["images", "jpg"], "1890", "0002.jpg");
        write_page(tmp.path(), "AZ", &["xml"], "1890", "0001.xml");

        let registry = stock_registry();
        let snapshot = resolve(tmp.path(), &registry, &ScanOptions::default()).unwrap();

        let stats = year_stats(&snapshot, "AZ", 1890);
        assert_eq!(stats.total_pages, 2);
        assert_eq!(stats.covered_for("xml"), 1);
        assert_eq!(stats.missing_for("xml").collect::<Vec<_>>(), vec!["0002"]);
        assert_eq!(stats.covered_for("altoxml"), 0);
        assert_eq!(
            stats.missing_for("altoxml").collect::<Vec<_>>(),
            vec!["0001", "0002"]
        );
    }

    #[test]
    fn composite_group_is_or_of_members() {
        let tmp = TempDir::new().unwrap();
        write_page(tmp.path(), "AZ", &["images", "jpg"], "1890", "0001.jpg");
        write_page(tmp.path(), "AZ", &["images", "jpg"], "1890", "0002.jpg");
        // Page 0001 covered by one OCR variant only; page 0002 by none.
        write_page(
            tmp.path(),
            "AZ",
            &["texts", "tesseract-v1"],
            "1890",
            "0001.txt",
        );

        let registry = stock_registry();
        let snapshot = resolve(tmp.path(), &registry, &ScanOptions::default()).unwrap();

        let stats = year_stats(&snapshot, "AZ", 1890);
        assert_eq!(stats.covered_for("texts-tesseract-v1"), 1);
        assert_eq!(stats.covered_for("texts-ra-ocr"), 0);
        assert_eq!(stats.covered_for("texts"), 1);
        assert_eq!(stats.missing_for("texts").collect::<Vec<_>>(), vec!["0002"]);
    }

    #[test]
    fn multi_part_extension_probed_exactly() {
        let tmp = TempDir::new().unwrap();
        write_page(tmp.path(), "AZ", &["images", "jpg"], "1890", "0001.jpg");
        write_page(tmp.path(), "AZ", &["altoxml"], "1890", "0001.alto.xml");

        let registry = stock_registry();
        let snapshot = resolve(tmp.path(), &registry, &ScanOptions::default()).unwrap();
        assert_eq!(year_stats(&snapshot, "AZ", 1890).covered_for("altoxml"), 1);
    }

    #[test]
    fn derivative_found_through_own_range_folder() {
        let tmp = TempDir::new().unwrap();
        write_page(tmp.path(), "AZ", &["images", "jpg"], "1890", "0001.jpg");
        // xml keeps a range folder where the reference keeps a single year.
        write_page(tmp.path(), "AZ", &["xml"], "1889-1891", "0001.xml");

        let registry = stock_registry();
        let snapshot = resolve(tmp.path(), &registry, &ScanOptions::default()).unwrap();

        let stats = year_stats(&snapshot, "AZ", 1890);
        assert_eq!(stats.covered_for("xml"), 1);
        assert!(snapshot.diagnostics.iter().any(|d| matches!(
            d,
            Diagnostic::MixedOrganization { profile, year: 1890, .. } if profile == "xml"
        )));
    }

    #[test]
    fn journals_resolve_independently() {
        let tmp = TempDir::new().unwrap();
        write_page(tmp.path(), "AZ", &["images", "jpg"], "1890", "0001.jpg");
        write_page(tmp.path(), "VB", &["images", "jpg"], "1900", "0001.jpg");
        write_page(tmp.path(), "VB", &["xml"], "1900", "0001.xml");

        let registry = stock_registry();
        let snapshot = resolve(tmp.path(), &registry, &ScanOptions::default()).unwrap();

        assert_eq!(snapshot.journal_names().collect::<Vec<_>>(), vec!["AZ", "VB"]);
        assert_eq!(year_stats(&snapshot, "AZ", 1890).covered_for("xml"), 0);
        assert_eq!(year_stats(&snapshot, "VB", 1900).covered_for("xml"), 1);
    }

    #[test]
    fn cancelled_scan_returns_error() {
        let tmp = TempDir::new().unwrap();
        write_page(tmp.path(), "AZ", &["images", "jpg"], "1890", "0001.jpg");

        let registry = stock_registry();
        let cancel = CancelToken::new();
        cancel.cancel();
        let result =
            resolve_with_cancel(tmp.path(), &registry, &ScanOptions::default(), &cancel);
        assert!(matches!(result, Err(ScanError::Cancelled)));
    }

    #[test]
    fn empty_root_yields_empty_snapshot() {
        let tmp = TempDir::new().unwrap();
        let registry = stock_registry();
        let snapshot = resolve(tmp.path(), &registry, &ScanOptions::default()).unwrap();
        assert!(snapshot.journals.is_empty());
        assert!(snapshot.diagnostics.is_empty());
        assert_eq!(snapshot.total_pages(), 0);
    }
}
