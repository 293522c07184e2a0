//! Reference-tree scanning.
//!
//! Enumerates every page the archive claims to have by walking only the
//! reference profile's tree: journal folders directly under the root, the
//! reference path segments under each journal, year-span folders under
//! that, page files inside. Derivative profiles are never touched here —
//! the [`coverage`](crate::coverage) resolver probes them page by page.
//!
//! ## Failure Policy
//!
//! A missing or unreadable *root* is fatal. Everything below it degrades:
//! a journal without the reference tree is skipped (it is simply not
//! onboarded yet), an unreadable journal or year folder becomes a
//! [`Diagnostic::PathAccess`] entry and the scan moves on. One bad folder
//! never loses the rest of a multi-terabyte scan.

use crate::model::Diagnostic;
use crate::profiles::ProfileRegistry;
use crate::yearspan::YearIndex;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("archive root not readable: {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("scan cancelled")]
    Cancelled,
}

/// Reference pages found for one nominal year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearPages {
    pub year: u16,
    /// Folder the pages were enumerated from (single-year or range).
    pub source_folder: String,
    /// Page ids, i.e. file names cut at the first dot. Deduplicated.
    pub pages: BTreeSet<String>,
}

/// Everything the scanner found for one journal.
#[derive(Debug, Clone)]
pub struct JournalScan {
    pub journal: String,
    /// Per-year page sets, years ascending.
    pub years: Vec<YearPages>,
    pub diagnostics: Vec<Diagnostic>,
}

/// List journal directories directly under the archive root, sorted by
/// name. The only fatal error in the scanning path: no root, no scan.
pub fn list_journals(root: &Path) -> Result<Vec<(String, PathBuf)>, ScanError> {
    let entries = std::fs::read_dir(root).map_err(|source| ScanError::Root {
        path: root.to_path_buf(),
        source,
    })?;
    let mut journals: Vec<(String, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .filter_map(|p| {
            p.file_name()
                .map(|n| (n.to_string_lossy().into_owned(), p.clone()))
        })
        .collect();
    journals.sort();
    Ok(journals)
}

/// Enumerate the reference profile's pages for one journal.
///
/// Returns `None` when the journal has no reference tree at all. Every
/// year covered by the year-folder index yields the pages of the folder
/// the precedence policy picks for it — so a range folder's pages count
/// once per distinct year it wins.
pub fn scan_journal(
    journal: &str,
    journal_dir: &Path,
    registry: &ProfileRegistry,
    ranges_take_precedence: bool,
) -> Option<JournalScan> {
    let reference = registry.reference();
    let reference_dir = reference.dir(journal_dir);

    let mut diagnostics = Vec::new();
    let (index, unparsed) = match index_profile_dir(&reference_dir) {
        IndexOutcome::Missing => return None,
        IndexOutcome::Unreadable(detail) => {
            warn!(journal, path = %reference_dir.display(), %detail, "skipping unreadable reference tree");
            diagnostics.push(Diagnostic::PathAccess {
                path: reference_dir.display().to_string(),
                detail,
            });
            return Some(JournalScan {
                journal: journal.to_string(),
                years: Vec::new(),
                diagnostics,
            });
        }
        IndexOutcome::Indexed(index, unparsed) => (index, unparsed),
    };
    for folder in unparsed {
        diagnostics.push(Diagnostic::UnparsedFolder {
            journal: journal.to_string(),
            profile: reference.name.clone(),
            folder,
        });
    }

    let mut years = Vec::new();
    // Range folders cover several years; list each folder once.
    let mut listed: Vec<(String, BTreeSet<String>)> = Vec::new();
    for year in index.years().collect::<Vec<_>>() {
        let Some(resolution) = index.pick(year, ranges_take_precedence) else {
            continue;
        };
        if resolution.is_ambiguous() {
            diagnostics.push(Diagnostic::AmbiguousYearSpan {
                journal: journal.to_string(),
                profile: reference.name.clone(),
                year,
                chosen: resolution.chosen.folder.clone(),
                contenders: resolution.contenders.clone(),
            });
        }
        let folder = resolution.chosen.folder;
        let pages = match listed.iter().find(|(name, _)| *name == folder) {
            Some((_, pages)) => pages.clone(),
            None => {
                let pages = match page_ids(&reference_dir.join(&folder), &reference.extension) {
                    Ok(pages) => pages,
                    Err(err) => {
                        let path = reference_dir.join(&folder);
                        warn!(journal, path = %path.display(), %err, "skipping unreadable year folder");
                        diagnostics.push(Diagnostic::PathAccess {
                            path: path.display().to_string(),
                            detail: err.to_string(),
                        });
                        BTreeSet::new()
                    }
                };
                listed.push((folder.clone(), pages.clone()));
                pages
            }
        };
        // A year folder with no reference files contributes nothing.
        if pages.is_empty() {
            continue;
        }
        years.push(YearPages {
            year,
            source_folder: folder,
            pages,
        });
    }

    debug!(
        journal,
        years = years.len(),
        pages = years.iter().map(|y| y.pages.len()).sum::<usize>(),
        "reference tree scanned"
    );
    Some(JournalScan {
        journal: journal.to_string(),
        years,
        diagnostics,
    })
}

/// What indexing one profile directory produced.
pub(crate) enum IndexOutcome {
    /// The directory does not exist.
    Missing,
    /// The directory exists but could not be read.
    Unreadable(String),
    /// Index plus the subfolder names that did not parse as year spans.
    Indexed(YearIndex, Vec<String>),
}

/// Build a year-folder index from a profile directory's immediate
/// subfolders.
pub(crate) fn index_profile_dir(dir: &Path) -> IndexOutcome {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return IndexOutcome::Missing,
        Err(err) => return IndexOutcome::Unreadable(err.to_string()),
    };
    let folders: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    let (index, unparsed) = YearIndex::build(folders);
    IndexOutcome::Indexed(index, unparsed)
}

/// Page ids inside one year folder: files matching the extension
/// (case-insensitively, as archives mix `.jpg` and `.JPG`), each cut at
/// the first dot so multi-part extensions collapse to the same id.
fn page_ids(dir: &Path, extension: &str) -> io::Result<BTreeSet<String>> {
    let mut ids = BTreeSet::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !name.to_lowercase().ends_with(extension) {
            continue;
        }
        let id = match name.split_once('.') {
            Some((stem, _)) => stem,
            None => name.as_ref(),
        };
        if !id.is_empty() {
            ids.insert(id.to_string());
        }
    }
    Ok(ids)
}
