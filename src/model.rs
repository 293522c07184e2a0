//! The coverage data model.
//!
//! A [`DatasetSnapshot`] is the complete result of one scan (or one loaded
//! state file): every journal, every year, per-profile and per-group
//! coverage counts, explicit missing-page sets, and the diagnostics the
//! scan accumulated. It is treated as immutable by all consumers — a
//! rescan or reload produces a fresh snapshot that replaces the old one
//! wholesale through [`SnapshotHandle`].
//!
//! All collections are ordered (`Vec`s sorted at construction, `BTreeMap`/
//! `BTreeSet` elsewhere) so that serialization and report output are
//! deterministic across runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// One page under the reference profile. Identity is (journal, year,
/// page id); the page id is the reference file's name cut at the first
/// dot, so `0017.jpg` and a derivative `0017.alto.xml` share the id `0017`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Page {
    pub journal: String,
    pub year: u16,
    pub page_id: String,
}

/// A non-fatal condition observed during a scan.
///
/// Diagnostics never abort a scan; they travel inside the snapshot so the
/// reporting side can show what the numbers are *not* telling.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A directory could not be read; its subtree was skipped.
    PathAccess { path: String, detail: String },
    /// A folder under a profile tree is not named like a year or range.
    UnparsedFolder {
        journal: String,
        profile: String,
        folder: String,
    },
    /// Several span folders of the winning kind covered the same year;
    /// the narrowest-then-lexicographic rule decided.
    AmbiguousYearSpan {
        journal: String,
        profile: String,
        year: u16,
        chosen: String,
        contenders: Vec<String>,
    },
    /// A derivative profile stores a year under a different folder shape
    /// than the reference (e.g. range folder vs. single-year folder).
    MixedOrganization {
        journal: String,
        year: u16,
        profile: String,
        reference_folder: String,
        profile_folder: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::PathAccess { path, detail } => {
                write!(f, "unreadable path {path}: {detail}")
            }
            Diagnostic::UnparsedFolder {
                journal,
                profile,
                folder,
            } => write!(
                f,
                "folder '{folder}' under {journal}/{profile} is not a year or year range"
            ),
            Diagnostic::AmbiguousYearSpan {
                journal,
                profile,
                year,
                chosen,
                contenders,
            } => write!(
                f,
                "year {year} in {journal}/{profile} covered by {} folders; chose '{chosen}' over {}",
                contenders.len() + 1,
                contenders.join(", ")
            ),
            Diagnostic::MixedOrganization {
                journal,
                year,
                profile,
                reference_folder,
                profile_folder,
            } => write!(
                f,
                "{journal} year {year}: {profile} stores '{profile_folder}' where the reference stores '{reference_folder}'"
            ),
        }
    }
}

/// Coverage statistics for one (journal, year).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearStats {
    /// Nominal calendar year this row depicts.
    pub year: u16,
    /// Folder the reference pages for this year were enumerated from.
    pub source_folder: String,
    /// Number of reference pages attributed to this year.
    pub total_pages: u32,
    /// Covered page count per derivative profile and composite group.
    /// Every tracked target has an entry, including zero.
    pub covered: BTreeMap<String, u32>,
    /// Missing page ids per target. Targets with nothing missing are
    /// omitted; use [`YearStats::missing_for`] for lookups.
    pub missing: BTreeMap<String, BTreeSet<String>>,
}

impl YearStats {
    /// Covered count for a profile or group; zero when untracked.
    pub fn covered_for(&self, target: &str) -> u32 {
        self.covered.get(target).copied().unwrap_or(0)
    }

    /// Missing page ids for a profile or group; empty when nothing is
    /// missing or the target is untracked.
    pub fn missing_for(&self, target: &str) -> impl Iterator<Item = &str> {
        self.missing
            .get(target)
            .into_iter()
            .flat_map(|set| set.iter().map(|s| s.as_str()))
    }

    /// Whether this year tracks the target at all.
    pub fn tracks(&self, target: &str) -> bool {
        self.covered.contains_key(target)
    }
}

/// All per-year statistics for one journal, years ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalStats {
    pub name: String,
    pub years: Vec<YearStats>,
}

impl JournalStats {
    pub fn year(&self, year: u16) -> Option<&YearStats> {
        self.years.iter().find(|y| y.year == year)
    }

    pub fn total_pages(&self) -> u64 {
        self.years.iter().map(|y| u64::from(y.total_pages)).sum()
    }
}

/// The complete, immutable result of one scan or one loaded state file.
///
/// Journals are sorted by name, years ascending within each journal,
/// diagnostics in their natural order — so two scans of an unchanged
/// archive serialize identically (modulo [`scanned_at`](Self::scanned_at)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSnapshot {
    /// Archive root this snapshot was scanned from.
    pub root: PathBuf,
    pub scanned_at: DateTime<Utc>,
    pub journals: Vec<JournalStats>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DatasetSnapshot {
    pub fn journal(&self, name: &str) -> Option<&JournalStats> {
        self.journals.iter().find(|j| j.name == name)
    }

    pub fn journal_names(&self) -> impl Iterator<Item = &str> {
        self.journals.iter().map(|j| j.name.as_str())
    }

    /// Years with pages for one journal, ascending.
    pub fn years(&self, journal: &str) -> Vec<u16> {
        self.journal(journal)
            .map(|j| j.years.iter().map(|y| y.year).collect())
            .unwrap_or_default()
    }

    pub fn stats(&self, journal: &str, year: u16) -> Option<&YearStats> {
        self.journal(journal)?.year(year)
    }

    pub fn total_pages(&self) -> u64 {
        self.journals.iter().map(|j| j.total_pages()).sum()
    }

    /// Every coverage target tracked anywhere in the snapshot, sorted.
    /// Useful for consumers that render per-target columns without
    /// access to the registry the snapshot was scanned with.
    pub fn targets(&self) -> Vec<&str> {
        let mut targets: BTreeSet<&str> = BTreeSet::new();
        for journal in &self.journals {
            for year in &journal.years {
                targets.extend(year.covered.keys().map(|k| k.as_str()));
            }
        }
        targets.into_iter().collect()
    }
}

/// Process-wide handle to the active snapshot.
///
/// A long-running dashboard process scans (or reloads state) while serving
/// readers. The handle holds an atomically swappable `Arc`: [`replace`]
/// publishes a complete snapshot, [`get`] hands out the current one.
/// Readers always observe either the old or the new snapshot, never a mix,
/// and a failed or cancelled rescan simply never calls [`replace`].
///
/// [`replace`]: SnapshotHandle::replace
/// [`get`]: SnapshotHandle::get
#[derive(Debug, Default)]
pub struct SnapshotHandle {
    current: RwLock<Option<Arc<DatasetSnapshot>>>,
}

impl SnapshotHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new snapshot, returning the shared reference to it.
    pub fn replace(&self, snapshot: DatasetSnapshot) -> Arc<DatasetSnapshot> {
        let snapshot = Arc::new(snapshot);
        let mut slot = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// The currently active snapshot, if any has been published.
    pub fn get(&self) -> Option<Arc<DatasetSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
