//! # shelfcheck
//!
//! A coverage auditor for large archives of digitized journal pages. The
//! filesystem is the data source: one folder per journal, one subtree per
//! derivative kind ("profile"), one folder per year or year range, one file
//! per page. shelfcheck walks the reference profile (the source images),
//! probes every other profile for the matching derivative of each page, and
//! aggregates what it finds into an immutable, serializable snapshot.
//!
//! # Architecture: Scan → Resolve → Snapshot
//!
//! ```text
//! 1. Scan      archive root  →  reference pages    (per journal, per year)
//! 2. Resolve   pages         →  per-page coverage  (probe every profile)
//! 3. Snapshot  coverage      →  DatasetSnapshot    (stats + diagnostics)
//! ```
//!
//! The snapshot is the unit everything else consumes: reports are pure
//! queries over it, persistence round-trips it to JSON, and a long-running
//! dashboard process holds it behind a swappable handle. Rebuilding is
//! always whole-snapshot — there is no partial mutation after construction,
//! so readers never observe a half-updated view.
//!
//! # Archive Layout
//!
//! ```text
//! archive/                          # Scan root
//! ├── ArbeiterZeitung/              # One folder per journal
//! │   ├── images/jpg/               # Reference profile (source of truth)
//! │   │   ├── 1890/                 # Single-year folder
//! │   │   │   ├── 0001.jpg
//! │   │   │   └── 0002.jpg
//! │   │   └── 1891-1893/            # Range folder (inclusive)
//! │   │       └── 0001.jpg
//! │   ├── texts/tesseract-v1/       # OCR variant
//! │   │   └── 1890/0001.txt
//! │   ├── texts/ra-ocr/             # Another OCR variant
//! │   ├── xml/
//! │   ├── altoxml/                  # Multi-part extension: .alto.xml
//! │   └── metadata/v1/
//! └── Volksblatt/
//!     └── ...
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `shelfcheck.toml` loading: profile table, reference, group prefixes, precedence flag |
//! | [`profiles`] | Validated profile registry and composite-group membership |
//! | [`yearspan`] | Year / year-range folder parsing and precedence resolution |
//! | [`scan`] | Reference-tree walk — enumerates every page the archive claims to have |
//! | [`coverage`] | Cross-references each page against every profile, builds the snapshot |
//! | [`model`] | Snapshot data model, read-only query surface, swappable handle |
//! | [`state`] | Versioned snapshot persistence (save/load, atomic writes) |
//! | [`report`] | Missing-years / missing-pages queries for the export collaborator |
//! | [`output`] | CLI output formatting — pure `format_*` functions, `print_*` wrappers |
//!
//! # Design Decisions
//!
//! ## One Bad Folder Never Loses a Scan
//!
//! Archives in the multi-terabyte range always contain some rot: a year
//! folder with wrong permissions, a directory named `1890_fixup`, a journal
//! half-migrated to a new layout. All of these become structured
//! [`Diagnostic`](model::Diagnostic) entries inside the snapshot; none of
//! them abort the scan. Only a missing or unreadable *root* is fatal.
//!
//! ## Composite Groups Are Derived, Never Stored
//!
//! "Any OCR variant counts" is a view, not state. A page's `texts` coverage
//! is the OR of its `texts-*` profiles, computed during accumulation from
//! the registry's group prefixes. Storing it per member as well would let
//! the two diverge when profiles are reconfigured.
//!
//! ## Single Year vs. Range Folders
//!
//! The same logical year may live in a `1890` folder, a `1889-1891` folder,
//! or both. Both shapes parse into one [`YearSpan`](yearspan::YearSpan)
//! variant and resolution is a single ranking function: preferred kind per
//! the `ranges_take_precedence` flag, then narrowest span, then first folder
//! name. Overlaps that needed the tie-breakers are recorded as diagnostics.
//!
//! ## Snapshots Are Cheap to Reload
//!
//! Rescanning terabytes to answer "which years still have no OCR?" is
//! wasteful. [`state`] serializes the whole snapshot as versioned JSON so a
//! later invocation (or the external dashboard) can reload it instead of
//! rescanning; files from an incompatible schema version are rejected
//! outright rather than half-parsed.

pub mod config;
pub mod coverage;
pub mod model;
pub mod output;
pub mod profiles;
pub mod report;
pub mod scan;
pub mod state;
pub mod yearspan;

#[cfg(test)]
pub(crate) mod test_helpers;
