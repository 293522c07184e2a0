//! Snapshot persistence.
//!
//! Scanning terabytes takes hours; reading the result back takes
//! milliseconds. This module serializes a complete [`DatasetSnapshot`] to
//! a versioned JSON document so later invocations (and the external
//! dashboard) can reload instead of rescanning.
//!
//! ## Format
//!
//! A single JSON object `{version, snapshot}`. The version is checked
//! *before* the snapshot is deserialized, so a file written by a newer
//! shelfcheck fails with a distinct [`StateError::VersionMismatch`]
//! instead of a misleading parse error. Bump [`STATE_VERSION`] whenever
//! the snapshot schema changes shape.
//!
//! ## Atomicity
//!
//! Saves write to a sibling `<name>.tmp` file and rename it into place.
//! An interrupted save leaves the previous state file intact; a truncated
//! snapshot file is never published.

use crate::model::DatasetSnapshot;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Version of the persisted snapshot format.
pub const STATE_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("state file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed state file: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported state file version {found} (this build reads version {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}

#[derive(Serialize)]
struct StateFileRef<'a> {
    version: u32,
    snapshot: &'a DatasetSnapshot,
}

#[derive(Deserialize)]
struct StateFile {
    version: u32,
    snapshot: DatasetSnapshot,
}

/// Only the version field; parsed first so schema drift in the snapshot
/// body still reports as a version problem.
#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Write a complete snapshot to `path`, atomically.
pub fn save(snapshot: &DatasetSnapshot, path: &Path) -> Result<(), StateError> {
    let document = StateFileRef {
        version: STATE_VERSION,
        snapshot,
    };
    let json = serde_json::to_string_pretty(&document)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Reconstruct a snapshot from a file written by [`save`].
pub fn load(path: &Path) -> Result<DatasetSnapshot, StateError> {
    let content = fs::read_to_string(path)?;
    let probe: VersionProbe = serde_json::from_str(&content)?;
    if probe.version != STATE_VERSION {
        return Err(StateError::VersionMismatch {
            found: probe.version,
            expected: STATE_VERSION,
        });
    }
    let document: StateFile = serde_json::from_str(&content)?;
    Ok(document.snapshot)
}
