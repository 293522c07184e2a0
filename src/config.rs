//! Audit configuration module.
//!
//! Handles loading and validating `shelfcheck.toml`. The file describes the
//! profile registry — which derivative kinds exist, where each lives inside
//! a journal folder, and which one is the reference — plus the year-folder
//! precedence policy.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - the stock registry below is the default
//!
//! # Profile treated as ground truth for page existence
//! reference = "images"
//!
//! # Name prefixes that form OR-groups: a page "has texts" when any
//! # profile named `texts` or `texts-*` has a file for it
//! composite_groups = ["texts"]
//!
//! # When a year is covered by both a single-year folder ("1890") and a
//! # range folder ("1889-1891"), prefer the range folder
//! ranges_take_precedence = false
//!
//! [profiles.images]
//! path_segments = ["images", "jpg"]   # journal/<segments...>/<year>/<page><ext>
//! extension = ".jpg"
//!
//! [profiles.texts-tesseract-v1]
//! path_segments = ["texts", "tesseract-v1"]
//! extension = ".txt"
//!
//! [profiles.texts-ra-ocr]
//! path_segments = ["texts", "ra-ocr"]
//! extension = ".txt"
//!
//! [profiles.xml]
//! path_segments = ["xml"]
//! extension = ".xml"
//!
//! [profiles.altoxml]
//! path_segments = ["altoxml"]
//! extension = ".alto.xml"
//!
//! [profiles.metadata-v1]
//! path_segments = ["metadata", "v1"]
//! extension = ".yaml"
//! ```
//!
//! Unknown keys are rejected to catch typos early. Structural invariants
//! (exactly one reference profile, sane extensions) are checked when the
//! registry is built in [`crate::profiles`], before any scan starts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Audit configuration loaded from `shelfcheck.toml`.
///
/// All fields have stock defaults mirroring the archive layout this tool
/// grew up with; a config file need only override what differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Name of the profile treated as ground truth for page existence.
    pub reference: String,
    /// Name prefixes combined with OR semantics for coverage purposes.
    pub composite_groups: Vec<String>,
    /// Prefer range folders over single-year folders when both cover a year.
    pub ranges_take_precedence: bool,
    /// Profile name → location and extension.
    pub profiles: BTreeMap<String, ProfileConfig>,
}

/// Where one profile's files live inside a journal folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// Path segments between the journal folder and the year folders.
    pub path_segments: Vec<String>,
    /// File extension including the leading dot (may be multi-part,
    /// e.g. `.alto.xml`).
    pub extension: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        let profile = |segments: &[&str], extension: &str| ProfileConfig {
            path_segments: segments.iter().map(|s| s.to_string()).collect(),
            extension: extension.to_string(),
        };
        let mut profiles = BTreeMap::new();
        profiles.insert("images".into(), profile(&["images", "jpg"], ".jpg"));
        profiles.insert(
            "texts-tesseract-v1".into(),
            profile(&["texts", "tesseract-v1"], ".txt"),
        );
        profiles.insert("texts-ra-ocr".into(), profile(&["texts", "ra-ocr"], ".txt"));
        profiles.insert("xml".into(), profile(&["xml"], ".xml"));
        profiles.insert("altoxml".into(), profile(&["altoxml"], ".alto.xml"));
        profiles.insert("metadata-v1".into(), profile(&["metadata", "v1"], ".yaml"));

        Self {
            reference: "images".into(),
            composite_groups: vec!["texts".into()],
            ranges_take_precedence: false,
            profiles,
        }
    }
}

impl AuditConfig {
    /// Load a config file. The path must exist — unlike the stock defaults,
    /// an explicitly named file that is missing is a user error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Return the stock config as a documented TOML string.
///
/// Written by hand rather than serialized so every option carries its
/// explanatory comment.
pub fn stock_config_toml() -> String {
    let stock = r##"# shelfcheck configuration
# All options are optional - defaults shown below.

# Profile treated as ground truth for page existence. Pages are whatever
# files this profile has; every other profile is audited against them.
reference = "images"

# Name prefixes that form OR-groups. A page "has texts" when any profile
# named `texts` or `texts-*` has a file for it.
composite_groups = ["texts"]

# When a year is covered by both a single-year folder ("1890") and a
# range folder ("1889-1891"), prefer the range folder's contents.
ranges_take_precedence = false

# Each profile names a derivative kind. Files are expected at
#   <root>/<journal>/<path_segments...>/<year-folder>/<page-id><extension>

[profiles.images]
path_segments = ["images", "jpg"]
extension = ".jpg"

[profiles.texts-tesseract-v1]
path_segments = ["texts", "tesseract-v1"]
extension = ".txt"

[profiles.texts-ra-ocr]
path_segments = ["texts", "ra-ocr"]
extension = ".txt"

[profiles.xml]
path_segments = ["xml"]
extension = ".xml"

[profiles.altoxml]
path_segments = ["altoxml"]
extension = ".alto.xml"

[profiles.metadata-v1]
path_segments = ["metadata", "v1"]
extension = ".yaml"
"##;
    stock.to_string()
}
