//! Validated profile registry.
//!
//! A profile is a named derivative kind — source images, an OCR engine's
//! text output, ALTO-XML — together with where its files live inside a
//! journal folder. The registry validates the configured set once, up
//! front, and answers the structural questions the scanner and resolver
//! ask: which profile is the reference, which profiles form a composite
//! group, and where does profile X keep its year folders for journal Y.
//!
//! Group membership follows a naming convention rather than explicit
//! lists: a profile belongs to group `texts` when its name is `texts` or
//! starts with `texts-`. The reference profile never counts as a group
//! member — it defines page existence, it is not audited against itself.

use crate::config::{AuditConfig, ConfigError};
use std::path::{Path, PathBuf};

/// A named category of derivative (or source) file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    /// Path segments between the journal folder and the year folders.
    pub path_segments: Vec<String>,
    /// File extension including the leading dot.
    pub extension: String,
    pub is_reference: bool,
}

impl Profile {
    /// Directory holding this profile's year folders for one journal.
    pub fn dir(&self, journal_dir: &Path) -> PathBuf {
        self.path_segments
            .iter()
            .fold(journal_dir.to_path_buf(), |path, segment| path.join(segment))
    }

    /// File name of this profile's artifact for a page id.
    pub fn file_name(&self, page_id: &str) -> String {
        format!("{}{}", page_id, self.extension)
    }
}

/// The validated set of profiles for one audit run.
///
/// Invariant: exactly one profile is the reference. Construction fails
/// fast on a broken configuration — a scan never starts against an
/// invalid registry.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    /// All profiles, sorted by name. The reference is included.
    profiles: Vec<Profile>,
    reference: usize,
    groups: Vec<String>,
}

impl ProfileRegistry {
    pub fn from_config(config: &AuditConfig) -> Result<Self, ConfigError> {
        if config.profiles.is_empty() {
            return Err(ConfigError::Validation(
                "no profiles configured".to_string(),
            ));
        }
        if !config.profiles.contains_key(&config.reference) {
            return Err(ConfigError::Validation(format!(
                "reference profile '{}' is not in the profile table",
                config.reference
            )));
        }
        for (name, profile) in &config.profiles {
            if profile.path_segments.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "profile '{name}' has no path segments"
                )));
            }
            if !profile.extension.starts_with('.') {
                return Err(ConfigError::Validation(format!(
                    "profile '{name}' extension '{}' must start with '.'",
                    profile.extension
                )));
            }
        }

        // BTreeMap iteration gives the sorted order the rest of the crate
        // relies on for deterministic output.
        let profiles: Vec<Profile> = config
            .profiles
            .iter()
            .map(|(name, p)| Profile {
                name: name.clone(),
                path_segments: p.path_segments.clone(),
                extension: p.extension.clone(),
                is_reference: *name == config.reference,
            })
            .collect();
        let reference = profiles
            .iter()
            .position(|p| p.is_reference)
            .ok_or_else(|| ConfigError::Validation("reference profile lost".to_string()))?;

        Ok(Self {
            profiles,
            reference,
            groups: config.composite_groups.clone(),
        })
    }

    /// The profile treated as ground truth for page existence.
    pub fn reference(&self) -> &Profile {
        &self.profiles[self.reference]
    }

    /// Every non-reference profile, in name order.
    pub fn derivatives(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter().filter(|p| !p.is_reference)
    }

    /// Configured composite group prefixes.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// The composite group a profile name belongs to, if any.
    pub fn group_of(&self, profile_name: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| {
                profile_name == g.as_str()
                    || (profile_name.starts_with(g.as_str())
                        && profile_name.as_bytes().get(g.len()) == Some(&b'-'))
            })
            .map(|g| g.as_str())
    }

    /// Non-reference members of a composite group, in name order.
    pub fn group_members(&self, group: &str) -> Vec<&Profile> {
        self.derivatives()
            .filter(|p| self.group_of(&p.name) == Some(group))
            .collect()
    }

    /// Every key coverage is tracked under: each derivative profile name
    /// plus each composite group with at least one member. Sorted.
    pub fn coverage_targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self.derivatives().map(|p| p.name.clone()).collect();
        for group in &self.groups {
            if !self.group_members(group).is_empty() {
                targets.push(group.clone());
            }
        }
        targets.sort();
        targets
    }

    /// Whether a name is something reports can be asked about.
    pub fn is_target(&self, name: &str) -> bool {
        self.coverage_targets().iter().any(|t| t == name)
    }
}
