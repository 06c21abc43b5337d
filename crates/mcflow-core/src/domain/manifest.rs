//! The persisted deployment record of a downstream project.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{hash::ContentHash, version::Version};

/// Baseline hashes keyed by file name relative to the upstream `markdown/`.
pub type BaselineHashes = BTreeMap<String, ContentHash>;

/// `.claude/workflow-manifest.json`.
///
/// Fields this crate does not know about are kept in `extra` and written
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,

    #[serde(default)]
    pub baseline_hashes: BaselineHashes,

    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub installed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_from: Option<Version>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// A fresh manifest for a project with no deployment record.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            version: Some(Version::UNINSTALLED),
            baseline_hashes: BaselineHashes::new(),
            installed_at: Some(now),
            updated_at: None,
            migrated_from: None,
            migrated_at: None,
            extra: Map::new(),
        }
    }

    /// Shallow merge: every field set in `update` replaces the stored one.
    pub fn apply(&mut self, update: ManifestUpdate, now: DateTime<Utc>) {
        if let Some(version) = update.version {
            self.version = Some(version);
        }
        if let Some(hashes) = update.baseline_hashes {
            self.baseline_hashes = hashes;
        }
        if let Some(at) = update.installed_at {
            self.installed_at = Some(at);
        }
        if let Some(from) = update.migrated_from {
            self.migrated_from = Some(from);
        }
        if let Some(at) = update.migrated_at {
            self.migrated_at = Some(at);
        }
        if self.installed_at.is_none() {
            self.installed_at = Some(now);
        }
        self.updated_at = Some(now);
    }

    pub fn baseline(&self, file: &str) -> Option<&ContentHash> {
        self.baseline_hashes.get(file)
    }
}

/// Fields to overwrite on the next manifest write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestUpdate {
    pub version: Option<Version>,
    pub baseline_hashes: Option<BaselineHashes>,
    pub installed_at: Option<DateTime<Utc>>,
    pub migrated_from: Option<Version>,
    pub migrated_at: Option<DateTime<Utc>>,
}

impl ManifestUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn baseline_hashes(mut self, hashes: BaselineHashes) -> Self {
        self.baseline_hashes = Some(hashes);
        self
    }

    pub fn installed_at(mut self, at: DateTime<Utc>) -> Self {
        self.installed_at = Some(at);
        self
    }

    /// Record migration provenance.
    pub fn migrated(mut self, from: Version, at: DateTime<Utc>) -> Self {
        self.migrated_from = Some(from);
        self.migrated_at = Some(at);
        self
    }
}

/// `.claude/workflow-version.json`, written by 15.x deployments.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LegacyVersionFile {
    #[serde(default)]
    pub version: Option<String>,
}

impl LegacyVersionFile {
    /// Version recorded in the file. A file without one is a 15.0 install.
    pub fn resolved(&self) -> Version {
        match self.version.as_deref() {
            Some(v) if !v.trim().is_empty() => Version::parse(v),
            _ => Version::new(15, 0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, day, 8, 0, 0).unwrap()
    }

    #[test]
    fn reads_camel_case_and_created_at_alias() {
        let json = r#"{
            "version": "16.0.0",
            "createdAt": "2025-11-01T08:00:00.000Z",
            "baselineHashes": { "a.md": "abc" },
            "obsoleteFiles": []
        }"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.version, Some(Version::new(16, 0, 0)));
        assert_eq!(manifest.installed_at, Some(at(1)));
        assert_eq!(manifest.baseline("a.md"), Some(&ContentHash::new("abc")));
        assert!(manifest.extra.contains_key("obsoleteFiles"));
    }

    #[test]
    fn unknown_fields_survive_a_rewrite() {
        let json = r#"{"version":"16.0.0","baselineHashes":{},"custom":{"k":1}}"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();
        let out = serde_json::to_value(&manifest).unwrap();
        assert_eq!(out["custom"]["k"], 1);
        assert_eq!(out["version"], "16.0.0");
    }

    #[test]
    fn apply_is_a_shallow_merge() {
        let mut manifest = Manifest::new(at(1));
        manifest
            .baseline_hashes
            .insert("old.md".into(), ContentHash::new("1"));

        manifest.apply(ManifestUpdate::new().version(Version::new(16, 1, 0)), at(2));
        assert_eq!(manifest.version, Some(Version::new(16, 1, 0)));
        assert!(manifest.baseline("old.md").is_some());
        assert_eq!(manifest.installed_at, Some(at(1)));
        assert_eq!(manifest.updated_at, Some(at(2)));

        manifest.apply(
            ManifestUpdate::new()
                .baseline_hashes(BaselineHashes::new())
                .migrated(Version::new(16, 0, 0), at(3)),
            at(3),
        );
        assert!(manifest.baseline_hashes.is_empty());
        assert_eq!(manifest.migrated_from, Some(Version::new(16, 0, 0)));
    }

    #[test]
    fn legacy_two_component_version_is_normalised() {
        let legacy: LegacyVersionFile = serde_json::from_str(r#"{"version":"15.0"}"#).unwrap();
        assert_eq!(legacy.resolved(), Version::new(15, 0, 0));

        let empty: LegacyVersionFile = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.resolved(), Version::new(15, 0, 0));
    }
}
