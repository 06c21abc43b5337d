//! Local and upstream version resolution.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    application::context::WorkflowContext,
    domain::{ManagedFiles, Version},
};

use super::manifest_store::ManifestStore;

/// Version assumed when a tracking file exists but cannot tell us more.
const UNREADABLE_LOCAL: Version = Version::new(15, 1, 0);

/// Version assumed when the upstream `package.json` is unreadable.
const UNREADABLE_UPSTREAM: Version = Version::new(16, 0, 0);

#[derive(Debug, Deserialize)]
struct PackageJson {
    version: Option<String>,
}

/// Result of comparing the deployed version with the upstream one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionCheck {
    pub local: Version,
    pub upstream: Version,
    pub needs_update: bool,
    pub changelog: Option<&'static str>,
}

impl VersionCheck {
    pub fn is_first_deploy(&self) -> bool {
        self.local.is_uninstalled()
    }
}

pub struct VersionResolver<'a> {
    ctx: &'a WorkflowContext,
}

impl<'a> VersionResolver<'a> {
    pub fn new(ctx: &'a WorkflowContext) -> Self {
        Self { ctx }
    }

    /// Version the project was deployed from.
    ///
    /// The legacy version file wins over the manifest; `0.0.0` when neither
    /// exists.
    pub fn resolve_local(&self) -> Version {
        let store = ManifestStore::new(self.ctx);

        if store.legacy_exists() {
            return match store.load_legacy() {
                Ok(Some(legacy)) => legacy.resolved(),
                Ok(None) => Version::UNINSTALLED,
                Err(e) => {
                    warn!(error = %e, "Legacy version file unreadable");
                    UNREADABLE_LOCAL
                }
            };
        }

        match store.load() {
            Ok(Some(manifest)) => manifest.version.unwrap_or(UNREADABLE_LOCAL),
            Ok(None) => Version::UNINSTALLED,
            Err(e) => {
                warn!(error = %e, "Manifest unreadable");
                UNREADABLE_LOCAL
            }
        }
    }

    /// Version shipped by the upstream checkout (`package.json`).
    pub fn resolve_upstream(&self) -> Version {
        let path = self.ctx.upstream_path(ManagedFiles::UPSTREAM_PACKAGE);
        let parsed = self
            .ctx
            .fs()
            .read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str::<PackageJson>(&text).ok())
            .and_then(|pkg| pkg.version);

        match parsed {
            Some(v) => Version::parse(&v),
            None => {
                debug!(path = %path.display(), "Upstream version unreadable, assuming 16.0.0");
                UNREADABLE_UPSTREAM
            }
        }
    }

    pub fn check(&self) -> VersionCheck {
        let local = self.resolve_local();
        let upstream = self.resolve_upstream();
        VersionCheck {
            local,
            upstream,
            needs_update: local < upstream,
            changelog: changelog(upstream),
        }
    }
}

/// Release note for the known workflow lines.
pub fn changelog(version: Version) -> Option<&'static str> {
    match (version.major, version.minor) {
        (16, 0) => Some(
            "Two-layer docs: core documents are served from .claude/core-docs/, \
             project overrides live in markdown/core/.",
        ),
        (16, 1) => Some(
            "CLAUDE.md gains a project extension region that survives upgrades.",
        ),
        (18, 0) => Some(
            "CLAUDE.md is no longer managed by the workflow; workflow guidance \
             moves to the /mc command family.",
        ),
        (21, 0) => Some(
            "Task metadata (.task-meta.json) is the single source of task state; \
             workflow-state.json is retired.",
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_lines_have_notes() {
        for v in ["16.0.0", "16.1.2", "18.0.0", "21.0.1"] {
            assert!(changelog(Version::parse(v)).is_some(), "{v}");
        }
        assert!(changelog(Version::parse("17.0.0")).is_none());
    }
}
