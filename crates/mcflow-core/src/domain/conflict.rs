//! Override-layer drift.

use std::fmt;

use serde::Serialize;

use super::hash::ContentHash;

/// An override whose upstream counterpart changed after the override was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideConflict {
    /// File name relative to the override directory, e.g. `开发规范.md`.
    pub file: String,
    /// Project-relative path of the override.
    pub override_path: String,
    /// Upstream-relative path of the baseline document.
    pub upstream_path: String,
    pub old_baseline_hash: ContentHash,
    pub new_baseline_hash: ContentHash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Back up the override, then replace it with the upstream document.
    AcceptUpstream,
    /// Keep the override as is and acknowledge the new baseline.
    KeepOverride,
    /// Write both versions side by side for a manual merge.
    ManualMerge,
    Skip,
}

impl Resolution {
    pub const ALL: [Resolution; 4] = [
        Self::AcceptUpstream,
        Self::KeepOverride,
        Self::ManualMerge,
        Self::Skip,
    ];

    /// Whether resolving this way records the new baseline in the manifest.
    pub fn acknowledges(self) -> bool {
        matches!(self, Self::AcceptUpstream | Self::KeepOverride)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::AcceptUpstream => "accept upstream",
            Self::KeepOverride => "keep override",
            Self::ManualMerge => "manual merge",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What resolving one conflict did on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ResolutionOutcome {
    Accepted { backup: String },
    Kept,
    MergeWritten { merge_file: String },
    Skipped,
}

/// Counts over a batch of resolutions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConflictSummary {
    pub accepted: usize,
    pub kept: usize,
    pub merged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ConflictSummary {
    pub fn record(&mut self, outcome: &ResolutionOutcome) {
        match outcome {
            ResolutionOutcome::Accepted { .. } => self.accepted += 1,
            ResolutionOutcome::Kept => self.kept += 1,
            ResolutionOutcome::MergeWritten { .. } => self.merged += 1,
            ResolutionOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.accepted + self.kept + self.merged + self.skipped + self.failed
    }
}

/// Both texts of a conflict, for diff display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictPreview {
    pub override_text: String,
    pub upstream_text: String,
}

/// Merge file body with both versions between conflict markers.
pub fn merge_document(conflict: &OverrideConflict, preview: &ConflictPreview) -> String {
    format!(
        "<<<<<<< override ({})\n{}\n=======\n{}\n>>>>>>> upstream ({})\n",
        conflict.override_path,
        preview.override_text.trim_end(),
        preview.upstream_text.trim_end(),
        conflict.upstream_path,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict() -> OverrideConflict {
        OverrideConflict {
            file: "开发规范.md".into(),
            override_path: "markdown/core/开发规范.md".into(),
            upstream_path: "markdown/开发规范.md".into(),
            old_baseline_hash: ContentHash::new("H1"),
            new_baseline_hash: ContentHash::new("H2"),
        }
    }

    #[test]
    fn only_accept_and_keep_acknowledge() {
        let acks: Vec<_> = Resolution::ALL
            .iter()
            .filter(|r| r.acknowledges())
            .collect();
        assert_eq!(acks, [&Resolution::AcceptUpstream, &Resolution::KeepOverride]);
    }

    #[test]
    fn merge_document_contains_both_sides() {
        let preview = ConflictPreview {
            override_text: "mine\n".into(),
            upstream_text: "theirs\n".into(),
        };
        let doc = merge_document(&conflict(), &preview);
        assert!(doc.starts_with("<<<<<<< override (markdown/core/开发规范.md)\nmine\n=======\ntheirs\n"));
        assert!(doc.ends_with(">>>>>>> upstream (markdown/开发规范.md)\n"));
    }

    #[test]
    fn summary_counts_by_category() {
        let mut summary = ConflictSummary::default();
        summary.record(&ResolutionOutcome::Kept);
        summary.record(&ResolutionOutcome::Skipped);
        summary.record(&ResolutionOutcome::Accepted {
            backup: "x".into(),
        });
        assert_eq!(summary.kept, 1);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn serialises_camel_case() {
        let json = serde_json::to_value(conflict()).unwrap();
        assert_eq!(json["oldBaselineHash"], "H1");
        assert_eq!(json["overridePath"], "markdown/core/开发规范.md");
    }
}
