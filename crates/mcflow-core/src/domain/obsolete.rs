//! Obsolete-file rules and the registry that holds them.
//!
//! A rule fires for an upgrade `local -> upstream` when the upgrade crosses
//! the rule's target version: `local < rule.to && upstream >= rule.to`.

use std::fmt;

use serde::Serialize;

use super::{layout::ManagedFiles, version::Version};

/// What to do with a file made obsolete by a version boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ObsoleteAction {
    /// Remove the file or directory.
    Delete,
    /// Move into `.backup-obsolete/`, keeping the relative path.
    Backup,
    /// Move into `to/<file name>`.
    Migrate { to: String },
    /// Leave in place; the user reviews it by hand.
    Warn,
}

impl ObsoleteAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Backup => "backup",
            Self::Migrate { .. } => "migrate",
            Self::Warn => "warn",
        }
    }
}

impl fmt::Display for ObsoleteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Migrate { to } => write!(f, "migrate -> {to}"),
            other => f.write_str(other.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObsoleteRule {
    pub from: Version,
    pub to: Version,
    /// Paths relative to the project root.
    pub files: Vec<String>,
    pub reason: String,
    pub action: ObsoleteAction,
}

impl ObsoleteRule {
    pub fn new(from: Version, to: Version, action: ObsoleteAction, reason: impl Into<String>) -> Self {
        Self {
            from,
            to,
            files: Vec::new(),
            reason: reason.into(),
            action,
        }
    }

    pub fn file(mut self, path: impl Into<String>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn files<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Does the upgrade `local -> upstream` cross this rule's boundary?
    pub fn applies_to(&self, local: Version, upstream: Version) -> bool {
        local < self.to && upstream >= self.to
    }
}

/// A file on disk that an applicable rule names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObsoleteMatch {
    pub file: String,
    pub reason: String,
    pub action: ObsoleteAction,
    pub from_version: Version,
    pub to_version: Version,
}

/// The set of rules the obsolete-file engine consults.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<ObsoleteRule>,
}

impl RuleRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The rules shipped with the workflow, one per historical boundary.
    pub fn with_defaults() -> Self {
        let v15 = Version::new(15, 0, 0);
        let v16 = Version::new(16, 0, 0);
        let v17 = Version::new(17, 0, 0);
        let v18 = Version::new(18, 0, 0);
        let files = ManagedFiles::standard();

        let mut registry = Self::new();
        registry.add(
            ObsoleteRule::new(
                v15,
                v16,
                ObsoleteAction::Migrate {
                    to: ManagedFiles::OVERRIDE_DIR.into(),
                },
                "Two-layer docs: core documents are served from .claude/core-docs/",
            )
            .files(files.core_docs().iter().map(|d| format!("markdown/{d}")))
            .file("markdown/AI策略文档"),
        );
        registry.add(
            ObsoleteRule::new(
                v15,
                v16,
                ObsoleteAction::Warn,
                "Replaced by the workflow installer; may still be used locally",
            )
            .file("scripts/initmc.js"),
        );
        registry.add(
            ObsoleteRule::new(
                v15,
                v16,
                ObsoleteAction::Backup,
                "Configuration merged into .claude/workflow-manifest.json",
            )
            .file(".claude/workflow-config.json"),
        );
        registry.add(
            ObsoleteRule::new(
                v16,
                v17,
                ObsoleteAction::Delete,
                "The v15.0 migration guide is outdated",
            )
            .file("markdown/迁移指南-v15.0.md"),
        );
        registry.add(
            ObsoleteRule::new(
                v17,
                v18,
                ObsoleteAction::Delete,
                "AI strategy docs directory renamed: ai -> AI策略文档",
            )
            .file(".claude/core-docs/ai"),
        );
        registry
    }

    pub fn add(&mut self, rule: ObsoleteRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[ObsoleteRule] {
        &self.rules
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules crossed by `local -> upstream`, ascending by target version.
    ///
    /// Ties keep registration order.
    pub fn applicable(&self, local: Version, upstream: Version) -> Vec<&ObsoleteRule> {
        let mut rules: Vec<&ObsoleteRule> = self
            .rules
            .iter()
            .filter(|r| r.applies_to(local, upstream))
            .collect();
        rules.sort_by_key(|r| r.to);
        rules
    }
}
