//! Loads extra obsolete-file rules from JSON or TOML rule tables.
//!
//! # JSON format
//!
//! ```json
//! [
//!   {
//!     "fromVersion": "20.0.0",
//!     "toVersion": "21.0.0",
//!     "files": [".claude/workflow-state.json"],
//!     "reason": "Task metadata is the single source of task state",
//!     "action": "backup"
//!   }
//! ]
//! ```
//!
//! # TOML format
//!
//! ```toml
//! [[rules]]
//! fromVersion = "17.0.0"
//! toVersion   = "18.0.0"
//! files       = ["markdown/old-guide.md"]
//! reason      = "Moved into the /mc commands"
//! action      = "migrate"
//! migrateTo   = "markdown/archive"
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use mcflow_core::domain::{DomainError, ObsoleteAction, ObsoleteRule, RuleRegistry, Version};

/// One rule as written in a rule table.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    #[serde(alias = "from_version")]
    pub from_version: String,
    #[serde(alias = "to_version")]
    pub to_version: String,
    pub files: Vec<String>,
    #[serde(default)]
    pub reason: String,
    /// `delete` | `backup` | `migrate` | `warn`
    pub action: String,
    /// Required when `action = "migrate"`.
    #[serde(default, alias = "migrate_to")]
    pub migrate_to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlRuleFile {
    #[serde(default)]
    rules: Vec<RuleDefinition>,
}

impl TryFrom<RuleDefinition> for ObsoleteRule {
    type Error = DomainError;

    fn try_from(def: RuleDefinition) -> Result<Self, Self::Error> {
        let action = match def.action.to_ascii_lowercase().as_str() {
            "delete" => ObsoleteAction::Delete,
            "backup" => ObsoleteAction::Backup,
            "warn" => ObsoleteAction::Warn,
            "migrate" => match def.migrate_to.filter(|t| !t.trim().is_empty()) {
                Some(to) => ObsoleteAction::Migrate { to },
                None => return Err(DomainError::MissingMigrateTarget { files: def.files }),
            },
            _ => return Err(DomainError::UnknownRuleAction { action: def.action }),
        };

        if def.files.is_empty() {
            return Err(DomainError::InvalidRule {
                reason: format!("rule '{}' lists no files", def.reason),
            });
        }

        Ok(ObsoleteRule::new(
            Version::parse(&def.from_version),
            Version::parse(&def.to_version),
            action,
            def.reason,
        )
        .files(def.files.into_iter().map(|f| normalize_path(&f))))
    }
}

/// Parse a JSON rule table.
pub fn parse_json(raw: &str) -> Result<Vec<ObsoleteRule>, DomainError> {
    let defs: Vec<RuleDefinition> = serde_json::from_str(raw).map_err(|e| DomainError::InvalidRule {
        reason: format!("invalid JSON rule table: {e}"),
    })?;
    defs.into_iter().map(ObsoleteRule::try_from).collect()
}

/// Parse a TOML rule table (`[[rules]]` entries).
pub fn parse_toml(raw: &str) -> Result<Vec<ObsoleteRule>, DomainError> {
    let file: TomlRuleFile = toml::from_str(raw).map_err(|e| DomainError::InvalidRule {
        reason: format!("invalid TOML rule table: {e}"),
    })?;
    file.rules.into_iter().map(ObsoleteRule::try_from).collect()
}

/// Reads rule tables from disk into a [`RuleRegistry`].
pub struct RuleLoader {
    path: PathBuf,
}

impl RuleLoader {
    /// `path` is a single rule file or a directory of them.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load every rule and append them to `registry`.
    ///
    /// A single file must parse. In a directory, broken files are skipped
    /// with a warning.
    #[instrument(skip(self, registry), fields(path = %self.path.display()))]
    pub fn extend(&self, registry: &mut RuleRegistry) -> Result<usize, DomainError> {
        let rules = if self.path.is_dir() {
            self.load_dir()?
        } else {
            load_file(&self.path)?
        };
        let count = rules.len();
        for rule in rules {
            registry.add(rule);
        }
        debug!(count, "Loaded extra obsolete rules");
        Ok(count)
    }

    fn load_dir(&self) -> Result<Vec<ObsoleteRule>, DomainError> {
        let mut rules = Vec::new();
        let mut files: Vec<PathBuf> = WalkDir::new(&self.path)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|p| matches!(extension(p).as_deref(), Some("json" | "toml")))
            .collect();
        files.sort();

        for file in files {
            match load_file(&file) {
                Ok(mut loaded) => rules.append(&mut loaded),
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "skipping rule table");
                }
            }
        }
        Ok(rules)
    }
}

/// Load one rule table, picking the format from the extension.
pub fn load_file(path: &Path) -> Result<Vec<ObsoleteRule>, DomainError> {
    let raw = fs::read_to_string(path).map_err(|e| DomainError::InvalidRule {
        reason: format!("failed to read '{}': {e}", path.display()),
    })?;
    match extension(path).as_deref() {
        Some("toml") => parse_toml(&raw),
        _ => parse_json(&raw),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches("./").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const JSON_TABLE: &str = r#"[
        {
            "fromVersion": "20.0",
            "toVersion": "21.0",
            "files": [".claude/workflow-state.json"],
            "reason": "state file retired",
            "action": "backup"
        },
        {
            "fromVersion": "17",
            "toVersion": "18",
            "files": ["markdown\\old.md"],
            "reason": "moved",
            "action": "migrate",
            "migrateTo": "markdown/archive"
        }
    ]"#;

    #[test]
    fn parses_json_rules() {
        let rules = parse_json(JSON_TABLE).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].to, Version::new(21, 0, 0));
        assert_eq!(rules[0].action, ObsoleteAction::Backup);
        assert_eq!(rules[1].files, ["markdown/old.md"]);
        assert_eq!(
            rules[1].action,
            ObsoleteAction::Migrate {
                to: "markdown/archive".into()
            }
        );
    }

    #[test]
    fn migrate_without_target_is_rejected() {
        let raw = r#"[{"fromVersion":"1","toVersion":"2","files":["a.md"],"reason":"r","action":"migrate"}]"#;
        assert!(matches!(
            parse_json(raw),
            Err(DomainError::MissingMigrateTarget { ref files }) if files == &["a.md"]
        ));
    }

    #[test]
    fn unknown_action_is_rejected() {
        let raw = r#"[{"fromVersion":"1","toVersion":"2","files":["a.md"],"reason":"r","action":"shred"}]"#;
        assert!(matches!(
            parse_json(raw),
            Err(DomainError::UnknownRuleAction { ref action }) if action == "shred"
        ));
    }

    #[test]
    fn parses_toml_rules() {
        let raw = r#"
            [[rules]]
            fromVersion = "17.0.0"
            toVersion = "18.0.0"
            files = ["markdown/old-guide.md"]
            reason = "gone"
            action = "delete"
        "#;
        let rules = parse_toml(raw).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].action, ObsoleteAction::Delete);
    }

    #[test]
    fn directory_loading_skips_broken_tables() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), JSON_TABLE).unwrap();
        fs::write(dir.path().join("b.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut registry = RuleRegistry::new();
        let added = RuleLoader::new(dir.path()).extend(&mut registry).unwrap();

        assert_eq!(added, 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn single_broken_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, "[{}]").unwrap();
        assert!(RuleLoader::new(&path).extend(&mut RuleRegistry::new()).is_err());
    }
}
