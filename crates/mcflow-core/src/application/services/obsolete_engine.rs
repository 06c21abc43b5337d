//! Detects and processes files made obsolete by a version jump.

use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    application::{context::WorkflowContext, ports::Prompt},
    domain::{ManagedFiles, ObsoleteAction, ObsoleteMatch, RuleRegistry, Version},
    error::McflowResult,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObsoleteOptions {
    pub auto_confirm: bool,
    /// Record what would happen without touching the filesystem.
    pub dry_run: bool,
}

/// Per-item result of processing one obsolete file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ObsoleteOutcome {
    Deleted,
    BackedUp { to: String },
    Migrated { to: String },
    Warned,
    Skipped,
    Planned { action: ObsoleteAction },
    Failed { reason: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ObsoleteStats {
    pub deleted: usize,
    pub backed: usize,
    pub migrated: usize,
    pub warned: usize,
    pub skipped: usize,
    pub failed: usize,
    pub planned: usize,
}

impl ObsoleteStats {
    fn record(&mut self, outcome: &ObsoleteOutcome) {
        match outcome {
            ObsoleteOutcome::Deleted => self.deleted += 1,
            ObsoleteOutcome::BackedUp { .. } => self.backed += 1,
            ObsoleteOutcome::Migrated { .. } => self.migrated += 1,
            ObsoleteOutcome::Warned => self.warned += 1,
            ObsoleteOutcome::Skipped => self.skipped += 1,
            ObsoleteOutcome::Planned { .. } => self.planned += 1,
            ObsoleteOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Items that changed the project.
    pub fn changed(&self) -> usize {
        self.deleted + self.backed + self.migrated
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedItem {
    #[serde(flatten)]
    pub entry: ObsoleteMatch,
    pub outcome: ObsoleteOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObsoleteReport {
    pub items: Vec<ProcessedItem>,
    pub stats: ObsoleteStats,
}

pub struct ObsoleteFileEngine<'a> {
    ctx: &'a WorkflowContext,
    registry: &'a RuleRegistry,
}

impl<'a> ObsoleteFileEngine<'a> {
    pub fn new(ctx: &'a WorkflowContext, registry: &'a RuleRegistry) -> Self {
        Self { ctx, registry }
    }

    /// Existing files named by every rule the upgrade crosses.
    #[instrument(skip(self))]
    pub fn detect(&self, local: Version, upstream: Version) -> Vec<ObsoleteMatch> {
        let mut matches = Vec::new();
        for rule in self.registry.applicable(local, upstream) {
            for file in &rule.files {
                if !self.ctx.fs().exists(&self.ctx.project_path(file)) {
                    continue;
                }
                matches.push(ObsoleteMatch {
                    file: file.clone(),
                    reason: rule.reason.clone(),
                    action: rule.action.clone(),
                    from_version: rule.from,
                    to_version: rule.to,
                });
            }
        }
        info!(count = matches.len(), "Obsolete files detected");
        matches
    }

    /// Apply each match's action, asking first unless auto-confirmed.
    ///
    /// A failing item is recorded and the batch continues.
    #[instrument(skip_all, fields(count = matches.len(), dry_run = options.dry_run))]
    pub fn process(
        &self,
        matches: &[ObsoleteMatch],
        options: ObsoleteOptions,
        prompt: &dyn Prompt,
    ) -> McflowResult<ObsoleteReport> {
        let mut report = ObsoleteReport::default();

        for item in matches {
            // An earlier rule in the same jump may already have moved it.
            if !options.dry_run && !self.ctx.fs().exists(&self.ctx.project_path(&item.file)) {
                let outcome = ObsoleteOutcome::Skipped;
                report.stats.record(&outcome);
                report.items.push(ProcessedItem {
                    entry: item.clone(),
                    outcome,
                });
                continue;
            }

            let confirmed = if options.auto_confirm || options.dry_run {
                true
            } else {
                prompt.confirm(
                    &format!("{} ({}): {}?", item.file, item.reason, item.action),
                    true,
                )?
            };

            let outcome = if !confirmed {
                ObsoleteOutcome::Skipped
            } else if options.dry_run {
                ObsoleteOutcome::Planned {
                    action: item.action.clone(),
                }
            } else {
                self.apply(item).unwrap_or_else(|e| {
                    warn!(file = %item.file, error = %e, "Obsolete file not processed");
                    ObsoleteOutcome::Failed {
                        reason: e.to_string(),
                    }
                })
            };

            report.stats.record(&outcome);
            report.items.push(ProcessedItem {
                entry: item.clone(),
                outcome,
            });
        }

        Ok(report)
    }

    fn apply(&self, item: &ObsoleteMatch) -> McflowResult<ObsoleteOutcome> {
        let fs = self.ctx.fs();
        let source = self.ctx.project_path(&item.file);

        match &item.action {
            ObsoleteAction::Delete => {
                fs.remove(&source)?;
                Ok(ObsoleteOutcome::Deleted)
            }
            ObsoleteAction::Backup => {
                let rel = format!("{}/{}", ManagedFiles::OBSOLETE_BACKUP_DIR, item.file);
                self.move_into(&source, &rel)?;
                Ok(ObsoleteOutcome::BackedUp { to: rel })
            }
            ObsoleteAction::Migrate { to } => {
                let name = Path::new(&item.file)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| item.file.clone());
                let rel = format!("{}/{}", to.trim_end_matches('/'), name);
                self.move_into(&source, &rel)?;
                Ok(ObsoleteOutcome::Migrated { to: rel })
            }
            ObsoleteAction::Warn => Ok(ObsoleteOutcome::Warned),
        }
    }

    fn move_into(&self, source: &Path, rel: &str) -> McflowResult<()> {
        let fs = self.ctx.fs();
        let dest = self.ctx.project_path(rel);
        if let Some(parent) = dest.parent() {
            fs.create_dir_all(parent)?;
        }
        fs.rename(source, &dest)
    }
}
