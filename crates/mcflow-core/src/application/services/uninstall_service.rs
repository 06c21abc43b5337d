//! Removes a workflow installation, keeping user content.

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    application::{ApplicationError, context::WorkflowContext},
    domain::ManagedFiles,
    error::McflowResult,
};

use super::manifest_store::ManifestStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UninstallOptions {
    pub dry_run: bool,
    /// Also remove `CLAUDE.md`, which users usually edit.
    pub include_claude_md: bool,
}

/// Managed paths found in the project, in removal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UninstallPlan {
    pub targets: Vec<String>,
    /// User paths that exist and will be left alone.
    pub preserved: Vec<String>,
}

impl UninstallPlan {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UninstallReport {
    pub plan: UninstallPlan,
    pub backup_dir: Option<String>,
    pub removed: Vec<String>,
    pub failed: Vec<(String, String)>,
    pub dry_run: bool,
}

pub struct UninstallService<'a> {
    ctx: &'a WorkflowContext,
}

impl<'a> UninstallService<'a> {
    pub fn new(ctx: &'a WorkflowContext) -> Self {
        Self { ctx }
    }

    /// Errors with `NotInstalled` when there is no deployment record at all.
    pub fn plan(&self, options: UninstallOptions) -> McflowResult<UninstallPlan> {
        let store = ManifestStore::new(self.ctx);
        if !store.exists() && !store.legacy_exists() {
            return Err(ApplicationError::NotInstalled {
                path: self.ctx.project_root().to_path_buf(),
            }
            .into());
        }

        let fs = self.ctx.fs();
        let mut candidates = self.ctx.files().uninstall_targets();
        if options.include_claude_md {
            candidates.insert(candidates.len() - 1, ManagedFiles::CLAUDE_MD.to_string());
        }

        Ok(UninstallPlan {
            targets: candidates
                .into_iter()
                .filter(|rel| fs.exists(&self.ctx.project_path(rel)))
                .collect(),
            preserved: ManagedFiles::preserved_user_paths()
                .iter()
                .filter(|rel| fs.exists(&self.ctx.project_path(rel)))
                .map(|rel| rel.to_string())
                .collect(),
        })
    }

    /// Back up every target, then remove it.
    ///
    /// A target that fails to back up is not removed.
    #[instrument(skip_all, fields(dry_run = options.dry_run))]
    pub fn execute(&self, options: UninstallOptions) -> McflowResult<UninstallReport> {
        let plan = self.plan(options)?;
        let mut report = UninstallReport {
            plan: plan.clone(),
            backup_dir: None,
            removed: Vec::new(),
            failed: Vec::new(),
            dry_run: options.dry_run,
        };
        if options.dry_run || plan.is_empty() {
            return Ok(report);
        }

        let fs = self.ctx.fs();
        let backup_dir = format!(".backup-uninstall-{}", self.ctx.today());
        fs.create_dir_all(&self.ctx.project_path(&backup_dir))?;

        for rel in &plan.targets {
            let path = self.ctx.project_path(rel);
            let result = fs
                .copy_all(&path, &self.ctx.project_path(format!("{backup_dir}/{rel}")))
                .and_then(|()| fs.remove(&path));
            match result {
                Ok(()) => report.removed.push(rel.clone()),
                Err(e) => {
                    warn!(target = %rel, error = %e, "Could not remove managed file");
                    report.failed.push((rel.clone(), e.to_string()));
                }
            }
        }

        info!(
            removed = report.removed.len(),
            failed = report.failed.len(),
            "Uninstall finished"
        );
        report.backup_dir = Some(backup_dir);
        Ok(report)
    }
}
