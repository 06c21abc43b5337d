//! 20.x -> 21.0: task metadata becomes the single source of task state.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{
    application::{
        ApplicationError, context::WorkflowContext, ports::Prompt, services::VersionResolver,
    },
    domain::{
        ManagedFiles, MigrationOptions, MigrationOutcome, MigrationReport, Version,
        task_meta::{active_task_id, is_current, migrate_task_meta, needs_migration},
    },
    error::{McflowError, McflowResult},
};

use super::{MigrationSession, MigrationUnit};

pub struct MigrationV21;

impl MigrationV21 {
    /// Every `.task-meta.json` under `tasks/`.
    ///
    /// A directory holding a meta file is a task directory and is not
    /// descended into.
    fn task_metas(&self, ctx: &WorkflowContext) -> Vec<PathBuf> {
        let mut metas = Vec::new();
        let root = ctx.project_path(ManagedFiles::TASKS_DIR);
        if ctx.fs().is_dir(&root) {
            collect_metas(ctx, &root, &mut metas);
        }
        metas
    }

    fn read_json(&self, ctx: &WorkflowContext, path: &Path) -> McflowResult<Value> {
        let text = ctx.fs().read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| {
            ApplicationError::InvalidJson {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn write_json(&self, ctx: &WorkflowContext, path: &Path, value: &Value) -> McflowResult<()> {
        let mut json =
            serde_json::to_string_pretty(value).map_err(|e| ApplicationError::InvalidJson {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        json.push('\n');
        ctx.fs().write_file(path, &json)
    }

    fn backup(&self, ctx: &WorkflowContext, path: &Path) -> McflowResult<String> {
        let rel = format!(
            "{}/{}",
            ManagedFiles::V20_BACKUP_DIR,
            ctx.relative_to_project(path)
        );
        ctx.fs().copy_all(path, &ctx.project_path(&rel))?;
        Ok(rel)
    }

    /// Metas the unit would rewrite. One that cannot be read or parsed
    /// counts as stale so a failed run stays pending.
    fn stale_metas(&self, ctx: &WorkflowContext) -> Vec<PathBuf> {
        self.task_metas(ctx)
            .into_iter()
            .filter(|path| {
                self.read_json(ctx, path)
                    .map(|meta| needs_migration(&meta))
                    .unwrap_or(true)
            })
            .collect()
    }

    /// The 21.0 form of one meta, or `None` when it is already current.
    fn rewrite(
        &self,
        ctx: &WorkflowContext,
        path: &Path,
        state: Option<&Value>,
    ) -> McflowResult<Option<Value>> {
        let meta = self.read_json(ctx, path)?;
        if state.is_none() && is_current(&meta) && !needs_migration(&meta) {
            return Ok(None);
        }
        Ok(Some(migrate_task_meta(meta, state)?))
    }

    fn failed(&self, errors: Vec<String>) -> McflowError {
        ApplicationError::MigrationFailed {
            unit: self.name().to_string(),
            reason: errors.join("; "),
        }
        .into()
    }

    /// Nothing on disk changes until every meta has been parsed and
    /// rewritten in memory. The state file goes last, so a failed run is
    /// detected again next time.
    fn execute(&self, ctx: &WorkflowContext, local: Version) -> McflowResult<MigrationReport> {
        let mut report = MigrationReport::new(self.name(), local, self.target_version());
        let state_path = ctx.project_path(ManagedFiles::WORKFLOW_STATE);
        let state = if ctx.fs().exists(&state_path) {
            Some(self.read_json(ctx, &state_path).map_err(|e| {
                self.failed(vec![format!("{}: {e}", ManagedFiles::WORKFLOW_STATE)])
            })?)
        } else {
            None
        };
        let active_id = state.as_ref().and_then(active_task_id);
        let active_meta = active_id.map(|id| {
            ctx.project_path(ManagedFiles::TASKS_DIR)
                .join(id)
                .join(ManagedFiles::TASK_META)
        });

        let mut errors = Vec::new();
        let mut rewrites = Vec::new();
        for path in self.task_metas(ctx) {
            let merge = if active_meta.as_deref() == Some(path.as_path()) {
                state.as_ref()
            } else {
                None
            };
            match self.rewrite(ctx, &path, merge) {
                Ok(Some(meta)) => rewrites.push((path, meta)),
                Ok(None) => {}
                Err(e) => errors.push(format!("{}: {e}", ctx.relative_to_project(&path))),
            }
        }
        if !errors.is_empty() {
            return Err(self.failed(errors));
        }

        if state.is_some() {
            let rel = self.backup(ctx, &state_path)?;
            report.note(format!("Backed up workflow state to {rel}"));
        }
        for (path, _) in &rewrites {
            self.backup(ctx, path)?;
        }

        let mut migrated = 0usize;
        for (path, meta) in &rewrites {
            let rel = ctx.relative_to_project(path);
            match self.write_json(ctx, path, meta) {
                Ok(()) => {
                    debug!(meta = %rel, "Task metadata migrated");
                    migrated += 1;
                }
                Err(e) => errors.push(format!("{rel}: {e}")),
            }
        }
        report.note(format!("Migrated {migrated} task metadata files to 21.0"));
        if !errors.is_empty() {
            return Err(self.failed(errors));
        }

        if let (Some(id), Some(meta_path)) = (active_id, active_meta.as_deref()) {
            if rewrites.iter().any(|(path, _)| path == meta_path) {
                report.note(format!("Merged workflow state into task {id}"));
            } else {
                warn!(task_id = id, "Active task has no metadata; state dropped");
                report.note(format!("Active task {id} has no metadata; state dropped"));
            }
        }
        if state.is_some() {
            ctx.fs().remove(&state_path)?;
            report.note(format!("Removed {}", ManagedFiles::WORKFLOW_STATE));
        }
        Ok(report)
    }
}

fn collect_metas(ctx: &WorkflowContext, dir: &Path, metas: &mut Vec<PathBuf>) {
    let meta = dir.join(ManagedFiles::TASK_META);
    if ctx.fs().exists(&meta) {
        metas.push(meta);
        return;
    }
    let Ok(entries) = ctx.fs().read_dir(dir) else {
        return;
    };
    for entry in entries {
        if ctx.fs().is_dir(&entry) {
            collect_metas(ctx, &entry, metas);
        }
    }
}

impl MigrationUnit for MigrationV21 {
    fn name(&self) -> &'static str {
        "v21"
    }

    fn target_version(&self) -> Version {
        Version::new(21, 0, 0)
    }

    fn needs_migration(&self, ctx: &WorkflowContext) -> bool {
        if VersionResolver::new(ctx).resolve_upstream() < self.target_version() {
            return false;
        }
        ctx.fs().exists(&ctx.project_path(ManagedFiles::WORKFLOW_STATE))
            || !self.stale_metas(ctx).is_empty()
    }

    #[instrument(skip_all, fields(unit = "v21"))]
    fn migrate(
        &self,
        ctx: &WorkflowContext,
        options: &MigrationOptions,
        prompt: &dyn Prompt,
    ) -> McflowResult<MigrationOutcome> {
        let mut session = MigrationSession::begin(self.name())?;
        let local = VersionResolver::new(ctx).resolve_local();
        let stale = self.stale_metas(ctx).len();

        let question = format!(
            "Move task state into .task-meta.json ({stale} task files to update, backups in {})?",
            ManagedFiles::V20_BACKUP_DIR
        );
        if !session.confirm(options, prompt, &question)? {
            return Ok(MigrationOutcome::Cancelled);
        }

        let report = session.execute(|| self.execute(ctx, local))?;
        Ok(MigrationOutcome::Completed(report))
    }
}
