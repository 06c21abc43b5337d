//! Deploy and sync orchestration.
//!
//! ```text
//! guard -> versions -> migrations -> obsolete files -> conflicts
//!       -> publish docs + commands -> manifest
//! ```

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        context::WorkflowContext,
        migrations::MigrationChain,
        ports::Prompt,
    },
    domain::{
        BaselineHashes, ManagedFiles, Manifest, ManifestUpdate, MigrationOptions,
        MigrationReport, OverrideConflict, RuleRegistry, Version,
    },
    error::McflowResult,
};

use super::{
    conflict_detector::OverrideConflictDetector,
    hash_store::HashStore,
    manifest_store::ManifestStore,
    obsolete_engine::{ObsoleteFileEngine, ObsoleteOptions, ObsoleteReport},
    publisher::DocPublisher,
    version_resolver::{VersionCheck, VersionResolver},
};

/// The state-file architecture retired `.claude/workflow-state.json` here.
const STATE_FILE_RETIRED: Version = Version::new(21, 0, 0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeployOptions {
    /// Run the full sync even when versions already match.
    pub sync: bool,
    /// Rewrite the manifest from scratch.
    pub reset: bool,
    /// Look for obsolete files across the whole history.
    pub clean: bool,
    pub auto_confirm: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DeployMode {
    UpToDate,
    FirstDeploy,
    Upgrade,
    Redeploy,
    Reset,
}

impl DeployMode {
    fn select(check: &VersionCheck, options: &DeployOptions) -> Self {
        if options.reset {
            Self::Reset
        } else if check.is_first_deploy() {
            Self::FirstDeploy
        } else if check.needs_update {
            Self::Upgrade
        } else if options.sync {
            Self::Redeploy
        } else {
            Self::UpToDate
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployReport {
    pub mode: DeployMode,
    pub from: Version,
    pub to: Version,
    pub changelog: Option<&'static str>,
    pub migrations: Vec<MigrationReport>,
    /// Migration the user declined; the deploy stopped there.
    pub cancelled: Option<&'static str>,
    pub obsolete: Option<ObsoleteReport>,
    pub conflicts: Vec<OverrideConflict>,
    pub published: Vec<String>,
    pub rendered: Vec<String>,
    pub removed_state_file: bool,
    pub removed_legacy_version: bool,
    /// Cleanup steps that failed without stopping the deploy.
    pub warnings: Vec<String>,
}

impl DeployReport {
    fn new(mode: DeployMode, check: &VersionCheck) -> Self {
        Self {
            mode,
            from: check.local,
            to: check.upstream,
            changelog: check.changelog,
            migrations: Vec::new(),
            cancelled: None,
            obsolete: None,
            conflicts: Vec::new(),
            published: Vec::new(),
            rendered: Vec::new(),
            removed_state_file: false,
            removed_legacy_version: false,
            warnings: Vec::new(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.is_some()
    }
}

pub struct SyncService<'a> {
    ctx: &'a WorkflowContext,
    chain: MigrationChain,
}

impl<'a> SyncService<'a> {
    pub fn new(ctx: &'a WorkflowContext) -> Self {
        Self {
            ctx,
            chain: MigrationChain::standard(),
        }
    }

    #[instrument(skip_all, fields(project = %self.ctx.project_root().display()))]
    pub fn deploy(
        &self,
        options: DeployOptions,
        rules: &RuleRegistry,
        prompt: &dyn Prompt,
    ) -> McflowResult<DeployReport> {
        if self.ctx.project_is_upstream() {
            return Err(ApplicationError::DeployIntoUpstream {
                path: self.ctx.project_root().to_path_buf(),
            }
            .into());
        }
        self.ctx.ensure_roots()?;

        let check = VersionResolver::new(self.ctx).check();
        let mode = DeployMode::select(&check, &options);
        let mut report = DeployReport::new(mode, &check);
        info!(?mode, local = %check.local, upstream = %check.upstream, "Deploy planned");

        if mode == DeployMode::UpToDate {
            return Ok(report);
        }

        if mode != DeployMode::FirstDeploy {
            let migration_options = MigrationOptions {
                auto_confirm: options.auto_confirm,
            };
            let chain = self
                .chain
                .run_to_completion(self.ctx, &migration_options, prompt)?;
            report.migrations = chain.reports;
            if let Some(unit) = chain.cancelled {
                info!(unit, "Deploy stopped: migration declined");
                report.cancelled = Some(unit);
                return Ok(report);
            }
        }

        if mode != DeployMode::FirstDeploy || options.clean {
            let from = if options.clean {
                Version::UNINSTALLED
            } else {
                check.local
            };
            let engine = ObsoleteFileEngine::new(self.ctx, rules);
            let matches = engine.detect(from, check.upstream);
            if !matches.is_empty() {
                let obsolete_options = ObsoleteOptions {
                    auto_confirm: options.auto_confirm,
                    dry_run: false,
                };
                report.obsolete = Some(engine.process(&matches, obsolete_options, prompt)?);
            }
        }

        let store = ManifestStore::new(self.ctx);
        let previous = store.read();
        if mode != DeployMode::Reset {
            report.conflicts = OverrideConflictDetector::new(self.ctx).detect(&previous)?;
        }

        report.removed_state_file = self.remove_stale_state(check.upstream, &mut report.warnings);
        report.published = DocPublisher::new(self.ctx).publish()?;
        report.rendered = self.render_project_files(check.upstream)?;

        let baselines = self.baselines_for(&previous, &report.conflicts);
        if mode == DeployMode::Reset {
            let mut manifest = Manifest::new(self.ctx.now());
            manifest.apply(
                ManifestUpdate::new()
                    .version(check.upstream)
                    .baseline_hashes(baselines),
                self.ctx.now(),
            );
            store.replace(manifest)?;
        } else {
            store.write(
                ManifestUpdate::new()
                    .version(check.upstream)
                    .baseline_hashes(baselines),
            )?;
        }
        report.removed_legacy_version = store.retire_legacy_version()?;

        info!(
            published = report.published.len(),
            conflicts = report.conflicts.len(),
            "Deploy finished"
        );
        Ok(report)
    }

    /// Fresh upstream baselines, except that unresolved conflicts keep the
    /// hash they were detected against.
    fn baselines_for(&self, previous: &Manifest, conflicts: &[OverrideConflict]) -> BaselineHashes {
        let mut baselines = HashStore::new(self.ctx).upstream_baselines();
        for conflict in conflicts {
            if let Some(old) = previous.baseline(&conflict.file) {
                baselines.insert(conflict.file.clone(), old.clone());
            }
        }
        baselines
    }

    fn remove_stale_state(&self, upstream: Version, warnings: &mut Vec<String>) -> bool {
        if upstream < STATE_FILE_RETIRED {
            return false;
        }
        let path = self.ctx.project_path(ManagedFiles::WORKFLOW_STATE);
        if !self.ctx.fs().exists(&path) {
            return false;
        }
        match self.ctx.fs().remove(&path) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Could not remove stale workflow state");
                warnings.push(format!(
                    "Could not remove {}: {e}",
                    ManagedFiles::WORKFLOW_STATE
                ));
                false
            }
        }
    }

    /// Command files from their templates; `CLAUDE.md` only when absent.
    fn render_project_files(&self, upstream: Version) -> McflowResult<Vec<String>> {
        let fs = self.ctx.fs();
        let mut rendered = Vec::new();

        for command in self.ctx.files().commands() {
            let template = ManagedFiles::command_template(command);
            let Some(content) = self.ctx.render_upstream(&template, upstream)? else {
                continue;
            };
            let rel = format!("{}/{}", ManagedFiles::COMMANDS_DIR, command);
            fs.write_file_all(&self.ctx.project_path(&rel), &content)?;
            rendered.push(rel);
        }

        let claude_md = self.ctx.project_path(ManagedFiles::CLAUDE_MD);
        if !fs.exists(&claude_md) {
            if let Some(content) = self.ctx.render_upstream(ManagedFiles::CLAUDE_TEMPLATE, upstream)? {
                fs.write_file(&claude_md, &content)?;
                rendered.push(ManagedFiles::CLAUDE_MD.to_string());
            }
        }

        Ok(rendered)
    }
}
