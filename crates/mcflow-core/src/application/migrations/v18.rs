//! 17.x -> 18.0: `CLAUDE.md` becomes user-owned.
//!
//! The managed region markers are removed; the workflow itself moves into
//! the `/mc` command family. The manifest is left alone: the deploy that
//! follows records the version.

use tracing::instrument;

use crate::{
    application::{context::WorkflowContext, ports::Prompt, services::VersionResolver},
    domain::{
        ManagedFiles, MigrationOptions, MigrationOutcome, MigrationReport, Version,
        claude_md::{has_workflow_markers, minimal_template, strip_workflow_markers},
    },
    error::McflowResult,
};

use super::{MigrationSession, MigrationUnit};

/// Backup written by the simplify choice.
const V17_BACKUP: &str = "CLAUDE.md.v17.backup";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Preserve,
    Simplify,
    Cancel,
}

impl Choice {
    const ALL: [Choice; 3] = [Choice::Preserve, Choice::Simplify, Choice::Cancel];

    fn describe(self) -> String {
        match self {
            Self::Preserve => "Preserve: keep the content, drop the workflow markers (recommended)".into(),
            Self::Simplify => format!("Simplify: replace with a minimal template (backup: {V17_BACKUP})"),
            Self::Cancel => "Cancel: leave CLAUDE.md untouched".into(),
        }
    }
}

pub struct MigrationV18;

impl MigrationV18 {
    fn execute(
        &self,
        ctx: &WorkflowContext,
        simplify: bool,
        local: Version,
    ) -> McflowResult<MigrationReport> {
        let fs = ctx.fs();
        let path = ctx.project_path(ManagedFiles::CLAUDE_MD);
        let mut report = MigrationReport::new(self.name(), local, self.target_version());

        if !simplify {
            let backup = format!("{}.backup.{}", ManagedFiles::CLAUDE_MD, ctx.today());
            fs.copy_file(&path, &ctx.project_path(&backup))?;
            report.note(format!("Backed up CLAUDE.md to {backup}"));

            let content = fs.read_to_string(&path)?;
            fs.write_file(&path, &strip_workflow_markers(&content))?;
            report.note("Removed workflow region markers from CLAUDE.md");
        } else {
            fs.copy_file(&path, &ctx.project_path(V17_BACKUP))?;
            report.note(format!("Backed up CLAUDE.md to {V17_BACKUP}"));

            let project_path = ctx.project_root().to_string_lossy().replace('\\', "/");
            fs.write_file(
                &path,
                &minimal_template(&ctx.project_name(), &project_path, &ctx.today()),
            )?;
            report.note("Replaced CLAUDE.md with a minimal template");
        }

        report.note("Workflow guidance now lives in .claude/commands/mc*.md");
        Ok(report)
    }
}

impl MigrationUnit for MigrationV18 {
    fn name(&self) -> &'static str {
        "v18"
    }

    fn target_version(&self) -> Version {
        Version::new(18, 0, 0)
    }

    /// Upstream must ship 18.0 or later; 16.x templates still carry markers.
    fn needs_migration(&self, ctx: &WorkflowContext) -> bool {
        if VersionResolver::new(ctx).resolve_upstream() < self.target_version() {
            return false;
        }
        ctx.fs()
            .read_to_string(&ctx.project_path(ManagedFiles::CLAUDE_MD))
            .map(|content| has_workflow_markers(&content))
            .unwrap_or(false)
    }

    #[instrument(skip_all, fields(unit = "v18"))]
    fn migrate(
        &self,
        ctx: &WorkflowContext,
        options: &MigrationOptions,
        prompt: &dyn Prompt,
    ) -> McflowResult<MigrationOutcome> {
        let mut session = MigrationSession::begin(self.name())?;
        let local = VersionResolver::new(ctx).resolve_local();

        let choices: Vec<String> = Choice::ALL.iter().map(|c| c.describe()).collect();
        let picked = session.choose(
            options,
            prompt,
            "CLAUDE.md is now user-owned. How should it be migrated?",
            &choices,
            0,
        )?;
        let simplify = match Choice::ALL.get(picked).copied().unwrap_or(Choice::Cancel) {
            Choice::Preserve => false,
            Choice::Simplify => true,
            Choice::Cancel => return session.cancel(),
        };

        let report = session.execute(|| self.execute(ctx, simplify, local))?;
        Ok(MigrationOutcome::Completed(report))
    }
}
