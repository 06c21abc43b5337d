//! 16.0 -> 16.1: four-region `CLAUDE.md` with a preserved extension area.

use tracing::{debug, instrument};

use crate::{
    application::{
        ApplicationError, context::WorkflowContext, ports::Prompt, services::VersionResolver,
    },
    domain::{
        ManagedFiles, MigrationOptions, MigrationOutcome, MigrationReport, Version,
        claude_md::{
            ClaudeMdParts, Section, assemble_v16_1, default_project_config, extract_section,
        },
    },
    error::McflowResult,
};

use super::{MigrationSession, MigrationUnit, record_migration};

pub struct MigrationV16_1;

impl MigrationV16_1 {
    fn render_template(&self, ctx: &WorkflowContext, upstream: Version) -> McflowResult<String> {
        ctx.render_upstream(ManagedFiles::CLAUDE_TEMPLATE, upstream)?
            .ok_or_else(|| {
                ApplicationError::MissingUpstreamFile {
                    path: ctx.upstream_path(ManagedFiles::CLAUDE_TEMPLATE),
                }
                .into()
            })
    }

    fn execute(
        &self,
        ctx: &WorkflowContext,
        local: Version,
        upstream: Version,
    ) -> McflowResult<MigrationReport> {
        let fs = ctx.fs();
        let path = ctx.project_path(ManagedFiles::CLAUDE_MD);
        let mut report = MigrationReport::new(self.name(), local, upstream);
        let rendered = self.render_template(ctx, upstream)?;

        if !fs.exists(&path) {
            fs.write_file(&path, &rendered)?;
            report.note("CLAUDE.md was missing; rendered it from the template");
        } else {
            let backup = format!("{}.backup.{}", ManagedFiles::CLAUDE_MD, ctx.today());
            fs.copy_file(&path, &ctx.project_path(&backup))?;
            report.note(format!("Backed up CLAUDE.md to {backup}"));

            let current = fs.read_to_string(&path)?;
            let project_config = match extract_section(&current, Section::ProjectConfig)? {
                Some(config) => config,
                None => {
                    report.note("No project config region found; using defaults");
                    default_project_config(
                        &ctx.project_name(),
                        &ctx.project_root().to_string_lossy().replace('\\', "/"),
                        &ctx.today(),
                    )
                }
            };
            let project_extension =
                extract_section(&current, Section::ProjectExtension)?.unwrap_or_default();
            let workflow = extract_section(&rendered, Section::Workflow)?.unwrap_or_default();
            debug!(
                extension_len = project_extension.len(),
                workflow_len = workflow.len(),
                "Reassembling CLAUDE.md"
            );

            let parts = ClaudeMdParts {
                project_config,
                workflow,
                project_extension,
            };
            let recorded_label = self.target_version().min(upstream).to_string();
            fs.write_file(&path, &assemble_v16_1(&parts, &recorded_label, &ctx.today()))?;
            report.note("Rewrote CLAUDE.md with the project extension region");
        }

        let recorded = record_migration(ctx, local, self.target_version(), upstream)?;
        report.to = recorded;
        report.note(format!("Recorded version {recorded} in the manifest"));
        Ok(report)
    }
}

impl MigrationUnit for MigrationV16_1 {
    fn name(&self) -> &'static str {
        "v16.1"
    }

    fn target_version(&self) -> Version {
        Version::new(16, 1, 0)
    }

    fn needs_migration(&self, ctx: &WorkflowContext) -> bool {
        let resolver = VersionResolver::new(ctx);
        resolver.resolve_local().in_minor(16, 0) && resolver.resolve_upstream().in_minor(16, 1)
    }

    #[instrument(skip_all, fields(unit = "v16.1"))]
    fn migrate(
        &self,
        ctx: &WorkflowContext,
        options: &MigrationOptions,
        prompt: &dyn Prompt,
    ) -> McflowResult<MigrationOutcome> {
        let mut session = MigrationSession::begin(self.name())?;
        let resolver = VersionResolver::new(ctx);
        let (local, upstream) = (resolver.resolve_local(), resolver.resolve_upstream());

        let question = format!(
            "Upgrade CLAUDE.md {local} -> {upstream} (project regions are kept, a backup is written)?"
        );
        if !session.confirm(options, prompt, &question)? {
            return Ok(MigrationOutcome::Cancelled);
        }

        let report = session.execute(|| self.execute(ctx, local, upstream))?;
        Ok(MigrationOutcome::Completed(report))
    }
}
