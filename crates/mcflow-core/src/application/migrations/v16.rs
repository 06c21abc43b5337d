//! 15.x -> 16.0: split `markdown/` into published core docs and overrides.

use tracing::{debug, instrument};

use crate::{
    application::{
        context::WorkflowContext,
        ports::Prompt,
        services::{CustomizationDetector, DocPublisher, HashStore, VersionResolver},
    },
    domain::{
        ManagedFiles, MigrationOptions, MigrationOutcome, MigrationReport, Version,
        docs::{add_customization_header, docs_readme},
    },
    error::McflowResult,
};

use super::{MigrationSession, MigrationUnit, record_migration};

pub struct MigrationV16;

/// How each core document in `markdown/` compares to upstream.
#[derive(Debug, Default)]
struct DocAnalysis {
    customized: Vec<String>,
    pristine: Vec<String>,
    missing: Vec<String>,
    legacy_dirs: Vec<String>,
}

impl MigrationV16 {
    fn analyze(&self, ctx: &WorkflowContext) -> DocAnalysis {
        let baselines = HashStore::new(ctx).upstream_baselines();
        let detector = CustomizationDetector::new(ctx);
        let mut analysis = DocAnalysis::default();

        for doc in ctx.files().core_docs() {
            let path = ctx.project_path(ManagedFiles::MARKDOWN_DIR).join(doc);
            if !ctx.fs().exists(&path) {
                analysis.missing.push(doc.clone());
            } else if detector.is_customized(&path, baselines.get(doc)) {
                analysis.customized.push(doc.clone());
            } else {
                analysis.pristine.push(doc.clone());
            }
        }

        for dir in ctx.files().legacy_core_dirs() {
            let path = ctx.project_path(ManagedFiles::MARKDOWN_DIR).join(dir);
            if ctx.fs().is_dir(&path) {
                analysis.legacy_dirs.push(dir.clone());
            }
        }

        debug!(
            customized = analysis.customized.len(),
            pristine = analysis.pristine.len(),
            missing = analysis.missing.len(),
            "Analyzed 15.x docs"
        );
        analysis
    }

    fn execute(
        &self,
        ctx: &WorkflowContext,
        analysis: &DocAnalysis,
        local: Version,
        upstream: Version,
    ) -> McflowResult<MigrationReport> {
        let fs = ctx.fs();
        let markdown = ctx.project_path(ManagedFiles::MARKDOWN_DIR);
        let mut report = MigrationReport::new(self.name(), local, upstream);

        if fs.is_dir(&markdown) {
            let backup = format!("{}/{}", ManagedFiles::V15_BACKUP_DIR, ManagedFiles::MARKDOWN_DIR);
            fs.copy_dir_all(&markdown, &ctx.project_path(&backup))?;
            report.note(format!("Backed up markdown/ to {backup}/"));
        }

        let overrides = ctx.project_path(ManagedFiles::OVERRIDE_DIR);
        fs.create_dir_all(&overrides)?;

        let upstream_label = upstream.to_string();
        for doc in &analysis.customized {
            let target = overrides.join(doc);
            fs.rename(&markdown.join(doc), &target)?;
            let content = fs.read_to_string(&target)?;
            fs.write_file(
                &target,
                &add_customization_header(&content, &upstream_label, doc),
            )?;
            report.note(format!("Kept customised {doc} as {}/{doc}", ManagedFiles::OVERRIDE_DIR));
        }

        for doc in &analysis.pristine {
            fs.remove(&markdown.join(doc))?;
            report.note(format!("Removed unmodified markdown/{doc}"));
        }
        for dir in &analysis.legacy_dirs {
            fs.remove(&markdown.join(dir))?;
            report.note(format!("Removed markdown/{dir}/"));
        }

        let published = DocPublisher::new(ctx).publish()?;
        report.note(format!(
            "Published {} core docs to {}/",
            published.len(),
            ManagedFiles::CORE_DOCS_DIR
        ));

        fs.write_file_all(
            &ctx.project_path(ManagedFiles::DOCS_README),
            &docs_readme(ctx.files(), &upstream_label, &ctx.today()),
        )?;
        report.note(format!("Wrote {}", ManagedFiles::DOCS_README));

        if let Some(claude_md) = ctx.render_upstream(ManagedFiles::CLAUDE_TEMPLATE, upstream)? {
            fs.write_file_all(&ctx.project_path(ManagedFiles::CLAUDE_MD), &claude_md)?;
            report.note("Regenerated CLAUDE.md");
        }

        for command in ctx.files().legacy_commands() {
            let template = ManagedFiles::command_template(command);
            if let Some(rendered) = ctx.render_upstream(&template, upstream)? {
                let rel = format!("{}/{}", ManagedFiles::COMMANDS_DIR, command);
                fs.write_file_all(&ctx.project_path(&rel), &rendered)?;
                report.note(format!("Rendered {rel}"));
            }
        }

        let recorded = record_migration(ctx, local, self.target_version(), upstream)?;
        report.to = recorded;
        report.note(format!("Recorded version {recorded} in the manifest"));
        Ok(report)
    }
}

impl MigrationUnit for MigrationV16 {
    fn name(&self) -> &'static str {
        "v16"
    }

    fn target_version(&self) -> Version {
        Version::new(16, 0, 0)
    }

    fn needs_migration(&self, ctx: &WorkflowContext) -> bool {
        let resolver = VersionResolver::new(ctx);
        resolver.resolve_local().in_major(15) && resolver.resolve_upstream().in_major(16)
    }

    #[instrument(skip_all, fields(unit = "v16"))]
    fn migrate(
        &self,
        ctx: &WorkflowContext,
        options: &MigrationOptions,
        prompt: &dyn Prompt,
    ) -> McflowResult<MigrationOutcome> {
        let mut session = MigrationSession::begin(self.name())?;
        let resolver = VersionResolver::new(ctx);
        let (local, upstream) = (resolver.resolve_local(), resolver.resolve_upstream());
        let analysis = self.analyze(ctx);

        let question = format!(
            "Migrate docs {local} -> {upstream}: keep {} customised, remove {} unmodified?",
            analysis.customized.len(),
            analysis.pristine.len()
        );
        if !session.confirm(options, prompt, &question)? {
            return Ok(MigrationOutcome::Cancelled);
        }

        let mut report = session.execute(|| self.execute(ctx, &analysis, local, upstream))?;
        for doc in &analysis.missing {
            report.note(format!("Not present in markdown/: {doc}"));
        }
        Ok(MigrationOutcome::Completed(report))
    }
}
