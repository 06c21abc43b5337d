//! `mcflow deploy`: publish or upgrade the workflow in a project.

use tracing::{info, instrument};

use mcflow_core::application::services::{DeployMode, DeployOptions, DeployReport, SyncService};

use super::{obsolete::render_obsolete_report, open_project, prompt_for, rule_registry};
use crate::{
    cli::{DeployArgs, GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(
    args: DeployArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let ctx = open_project(&global, &config, args.project.path.as_deref())?;
    let registry = rule_registry(&config)?;

    let auto_confirm = args.yes || config.deploy.auto_confirm;
    let options = DeployOptions {
        sync: args.sync,
        reset: args.reset,
        clean: args.clean,
        auto_confirm,
    };
    info!(?options, "Starting deploy");

    let prompt = prompt_for(auto_confirm);
    let report = SyncService::new(&ctx)
        .deploy(options, &registry, prompt.as_ref())
        .with_cli_context(|| "deploying workflow")?;

    if output.is_json() {
        output.json(&report)?;
    } else {
        render(&report, &output)?;
    }

    match report.cancelled {
        Some(stage) => Err(CliError::Cancelled { stage: Some(stage) }),
        None => Ok(()),
    }
}

fn render(report: &DeployReport, output: &OutputManager) -> CliResult<()> {
    let (from, to) = (report.from, report.to);
    match report.mode {
        DeployMode::UpToDate => {
            output.success(&format!("Already up to date (v{to})"))?;
            output.detail("use --sync to re-publish, or --reset to rebuild the manifest")?;
            return Ok(());
        }
        DeployMode::FirstDeploy => output.header(&format!("Deploying workflow v{to}"))?,
        DeployMode::Upgrade => output.header(&format!("Upgrading v{from} -> v{to}"))?,
        DeployMode::Redeploy => output.header(&format!("Re-syncing v{to}"))?,
        DeployMode::Reset => output.header(&format!("Resetting deployment at v{to}"))?,
    }
    if let Some(note) = report.changelog {
        output.detail(note)?;
    }

    for migration in &report.migrations {
        output.success(&format!(
            "Migration {} (v{} -> v{})",
            migration.unit, migration.from, migration.to
        ))?;
        for line in &migration.lines {
            output.detail(line)?;
        }
    }
    if let Some(stage) = report.cancelled {
        output.warning(&format!("Stopped: migration {stage} was declined"))?;
        return Ok(());
    }

    if let Some(obsolete) = &report.obsolete {
        if !obsolete.items.is_empty() {
            output.print("")?;
            output.header("Obsolete files")?;
            render_obsolete_report(obsolete, output)?;
        }
    }

    if !report.conflicts.is_empty() {
        output.warning(&format!(
            "{} project override(s) differ from the new upstream docs",
            report.conflicts.len()
        ))?;
        for conflict in &report.conflicts {
            output.detail(&conflict.override_path)?;
        }
        output.detail("run 'mcflow conflicts' to review them")?;
    }

    output.success(&format!("Published {} document(s)", report.published.len()))?;
    for file in &report.rendered {
        output.detail(&format!("rendered {file}"))?;
    }
    if report.removed_state_file {
        output.info("Removed retired workflow-state.json")?;
    }
    if report.removed_legacy_version {
        output.info("Replaced the legacy version file with the manifest")?;
    }
    for warning in &report.warnings {
        output.warning(warning)?;
    }
    Ok(())
}
