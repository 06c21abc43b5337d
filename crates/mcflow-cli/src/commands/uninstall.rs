//! `mcflow uninstall`: remove the workflow from a project.
//!
//! Managed files are backed up before removal; user content (task folders,
//! `CLAUDE.md` unless asked) stays.

use tracing::instrument;

use mcflow_core::application::{
    ports::Prompt,
    services::{UninstallOptions, UninstallPlan, UninstallService},
};

use super::open_project;
use crate::{
    cli::{GlobalArgs, UninstallArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
    prompt::TerminalPrompt,
};

#[instrument(skip_all)]
pub fn execute(
    args: UninstallArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let ctx = open_project(&global, &config, args.project.path.as_deref())?;
    let service = UninstallService::new(&ctx);
    let options = UninstallOptions {
        dry_run: args.dry_run,
        include_claude_md: args.include_claude_md,
    };

    let plan = service
        .plan(options)
        .with_cli_context(|| "planning uninstall")?;

    if plan.is_empty() {
        if output.is_json() {
            output.json(&plan)?;
        } else {
            output.info("Nothing to remove")?;
        }
        return Ok(());
    }

    if args.dry_run {
        if output.is_json() {
            output.json(&plan)?;
        } else {
            output.header("Would remove:")?;
            show_plan(&plan, &output)?;
        }
        return Ok(());
    }

    if !args.yes {
        if !output.is_json() {
            output.header("Will remove:")?;
            show_plan(&plan, &output)?;
        }
        let go = TerminalPrompt
            .confirm("Remove these files? A backup is kept.", false)
            .with_cli_context(|| "confirming uninstall")?;
        if !go {
            return Err(CliError::Cancelled { stage: None });
        }
    }

    let report = service
        .execute(options)
        .with_cli_context(|| "removing workflow files")?;

    if output.is_json() {
        output.json(&report)?;
        return Ok(());
    }
    for path in &report.removed {
        output.success(&format!("Removed {path}"))?;
    }
    for (path, reason) in &report.failed {
        output.error(&format!("{path}: {reason}"))?;
    }
    if let Some(dir) = &report.backup_dir {
        output.info(&format!("Backup kept in {dir}"))?;
    }
    Ok(())
}

fn show_plan(plan: &UninstallPlan, output: &OutputManager) -> CliResult<()> {
    for target in &plan.targets {
        output.print(&format!("  {target}"))?;
    }
    if !plan.preserved.is_empty() {
        output.detail("kept:")?;
        for path in &plan.preserved {
            output.detail(&format!("  {path}"))?;
        }
    }
    Ok(())
}
