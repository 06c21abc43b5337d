//! `mcflow migrate`: run pending version migrations without a full deploy.

use serde::Serialize;
use tracing::instrument;

use mcflow_core::{
    application::migrations::{ChainStep, MigrationChain},
    domain::{MigrationOptions, MigrationOutcome, MigrationReport},
};

use super::{open_project, prompt_for};
use crate::{
    cli::{GlobalArgs, MigrateArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

#[derive(Serialize)]
struct MigrateView {
    applied: Vec<MigrationReport>,
    cancelled: Option<&'static str>,
}

#[instrument(skip_all)]
pub fn execute(
    args: MigrateArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let ctx = open_project(&global, &config, args.project.path.as_deref())?;
    ctx.ensure_roots().with_cli_context(|| "checking workspace roots")?;

    let options = MigrationOptions {
        auto_confirm: args.yes,
    };
    let prompt = prompt_for(args.yes);
    let chain = MigrationChain::standard();

    let view = if args.once {
        match chain
            .run_applicable(&ctx, &options, prompt.as_ref())
            .with_cli_context(|| "running migration")?
        {
            ChainStep::NothingToDo => MigrateView {
                applied: Vec::new(),
                cancelled: None,
            },
            ChainStep::Applied { unit, outcome } => match outcome {
                MigrationOutcome::Completed(report) => MigrateView {
                    applied: vec![report],
                    cancelled: None,
                },
                MigrationOutcome::Cancelled => MigrateView {
                    applied: Vec::new(),
                    cancelled: Some(unit),
                },
            },
        }
    } else {
        let outcome = chain
            .run_to_completion(&ctx, &options, prompt.as_ref())
            .with_cli_context(|| "running migrations")?;
        MigrateView {
            applied: outcome.reports,
            cancelled: outcome.cancelled,
        }
    };

    if output.is_json() {
        output.json(&view)?;
    } else if view.applied.is_empty() && view.cancelled.is_none() {
        output.info("No migration needed")?;
    } else {
        for report in &view.applied {
            output.success(&format!(
                "Migration {} (v{} -> v{})",
                report.unit, report.from, report.to
            ))?;
            for line in &report.lines {
                output.detail(line)?;
            }
        }
        if let Some(stage) = view.cancelled {
            output.warning(&format!("Migration {stage} was declined; nothing written for it"))?;
        }
    }

    match view.cancelled {
        Some(stage) => Err(CliError::Cancelled { stage: Some(stage) }),
        None => Ok(()),
    }
}
