//! `mcflow version`: installed vs. upstream workflow version.

use serde::Serialize;

use mcflow_core::application::{
    migrations::MigrationChain,
    services::{VersionCheck, VersionResolver},
};

use super::open_project;
use crate::{
    cli::{GlobalArgs, ProjectArgs},
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionView {
    #[serde(flatten)]
    check: VersionCheck,
    pending_migrations: Vec<&'static str>,
}

pub fn execute(
    args: ProjectArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let ctx = open_project(&global, &config, args.path.as_deref())?;
    ctx.ensure_roots().with_cli_context(|| "checking workspace roots")?;

    let view = VersionView {
        check: VersionResolver::new(&ctx).check(),
        pending_migrations: MigrationChain::standard().pending(&ctx),
    };

    if output.is_json() {
        output.json(&view)?;
        return Ok(());
    }

    let check = &view.check;
    let local = if check.is_first_deploy() {
        "not installed".to_string()
    } else {
        format!("v{}", check.local)
    };
    output.print(&format!("installed: {local}"))?;
    output.print(&format!("upstream:  v{}", check.upstream))?;

    if check.needs_update {
        output.warning("An update is available; run 'mcflow deploy'")?;
        if let Some(note) = check.changelog {
            output.detail(note)?;
        }
    } else {
        output.success("Up to date")?;
    }
    if !view.pending_migrations.is_empty() {
        output.info(&format!(
            "Pending migrations: {}",
            view.pending_migrations.join(", ")
        ))?;
    }
    Ok(())
}
