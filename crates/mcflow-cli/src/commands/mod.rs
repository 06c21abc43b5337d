//! Command handlers.
//!
//! Each handler translates parsed arguments into a core service call and
//! renders the result. Shared wiring (project context, rule registry,
//! prompt choice) lives here.

pub mod completions;
pub mod config;
pub mod conflicts;
pub mod deploy;
pub mod init;
pub mod migrate;
pub mod obsolete;
pub mod uninstall;
pub mod version;

use std::path::{Path, PathBuf};

use tracing::debug;

use mcflow_adapters::{LocalFilesystem, RuleLoader, SimpleRenderer};
use mcflow_core::{
    application::{AutoConfirm, Prompt, WorkflowContext},
    domain::RuleRegistry,
};

use crate::{
    cli::GlobalArgs,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    prompt::TerminalPrompt,
};

/// Build the workflow context for the project at `path` (default: cwd).
pub(crate) fn open_project(
    global: &GlobalArgs,
    config: &AppConfig,
    path: Option<&Path>,
) -> CliResult<WorkflowContext> {
    let project = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().with_cli_context(|| "reading the current directory")?,
    };
    if !project.is_dir() {
        return Err(CliError::ProjectNotFound { path: project });
    }
    let project = canonical(project);
    let upstream = canonical(config.upstream_root(global.upstream.as_deref())?);
    debug!(
        project = %project.display(),
        upstream = %upstream.display(),
        "Workspace resolved"
    );

    Ok(WorkflowContext::new(
        Box::new(LocalFilesystem::new()),
        Box::new(SimpleRenderer::new()),
        upstream,
        project,
    ))
}

/// Absolute form of `path` when it exists; as given otherwise.
fn canonical(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}

/// Built-in obsolete-file rules plus the table named by `obsolete.rules_file`.
pub(crate) fn rule_registry(config: &AppConfig) -> CliResult<RuleRegistry> {
    let mut registry = RuleRegistry::with_defaults();
    if let Some(path) = &config.obsolete.rules_file {
        let added = RuleLoader::new(path)
            .extend(&mut registry)
            .map_err(|e| CliError::Core(e.into()))?;
        debug!(added, path = %path.display(), "Extra obsolete rules loaded");
    }
    Ok(registry)
}

/// `AutoConfirm` when every question should take its default.
pub(crate) fn prompt_for(auto_confirm: bool) -> Box<dyn Prompt> {
    if auto_confirm {
        Box::new(AutoConfirm)
    } else {
        Box::new(TerminalPrompt)
    }
}
