//! `mcflow obsolete`: find and handle files retired by an upgrade.

use tracing::instrument;

use mcflow_core::{
    application::services::{
        ObsoleteFileEngine, ObsoleteOptions, ObsoleteOutcome, ObsoleteReport, VersionResolver,
    },
    domain::{ObsoleteMatch, Version},
};

use super::{open_project, prompt_for, rule_registry};
use crate::{
    cli::{GlobalArgs, ObsoleteArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(
    args: ObsoleteArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let ctx = open_project(&global, &config, args.project.path.as_deref())?;
    ctx.ensure_roots().with_cli_context(|| "checking workspace roots")?;
    let registry = rule_registry(&config)?;

    let resolver = VersionResolver::new(&ctx);
    let (from, to) = version_range(
        args.from.as_deref(),
        args.to.as_deref(),
        || resolver.resolve_local(),
        || resolver.resolve_upstream(),
    )?;

    let engine = ObsoleteFileEngine::new(&ctx, &registry);
    let found = engine.detect(from, to);

    if args.list {
        return list(&found, from, to, &output);
    }

    if found.is_empty() {
        if output.is_json() {
            output.json(&ObsoleteReport::default())?;
        } else {
            output.success(&format!("No obsolete files between v{from} and v{to}"))?;
        }
        return Ok(());
    }

    let options = ObsoleteOptions {
        auto_confirm: args.auto_confirm,
        dry_run: args.dry_run,
    };
    let prompt = prompt_for(args.auto_confirm || args.dry_run);
    let report = engine
        .process(&found, options, prompt.as_ref())
        .with_cli_context(|| "processing obsolete files")?;

    if output.is_json() {
        output.json(&report)?;
    } else {
        output.header(&format!("Obsolete files (v{from} -> v{to})"))?;
        render_obsolete_report(&report, &output)?;
    }
    Ok(())
}

/// Explicit bounds win; missing ones come from the resolver.
fn version_range(
    from: Option<&str>,
    to: Option<&str>,
    local: impl FnOnce() -> Version,
    upstream: impl FnOnce() -> Version,
) -> CliResult<(Version, Version)> {
    let from = from.map(Version::parse).unwrap_or_else(local);
    let to = to.map(Version::parse).unwrap_or_else(upstream);
    if from > to {
        return Err(CliError::InvalidInput {
            message: format!("--from v{from} is newer than --to v{to}"),
        });
    }
    Ok((from, to))
}

fn list(found: &[ObsoleteMatch], from: Version, to: Version, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        output.json(&found)?;
        return Ok(());
    }
    if found.is_empty() {
        output.success(&format!("No obsolete files between v{from} and v{to}"))?;
        return Ok(());
    }
    output.header(&format!("{} obsolete file(s) (v{from} -> v{to})", found.len()))?;
    for entry in found {
        output.print(&format!("  {}  [{}]", entry.file, entry.action))?;
        output.detail(&format!(
            "  {} (v{} -> v{})",
            entry.reason, entry.from_version, entry.to_version
        ))?;
    }
    Ok(())
}

/// Per-file lines and the closing counts; shared with `deploy`.
pub(crate) fn render_obsolete_report(report: &ObsoleteReport, output: &OutputManager) -> CliResult<()> {
    for item in &report.items {
        let file = &item.entry.file;
        match &item.outcome {
            ObsoleteOutcome::Deleted => output.success(&format!("Deleted {file}"))?,
            ObsoleteOutcome::BackedUp { to } => output.success(&format!("Backed up {file} -> {to}"))?,
            ObsoleteOutcome::Migrated { to } => output.success(&format!("Moved {file} -> {to}"))?,
            ObsoleteOutcome::Warned => {
                output.warning(&format!("{file}: {}", item.entry.reason))?;
                output.detail("review and remove it by hand")?;
            }
            ObsoleteOutcome::Skipped => output.info(&format!("Skipped {file}"))?,
            ObsoleteOutcome::Planned { action } => {
                output.info(&format!("Would {action}: {file}"))?
            }
            ObsoleteOutcome::Failed { reason } => output.error(&format!("{file}: {reason}"))?,
        }
    }

    let s = report.stats;
    if s.planned > 0 {
        output.info(&format!("Dry run: {} action(s) planned", s.planned))?;
    } else {
        output.print(&format!(
            "deleted {}, backed up {}, moved {}, warned {}, skipped {}, failed {}",
            s.deleted, s.backed, s.migrated, s.warned, s.skipped, s.failed
        ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never() -> Version {
        panic!("resolver should not be consulted")
    }

    #[test]
    fn explicit_range_skips_the_resolver() {
        let (from, to) = version_range(Some("15.0"), Some("21"), never, never).unwrap();
        assert_eq!(from, Version::new(15, 0, 0));
        assert_eq!(to, Version::new(21, 0, 0));
    }

    #[test]
    fn missing_bounds_fall_back() {
        let (from, to) = version_range(
            None,
            Some("18.0.0"),
            || Version::new(16, 1, 0),
            never,
        )
        .unwrap();
        assert_eq!(from, Version::new(16, 1, 0));
        assert_eq!(to, Version::new(18, 0, 0));
    }

    #[test]
    fn reversed_range_is_invalid_input() {
        let err = version_range(Some("21.0"), Some("16.0"), never, never).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
