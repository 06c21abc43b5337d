//! `mcflow conflicts`: review overrides whose upstream document moved on.

use owo_colors::OwoColorize;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use tracing::{instrument, warn};

use mcflow_core::{
    application::{
        ports::Prompt,
        services::{ManifestStore, OverrideConflictDetector},
    },
    domain::{ConflictPreview, ConflictSummary, OverrideConflict, Resolution, ResolutionOutcome},
};

use super::open_project;
use crate::{
    cli::{ConflictsArgs, GlobalArgs},
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
    prompt::TerminalPrompt,
};

/// Diff lines shown before the preview is cut off.
const PREVIEW_LINES: usize = 40;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConflictView<'a> {
    #[serde(flatten)]
    conflict: &'a OverrideConflict,
    added: usize,
    removed: usize,
}

#[derive(Serialize)]
struct ResolvedView<'a> {
    file: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<ResolutionOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct ResolveReport<'a> {
    items: Vec<ResolvedView<'a>>,
    summary: ConflictSummary,
}

#[instrument(skip_all)]
pub fn execute(
    args: ConflictsArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let ctx = open_project(&global, &config, args.project.path.as_deref())?;
    ctx.ensure_roots().with_cli_context(|| "checking workspace roots")?;

    let detector = OverrideConflictDetector::new(&ctx);
    let manifest = ManifestStore::new(&ctx).read();
    let conflicts = detector
        .detect(&manifest)
        .with_cli_context(|| "detecting override conflicts")?;

    if conflicts.is_empty() {
        if output.is_json() {
            output.json(&Vec::<ConflictView>::new())?;
        } else {
            output.success("No override conflicts")?;
        }
        return Ok(());
    }

    if args.list {
        return list(&detector, &conflicts, &output);
    }

    let fixed = if args.accept_all {
        Some(Resolution::AcceptUpstream)
    } else if args.keep_all {
        Some(Resolution::KeepOverride)
    } else {
        None
    };

    let prompt = TerminalPrompt;
    let labels: Vec<String> = Resolution::ALL.iter().map(|r| r.label().to_string()).collect();
    let skip_index = Resolution::ALL
        .iter()
        .position(|r| *r == Resolution::Skip)
        .unwrap_or(0);

    let mut summary = ConflictSummary::default();
    let mut items = Vec::with_capacity(conflicts.len());

    for conflict in &conflicts {
        let resolution = match fixed {
            Some(r) => r,
            None => {
                if let Ok(preview) = detector.preview(conflict) {
                    show_diff(conflict, &preview, &output)?;
                }
                let pick = prompt
                    .select(
                        &format!("How should {} be resolved?", conflict.file),
                        &labels,
                        skip_index,
                    )
                    .with_cli_context(|| "asking for a resolution")?;
                Resolution::ALL[pick.min(Resolution::ALL.len() - 1)]
            }
        };

        match detector.resolve(conflict, resolution) {
            Ok(outcome) => {
                summary.record(&outcome);
                if !output.is_json() {
                    render_outcome(conflict, &outcome, &output)?;
                }
                items.push(ResolvedView {
                    file: &conflict.file,
                    outcome: Some(outcome),
                    error: None,
                });
            }
            Err(e) => {
                warn!(file = %conflict.file, error = %e, "Resolution failed");
                summary.failed += 1;
                if !output.is_json() {
                    output.error(&format!("{}: {e}", conflict.file))?;
                }
                items.push(ResolvedView {
                    file: &conflict.file,
                    outcome: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    if output.is_json() {
        output.json(&ResolveReport { items, summary })?;
    } else {
        output.print(&format!(
            "{} conflict(s): accepted {}, kept {}, merge files {}, skipped {}, failed {}",
            summary.total(),
            summary.accepted,
            summary.kept,
            summary.merged,
            summary.skipped,
            summary.failed
        ))?;
    }
    Ok(())
}

fn list(
    detector: &OverrideConflictDetector<'_>,
    conflicts: &[OverrideConflict],
    output: &OutputManager,
) -> CliResult<()> {
    let views: Vec<ConflictView> = conflicts
        .iter()
        .map(|conflict| {
            let (added, removed) = detector
                .preview(conflict)
                .map(|p| diff_stats(&p))
                .unwrap_or_default();
            ConflictView {
                conflict,
                added,
                removed,
            }
        })
        .collect();

    if output.is_json() {
        output.json(&views)?;
        return Ok(());
    }

    output.header(&format!("{} override conflict(s)", views.len()))?;
    for view in &views {
        let c = view.conflict;
        output.print(&format!(
            "  {}  (+{} -{} vs upstream)",
            c.override_path, view.added, view.removed
        ))?;
        output.detail(&format!(
            "  baseline {} -> {}",
            c.old_baseline_hash.short(),
            c.new_baseline_hash.short()
        ))?;
    }
    Ok(())
}

/// Lines the upstream document adds and removes relative to the override.
fn diff_stats(preview: &ConflictPreview) -> (usize, usize) {
    let diff = TextDiff::from_lines(&preview.override_text, &preview.upstream_text);
    diff.iter_all_changes()
        .fold((0, 0), |(added, removed), change| match change.tag() {
            ChangeTag::Insert => (added + 1, removed),
            ChangeTag::Delete => (added, removed + 1),
            ChangeTag::Equal => (added, removed),
        })
}

/// Changed lines only, capped at [`PREVIEW_LINES`].
fn diff_lines(preview: &ConflictPreview) -> (Vec<(ChangeTag, String)>, usize) {
    let diff = TextDiff::from_lines(&preview.override_text, &preview.upstream_text);
    let changed: Vec<(ChangeTag, String)> = diff
        .iter_all_changes()
        .filter(|c| c.tag() != ChangeTag::Equal)
        .map(|c| (c.tag(), c.value().trim_end_matches('\n').to_string()))
        .collect();
    let hidden = changed.len().saturating_sub(PREVIEW_LINES);
    (changed.into_iter().take(PREVIEW_LINES).collect(), hidden)
}

fn show_diff(
    conflict: &OverrideConflict,
    preview: &ConflictPreview,
    output: &OutputManager,
) -> CliResult<()> {
    output.header(&format!(
        "--- {} (override)\n+++ {} (upstream)",
        conflict.override_path, conflict.upstream_path
    ))?;

    let (lines, hidden) = diff_lines(preview);
    for (tag, text) in lines {
        let line = match (tag, output.supports_color()) {
            (ChangeTag::Delete, true) => format!("-{text}").red().to_string(),
            (ChangeTag::Insert, true) => format!("+{text}").green().to_string(),
            (ChangeTag::Delete, false) => format!("-{text}"),
            _ => format!("+{text}"),
        };
        output.print(&line)?;
    }
    if hidden > 0 {
        output.detail(&format!("... {hidden} more changed line(s)"))?;
    }
    Ok(())
}

fn render_outcome(
    conflict: &OverrideConflict,
    outcome: &ResolutionOutcome,
    output: &OutputManager,
) -> CliResult<()> {
    let file = &conflict.override_path;
    match outcome {
        ResolutionOutcome::Accepted { backup } => {
            output.success(&format!("{file}: replaced with upstream (backup {backup})"))?
        }
        ResolutionOutcome::Kept => output.success(&format!("{file}: override kept"))?,
        ResolutionOutcome::MergeWritten { merge_file } => {
            output.info(&format!("{file}: edit {merge_file}, then run again to acknowledge"))?
        }
        ResolutionOutcome::Skipped => output.info(&format!("{file}: skipped"))?,
    }
    Ok(())
}
