//! Override-layer conflicts: `markdown/core/*.md` vs the upstream baselines.

use tracing::{debug, info, instrument};

use crate::{
    application::context::WorkflowContext,
    domain::{
        ConflictPreview, ManagedFiles, Manifest, OverrideConflict, Resolution, ResolutionOutcome,
        conflict::merge_document,
    },
    error::McflowResult,
};

use super::{hash_store::HashStore, manifest_store::ManifestStore};

pub struct OverrideConflictDetector<'a> {
    ctx: &'a WorkflowContext,
}

impl<'a> OverrideConflictDetector<'a> {
    pub fn new(ctx: &'a WorkflowContext) -> Self {
        Self { ctx }
    }

    /// Overrides whose upstream document changed since the recorded baseline.
    ///
    /// A file is reported only when both the recorded and the fresh upstream
    /// hash exist and differ.
    #[instrument(skip_all)]
    pub fn detect(&self, manifest: &Manifest) -> McflowResult<Vec<OverrideConflict>> {
        let fs = self.ctx.fs();
        let dir = self.ctx.project_path(ManagedFiles::OVERRIDE_DIR);
        if !fs.is_dir(&dir) {
            return Ok(Vec::new());
        }

        let hashes = HashStore::new(self.ctx);
        let mut conflicts = Vec::new();

        for entry in fs.read_dir(&dir)? {
            if fs.is_dir(&entry) {
                continue;
            }
            let Some(file) = entry.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if !file.ends_with(".md") {
                continue;
            }

            let upstream_path = format!("{}/{}", ManagedFiles::UPSTREAM_DOCS_DIR, file);
            let (Some(old), Some(new)) = (
                manifest.baseline(&file),
                hashes.hash(&self.ctx.upstream_path(&upstream_path)),
            ) else {
                continue;
            };
            if *old == new {
                continue;
            }

            debug!(file = %file, old = old.short(), new = new.short(), "Override conflict");
            conflicts.push(OverrideConflict {
                override_path: format!("{}/{}", ManagedFiles::OVERRIDE_DIR, file),
                upstream_path,
                old_baseline_hash: old.clone(),
                new_baseline_hash: new,
                file,
            });
        }

        info!(count = conflicts.len(), "Override conflicts detected");
        Ok(conflicts)
    }

    /// Both texts of a conflict.
    pub fn preview(&self, conflict: &OverrideConflict) -> McflowResult<ConflictPreview> {
        let fs = self.ctx.fs();
        Ok(ConflictPreview {
            override_text: fs.read_to_string(&self.ctx.project_path(&conflict.override_path))?,
            upstream_text: fs.read_to_string(&self.ctx.upstream_path(&conflict.upstream_path))?,
        })
    }

    #[instrument(skip(self), fields(file = %conflict.file))]
    pub fn resolve(
        &self,
        conflict: &OverrideConflict,
        resolution: Resolution,
    ) -> McflowResult<ResolutionOutcome> {
        let fs = self.ctx.fs();
        let override_path = self.ctx.project_path(&conflict.override_path);

        let outcome = match resolution {
            Resolution::AcceptUpstream => {
                let backup = format!("{}.backup.{}", conflict.override_path, self.ctx.today());
                fs.copy_file(&override_path, &self.ctx.project_path(&backup))?;
                fs.copy_file(
                    &self.ctx.upstream_path(&conflict.upstream_path),
                    &override_path,
                )?;
                ResolutionOutcome::Accepted { backup }
            }
            Resolution::KeepOverride => ResolutionOutcome::Kept,
            Resolution::ManualMerge => {
                let merge_file = format!("{}.merge", conflict.override_path);
                let preview = self.preview(conflict)?;
                fs.write_file(
                    &self.ctx.project_path(&merge_file),
                    &merge_document(conflict, &preview),
                )?;
                ResolutionOutcome::MergeWritten { merge_file }
            }
            Resolution::Skip => ResolutionOutcome::Skipped,
        };

        if resolution.acknowledges() {
            ManifestStore::new(self.ctx).acknowledge(&conflict.file, &conflict.new_baseline_hash)?;
        }
        Ok(outcome)
    }
}
