//! Content hashes and customisation detection.

use std::path::Path;

use tracing::trace;

use crate::{
    application::context::WorkflowContext,
    domain::{BaselineHashes, ContentHash, ManagedFiles},
};

pub struct HashStore<'a> {
    ctx: &'a WorkflowContext,
}

impl<'a> HashStore<'a> {
    pub fn new(ctx: &'a WorkflowContext) -> Self {
        Self { ctx }
    }

    /// Hash a file's raw bytes; `None` when it cannot be read.
    pub fn hash(&self, path: &Path) -> Option<ContentHash> {
        match self.ctx.fs().read(path) {
            Ok(bytes) => Some(ContentHash::of(&bytes)),
            Err(e) => {
                trace!(path = %path.display(), error = %e, "Unhashable file");
                None
            }
        }
    }

    /// Hashes of `files` under `dir`, skipping those that do not exist.
    pub fn compute_baseline_hashes(&self, dir: &Path, files: &[String]) -> BaselineHashes {
        files
            .iter()
            .filter_map(|file| {
                let path = dir.join(file);
                if self.ctx.fs().is_dir(&path) {
                    return None;
                }
                self.hash(&path).map(|h| (file.clone(), h))
            })
            .collect()
    }

    /// Baseline snapshot of the upstream core documents.
    pub fn upstream_baselines(&self) -> BaselineHashes {
        let dir = self.ctx.upstream_path(ManagedFiles::UPSTREAM_DOCS_DIR);
        self.compute_baseline_hashes(&dir, self.ctx.files().core_docs())
    }
}

pub struct CustomizationDetector<'a> {
    hashes: HashStore<'a>,
}

impl<'a> CustomizationDetector<'a> {
    pub fn new(ctx: &'a WorkflowContext) -> Self {
        Self {
            hashes: HashStore::new(ctx),
        }
    }

    /// Has the file at `path` drifted from its recorded baseline?
    ///
    /// An absent file is not customised; a present file without a record is.
    pub fn is_customized(&self, path: &Path, recorded: Option<&ContentHash>) -> bool {
        match self.hashes.hash(path) {
            None => false,
            Some(current) => recorded != Some(&current),
        }
    }
}
