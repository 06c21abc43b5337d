//! Copies upstream core documents into `.claude/core-docs/`.

use tracing::{debug, instrument};

use crate::{
    application::context::WorkflowContext,
    domain::ManagedFiles,
    error::McflowResult,
};

pub struct DocPublisher<'a> {
    ctx: &'a WorkflowContext,
}

impl<'a> DocPublisher<'a> {
    pub fn new(ctx: &'a WorkflowContext) -> Self {
        Self { ctx }
    }

    /// Publish every core document and core directory that upstream ships.
    ///
    /// Existing copies are replaced. Returns the published names.
    #[instrument(skip_all)]
    pub fn publish(&self) -> McflowResult<Vec<String>> {
        let fs = self.ctx.fs();
        let source = self.ctx.upstream_path(ManagedFiles::UPSTREAM_DOCS_DIR);
        let target = self.ctx.project_path(ManagedFiles::CORE_DOCS_DIR);
        fs.create_dir_all(&target)?;

        let mut published = Vec::new();
        for doc in self.ctx.files().core_docs() {
            let from = source.join(doc);
            if !fs.exists(&from) || fs.is_dir(&from) {
                continue;
            }
            fs.copy_file(&from, &target.join(doc))?;
            published.push(doc.clone());
        }

        for dir in self.ctx.files().core_dirs() {
            let from = source.join(dir);
            if !fs.is_dir(&from) {
                continue;
            }
            let to = target.join(dir);
            if fs.exists(&to) {
                fs.remove(&to)?;
            }
            fs.copy_dir_all(&from, &to)?;
            published.push(format!("{dir}/"));
        }

        debug!(count = published.len(), "Published core docs");
        Ok(published)
    }
}
