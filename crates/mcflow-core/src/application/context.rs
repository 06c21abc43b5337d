//! Shared handles for one upstream -> project relationship.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateRenderer},
    },
    domain::{ManagedFiles, RenderContext, Version},
    error::McflowResult,
};

/// Everything a service needs to touch the upstream tree and the project.
///
/// Services borrow the context; they never own adapters themselves.
pub struct WorkflowContext {
    fs: Box<dyn Filesystem>,
    renderer: Box<dyn TemplateRenderer>,
    upstream_root: PathBuf,
    project_root: PathBuf,
    files: ManagedFiles,
    fixed_now: Option<DateTime<Utc>>,
}

impl WorkflowContext {
    pub fn new(
        fs: Box<dyn Filesystem>,
        renderer: Box<dyn TemplateRenderer>,
        upstream_root: impl Into<PathBuf>,
        project_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fs,
            renderer,
            upstream_root: upstream_root.into(),
            project_root: project_root.into(),
            files: ManagedFiles::standard(),
            fixed_now: None,
        }
    }

    /// Pin the clock (tests and reproducible backups).
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    /// Fail early when either root is missing.
    pub fn ensure_roots(&self) -> McflowResult<()> {
        if !self.fs.is_dir(&self.upstream_root) {
            return Err(ApplicationError::UpstreamNotFound {
                path: self.upstream_root.clone(),
            }
            .into());
        }
        if !self.fs.is_dir(&self.project_root) {
            return Err(ApplicationError::ProjectNotFound {
                path: self.project_root.clone(),
            }
            .into());
        }
        Ok(())
    }

    pub fn fs(&self) -> &dyn Filesystem {
        self.fs.as_ref()
    }

    pub fn renderer(&self) -> &dyn TemplateRenderer {
        self.renderer.as_ref()
    }

    pub fn files(&self) -> &ManagedFiles {
        &self.files
    }

    pub fn upstream_root(&self) -> &Path {
        &self.upstream_root
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn project_path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.project_root.join(rel)
    }

    pub fn upstream_path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.upstream_root.join(rel)
    }

    /// Project path relative to the project root, `/`-separated.
    pub fn relative_to_project(&self, path: &Path) -> String {
        path.strip_prefix(&self.project_root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    /// `YYYY-MM-DD`, used in backup names.
    pub fn today(&self) -> String {
        self.now().format("%Y-%m-%d").to_string()
    }

    pub fn project_name(&self) -> String {
        self.project_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    }

    /// Template variables for this project.
    pub fn render_context(&self, version: Version) -> RenderContext {
        RenderContext::new(
            self.project_name(),
            self.project_root.to_string_lossy(),
            self.today(),
            version.to_string(),
        )
    }

    /// Render an upstream template, `None` when the template does not exist.
    pub fn render_upstream(&self, rel: &str, version: Version) -> McflowResult<Option<String>> {
        let path = self.upstream_path(rel);
        if !self.fs.exists(&path) {
            return Ok(None);
        }
        let template = self.fs.read_to_string(&path)?;
        self.renderer
            .render(&template, &self.render_context(version))
            .map(Some)
    }

    /// Is the project the upstream checkout itself?
    ///
    /// Roots are compared lexically; callers canonicalize them first.
    pub fn project_is_upstream(&self) -> bool {
        normalize(&self.project_root) == normalize(&self.upstream_root)
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

impl std::fmt::Debug for WorkflowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowContext")
            .field("upstream_root", &self.upstream_root)
            .field("project_root", &self.project_root)
            .finish_non_exhaustive()
    }
}
