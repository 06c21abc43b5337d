//! Reads and writes `.claude/workflow-manifest.json`.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::{
    application::{ApplicationError, context::WorkflowContext},
    domain::{ContentHash, LegacyVersionFile, Manifest, ManifestUpdate, ManagedFiles},
    error::McflowResult,
};

pub struct ManifestStore<'a> {
    ctx: &'a WorkflowContext,
}

impl<'a> ManifestStore<'a> {
    pub fn new(ctx: &'a WorkflowContext) -> Self {
        Self { ctx }
    }

    pub fn path(&self) -> PathBuf {
        self.ctx.project_path(ManagedFiles::MANIFEST)
    }

    pub fn legacy_path(&self) -> PathBuf {
        self.ctx.project_path(ManagedFiles::LEGACY_VERSION)
    }

    pub fn exists(&self) -> bool {
        self.ctx.fs().exists(&self.path())
    }

    pub fn legacy_exists(&self) -> bool {
        self.ctx.fs().exists(&self.legacy_path())
    }

    /// Strict read: `Ok(None)` when absent, `InvalidJson` when corrupt.
    pub fn load(&self) -> McflowResult<Option<Manifest>> {
        let path = self.path();
        if !self.ctx.fs().exists(&path) {
            return Ok(None);
        }
        let text = self.ctx.fs().read_to_string(&path)?;
        serde_json::from_str(&text).map(Some).map_err(|e| {
            ApplicationError::InvalidJson {
                path,
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Lenient read: a missing or corrupt manifest becomes a fresh default.
    pub fn read(&self) -> Manifest {
        match self.load() {
            Ok(Some(manifest)) => manifest,
            Ok(None) => {
                debug!("No manifest yet, starting from defaults");
                Manifest::new(self.ctx.now())
            }
            Err(e) => {
                warn!(error = %e, "Manifest unreadable, starting from defaults");
                Manifest::new(self.ctx.now())
            }
        }
    }

    /// Strict read of the legacy 15.x version file.
    pub fn load_legacy(&self) -> McflowResult<Option<LegacyVersionFile>> {
        let path = self.legacy_path();
        if !self.ctx.fs().exists(&path) {
            return Ok(None);
        }
        let text = self.ctx.fs().read_to_string(&path)?;
        serde_json::from_str(&text).map(Some).map_err(|e| {
            ApplicationError::InvalidJson {
                path,
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Shallow-merge `update` into the stored manifest and write it back.
    pub fn write(&self, update: ManifestUpdate) -> McflowResult<Manifest> {
        let mut manifest = self.read();
        manifest.apply(update, self.ctx.now());
        self.save(&manifest)?;
        Ok(manifest)
    }

    /// Write `manifest` as is, refreshing `updatedAt`.
    pub fn replace(&self, mut manifest: Manifest) -> McflowResult<Manifest> {
        manifest.apply(ManifestUpdate::new(), self.ctx.now());
        self.save(&manifest)?;
        Ok(manifest)
    }

    /// Record `hash` as the acknowledged baseline of `file`.
    pub fn acknowledge(&self, file: &str, hash: &ContentHash) -> McflowResult<()> {
        let mut manifest = self.read();
        manifest.baseline_hashes.insert(file.to_string(), hash.clone());
        self.replace(manifest)?;
        Ok(())
    }

    /// Delete the 15.x version file once the manifest carries the version.
    pub fn retire_legacy_version(&self) -> McflowResult<bool> {
        let path = self.legacy_path();
        if !self.ctx.fs().exists(&path) {
            return Ok(false);
        }
        self.ctx.fs().remove(&path)?;
        debug!("Removed legacy workflow-version.json");
        Ok(true)
    }

    pub fn remove(&self) -> McflowResult<bool> {
        let path = self.path();
        if !self.ctx.fs().exists(&path) {
            return Ok(false);
        }
        self.ctx.fs().remove(&path)?;
        Ok(true)
    }

    fn save(&self, manifest: &Manifest) -> McflowResult<()> {
        let path = self.path();
        let mut json =
            serde_json::to_string_pretty(manifest).map_err(|e| ApplicationError::InvalidJson {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        json.push('\n');
        self.ctx.fs().write_file_all(&path, &json)
    }
}
