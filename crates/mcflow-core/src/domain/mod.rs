//! Core domain layer for mcflow.
//!
//! Pure reconciliation logic: version ordering, content hashes, the manifest
//! model, obsolete-file rules, override conflicts, migration state and the
//! document transforms the migrations apply. No I/O happens here; files are
//! reached through the ports in [`crate::application::ports`].

pub mod claude_md;
pub mod conflict;
pub mod docs;
pub mod error;
pub mod hash;
pub mod layout;
pub mod manifest;
pub mod migration;
pub mod obsolete;
pub mod render;
pub mod task_meta;
pub mod version;

pub use conflict::{
    ConflictPreview, ConflictSummary, OverrideConflict, Resolution, ResolutionOutcome,
};
pub use error::{DomainError, ErrorCategory};
pub use hash::ContentHash;
pub use layout::ManagedFiles;
pub use manifest::{BaselineHashes, LegacyVersionFile, Manifest, ManifestUpdate};
pub use migration::{
    MigrationOptions, MigrationOutcome, MigrationReport, MigrationState, recorded_version,
};
pub use obsolete::{ObsoleteAction, ObsoleteMatch, ObsoleteRule, RuleRegistry};
pub use render::RenderContext;
pub use version::Version;
