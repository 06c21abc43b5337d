//! Application layer for mcflow.
//!
//! This layer contains:
//! - **Services**: use case orchestration (deploy, obsolete files, conflicts, uninstall)
//! - **Migrations**: the ordered version migration chain
//! - **Ports**: interface definitions (traits) for external dependencies
//! - **Errors**: application-specific error types
//!
//! Business rules live in `crate::domain`; this layer sequences them over
//! the filesystem port.

pub mod context;
pub mod error;
pub mod migrations;
pub mod ports;
pub mod services;

pub use context::WorkflowContext;
pub use migrations::{ChainOutcome, ChainStep, MigrationChain, MigrationUnit};
pub use services::{
    DeployOptions, DeployReport, ManifestStore, ObsoleteFileEngine, OverrideConflictDetector,
    SyncService, UninstallService, VersionResolver,
};

// Re-export port traits (for adapter implementation)
pub use ports::{AutoConfirm, Filesystem, Prompt, TemplateRenderer};

pub use error::ApplicationError;
