//! mcflow Core - Hexagonal Architecture Implementation
//!
//! Domain and application layers for the mcflow workflow deployer: version
//! reconciliation, baseline hashes, override conflicts, obsolete files and
//! the migration chain.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            mcflow-cli (CLI)             │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (SyncService, MigrationChain, ...)     │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │   (Filesystem, TemplateRenderer,        │
//! │    Prompt)                              │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    mcflow-adapters (Infrastructure)     │
//! │ (LocalFilesystem, MemoryFilesystem, ..) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mcflow_core::prelude::*;
//!
//! let ctx = WorkflowContext::new(fs, renderer, upstream_root, project_root);
//! let report = SyncService::new(&ctx).deploy(
//!     DeployOptions { auto_confirm: true, ..Default::default() },
//!     &RuleRegistry::with_defaults(),
//!     &AutoConfirm,
//! )?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ChainOutcome, ChainStep, MigrationChain, MigrationUnit, WorkflowContext,
        ports::{AutoConfirm, Filesystem, Prompt, TemplateRenderer},
        services::{
            DeployMode, DeployOptions, DeployReport, DocPublisher, HashStore, ManifestStore,
            ObsoleteFileEngine, ObsoleteOptions, ObsoleteOutcome, ObsoleteReport,
            OverrideConflictDetector, SyncService, UninstallOptions, UninstallService,
            VersionCheck, VersionResolver,
        },
    };
    pub use crate::domain::{
        ContentHash, ManagedFiles, Manifest, MigrationOptions, MigrationOutcome, ObsoleteAction,
        ObsoleteMatch, ObsoleteRule, OverrideConflict, RenderContext, Resolution,
        ResolutionOutcome, RuleRegistry, Version,
    };
    pub use crate::error::{McflowError, McflowResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
