//! Application services - orchestrate use cases.
//!
//! Each service borrows a [`WorkflowContext`](crate::application::context::WorkflowContext)
//! and talks to the project only through its ports.

pub mod conflict_detector;
pub mod hash_store;
pub mod manifest_store;
pub mod obsolete_engine;
pub mod publisher;
pub mod sync_service;
pub mod uninstall_service;
pub mod version_resolver;

pub use conflict_detector::OverrideConflictDetector;
pub use hash_store::{CustomizationDetector, HashStore};
pub use manifest_store::ManifestStore;
pub use obsolete_engine::{
    ObsoleteFileEngine, ObsoleteOptions, ObsoleteOutcome, ObsoleteReport, ObsoleteStats,
    ProcessedItem,
};
pub use publisher::DocPublisher;
pub use sync_service::{DeployMode, DeployOptions, DeployReport, SyncService};
pub use uninstall_service::{UninstallOptions, UninstallPlan, UninstallReport, UninstallService};
pub use version_resolver::{VersionCheck, VersionResolver, changelog};
