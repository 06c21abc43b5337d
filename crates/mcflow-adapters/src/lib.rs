//! Infrastructure adapters for mcflow.
//!
//! This crate implements the ports defined in `mcflow-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod filesystem;
pub mod prompt;
pub mod renderer;
pub mod rule_loader;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use prompt::{Answer, ScriptedPrompt};
pub use renderer::SimpleRenderer;
pub use rule_loader::RuleLoader;
