//! Version migrations, applied in a fixed order by [`MigrationChain`].
//!
//! Every unit follows the same shape: back up, classify, change structure,
//! update the manifest last, summarise. A failure before the manifest write
//! leaves the project at its old recorded version, so the unit runs again.

mod chain;
mod v16;
mod v16_1;
mod v18;
mod v21;

pub use chain::{ChainOutcome, ChainStep, MigrationChain};
pub use v16::MigrationV16;
pub use v16_1::MigrationV16_1;
pub use v18::MigrationV18;
pub use v21::MigrationV21;

use tracing::{debug, warn};

use crate::{
    application::{
        ApplicationError,
        context::WorkflowContext,
        ports::Prompt,
        services::{HashStore, ManifestStore},
    },
    domain::{
        MigrationOptions, MigrationOutcome, MigrationState, Version, ManifestUpdate,
        recorded_version,
    },
    error::{McflowError, McflowResult},
};

/// One step of the upgrade path.
pub trait MigrationUnit {
    /// Short identifier, e.g. `v16.1`.
    fn name(&self) -> &'static str;

    /// Version the project reaches once this unit has run.
    fn target_version(&self) -> Version;

    /// Does this project need this unit right now?
    fn needs_migration(&self, ctx: &WorkflowContext) -> bool;

    fn migrate(
        &self,
        ctx: &WorkflowContext,
        options: &MigrationOptions,
        prompt: &dyn Prompt,
    ) -> McflowResult<MigrationOutcome>;
}

/// Drives [`MigrationState`] for one unit invocation.
pub(crate) struct MigrationSession {
    unit: &'static str,
    state: MigrationState,
}

impl MigrationSession {
    pub(crate) fn begin(unit: &'static str) -> McflowResult<Self> {
        let mut state = MigrationState::NotStarted;
        state.advance(MigrationState::Analyzing)?;
        debug!(unit, "Migration analyzing");
        Ok(Self { unit, state })
    }

    pub(crate) fn state(&self) -> MigrationState {
        self.state
    }

    /// Yes/no gate. `false` means the session is cancelled.
    pub(crate) fn confirm(
        &mut self,
        options: &MigrationOptions,
        prompt: &dyn Prompt,
        question: &str,
    ) -> McflowResult<bool> {
        if options.auto_confirm {
            self.state.advance(MigrationState::AutoConfirmed)?;
            return Ok(true);
        }
        self.state.advance(MigrationState::AwaitingConfirmation)?;
        let accepted = match prompt.confirm(question, true) {
            Ok(accepted) => accepted,
            Err(e) => {
                self.state.advance(MigrationState::Failed)?;
                return Err(e);
            }
        };
        if !accepted {
            self.cancel()?;
        }
        Ok(accepted)
    }

    /// Multiple-choice gate; auto-confirm takes `default`.
    pub(crate) fn choose(
        &mut self,
        options: &MigrationOptions,
        prompt: &dyn Prompt,
        question: &str,
        choices: &[String],
        default: usize,
    ) -> McflowResult<usize> {
        if options.auto_confirm {
            self.state.advance(MigrationState::AutoConfirmed)?;
            return Ok(default);
        }
        self.state.advance(MigrationState::AwaitingConfirmation)?;
        match prompt.select(question, choices, default) {
            Ok(choice) => Ok(choice),
            Err(e) => {
                self.state.advance(MigrationState::Failed)?;
                Err(e)
            }
        }
    }

    pub(crate) fn cancel(&mut self) -> McflowResult<MigrationOutcome> {
        self.state.advance(MigrationState::Cancelled)?;
        debug!(unit = self.unit, "Migration cancelled");
        Ok(MigrationOutcome::Cancelled)
    }

    /// Run the mutating part; errors are reported as a failed migration.
    pub(crate) fn execute<T>(&mut self, work: impl FnOnce() -> McflowResult<T>) -> McflowResult<T> {
        self.state.advance(MigrationState::Executing)?;
        match work() {
            Ok(value) => {
                self.state.advance(MigrationState::Completed)?;
                Ok(value)
            }
            Err(e) => {
                self.state.advance(MigrationState::Failed)?;
                warn!(unit = self.unit, error = %e, "Migration failed");
                Err(match e {
                    McflowError::Application(ApplicationError::MigrationFailed { .. }) => e,
                    other => ApplicationError::MigrationFailed {
                        unit: self.unit.to_string(),
                        reason: other.to_string(),
                    }
                    .into(),
                })
            }
        }
    }
}

/// Record a completed unit: clamped version, provenance, fresh baselines.
///
/// The legacy version file is retired together with the manifest write.
pub(crate) fn record_migration(
    ctx: &WorkflowContext,
    local: Version,
    target: Version,
    upstream: Version,
) -> McflowResult<Version> {
    let version = recorded_version(local, target, upstream);
    let baselines = HashStore::new(ctx).upstream_baselines();
    let store = ManifestStore::new(ctx);
    store.write(
        ManifestUpdate::new()
            .version(version)
            .baseline_hashes(baselines)
            .migrated(local, ctx.now()),
    )?;
    store.retire_legacy_version()?;
    Ok(version)
}
