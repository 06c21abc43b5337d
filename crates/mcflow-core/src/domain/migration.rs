//! Migration run state and outcomes.

use serde::Serialize;

use super::{error::DomainError, version::Version};

/// Lifecycle of a single migration invocation.
///
/// ```text
/// NotStarted -> Analyzing -> AwaitingConfirmation -> Executing -> Completed
///                         \-> AutoConfirmed -------/          \-> Failed
///                  AwaitingConfirmation -> Cancelled
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum MigrationState {
    #[default]
    NotStarted,
    Analyzing,
    AwaitingConfirmation,
    AutoConfirmed,
    Executing,
    Completed,
    Failed,
    Cancelled,
}

impl MigrationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    fn allows(self, next: MigrationState) -> bool {
        use MigrationState::*;
        matches!(
            (self, next),
            (NotStarted, Analyzing)
                | (Analyzing, AwaitingConfirmation)
                | (Analyzing, AutoConfirmed)
                | (Analyzing, Failed)
                | (AwaitingConfirmation, Executing)
                | (AwaitingConfirmation, Cancelled)
                | (AwaitingConfirmation, Failed)
                | (AutoConfirmed, Executing)
                | (Executing, Completed)
                | (Executing, Failed)
        )
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    pub fn advance(&mut self, next: MigrationState) -> Result<(), DomainError> {
        if !self.allows(next) {
            return Err(DomainError::IllegalTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationOptions {
    /// Skip every confirmation and take the default choice.
    pub auto_confirm: bool,
}

impl MigrationOptions {
    pub fn auto() -> Self {
        Self { auto_confirm: true }
    }
}

/// Summary of a completed migration unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub unit: String,
    pub from: Version,
    pub to: Version,
    /// Human-readable steps, in execution order.
    pub lines: Vec<String>,
}

impl MigrationReport {
    pub fn new(unit: impl Into<String>, from: Version, to: Version) -> Self {
        Self {
            unit: unit.into(),
            from,
            to,
            lines: Vec::new(),
        }
    }

    pub fn note(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    Completed(MigrationReport),
    /// The user declined; nothing was written.
    Cancelled,
}

impl MigrationOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Version recorded in the manifest after a unit targeting `target` ran.
///
/// Never moves backwards and never claims more than upstream ships.
pub fn recorded_version(local: Version, target: Version, upstream: Version) -> Version {
    local.max(target.min(upstream))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_interactive() {
        let mut state = MigrationState::default();
        for next in [
            MigrationState::Analyzing,
            MigrationState::AwaitingConfirmation,
            MigrationState::Executing,
            MigrationState::Completed,
        ] {
            state.advance(next).unwrap();
        }
        assert!(state.is_terminal());
    }

    #[test]
    fn auto_confirm_path() {
        let mut state = MigrationState::NotStarted;
        state.advance(MigrationState::Analyzing).unwrap();
        state.advance(MigrationState::AutoConfirmed).unwrap();
        state.advance(MigrationState::Executing).unwrap();
        state.advance(MigrationState::Failed).unwrap();
        assert_eq!(state, MigrationState::Failed);
    }

    #[test]
    fn skipping_steps_is_rejected() {
        let mut state = MigrationState::NotStarted;
        let err = state.advance(MigrationState::Executing).unwrap_err();
        assert_eq!(
            err,
            DomainError::IllegalTransition {
                from: MigrationState::NotStarted,
                to: MigrationState::Executing
            }
        );
        assert_eq!(state, MigrationState::NotStarted);
    }

    #[test]
    fn cancel_only_while_awaiting_confirmation() {
        let mut state = MigrationState::Analyzing;
        state.advance(MigrationState::AutoConfirmed).unwrap();
        assert!(state.advance(MigrationState::Cancelled).is_err());
    }

    #[test]
    fn terminal_states_do_not_move() {
        let mut state = MigrationState::Completed;
        assert!(state.advance(MigrationState::Analyzing).is_err());
    }

    #[test]
    fn recorded_version_is_clamped() {
        let v = Version::parse;
        assert_eq!(recorded_version(v("15.0"), v("16.0.0"), v("16.1.0")), v("16.0.0"));
        assert_eq!(recorded_version(v("15.0"), v("16.0.0"), v("15.9.0")), v("15.9.0"));
        assert_eq!(recorded_version(v("18.0.0"), v("16.1.0"), v("21.0.0")), v("18.0.0"));
    }
}
