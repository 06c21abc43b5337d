use tracing::{info, instrument};

use crate::{
    application::{ApplicationError, context::WorkflowContext, ports::Prompt},
    domain::{MigrationOptions, MigrationOutcome, MigrationReport},
    error::{McflowError, McflowResult},
};

use super::{MigrationUnit, MigrationV16, MigrationV16_1, MigrationV18, MigrationV21};

/// Result of one [`MigrationChain::run_applicable`] call.
#[derive(Debug)]
pub enum ChainStep {
    NothingToDo,
    Applied {
        unit: &'static str,
        outcome: MigrationOutcome,
    },
}

/// Everything [`MigrationChain::run_to_completion`] did.
#[derive(Debug, Default)]
pub struct ChainOutcome {
    pub reports: Vec<MigrationReport>,
    /// Unit the user declined; later units were not attempted.
    pub cancelled: Option<&'static str>,
}

impl ChainOutcome {
    pub fn applied(&self) -> impl Iterator<Item = &str> {
        self.reports.iter().map(|r| r.unit.as_str())
    }
}

/// Ordered list of migration units.
///
/// Newest first: the first unit whose predicate holds is the one that runs.
pub struct MigrationChain {
    units: Vec<Box<dyn MigrationUnit>>,
}

impl MigrationChain {
    pub fn new(units: Vec<Box<dyn MigrationUnit>>) -> Self {
        Self { units }
    }

    /// v21, v18, v16.1, v16.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(MigrationV21),
            Box::new(MigrationV18),
            Box::new(MigrationV16_1),
            Box::new(MigrationV16),
        ])
    }

    pub fn units(&self) -> impl Iterator<Item = &dyn MigrationUnit> {
        self.units.iter().map(AsRef::as_ref)
    }

    /// Names of the units that currently apply, in chain order.
    pub fn pending(&self, ctx: &WorkflowContext) -> Vec<&'static str> {
        self.units()
            .filter(|u| u.needs_migration(ctx))
            .map(|u| u.name())
            .collect()
    }

    /// Run the first applicable unit, if any.
    pub fn run_applicable(
        &self,
        ctx: &WorkflowContext,
        options: &MigrationOptions,
        prompt: &dyn Prompt,
    ) -> McflowResult<ChainStep> {
        Ok(match self.apply_first(ctx, options, prompt)? {
            Some((unit, outcome)) => ChainStep::Applied {
                unit: unit.name(),
                outcome,
            },
            None => ChainStep::NothingToDo,
        })
    }

    /// Keep running applicable units until none applies or one is cancelled.
    ///
    /// A unit that still applies right after completing is an error, which
    /// also bounds the loop.
    #[instrument(skip_all)]
    pub fn run_to_completion(
        &self,
        ctx: &WorkflowContext,
        options: &MigrationOptions,
        prompt: &dyn Prompt,
    ) -> McflowResult<ChainOutcome> {
        let mut outcome = ChainOutcome::default();

        // Each unit can complete at most once.
        for _ in 0..=self.units.len() {
            let Some((unit, result)) = self.apply_first(ctx, options, prompt)? else {
                return Ok(outcome);
            };

            match result {
                MigrationOutcome::Cancelled => {
                    outcome.cancelled = Some(unit.name());
                    return Ok(outcome);
                }
                MigrationOutcome::Completed(report) => {
                    if unit.needs_migration(ctx) {
                        return Err(ApplicationError::MigrationNotIdempotent {
                            unit: unit.name().to_string(),
                        }
                        .into());
                    }
                    info!(unit = unit.name(), to = %report.to, "Migration completed");
                    outcome.reports.push(report);
                }
            }
        }

        Err(McflowError::Internal {
            message: "migration chain did not settle".into(),
        })
    }

    fn apply_first(
        &self,
        ctx: &WorkflowContext,
        options: &MigrationOptions,
        prompt: &dyn Prompt,
    ) -> McflowResult<Option<(&dyn MigrationUnit, MigrationOutcome)>> {
        let Some(unit) = self.units().find(|u| u.needs_migration(ctx)) else {
            return Ok(None);
        };
        info!(unit = unit.name(), "Running migration");
        let outcome = unit.migrate(ctx, options, prompt)?;
        Ok(Some((unit, outcome)))
    }
}

impl Default for MigrationChain {
    fn default() -> Self {
        Self::standard()
    }
}
