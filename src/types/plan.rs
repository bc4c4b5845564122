use std::fmt;

use serde::Serialize;

use crate::types::Direction;

/// One `(migration, direction)` pair of an execution plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlanStep {
    pub version: i64,
    pub name: String,
    pub direction: Direction,
}

impl PlanStep {
    pub fn new(version: i64, name: impl Into<String>, direction: Direction) -> Self {
        Self {
            version,
            name: name.into(),
            direction,
        }
    }
}

/// A deliberate stop reported back to the caller instead of an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StopCondition {
    /// The requested target does not name a known migration.
    InvalidVersion(i64),
    /// The ledger is empty or already sits at the target.
    NothingToRollback,
    /// Rollback halted in front of a migration with its breakpoint set.
    BreakpointReached(i64),
    /// There are no migrations or ledger entries to act upon.
    NoMigrations,
}

impl fmt::Display for StopCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopCondition::InvalidVersion(version) => {
                write!(f, "{} is not a valid version", version)
            }
            StopCondition::NothingToRollback => write!(f, "No migrations to rollback"),
            StopCondition::BreakpointReached(version) => write!(
                f,
                "Breakpoint reached at {}. Further rollbacks inhibited.",
                version
            ),
            StopCondition::NoMigrations => write!(f, "There are no available migrations"),
        }
    }
}

/// Ordered steps computed for one manager call, plus the reason planning
/// stopped early, if it did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    pub steps: Vec<PlanStep>,
    pub stop: Option<StopCondition>,
}

impl ExecutionPlan {
    pub fn stopped(stop: StopCondition) -> Self {
        Self {
            steps: Vec::new(),
            stop: Some(stop),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn versions(&self) -> Vec<i64> {
        self.steps.iter().map(|s| s.version).collect()
    }
}

/// What a manager call actually did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub executed: Vec<PlanStep>,
    pub stop: Option<StopCondition>,
}

impl RunReport {
    pub fn executed_versions(&self) -> Vec<i64> {
        self.executed.iter().map(|s| s.version).collect()
    }

    pub fn is_noop(&self) -> bool {
        self.executed.is_empty()
    }
}

/// New breakpoint state after a toggle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BreakpointState {
    pub version: i64,
    pub name: String,
    pub set: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BreakpointOutcome {
    Toggled(BreakpointState),
    Skipped(StopCondition),
}
