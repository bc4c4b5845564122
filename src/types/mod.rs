mod direction;
mod ledger_entry;
mod migration_status;
mod plan;
mod status_report;

pub use direction::Direction;
pub use ledger_entry::{Ledger, LedgerEntry};
pub use migration_status::{ExitStatus, MigrationStatus};
pub use plan::{
    BreakpointOutcome, BreakpointState, ExecutionPlan, PlanStep, RunReport, StopCondition,
};
pub use status_report::{StatusReport, StatusRow, StructuredRow, StructuredStatus};
