use std::time::Instant;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::errors::{MigrationError, MigrationResult};
use crate::migration::{Migration, Seed};
use crate::registry::MigrationRegistry;
use crate::services::Environment;
use crate::services::planner;
use crate::types::{
    BreakpointOutcome, BreakpointState, ExecutionPlan, RunReport, StatusReport, StopCondition,
};
use crate::utils::{ProgressEvent, ProgressReporter, format_elapsed};

/// Plans migrate, rollback and breakpoint calls against the ledger and runs
/// them step by step through the [`Environment`].
pub struct Manager {
    environment: Environment,
    registry: MigrationRegistry,
    progress: ProgressReporter,
}

impl Manager {
    pub fn new(environment: Environment, registry: MigrationRegistry) -> Self {
        Self {
            environment,
            registry,
            progress: ProgressReporter::default(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn environment(&mut self) -> &mut Environment {
        &mut self.environment
    }

    pub fn registry(&mut self) -> &mut MigrationRegistry {
        &mut self.registry
    }

    pub fn set_migrations(&mut self, migrations: Vec<Migration>) -> MigrationResult<()> {
        self.registry.set_migrations(migrations)
    }

    pub fn set_seeds(&mut self, seeds: Vec<Seed>) -> MigrationResult<()> {
        self.registry.set_seeds(seeds)
    }

    pub fn status(&mut self) -> MigrationResult<StatusReport> {
        let known = self.registry.migrations()?;
        let ledger = self.environment.version_log()?;
        let report = planner::status_report(known, &ledger);
        info!(
            "Status: {} migrations, {} down, {} missing",
            report.rows.len(),
            report.down_count(),
            report.missing().count()
        );
        Ok(report)
    }

    /// Migrates to `target`, or applies every pending migration when no
    /// target is given.
    pub fn migrate(&mut self, target: Option<i64>) -> MigrationResult<RunReport> {
        let known = self.registry.migrations()?;
        let ledger = self.environment.version_log()?;
        let plan = planner::migrate_plan(known, &ledger, target);
        self.execute_plan(plan)
    }

    pub fn migrate_to_date_time(&mut self, datetime: NaiveDateTime) -> MigrationResult<RunReport> {
        let known = self.registry.migrations()?;
        match planner::migrate_to_datetime_target(known, datetime) {
            Some(version) => {
                info!("Migrating to version {}", version);
                self.migrate(Some(version))
            }
            None => {
                info!("No migrations created on or before {}", datetime);
                Ok(RunReport::default())
            }
        }
    }

    /// Reverts applied migrations down to `target`, by default only the most
    /// recent one. Stops in front of a breakpoint unless `force` is set.
    pub fn rollback(&mut self, target: Option<i64>, force: bool) -> MigrationResult<RunReport> {
        let known = self.registry.migrations()?;
        let ledger = self.environment.version_log()?;
        let plan = planner::rollback_plan(known, &ledger, target, force);
        self.execute_plan(plan)
    }

    pub fn rollback_to_date_time(
        &mut self,
        datetime: NaiveDateTime,
        force: bool,
    ) -> MigrationResult<RunReport> {
        let ledger = self.environment.version_log()?;
        match planner::rollback_to_datetime_target(&ledger, datetime) {
            Some(0) => {
                info!("Rolling back all migrations");
                self.rollback(Some(0), force)
            }
            Some(version) => {
                info!("Rolling back to version {}", version);
                self.rollback(Some(version), force)
            }
            None => {
                let stop = StopCondition::NothingToRollback;
                self.report_stop(stop);
                Ok(RunReport {
                    executed: Vec::new(),
                    stop: Some(stop),
                })
            }
        }
    }

    /// Flips the breakpoint of `version`, by default the most recently
    /// applied migration.
    pub fn toggle_breakpoint(&mut self, version: Option<i64>) -> MigrationResult<BreakpointOutcome> {
        let known = self.registry.migrations()?;
        let ledger = self.environment.version_log()?;

        let version = match planner::breakpoint_target(known, &ledger, version) {
            Ok(version) => version,
            Err(stop) => {
                self.report_stop(stop);
                return Ok(BreakpointOutcome::Skipped(stop));
            }
        };

        self.environment.adapter()?.toggle_breakpoint(version)?;
        let set = self
            .environment
            .version_log()?
            .get(&version)
            .is_some_and(|entry| entry.breakpoint);
        let name = known
            .get(&version)
            .map(|m| m.name.clone())
            .unwrap_or_default();

        info!(
            "Breakpoint {} for {} {}",
            if set { "set" } else { "cleared" },
            version,
            name
        );
        Ok(BreakpointOutcome::Toggled(BreakpointState { version, name, set }))
    }

    pub fn remove_breakpoints(&mut self) -> MigrationResult<usize> {
        let cleared = self.environment.adapter()?.reset_all_breakpoints()?;
        info!("{} breakpoints cleared.", cleared);
        Ok(cleared)
    }

    /// Runs the named seed, or every seed in name order. Returns the names
    /// of the seeds that ran.
    pub fn seed(&mut self, name: Option<&str>) -> MigrationResult<Vec<String>> {
        let seeds = self.registry.seeds()?;
        let selected: Vec<&Seed> = match name {
            Some(name) => vec![
                seeds
                    .get(name)
                    .ok_or_else(|| MigrationError::SeedNotFound(name.to_string()))?,
            ],
            None => seeds.values().collect(),
        };

        let mut executed = Vec::with_capacity(selected.len());
        for seed in selected {
            self.progress.report(ProgressEvent::Seeding {
                name: seed.name.clone(),
            });
            let started = Instant::now();
            self.environment.execute_seed(seed)?;
            let elapsed = format_elapsed(started.elapsed());

            info!("Seeded {} ({})", seed.name, elapsed);
            self.progress.report(ProgressEvent::Seeded {
                name: seed.name.clone(),
                elapsed,
            });
            executed.push(seed.name.clone());
        }
        Ok(executed)
    }

    fn execute_plan(&mut self, plan: ExecutionPlan) -> MigrationResult<RunReport> {
        let known = self.registry.migrations()?;
        let mut report = RunReport::default();

        for step in plan.steps {
            let Some(migration) = known.get(&step.version) else {
                continue;
            };

            self.progress.report(ProgressEvent::Migrating {
                version: step.version,
                name: step.name.clone(),
                direction: step.direction,
            });
            let started = Instant::now();
            self.environment.execute_migration(migration, step.direction)?;
            let elapsed = format_elapsed(started.elapsed());

            info!(
                "{} {} {} ({})",
                step.direction.done_verb(),
                step.version,
                step.name,
                elapsed
            );
            self.progress.report(ProgressEvent::Migrated {
                version: step.version,
                name: step.name.clone(),
                direction: step.direction,
                elapsed,
            });
            report.executed.push(step);
        }

        if let Some(stop) = plan.stop {
            self.report_stop(stop);
        }
        report.stop = plan.stop;
        Ok(report)
    }

    fn report_stop(&self, stop: StopCondition) {
        warn!("{}", stop);
        self.progress.report(ProgressEvent::Warning(stop.to_string()));
    }
}
