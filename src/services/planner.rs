//! Plan computation. Everything here is pure: it reads the known migration
//! set and a ledger snapshot and decides what should run, in which order.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::migration::{Migration, version_from_datetime};
use crate::types::{
    Direction, ExecutionPlan, Ledger, MigrationStatus, PlanStep, StatusReport, StatusRow,
    StopCondition,
};

pub type KnownMigrations = BTreeMap<i64, Migration>;

fn current_version(ledger: &Ledger) -> i64 {
    ledger.keys().next_back().copied().unwrap_or(0)
}

fn is_known_or_zero(known: &KnownMigrations, version: i64) -> bool {
    version == 0 || known.contains_key(&version)
}

/// Steps bringing the database to `target`, or fully up to date when no
/// target is given.
///
/// Applied migrations above the target are reverted newest first, then
/// every known unapplied migration up to the target is applied oldest first.
pub fn migrate_plan(known: &KnownMigrations, ledger: &Ledger, target: Option<i64>) -> ExecutionPlan {
    if known.is_empty() && ledger.is_empty() {
        return ExecutionPlan::default();
    }

    let target = match target {
        Some(version) if !is_known_or_zero(known, version) => {
            return ExecutionPlan::stopped(StopCondition::InvalidVersion(version));
        }
        Some(version) => version,
        None => known
            .keys()
            .chain(ledger.keys())
            .copied()
            .max()
            .unwrap_or(0),
    };

    let current = current_version(ledger);
    let direction = if target > current {
        Direction::Up
    } else {
        Direction::Down
    };
    debug!(
        "Planning migrate from {} to {} ({})",
        current, target, direction
    );

    let mut plan = ExecutionPlan::default();

    if direction == Direction::Down {
        for migration in known.values().rev() {
            if migration.version <= target {
                break;
            }
            if ledger.contains_key(&migration.version) {
                plan.steps.push(PlanStep::new(
                    migration.version,
                    &migration.name,
                    Direction::Down,
                ));
            }
        }
    }

    for migration in known.values() {
        if migration.version > target {
            break;
        }
        if !ledger.contains_key(&migration.version) {
            plan.steps
                .push(PlanStep::new(migration.version, &migration.name, Direction::Up));
        }
    }

    plan
}

/// Greatest known version not later than `datetime`.
pub fn migrate_to_datetime_target(known: &KnownMigrations, datetime: NaiveDateTime) -> Option<i64> {
    let limit = version_from_datetime(datetime);
    known.keys().rev().find(|&&version| version <= limit).copied()
}

/// Steps reverting applied migrations down to (not including) the target.
///
/// Without a target only the most recent migration is reverted. A target
/// below the earliest applied version reverts everything. The walk stops in
/// front of the first applied migration with its breakpoint set, unless
/// `force` is given.
pub fn rollback_plan(
    known: &KnownMigrations,
    ledger: &Ledger,
    target: Option<i64>,
    force: bool,
) -> ExecutionPlan {
    let versions: Vec<i64> = ledger.keys().copied().collect();

    let (first, last) = match (versions.first(), versions.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return ExecutionPlan::stopped(StopCondition::NothingToRollback),
    };
    if target == Some(last) {
        return ExecutionPlan::stopped(StopCondition::NothingToRollback);
    }

    let target = match target {
        None if versions.len() >= 2 => versions[versions.len() - 2],
        None => 0,
        Some(version) if version < first => 0,
        Some(version) => version,
    };

    if !is_known_or_zero(known, target) {
        return ExecutionPlan::stopped(StopCondition::InvalidVersion(target));
    }
    debug!("Planning rollback from {} to {} (force: {})", last, target, force);

    let mut plan = ExecutionPlan::default();
    for migration in known.values().rev() {
        if migration.version <= target {
            break;
        }
        let Some(entry) = ledger.get(&migration.version) else {
            continue;
        };
        if entry.breakpoint && !force {
            plan.stop = Some(StopCondition::BreakpointReached(migration.version));
            break;
        }
        plan.steps.push(PlanStep::new(
            migration.version,
            &migration.name,
            Direction::Down,
        ));
    }

    plan
}

/// Rollback target for a date: the greatest applied version not later than
/// `datetime`, or 0 when every applied version is later. `None` when nothing
/// was applied at or after `datetime`.
pub fn rollback_to_datetime_target(ledger: &Ledger, datetime: NaiveDateTime) -> Option<i64> {
    let limit = version_from_datetime(datetime);

    let earlier = ledger.keys().rev().find(|&&version| version <= limit).copied();
    let has_available = ledger.keys().any(|&version| version >= limit);

    has_available.then(|| earlier.unwrap_or(0))
}

/// Version a breakpoint toggle applies to. Defaults to the most recent
/// ledger entry.
pub fn breakpoint_target(
    known: &KnownMigrations,
    ledger: &Ledger,
    version: Option<i64>,
) -> Result<i64, StopCondition> {
    if known.is_empty() || ledger.is_empty() {
        return Err(StopCondition::NoMigrations);
    }
    let version = version.unwrap_or_else(|| current_version(ledger));
    if version == 0 || !known.contains_key(&version) {
        return Err(StopCondition::InvalidVersion(version));
    }
    Ok(version)
}

/// Known migrations in version order, then ledger entries without a known
/// migration.
pub fn status_report(known: &KnownMigrations, ledger: &Ledger) -> StatusReport {
    let mut rows: Vec<StatusRow> = known
        .values()
        .map(|migration| match ledger.get(&migration.version) {
            Some(entry) => StatusRow {
                status: MigrationStatus::Up,
                version: migration.version,
                name: migration.name.clone(),
                start_time: Some(entry.start_time),
                end_time: Some(entry.end_time),
                breakpoint: entry.breakpoint,
            },
            None => StatusRow {
                status: MigrationStatus::Down,
                version: migration.version,
                name: migration.name.clone(),
                start_time: None,
                end_time: None,
                breakpoint: false,
            },
        })
        .collect();

    rows.extend(
        ledger
            .values()
            .filter(|entry| !known.contains_key(&entry.version))
            .map(|entry| StatusRow {
                status: MigrationStatus::Missing,
                version: entry.version,
                name: entry.migration_name.clone(),
                start_time: Some(entry.start_time),
                end_time: Some(entry.end_time),
                breakpoint: entry.breakpoint,
            }),
    );

    StatusReport::new(rows)
}
