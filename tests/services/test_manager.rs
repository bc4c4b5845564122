#[path = "../common/mod.rs"]
mod common;

use anyhow::Result;
use tidemark::{
    MigrationError,
    adapter::{Adapter, Command},
    types::{BreakpointOutcome, Direction, StopCondition},
    utils::{ProgressEvent, ProgressReporter},
};
use tokio::sync::mpsc;

use crate::common::{
    ADD_EMAIL, CREATE_POSTS, CREATE_USERS, account_seeder, add_email, create_manager,
    create_manager_with_seeds, create_users, datetime, failing, irreversible, orphan_entry,
    standard_migrations, user_seeder,
};

#[test]
fn test_migrate_then_rollback_to_zero_empties_ledger() -> Result<()> {
    let (mut manager, memory) = create_manager(standard_migrations());

    let report = manager.migrate(None)?;
    assert_eq!(
        report.executed_versions(),
        vec![CREATE_USERS, ADD_EMAIL, CREATE_POSTS]
    );
    assert_eq!(memory.ledger().len(), 3);
    assert_eq!(memory.table_names(), vec!["posts", "users"]);

    let report = manager.rollback(Some(0), false)?;
    assert_eq!(
        report.executed_versions(),
        vec![CREATE_POSTS, ADD_EMAIL, CREATE_USERS]
    );
    assert!(memory.ledger().is_empty());
    assert!(memory.table_names().is_empty());
    Ok(())
}

#[test]
fn test_repeated_default_rollback_walks_back_one_at_a_time() -> Result<()> {
    let (mut manager, memory) = create_manager(standard_migrations());
    manager.migrate(None)?;

    for expected in [CREATE_POSTS, ADD_EMAIL, CREATE_USERS] {
        let report = manager.rollback(None, false)?;
        assert_eq!(report.executed_versions(), vec![expected]);
    }
    assert!(memory.ledger().is_empty());

    let report = manager.rollback(None, false)?;
    assert!(report.is_noop());
    assert_eq!(report.stop, Some(StopCondition::NothingToRollback));
    Ok(())
}

#[test]
fn test_migrate_is_idempotent() -> Result<()> {
    let (mut manager, memory) = create_manager(standard_migrations());

    manager.migrate(None)?;
    memory.clear_journal();

    let report = manager.migrate(None)?;
    assert!(report.is_noop());
    assert!(report.stop.is_none());
    assert!(memory.journal().is_empty());
    Ok(())
}

#[test]
fn test_migrate_with_nothing_known_is_noop() -> Result<()> {
    let (mut manager, memory) = create_manager(Vec::new());
    let report = manager.migrate(None)?;
    assert!(report.is_noop());
    assert!(memory.ledger().is_empty());
    Ok(())
}

#[test]
fn test_migrate_to_unknown_version_warns_and_noops() -> Result<()> {
    let (mut manager, memory) = create_manager(standard_migrations());

    let report = manager.migrate(Some(20230101120000))?;
    assert!(report.is_noop());
    assert_eq!(report.stop, Some(StopCondition::InvalidVersion(20230101120000)));
    assert!(memory.ledger().is_empty());
    Ok(())
}

#[test]
fn test_migrate_down_to_target() -> Result<()> {
    let (mut manager, memory) = create_manager(standard_migrations());
    manager.migrate(None)?;

    let report = manager.migrate(Some(CREATE_USERS))?;
    assert_eq!(report.executed_versions(), vec![CREATE_POSTS, ADD_EMAIL]);
    assert!(
        report
            .executed
            .iter()
            .all(|step| step.direction == Direction::Down)
    );
    assert_eq!(memory.ledger().keys().copied().collect::<Vec<_>>(), vec![CREATE_USERS]);
    assert_eq!(memory.column_names("users"), vec!["id", "name"]);
    Ok(())
}

#[test]
fn test_migrate_to_date_time_picks_latest_earlier_version() -> Result<()> {
    let (mut manager, memory) = create_manager(vec![create_users(), add_email()]);

    let report = manager.migrate_to_date_time(datetime("2023-01-01 12:00:00")?)?;
    assert_eq!(report.executed_versions(), vec![CREATE_USERS]);
    assert_eq!(memory.ledger().keys().copied().collect::<Vec<_>>(), vec![CREATE_USERS]);

    let report = manager.migrate_to_date_time(datetime("2022-12-31 00:00:00")?)?;
    assert!(report.is_noop());
    Ok(())
}

#[test]
fn test_rollback_change_and_explicit_migrations() -> Result<()> {
    let (mut manager, memory) = create_manager(vec![create_users(), add_email()]);
    manager.migrate(None)?;
    memory.clear_journal();

    let report = manager.rollback(Some(0), false)?;
    assert_eq!(report.executed_versions(), vec![ADD_EMAIL, CREATE_USERS]);
    assert_eq!(
        memory.journal(),
        vec![
            Command::RemoveColumn {
                table: "users".to_string(),
                column: "email".to_string(),
            },
            Command::DropTable {
                table: "users".to_string(),
            },
        ]
    );
    assert!(memory.ledger().is_empty());
    Ok(())
}

#[test]
fn test_change_rollback_replays_inverses_newest_first() -> Result<()> {
    let (mut manager, memory) = create_manager(standard_migrations());
    manager.migrate(None)?;
    memory.clear_journal();

    manager.rollback(None, false)?;
    let kinds: Vec<_> = memory.journal().iter().map(|c| c.kind()).collect();
    assert_eq!(kinds, vec!["dropForeignKey", "dropIndex", "dropTable"]);
    assert!(!memory.table_names().contains(&"posts".to_string()));
    Ok(())
}

#[test]
fn test_breakpoint_blocks_rollback_unless_forced() -> Result<()> {
    let (mut manager, memory) = create_manager(standard_migrations());
    manager.migrate(None)?;

    let outcome = manager.toggle_breakpoint(Some(ADD_EMAIL))?;
    match outcome {
        BreakpointOutcome::Toggled(state) => {
            assert_eq!(state.version, ADD_EMAIL);
            assert_eq!(state.name, "AddEmail");
            assert!(state.set);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let report = manager.rollback(Some(0), false)?;
    assert_eq!(report.executed_versions(), vec![CREATE_POSTS]);
    assert_eq!(report.stop, Some(StopCondition::BreakpointReached(ADD_EMAIL)));
    assert_eq!(
        memory.ledger().keys().copied().collect::<Vec<_>>(),
        vec![CREATE_USERS, ADD_EMAIL]
    );

    // a target below the breakpoint still stops in front of it
    let report = manager.rollback(Some(CREATE_USERS), false)?;
    assert!(report.is_noop());
    assert_eq!(report.stop, Some(StopCondition::BreakpointReached(ADD_EMAIL)));

    let report = manager.rollback(Some(0), true)?;
    assert_eq!(report.executed_versions(), vec![ADD_EMAIL, CREATE_USERS]);
    assert!(memory.ledger().is_empty());
    Ok(())
}

#[test]
fn test_toggle_breakpoint_defaults_to_latest_and_flips() -> Result<()> {
    let (mut manager, memory) = create_manager(standard_migrations());
    manager.migrate(None)?;

    let first = manager.toggle_breakpoint(None)?;
    assert!(matches!(first, BreakpointOutcome::Toggled(ref s) if s.version == CREATE_POSTS && s.set));
    assert!(memory.ledger()[&CREATE_POSTS].breakpoint);

    let second = manager.toggle_breakpoint(None)?;
    assert!(matches!(second, BreakpointOutcome::Toggled(ref s) if !s.set));
    assert!(!memory.ledger()[&CREATE_POSTS].breakpoint);
    Ok(())
}

#[test]
fn test_toggle_breakpoint_edge_cases() -> Result<()> {
    let (mut manager, _memory) = create_manager(standard_migrations());

    assert_eq!(
        manager.toggle_breakpoint(None)?,
        BreakpointOutcome::Skipped(StopCondition::NoMigrations)
    );

    manager.migrate(Some(CREATE_USERS))?;
    assert_eq!(
        manager.toggle_breakpoint(Some(42))?,
        BreakpointOutcome::Skipped(StopCondition::InvalidVersion(42))
    );

    // known but not applied: nothing to flag
    let outcome = manager.toggle_breakpoint(Some(CREATE_POSTS))?;
    assert!(matches!(outcome, BreakpointOutcome::Toggled(ref s) if !s.set));
    Ok(())
}

#[test]
fn test_remove_breakpoints_reports_count() -> Result<()> {
    let (mut manager, memory) = create_manager(standard_migrations());
    manager.migrate(None)?;
    manager.toggle_breakpoint(Some(CREATE_USERS))?;
    manager.toggle_breakpoint(Some(CREATE_POSTS))?;

    assert_eq!(manager.remove_breakpoints()?, 2);
    assert!(memory.ledger().values().all(|entry| !entry.breakpoint));
    assert_eq!(manager.remove_breakpoints()?, 0);
    Ok(())
}

#[test]
fn test_rollback_to_date_time() -> Result<()> {
    let (mut manager, memory) = create_manager(standard_migrations());
    manager.migrate(None)?;

    let report = manager.rollback_to_date_time(datetime("2023-01-01 12:00:00")?, false)?;
    assert_eq!(report.executed_versions(), vec![CREATE_POSTS, ADD_EMAIL]);
    assert_eq!(memory.ledger().keys().copied().collect::<Vec<_>>(), vec![CREATE_USERS]);

    let report = manager.rollback_to_date_time(datetime("2024-01-01 00:00:00")?, false)?;
    assert!(report.is_noop());

    let report = manager.rollback_to_date_time(datetime("2020-01-01 00:00:00")?, false)?;
    assert_eq!(report.executed_versions(), vec![CREATE_USERS]);
    assert!(memory.ledger().is_empty());
    Ok(())
}

#[test]
fn test_status_exit_codes() -> Result<()> {
    let (mut manager, memory) = create_manager(standard_migrations());

    let status = manager.status()?;
    assert_eq!(status.exit_code(), 1);
    assert_eq!(status.down_count(), 3);

    manager.migrate(None)?;
    let status = manager.status()?;
    assert_eq!(status.exit_code(), 0);
    assert_eq!(status.down_count(), 0);

    memory.insert_ledger_entry(orphan_entry(20220601000000));
    manager.rollback(None, false)?;
    let status = manager.status()?;
    assert_eq!(status.exit_code(), 2);
    assert_eq!(status.missing().count(), 1);
    assert_eq!(status.down_count(), 1);
    Ok(())
}

#[test]
fn test_status_structured_view() -> Result<()> {
    let (mut manager, memory) = create_manager(vec![create_users(), add_email()]);
    manager.migrate(Some(CREATE_USERS))?;
    memory.insert_ledger_entry(orphan_entry(20220601000000));

    let json: serde_json::Value = serde_json::from_str(&manager.status()?.to_json()?)?;
    assert_eq!(json["pending_count"], 2);
    let migrations = json["migrations"].as_array().unwrap();
    assert_eq!(migrations.len(), 2);
    assert_eq!(migrations[0]["status"], "up");
    assert_eq!(migrations[0]["id"], "20230101000000");
    assert_eq!(migrations[0]["name"], "CreateUsers");
    assert_eq!(migrations[1]["status"], "down");
    Ok(())
}

#[test]
fn test_irreversible_change_fails_and_keeps_ledger() -> Result<()> {
    let (mut manager, memory) = create_manager(vec![create_users(), irreversible()]);
    manager.migrate(None)?;

    let err = manager.rollback(None, false).unwrap_err();
    assert!(matches!(err, MigrationError::IrreversibleOperation { ref migration, .. } if migration == "BackfillNames"));
    assert_eq!(memory.ledger().len(), 2);
    assert!(!memory.in_transaction());
    Ok(())
}

#[test]
fn test_failed_migration_rolls_back_and_halts_plan() -> Result<()> {
    let mut migrations = standard_migrations();
    migrations.push(failing());
    let (mut manager, memory) = create_manager(migrations);

    let err = manager.migrate(None).unwrap_err();
    assert!(err.to_string().contains("does_not_exist"));

    assert_eq!(memory.ledger().len(), 3);
    assert!(!memory.table_names().contains(&"audit".to_string()));
    assert!(!memory.in_transaction());
    Ok(())
}

#[test]
fn test_failure_without_transactions_keeps_partial_effects() -> Result<()> {
    let (mut manager, memory) = create_manager(vec![failing()]);
    let plain = memory.clone().without_transactions();
    manager.environment().set_adapter(Box::new(plain));

    assert!(manager.migrate(None).is_err());
    assert!(memory.ledger().is_empty());
    assert!(memory.table_names().contains(&"audit".to_string()));
    Ok(())
}

#[test]
fn test_seed_all_in_name_order() -> Result<()> {
    let (mut manager, memory) = create_manager_with_seeds(
        vec![create_users()],
        vec![user_seeder(), account_seeder()],
    );
    manager.migrate(None)?;

    let executed = manager.seed(None)?;
    assert_eq!(executed, vec!["AccountSeeder", "UserSeeder"]);
    assert_eq!(memory.table("users").unwrap().rows.len(), 2);
    assert_eq!(memory.ledger().len(), 1);
    Ok(())
}

#[test]
fn test_seed_by_name() -> Result<()> {
    let (mut manager, _memory) =
        create_manager_with_seeds(vec![create_users()], vec![user_seeder(), account_seeder()]);
    manager.migrate(None)?;

    assert_eq!(manager.seed(Some("AccountSeeder"))?, vec!["AccountSeeder"]);
    let err = manager.seed(Some("MissingSeeder")).unwrap_err();
    assert!(matches!(err, MigrationError::SeedNotFound(ref name) if name == "MissingSeeder"));
    Ok(())
}

#[test]
fn test_failed_seed_rolls_back() -> Result<()> {
    let (mut manager, memory) = create_manager_with_seeds(Vec::new(), vec![account_seeder()]);

    let err = manager.seed(None).unwrap_err();
    assert!(err.to_string().contains("users table is missing"));
    assert!(!memory.in_transaction());
    Ok(())
}

#[test]
fn test_progress_events() -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (manager, _memory) = create_manager(vec![create_users()]);
    let mut manager = manager.with_progress(ProgressReporter::new(Some(tx)));

    manager.migrate(None)?;
    manager.migrate(Some(42))?;

    let first = rx.try_recv()?;
    assert_eq!(
        first.to_string(),
        " == 20230101000000 CreateUsers: migrating"
    );
    match rx.try_recv()? {
        ProgressEvent::Migrated {
            version, elapsed, ..
        } => {
            assert_eq!(version, CREATE_USERS);
            assert!(elapsed.ends_with('s'));
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(
        rx.try_recv()?,
        ProgressEvent::Warning("42 is not a valid version".to_string())
    );
    Ok(())
}

#[test]
fn test_manager_uses_live_ledger_through_environment() -> Result<()> {
    let (mut manager, mut memory) = create_manager(standard_migrations());
    manager.migrate(Some(ADD_EMAIL))?;

    assert_eq!(manager.environment().current_version()?, ADD_EMAIL);
    assert_eq!(memory.versions()?, vec![CREATE_USERS, ADD_EMAIL]);
    Ok(())
}
