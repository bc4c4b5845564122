#[path = "../common/mod.rs"]
mod common;

use std::fs;

use anyhow::Result;
use tempfile::tempdir;
use tidemark::{
    adapter::{AdapterFactory, MemoryAdapter},
    config::{DatabaseConfig, ExportConfig, Settings},
    services::Environment,
    types::Direction,
};

use crate::common::{add_email, create_posts, create_users, memory_environment, user_seeder};

fn export_settings(dir: &std::path::Path, merge: Option<&str>) -> Settings {
    Settings {
        export: ExportConfig {
            dir: Some(dir.to_string_lossy().to_string()),
            merge: merge.map(str::to_string),
        },
        ..Default::default()
    }
}

#[test]
fn test_export_writes_one_file_per_step() -> Result<()> {
    let dir = tempdir()?;
    let (mut env, _memory) = memory_environment(&export_settings(dir.path(), None));

    env.execute_migration(&create_users(), Direction::Up)?;
    env.execute_migration(&add_email(), Direction::Up)?;
    env.execute_migration(&add_email(), Direction::Down)?;

    let up = fs::read_to_string(dir.path().join("up").join("CreateUsers.sql"))?;
    assert_eq!(
        up,
        "#start\nCREATE TABLE `users` (`id` INTEGER NOT NULL, `name` STRING NOT NULL);\n"
    );

    let down = fs::read_to_string(dir.path().join("down").join("AddEmail.sql"))?;
    assert_eq!(down, "#start\nALTER TABLE `users` DROP COLUMN `email`;\n");
    assert!(env.export().current_file().is_none());
    Ok(())
}

#[test]
fn test_export_untouched_when_adapter_cannot_be_built() -> Result<()> {
    let dir = tempdir()?;
    let settings = Settings {
        database: DatabaseConfig {
            driver: "Mysql.Pdo".to_string(),
            ..Default::default()
        },
        ..export_settings(dir.path(), None)
    };
    let mut env = Environment::new("test", &settings);

    let err = env
        .execute_migration(&create_users(), Direction::Up)
        .unwrap_err();
    assert!(matches!(err, tidemark::MigrationError::UnknownAdapter(ref name) if name == "mysql"));
    assert!(env.export().current_file().is_none());
    assert!(!dir.path().join("up").join("CreateUsers.sql").exists());

    let err = env.execute_seed(&user_seeder()).unwrap_err();
    assert!(matches!(err, tidemark::MigrationError::UnknownAdapter(_)));
    assert!(env.export().current_file().is_none());
    assert!(!dir.path().join("seed").exists());
    Ok(())
}

#[test]
fn test_export_merges_steps_into_one_file() -> Result<()> {
    let dir = tempdir()?;
    let (mut env, _memory) = memory_environment(&export_settings(dir.path(), Some("release.sql")));

    env.execute_migration(&create_users(), Direction::Up)?;
    env.execute_migration(&create_posts(), Direction::Up)?;

    let merged = fs::read_to_string(dir.path().join("up").join("release.sql"))?;
    let lines: Vec<_> = merged.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("CREATE TABLE `users`"));
    assert!(lines[1].starts_with("CREATE TABLE `posts`"));
    assert!(lines[2].starts_with("CREATE INDEX"));
    assert!(lines[3].contains("FOREIGN KEY"));
    assert!(!dir.path().join("up").join("CreateUsers.sql").exists());
    Ok(())
}

#[test]
fn test_export_seed_directory() -> Result<()> {
    let dir = tempdir()?;
    let (mut env, _memory) = memory_environment(&export_settings(dir.path(), None));
    env.execute_migration(&create_users(), Direction::Up)?;

    env.execute_seed(&user_seeder())?;

    let seed = fs::read_to_string(dir.path().join("seed").join("UserSeeder.sql"))?;
    assert!(seed.starts_with("#start\nINSERT INTO `users`"));
    Ok(())
}

#[test]
fn test_export_skips_ledger_statements() -> Result<()> {
    let dir = tempdir()?;
    let (mut env, _memory) = memory_environment(&export_settings(dir.path(), None));
    let migration = tidemark::migration::Migration::change("20230106000000_touch_log", |schema| {
        schema.execute("UPDATE phinxlog SET breakpoint = 0")?;
        schema.execute("SELECT * FROM INFORMATION_SCHEMA.TABLES")?;
        schema.execute("DELETE FROM sessions;")
    })?;

    env.execute_migration(&migration, Direction::Up)?;

    let up = fs::read_to_string(dir.path().join("up").join("TouchLog.sql"))?;
    assert_eq!(up, "#start\nDELETE FROM sessions;\n");
    Ok(())
}

#[test]
fn test_ledger_written_only_after_success() -> Result<()> {
    let (mut env, memory) = memory_environment(&Settings::default());

    env.execute_migration(&create_users(), Direction::Up)?;
    let entry = memory.ledger()[&20230101000000].clone();
    assert_eq!(entry.migration_name, "CreateUsers");
    assert!(entry.start_time <= entry.end_time);
    assert!(!entry.breakpoint);

    // creating the table twice fails inside the transaction
    assert!(env.execute_migration(&create_users(), Direction::Up).is_err());
    assert_eq!(memory.ledger().len(), 1);

    env.execute_migration(&create_users(), Direction::Down)?;
    assert!(memory.ledger().is_empty());
    Ok(())
}

#[test]
fn test_prefixed_adapter_from_configuration() -> Result<()> {
    let memory = MemoryAdapter::default();
    let handle = memory.clone();
    let mut factory = AdapterFactory::new();
    factory.register_adapter("mysql", move |options| {
        Ok(Box::new(handle.with_options(options.clone())))
    });

    let settings = Settings {
        database: DatabaseConfig {
            driver: "Mysql.Pdo".to_string(),
            table_prefix: Some("app_".to_string()),
            table_suffix: Some("_v1".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let mut env = Environment::new("production", &settings).with_factory(factory);

    env.execute_migration(&create_users(), Direction::Up)?;
    env.execute_migration(&add_email(), Direction::Up)?;

    assert_eq!(memory.table_names(), vec!["app_users_v1"]);
    assert_eq!(memory.column_names("app_users_v1"), vec!["id", "name", "email"]);

    env.execute_migration(&add_email(), Direction::Down)?;
    assert_eq!(memory.column_names("app_users_v1"), vec!["id", "name"]);
    assert_eq!(env.adapter_info()?.driver, "memory");
    Ok(())
}

#[test]
fn test_unknown_driver_is_an_error() {
    let settings = Settings {
        database: DatabaseConfig {
            driver: "oracle".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    let mut env = Environment::new("test", &settings);

    let err = env.version_log().unwrap_err();
    assert!(matches!(err, tidemark::MigrationError::UnknownAdapter(ref name) if name == "oracle"));
}

#[test]
fn test_reset_rebuilds_adapter_from_configuration() -> Result<()> {
    let (mut env, memory) = memory_environment(&Settings::default());
    env.execute_migration(&create_users(), Direction::Up)?;
    assert_eq!(env.current_version()?, 20230101000000);

    env.reset();
    assert_eq!(env.current_version()?, 0);
    assert_eq!(memory.ledger().len(), 1);
    Ok(())
}
