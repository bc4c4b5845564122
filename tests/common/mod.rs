#![allow(dead_code)]

use anyhow::{Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use tidemark::{
    adapter::{Column, ColumnType, ForeignKey, MemoryAdapter},
    config::Settings,
    migration::{Migration, Seed},
    registry::{MigrationRegistry, StaticSource},
    services::{Environment, Manager},
    types::LedgerEntry,
};

pub const CREATE_USERS: i64 = 20230101000000;
pub const ADD_EMAIL: i64 = 20230102000000;
pub const CREATE_POSTS: i64 = 20230103000000;

/// Explicit up/down pair.
pub fn create_users() -> Migration {
    Migration::reversible(
        "20230101000000_create_users",
        |schema| {
            schema.create_table(
                "users",
                vec![
                    Column::new("id", ColumnType::Integer),
                    Column::new("name", ColumnType::String),
                ],
            )
        },
        |schema| schema.drop_table("users"),
    )
    .unwrap()
}

/// Forward-only, reverted through recorded inverses.
pub fn add_email() -> Migration {
    Migration::change("20230102000000_add_email", |schema| {
        schema.add_column("users", Column::new("email", ColumnType::String).nullable())
    })
    .unwrap()
}

pub fn create_posts() -> Migration {
    Migration::change("20230103000000_create_posts", |schema| {
        schema.create_table(
            "posts",
            vec![
                Column::new("id", ColumnType::Integer),
                Column::new("user_id", ColumnType::Integer),
                Column::new("title", ColumnType::String),
            ],
        )?;
        schema.add_index("posts", &["user_id"], false)?;
        schema.add_foreign_key("posts", ForeignKey::new(&["user_id"], "users", &["id"]))
    })
    .unwrap()
}

/// Forward-only but issues a raw statement, so it cannot be reverted.
pub fn irreversible() -> Migration {
    Migration::change("20230104000000_backfill_names", |schema| {
        schema.execute("UPDATE users SET name = 'unknown' WHERE name IS NULL")
    })
    .unwrap()
}

/// Creates a table, then fails.
pub fn failing() -> Migration {
    Migration::change("20230105000000_broken", |schema| {
        schema.create_table("audit", vec![Column::new("id", ColumnType::Integer)])?;
        schema.drop_table("does_not_exist")
    })
    .unwrap()
}

pub fn user_seeder() -> Seed {
    Seed::new("UserSeeder", |schema| {
        let ada: &[(&str, &str)] = &[("id", "1"), ("name", "'ada'")];
        let linus: &[(&str, &str)] = &[("id", "2"), ("name", "'linus'")];
        schema.insert_rows("users", &[ada, linus])
    })
    .unwrap()
}

pub fn account_seeder() -> Seed {
    Seed::new("AccountSeeder", |schema| {
        if !schema.has_table("users")? {
            bail!("users table is missing");
        }
        Ok(())
    })
    .unwrap()
}

pub fn standard_migrations() -> Vec<Migration> {
    vec![create_users(), add_email(), create_posts()]
}

/// Environment bound to `memory`; the returned clone shares its database.
pub fn memory_environment(settings: &Settings) -> (Environment, MemoryAdapter) {
    let memory = MemoryAdapter::default();
    let mut environment = Environment::new("test", settings);
    environment.set_adapter(Box::new(memory.clone()));
    (environment, memory)
}

pub fn create_manager(migrations: Vec<Migration>) -> (Manager, MemoryAdapter) {
    create_manager_with_seeds(migrations, Vec::new())
}

pub fn create_manager_with_seeds(
    migrations: Vec<Migration>,
    seeds: Vec<Seed>,
) -> (Manager, MemoryAdapter) {
    let (environment, memory) = memory_environment(&Settings::default());
    let registry = MigrationRegistry::new(Box::new(
        StaticSource::new(migrations).with_seeds(seeds),
    ));
    (Manager::new(environment, registry), memory)
}

pub fn datetime(input: &str) -> Result<NaiveDateTime> {
    Ok(NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S")?)
}

/// Ledger row for a version no migration knows about.
pub fn orphan_entry(version: i64) -> LedgerEntry {
    let time = NaiveDate::from_ymd_opt(2022, 6, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    LedgerEntry {
        version,
        migration_name: "DeletedMigration".to_string(),
        start_time: time,
        end_time: time,
        breakpoint: false,
    }
}
