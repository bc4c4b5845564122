//! The adapter capability consumed by the engine, and the decorators built on
//! top of it.
//!
//! Concrete database drivers live outside this crate; they implement
//! [`Adapter`] and register a constructor with [`AdapterFactory`]. The only
//! driver shipped here is [`MemoryAdapter`].

pub mod command;
pub mod export;
pub mod factory;
pub mod memory;
pub mod prefix;
pub mod recording;

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::types::{Direction, Ledger};

pub use command::{Column, ColumnType, Command, ForeignKey};
pub use export::ExportingAdapter;
pub use factory::AdapterFactory;
pub use memory::MemoryAdapter;
pub use prefix::TablePrefixAdapter;
pub use recording::RecordingAdapter;

/// Connection options handed to a driver constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdapterOptions {
    pub host: String,
    pub port: Option<u16>,
    pub name: String,
    pub charset: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub pass: String,
    pub engine: String,
    pub table_prefix: Option<String>,
    pub table_suffix: Option<String>,
    pub default_migration_table: String,
}

impl AdapterOptions {
    pub fn has_table_prefix(&self) -> bool {
        self.table_prefix.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_table_suffix(&self) -> bool {
        self.table_suffix.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// What the engine needs from a database driver.
///
/// Primitive operations go through [`Adapter::execute`]; the ledger is owned
/// by the adapter and only reached through the ledger methods.
pub trait Adapter {
    /// Driver identity, e.g. `mysql` or `memory`.
    fn adapter_name(&self) -> &str;

    fn options(&self) -> &AdapterOptions;

    fn has_transactions(&self) -> bool;

    fn begin_transaction(&mut self) -> Result<()>;

    fn commit_transaction(&mut self) -> Result<()>;

    fn rollback_transaction(&mut self) -> Result<()>;

    fn execute(&mut self, command: &Command) -> Result<()>;

    fn has_table(&mut self, table: &str) -> Result<bool>;

    fn has_column(&mut self, table: &str, column: &str) -> Result<bool>;

    /// Applied migrations keyed by version.
    fn version_log(&mut self) -> Result<Ledger>;

    fn versions(&mut self) -> Result<Vec<i64>> {
        Ok(self.version_log()?.into_keys().collect())
    }

    /// Inserts the ledger row for `Up` and deletes it for `Down`.
    fn migrated(
        &mut self,
        version: i64,
        name: &str,
        direction: Direction,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Result<()>;

    fn toggle_breakpoint(&mut self, version: i64) -> Result<()>;

    /// Clears every breakpoint, returning how many were set.
    fn reset_all_breakpoints(&mut self) -> Result<usize>;
}
