use anyhow::Result;
use chrono::NaiveDateTime;

use crate::adapter::{Adapter, AdapterOptions, Command};
use crate::types::{Direction, Ledger};

/// `command` with table names carrying the prefix and suffix configured in
/// `options`.
pub fn with_table_affixes(options: &AdapterOptions, command: &Command) -> Command {
    if !options.has_table_prefix() && !options.has_table_suffix() {
        return command.clone();
    }
    let prefix = options.table_prefix.as_deref().unwrap_or_default();
    let suffix = options.table_suffix.as_deref().unwrap_or_default();
    command.map_tables(|t| format!("{}{}{}", prefix, t, suffix))
}

/// Rewrites every table name to `<prefix><name><suffix>` before handing the
/// command to the wrapped adapter. The ledger table is left alone.
pub struct TablePrefixAdapter {
    inner: Box<dyn Adapter>,
    prefix: String,
    suffix: String,
}

impl TablePrefixAdapter {
    pub fn new(inner: Box<dyn Adapter>) -> Self {
        let prefix = inner.options().table_prefix.clone().unwrap_or_default();
        let suffix = inner.options().table_suffix.clone().unwrap_or_default();
        Self {
            inner,
            prefix,
            suffix,
        }
    }

    pub fn adapter_table_name(&self, table: &str) -> String {
        format!("{}{}{}", self.prefix, table, self.suffix)
    }
}

impl Adapter for TablePrefixAdapter {
    fn adapter_name(&self) -> &str {
        self.inner.adapter_name()
    }

    fn options(&self) -> &AdapterOptions {
        self.inner.options()
    }

    fn has_transactions(&self) -> bool {
        self.inner.has_transactions()
    }

    fn begin_transaction(&mut self) -> Result<()> {
        self.inner.begin_transaction()
    }

    fn commit_transaction(&mut self) -> Result<()> {
        self.inner.commit_transaction()
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        self.inner.rollback_transaction()
    }

    fn execute(&mut self, command: &Command) -> Result<()> {
        let prefixed = command.map_tables(|t| self.adapter_table_name(t));
        self.inner.execute(&prefixed)
    }

    fn has_table(&mut self, table: &str) -> Result<bool> {
        let table = self.adapter_table_name(table);
        self.inner.has_table(&table)
    }

    fn has_column(&mut self, table: &str, column: &str) -> Result<bool> {
        let table = self.adapter_table_name(table);
        self.inner.has_column(&table, column)
    }

    fn version_log(&mut self) -> Result<Ledger> {
        self.inner.version_log()
    }

    fn migrated(
        &mut self,
        version: i64,
        name: &str,
        direction: Direction,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Result<()> {
        self.inner
            .migrated(version, name, direction, start_time, end_time)
    }

    fn toggle_breakpoint(&mut self, version: i64) -> Result<()> {
        self.inner.toggle_breakpoint(version)
    }

    fn reset_all_breakpoints(&mut self) -> Result<usize> {
        self.inner.reset_all_breakpoints()
    }
}
