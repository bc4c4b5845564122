use anyhow::Result;
use chrono::NaiveDateTime;

use crate::adapter::{Adapter, AdapterOptions, Command, prefix::with_table_affixes};
use crate::types::{Direction, Ledger};
use crate::utils::ExportSink;

/// Forwards everything to the wrapped adapter and appends each executed
/// command to the export sink, with table names as the driver sees them.
pub struct ExportingAdapter<'a> {
    inner: &'a mut dyn Adapter,
    sink: &'a mut ExportSink,
    ledger_table: &'a str,
}

impl<'a> ExportingAdapter<'a> {
    pub fn new(inner: &'a mut dyn Adapter, sink: &'a mut ExportSink, ledger_table: &'a str) -> Self {
        Self {
            inner,
            sink,
            ledger_table,
        }
    }
}

impl Adapter for ExportingAdapter<'_> {
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
        self.inner.execute(command)?;
        let statement = with_table_affixes(self.inner.options(), command).to_string();
        self.sink.write_statement(&statement, self.ledger_table)?;
        Ok(())
    }

    fn has_table(&mut self, table: &str) -> Result<bool> {
        self.inner.has_table(table)
    }

    fn has_column(&mut self, table: &str, column: &str) -> Result<bool> {
        self.inner.has_column(table, column)
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
