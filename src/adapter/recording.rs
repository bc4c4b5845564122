use anyhow::Result;
use chrono::NaiveDateTime;
use tracing::debug;

use crate::adapter::{Adapter, AdapterOptions, Command};
use crate::errors::{MigrationError, MigrationResult};
use crate::types::{Direction, Ledger};

/// Captures primitive commands instead of executing them, so a forward-only
/// migration can be undone by replaying the inverses.
///
/// Introspection and ledger calls still reach the wrapped adapter.
pub struct RecordingAdapter<'a> {
    inner: &'a mut dyn Adapter,
    commands: Vec<Command>,
}

impl<'a> RecordingAdapter<'a> {
    pub fn new(inner: &'a mut dyn Adapter) -> Self {
        Self {
            inner,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Inverses of the recorded commands, last recorded first.
    ///
    /// Fails on the first command without an inverse; nothing is executed
    /// in that case.
    pub fn inverted_commands(&self, migration: &str) -> MigrationResult<Vec<Command>> {
        self.commands
            .iter()
            .rev()
            .map(|command| {
                command
                    .inverse()
                    .ok_or_else(|| MigrationError::IrreversibleOperation {
                        migration: migration.to_string(),
                        command: command.to_string(),
                    })
            })
            .collect()
    }

    /// Executes the inverted commands against the wrapped adapter.
    pub fn execute_inverted(self, migration: &str) -> MigrationResult<()> {
        let inverted = self.inverted_commands(migration)?;
        for command in &inverted {
            debug!("Replaying inverse '{}' for {}", command.kind(), migration);
            self.inner.execute(command)?;
        }
        Ok(())
    }
}

impl Adapter for RecordingAdapter<'_> {
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
        debug!("Recording '{}'", command.kind());
        self.commands.push(command.clone());
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
