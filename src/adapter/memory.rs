use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow, bail};
use chrono::NaiveDateTime;
use tracing::debug;

use crate::adapter::{Adapter, AdapterOptions, Column, Command, ForeignKey};
use crate::types::{Direction, Ledger, LedgerEntry};

pub const MEMORY_ADAPTER: &str = "memory";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTable {
    pub columns: Vec<Column>,
    pub indexes: Vec<(Vec<String>, bool)>,
    pub foreign_keys: Vec<ForeignKey>,
    pub rows: Vec<BTreeMap<String, String>>,
}

impl MemoryTable {
    fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    tables: BTreeMap<String, MemoryTable>,
    ledger: Ledger,
}

#[derive(Debug, Default)]
struct MemoryDatabase {
    tables: BTreeMap<String, MemoryTable>,
    ledger: Ledger,
    journal: Vec<Command>,
    snapshot: Option<Snapshot>,
}

impl MemoryDatabase {
    fn table_mut(&mut self, table: &str) -> Result<&mut MemoryTable> {
        match self.tables.get_mut(table) {
            Some(t) => Ok(t),
            None => bail!("Table '{}' does not exist", table),
        }
    }

    fn apply(&mut self, command: &Command) -> Result<()> {
        match command {
            Command::CreateTable { table, columns } => {
                if self.tables.contains_key(table) {
                    bail!("Table '{}' already exists", table);
                }
                self.tables.insert(
                    table.clone(),
                    MemoryTable {
                        columns: columns.clone(),
                        ..Default::default()
                    },
                );
            }
            Command::DropTable { table } => {
                if self.tables.remove(table).is_none() {
                    bail!("Table '{}' does not exist", table);
                }
            }
            Command::RenameTable { from, to } => {
                if self.tables.contains_key(to) {
                    bail!("Table '{}' already exists", to);
                }
                match self.tables.remove(from) {
                    Some(t) => {
                        self.tables.insert(to.clone(), t);
                    }
                    None => bail!("Table '{}' does not exist", from),
                }
            }
            Command::AddColumn { table, column } => {
                let t = self.table_mut(table)?;
                if t.column_position(&column.name).is_some() {
                    bail!("Column '{}.{}' already exists", table, column.name);
                }
                t.columns.push(column.clone());
            }
            Command::RemoveColumn { table, column } => {
                let t = self.table_mut(table)?;
                let Some(pos) = t.column_position(column) else {
                    bail!("Column '{}.{}' does not exist", table, column);
                };
                t.columns.remove(pos);
                for row in t.rows.iter_mut() {
                    row.remove(column);
                }
            }
            Command::RenameColumn { table, from, to } => {
                let t = self.table_mut(table)?;
                if t.column_position(to).is_some() {
                    bail!("Column '{}.{}' already exists", table, to);
                }
                let Some(pos) = t.column_position(from) else {
                    bail!("Column '{}.{}' does not exist", table, from);
                };
                t.columns[pos].name = to.clone();
                for row in t.rows.iter_mut() {
                    if let Some(value) = row.remove(from) {
                        row.insert(to.clone(), value);
                    }
                }
            }
            Command::ChangeColumn {
                table,
                column,
                definition,
            } => {
                let t = self.table_mut(table)?;
                let Some(pos) = t.column_position(column) else {
                    bail!("Column '{}.{}' does not exist", table, column);
                };
                t.columns[pos] = definition.clone();
                if definition.name != *column {
                    for row in t.rows.iter_mut() {
                        if let Some(value) = row.remove(column) {
                            row.insert(definition.name.clone(), value);
                        }
                    }
                }
            }
            Command::AddIndex {
                table,
                columns,
                unique,
            } => {
                let t = self.table_mut(table)?;
                if t.indexes.iter().any(|(c, _)| c == columns) {
                    bail!("Index on '{}' ({}) already exists", table, columns.join(", "));
                }
                t.indexes.push((columns.clone(), *unique));
            }
            Command::DropIndex { table, columns } => {
                let t = self.table_mut(table)?;
                let before = t.indexes.len();
                t.indexes.retain(|(c, _)| c != columns);
                if t.indexes.len() == before {
                    bail!("Index on '{}' ({}) does not exist", table, columns.join(", "));
                }
            }
            Command::AddForeignKey { table, foreign_key } => {
                if !self.tables.contains_key(&foreign_key.referenced_table) {
                    bail!(
                        "Referenced table '{}' does not exist",
                        foreign_key.referenced_table
                    );
                }
                self.table_mut(table)?.foreign_keys.push(foreign_key.clone());
            }
            Command::DropForeignKey { table, columns } => {
                let t = self.table_mut(table)?;
                let before = t.foreign_keys.len();
                t.foreign_keys.retain(|fk| fk.columns != *columns);
                if t.foreign_keys.len() == before {
                    bail!(
                        "Foreign key on '{}' ({}) does not exist",
                        table,
                        columns.join(", ")
                    );
                }
            }
            Command::Insert { table, rows } => {
                let t = self.table_mut(table)?;
                for row in rows {
                    if let Some((unknown, _)) =
                        row.iter().find(|(c, _)| t.column_position(c).is_none())
                    {
                        bail!("Column '{}.{}' does not exist", table, unknown);
                    }
                    t.rows.push(row.iter().cloned().collect());
                }
            }
            Command::Execute { .. } => {}
        }
        Ok(())
    }
}

/// In-process driver keeping schema, rows and the ledger in memory.
///
/// Clones share the same database, so a test can hand one clone to the
/// environment and inspect the other.
#[derive(Debug, Clone)]
pub struct MemoryAdapter {
    db: Arc<Mutex<MemoryDatabase>>,
    options: AdapterOptions,
    transactions: bool,
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new(AdapterOptions {
            default_migration_table: "phinxlog".to_string(),
            ..Default::default()
        })
    }
}

impl MemoryAdapter {
    pub fn new(options: AdapterOptions) -> Self {
        Self {
            db: Arc::new(Mutex::new(MemoryDatabase::default())),
            options,
            transactions: true,
        }
    }

    /// Another handle on the same database, reporting `options`.
    pub fn with_options(&self, options: AdapterOptions) -> Self {
        Self {
            db: Arc::clone(&self.db),
            options,
            transactions: self.transactions,
        }
    }

    /// Same database, reported as not supporting transactions.
    pub fn without_transactions(mut self) -> Self {
        self.transactions = false;
        self
    }

    fn db(&self) -> Result<MutexGuard<'_, MemoryDatabase>> {
        self.db
            .lock()
            .map_err(|_| anyhow!("Memory database lock is poisoned"))
    }

    /// Lock for the inspection helpers, which read through a poisoned lock.
    fn inspect(&self) -> MutexGuard<'_, MemoryDatabase> {
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn table_names(&self) -> Vec<String> {
        self.inspect().tables.keys().cloned().collect()
    }

    pub fn table(&self, name: &str) -> Option<MemoryTable> {
        self.inspect().tables.get(name).cloned()
    }

    pub fn column_names(&self, table: &str) -> Vec<String> {
        self.table(table)
            .map(|t| t.columns.into_iter().map(|c| c.name).collect())
            .unwrap_or_default()
    }

    /// Every command that was applied, in order, including those whose
    /// transaction was later rolled back.
    pub fn journal(&self) -> Vec<Command> {
        self.inspect().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.inspect().journal.clear();
    }

    pub fn ledger(&self) -> Ledger {
        self.inspect().ledger.clone()
    }

    /// Writes a ledger row directly, bypassing migration execution.
    pub fn insert_ledger_entry(&self, entry: LedgerEntry) {
        self.inspect().ledger.insert(entry.version, entry);
    }

    pub fn in_transaction(&self) -> bool {
        self.inspect().snapshot.is_some()
    }
}

impl Adapter for MemoryAdapter {
    fn adapter_name(&self) -> &str {
        MEMORY_ADAPTER
    }

    fn options(&self) -> &AdapterOptions {
        &self.options
    }

    fn has_transactions(&self) -> bool {
        self.transactions
    }

    fn begin_transaction(&mut self) -> Result<()> {
        let mut db = self.db()?;
        if db.snapshot.is_some() {
            bail!("A transaction is already active");
        }
        db.snapshot = Some(Snapshot {
            tables: db.tables.clone(),
            ledger: db.ledger.clone(),
        });
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        if self.db()?.snapshot.take().is_none() {
            bail!("No active transaction to commit");
        }
        Ok(())
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        let mut db = self.db()?;
        match db.snapshot.take() {
            Some(snapshot) => {
                db.tables = snapshot.tables;
                db.ledger = snapshot.ledger;
                Ok(())
            }
            None => bail!("No active transaction to roll back"),
        }
    }

    fn execute(&mut self, command: &Command) -> Result<()> {
        debug!("memory: {}", command);
        let mut db = self.db()?;
        db.apply(command)?;
        db.journal.push(command.clone());
        Ok(())
    }

    fn has_table(&mut self, table: &str) -> Result<bool> {
        Ok(self.db()?.tables.contains_key(table))
    }

    fn has_column(&mut self, table: &str, column: &str) -> Result<bool> {
        Ok(self
            .db()?
            .tables
            .get(table)
            .is_some_and(|t| t.column_position(column).is_some()))
    }

    fn version_log(&mut self) -> Result<Ledger> {
        Ok(self.db()?.ledger.clone())
    }

    fn migrated(
        &mut self,
        version: i64,
        name: &str,
        direction: Direction,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Result<()> {
        let mut db = self.db()?;
        match direction {
            Direction::Up => {
                db.ledger.insert(
                    version,
                    LedgerEntry {
                        version,
                        migration_name: name.to_string(),
                        start_time,
                        end_time,
                        breakpoint: false,
                    },
                );
            }
            Direction::Down => {
                db.ledger.remove(&version);
            }
        }
        Ok(())
    }

    fn toggle_breakpoint(&mut self, version: i64) -> Result<()> {
        if let Some(entry) = self.db()?.ledger.get_mut(&version) {
            entry.breakpoint = !entry.breakpoint;
        }
        Ok(())
    }

    fn reset_all_breakpoints(&mut self) -> Result<usize> {
        let mut db = self.db()?;
        let mut cleared = 0;
        for entry in db.ledger.values_mut().filter(|e| e.breakpoint) {
            entry.breakpoint = false;
            cleared += 1;
        }
        Ok(cleared)
    }
}
