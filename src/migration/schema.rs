use anyhow::Result;

use crate::adapter::{Adapter, Column, Command, ForeignKey};

/// What a migration body sees: a thin builder over the bound adapter.
///
/// Every mutating call becomes one [`Command`], so the bound adapter may be
/// the real driver or a recorder without the body noticing.
pub struct Schema<'a> {
    adapter: &'a mut dyn Adapter,
}

impl<'a> Schema<'a> {
    pub fn new(adapter: &'a mut dyn Adapter) -> Self {
        Self { adapter }
    }

    pub fn adapter(&mut self) -> &mut dyn Adapter {
        &mut *self.adapter
    }

    pub fn create_table(&mut self, table: &str, columns: Vec<Column>) -> Result<()> {
        self.adapter.execute(&Command::CreateTable {
            table: table.to_string(),
            columns,
        })
    }

    pub fn drop_table(&mut self, table: &str) -> Result<()> {
        self.adapter.execute(&Command::DropTable {
            table: table.to_string(),
        })
    }

    pub fn rename_table(&mut self, from: &str, to: &str) -> Result<()> {
        self.adapter.execute(&Command::RenameTable {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    pub fn add_column(&mut self, table: &str, column: Column) -> Result<()> {
        self.adapter.execute(&Command::AddColumn {
            table: table.to_string(),
            column,
        })
    }

    pub fn remove_column(&mut self, table: &str, column: &str) -> Result<()> {
        self.adapter.execute(&Command::RemoveColumn {
            table: table.to_string(),
            column: column.to_string(),
        })
    }

    pub fn rename_column(&mut self, table: &str, from: &str, to: &str) -> Result<()> {
        self.adapter.execute(&Command::RenameColumn {
            table: table.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    pub fn change_column(&mut self, table: &str, column: &str, definition: Column) -> Result<()> {
        self.adapter.execute(&Command::ChangeColumn {
            table: table.to_string(),
            column: column.to_string(),
            definition,
        })
    }

    pub fn add_index(&mut self, table: &str, columns: &[&str], unique: bool) -> Result<()> {
        self.adapter.execute(&Command::AddIndex {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique,
        })
    }

    pub fn remove_index(&mut self, table: &str, columns: &[&str]) -> Result<()> {
        self.adapter.execute(&Command::DropIndex {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        })
    }

    pub fn add_foreign_key(&mut self, table: &str, foreign_key: ForeignKey) -> Result<()> {
        self.adapter.execute(&Command::AddForeignKey {
            table: table.to_string(),
            foreign_key,
        })
    }

    pub fn drop_foreign_key(&mut self, table: &str, columns: &[&str]) -> Result<()> {
        self.adapter.execute(&Command::DropForeignKey {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        })
    }

    /// Inserts one row of `(column, value)` pairs. Values are raw SQL literals.
    pub fn insert(&mut self, table: &str, row: &[(&str, &str)]) -> Result<()> {
        self.insert_rows(table, &[row])
    }

    pub fn insert_rows(&mut self, table: &str, rows: &[&[(&str, &str)]]) -> Result<()> {
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(column, value)| (column.to_string(), value.to_string()))
                    .collect()
            })
            .collect();
        self.adapter.execute(&Command::Insert {
            table: table.to_string(),
            rows,
        })
    }

    /// Raw statement. Never invertible.
    pub fn execute(&mut self, sql: &str) -> Result<()> {
        self.adapter.execute(&Command::Execute {
            sql: sql.to_string(),
        })
    }

    pub fn has_table(&mut self, table: &str) -> Result<bool> {
        self.adapter.has_table(table)
    }

    pub fn has_column(&mut self, table: &str, column: &str) -> Result<bool> {
        self.adapter.has_column(table, column)
    }
}
