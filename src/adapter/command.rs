use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ColumnType {
    Integer,
    BigInteger,
    String,
    Text,
    Boolean,
    Decimal,
    Float,
    Date,
    DateTime,
    Timestamp,
    Binary,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub default: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            default: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` {}", self.name, self.column_type)?;
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        if let Some(default) = &self.default {
            write!(f, " DEFAULT {}", default)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub constraint: Option<String>,
}

impl ForeignKey {
    pub fn new(
        columns: &[&str],
        referenced_table: impl Into<String>,
        referenced_columns: &[&str],
    ) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            referenced_table: referenced_table.into(),
            referenced_columns: referenced_columns.iter().map(|c| c.to_string()).collect(),
            constraint: None,
        }
    }

    pub fn named(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }
}

/// A primitive schema or data operation issued by a migration.
///
/// Every variant either knows its inverse statically or is irreversible; see
/// [`Command::inverse`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    CreateTable {
        table: String,
        columns: Vec<Column>,
    },
    DropTable {
        table: String,
    },
    RenameTable {
        from: String,
        to: String,
    },
    AddColumn {
        table: String,
        column: Column,
    },
    RemoveColumn {
        table: String,
        column: String,
    },
    RenameColumn {
        table: String,
        from: String,
        to: String,
    },
    ChangeColumn {
        table: String,
        column: String,
        definition: Column,
    },
    AddIndex {
        table: String,
        columns: Vec<String>,
        unique: bool,
    },
    DropIndex {
        table: String,
        columns: Vec<String>,
    },
    AddForeignKey {
        table: String,
        foreign_key: ForeignKey,
    },
    DropForeignKey {
        table: String,
        columns: Vec<String>,
    },
    Insert {
        table: String,
        rows: Vec<Vec<(String, String)>>,
    },
    Execute {
        sql: String,
    },
}

impl Command {
    /// Statically known inverse, or `None` when the command cannot be undone
    /// without information it does not carry.
    pub fn inverse(&self) -> Option<Command> {
        match self {
            Command::CreateTable { table, .. } => Some(Command::DropTable {
                table: table.clone(),
            }),
            Command::RenameTable { from, to } => Some(Command::RenameTable {
                from: to.clone(),
                to: from.clone(),
            }),
            Command::AddColumn { table, column } => Some(Command::RemoveColumn {
                table: table.clone(),
                column: column.name.clone(),
            }),
            Command::RenameColumn { table, from, to } => Some(Command::RenameColumn {
                table: table.clone(),
                from: to.clone(),
                to: from.clone(),
            }),
            Command::AddIndex { table, columns, .. } => Some(Command::DropIndex {
                table: table.clone(),
                columns: columns.clone(),
            }),
            Command::AddForeignKey { table, foreign_key } => Some(Command::DropForeignKey {
                table: table.clone(),
                columns: foreign_key.columns.clone(),
            }),
            Command::DropTable { .. }
            | Command::RemoveColumn { .. }
            | Command::ChangeColumn { .. }
            | Command::DropIndex { .. }
            | Command::DropForeignKey { .. }
            | Command::Insert { .. }
            | Command::Execute { .. } => None,
        }
    }

    /// Short operation name, as used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::CreateTable { .. } => "createTable",
            Command::DropTable { .. } => "dropTable",
            Command::RenameTable { .. } => "renameTable",
            Command::AddColumn { .. } => "addColumn",
            Command::RemoveColumn { .. } => "removeColumn",
            Command::RenameColumn { .. } => "renameColumn",
            Command::ChangeColumn { .. } => "changeColumn",
            Command::AddIndex { .. } => "addIndex",
            Command::DropIndex { .. } => "dropIndex",
            Command::AddForeignKey { .. } => "addForeignKey",
            Command::DropForeignKey { .. } => "dropForeignKey",
            Command::Insert { .. } => "insert",
            Command::Execute { .. } => "execute",
        }
    }

    /// Same command with every table name passed through `rename`.
    pub fn map_tables(&self, rename: impl Fn(&str) -> String) -> Command {
        let mut command = self.clone();
        match &mut command {
            Command::RenameTable { from, to } => {
                *from = rename(from);
                *to = rename(to);
            }
            Command::AddForeignKey { table, foreign_key } => {
                *table = rename(table);
                foreign_key.referenced_table = rename(&foreign_key.referenced_table);
            }
            Command::CreateTable { table, .. }
            | Command::DropTable { table }
            | Command::AddColumn { table, .. }
            | Command::RemoveColumn { table, .. }
            | Command::RenameColumn { table, .. }
            | Command::ChangeColumn { table, .. }
            | Command::AddIndex { table, .. }
            | Command::DropIndex { table, .. }
            | Command::DropForeignKey { table, .. }
            | Command::Insert { table, .. } => *table = rename(table),
            Command::Execute { .. } => {}
        }
        command
    }
}

fn quoted_list(names: &[String]) -> String {
    names.iter().map(|n| format!("`{}`", n)).join(", ")
}

/// Generic SQL rendering. Drivers are free to emit their own dialect; this
/// form is what the export sink records.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::CreateTable { table, columns } => write!(
                f,
                "CREATE TABLE `{}` ({})",
                table,
                columns.iter().map(|c| c.to_string()).join(", ")
            ),
            Command::DropTable { table } => write!(f, "DROP TABLE `{}`", table),
            Command::RenameTable { from, to } => {
                write!(f, "ALTER TABLE `{}` RENAME TO `{}`", from, to)
            }
            Command::AddColumn { table, column } => {
                write!(f, "ALTER TABLE `{}` ADD {}", table, column)
            }
            Command::RemoveColumn { table, column } => {
                write!(f, "ALTER TABLE `{}` DROP COLUMN `{}`", table, column)
            }
            Command::RenameColumn { table, from, to } => write!(
                f,
                "ALTER TABLE `{}` RENAME COLUMN `{}` TO `{}`",
                table, from, to
            ),
            Command::ChangeColumn {
                table,
                column,
                definition,
            } => write!(
                f,
                "ALTER TABLE `{}` CHANGE `{}` {}",
                table, column, definition
            ),
            Command::AddIndex {
                table,
                columns,
                unique,
            } => write!(
                f,
                "CREATE {}INDEX `idx_{}_{}` ON `{}` ({})",
                if *unique { "UNIQUE " } else { "" },
                table,
                columns.join("_"),
                table,
                quoted_list(columns)
            ),
            Command::DropIndex { table, columns } => write!(
                f,
                "DROP INDEX `idx_{}_{}` ON `{}`",
                table,
                columns.join("_"),
                table
            ),
            Command::AddForeignKey { table, foreign_key } => {
                write!(f, "ALTER TABLE `{}` ADD ", table)?;
                if let Some(constraint) = &foreign_key.constraint {
                    write!(f, "CONSTRAINT `{}` ", constraint)?;
                }
                write!(
                    f,
                    "FOREIGN KEY ({}) REFERENCES `{}` ({})",
                    quoted_list(&foreign_key.columns),
                    foreign_key.referenced_table,
                    quoted_list(&foreign_key.referenced_columns)
                )
            }
            Command::DropForeignKey { table, columns } => write!(
                f,
                "ALTER TABLE `{}` DROP FOREIGN KEY `fk_{}_{}`",
                table,
                table,
                columns.join("_")
            ),
            Command::Insert { table, rows } => {
                let columns: Vec<String> = rows
                    .first()
                    .map(|r| r.iter().map(|(c, _)| c.clone()).collect())
                    .unwrap_or_default();
                let values = rows
                    .iter()
                    .map(|r| format!("({})", r.iter().map(|(_, v)| v.as_str()).join(", ")))
                    .join(", ");
                write!(
                    f,
                    "INSERT INTO `{}` ({}) VALUES {}",
                    table,
                    quoted_list(&columns),
                    values
                )
            }
            Command::Execute { sql } => write!(f, "{}", sql),
        }
    }
}
