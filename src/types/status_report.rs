use std::fmt;

use chrono::NaiveDateTime;
use colored::*;
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use crate::types::{ExitStatus, MigrationStatus};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One line of the status report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusRow {
    pub status: MigrationStatus,
    pub version: i64,
    pub name: String,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub breakpoint: bool,
}

/// Join of the known migration set with the ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub rows: Vec<StatusRow>,
    pub exit: ExitStatus,
}

#[derive(Debug, Serialize)]
pub struct StructuredStatus {
    pub pending_count: usize,
    pub migrations: Vec<StructuredRow>,
}

#[derive(Debug, Serialize)]
pub struct StructuredRow {
    pub status: MigrationStatus,
    pub id: String,
    pub name: String,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "Status")]
    status: String,

    #[tabled(rename = "Migration ID")]
    id: String,

    #[tabled(rename = "Started")]
    started: String,

    #[tabled(rename = "Finished")]
    finished: String,

    #[tabled(rename = "Migration Name")]
    name: String,
}

fn format_time(time: Option<NaiveDateTime>) -> String {
    time.map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_default()
}

impl StatusReport {
    pub fn new(rows: Vec<StatusRow>) -> Self {
        let has_down = rows.iter().any(|r| r.status == MigrationStatus::Down);
        let has_missing = rows.iter().any(|r| r.status == MigrationStatus::Missing);
        Self {
            rows,
            exit: ExitStatus::from_flags(has_down, has_missing),
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.exit.code()
    }

    /// Number of known migrations not yet applied.
    pub fn down_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.status == MigrationStatus::Down)
            .count()
    }

    pub fn known(&self) -> impl Iterator<Item = &StatusRow> {
        self.rows
            .iter()
            .filter(|r| r.status != MigrationStatus::Missing)
    }

    pub fn missing(&self) -> impl Iterator<Item = &StatusRow> {
        self.rows
            .iter()
            .filter(|r| r.status == MigrationStatus::Missing)
    }

    /// Machine-readable view; only known migrations are listed and
    /// `pending_count` is the number of listed rows.
    pub fn to_structured(&self) -> StructuredStatus {
        let migrations: Vec<StructuredRow> = self
            .known()
            .map(|r| StructuredRow {
                status: r.status,
                id: format!("{:>14}", r.version),
                name: r.name.clone(),
            })
            .collect();
        StructuredStatus {
            pending_count: migrations.len(),
            migrations,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_structured())
    }

    pub fn render_table(&self) -> String {
        if self.known().next().is_none() {
            return format!(
                "There are no available migrations. Try creating one using the {} command.",
                "create".green()
            );
        }

        let rows: Vec<StatusTableRow> = self
            .rows
            .iter()
            .map(|r| {
                let mut name = r.name.cyan().to_string();
                if r.status == MigrationStatus::Missing {
                    name.push_str(&format!("  {}", "** MISSING **".red()));
                }
                if r.breakpoint {
                    name.push_str(&format!("\n{}", "BREAKPOINT SET".red()));
                }
                StatusTableRow {
                    status: r.status.to_colored_string(),
                    id: format!("{:>14}", r.version),
                    started: format_time(r.start_time),
                    finished: format_time(r.end_time),
                    name,
                }
            })
            .collect();

        Table::new(rows)
            .with(Style::psql())
            .with(Modify::new(Columns::first()).with(Alignment::right()))
            .to_string()
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.render_table())
    }
}
