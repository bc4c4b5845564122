use std::fs::{self, OpenOptions};
use std::io::{Result, Write};
use std::path::{Path, PathBuf};

use strum_macros::Display;

use crate::types::Direction;

/// Sub-directory an exported statement lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ExportKind {
    Up,
    Down,
    Seed,
}

impl From<Direction> for ExportKind {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => ExportKind::Up,
            Direction::Down => ExportKind::Down,
        }
    }
}

/// Statements touching these are bookkeeping, not schema changes.
const SKIPPED_MARKERS: [&str; 2] = ["information_schema", "show indexes from"];

/// Configuration options for the ExportSink.
#[derive(Debug, Clone)]
pub struct ExportSinkOptions {
    /// Root directory; statements go to `<dir>/<up|down|seed>/`.
    pub dir: PathBuf,
    /// When set, every step of the run appends to this one file name
    /// instead of one file per migration.
    pub merge: Option<String>,
}

/// Audit trail of executed statements, one per line.
///
/// A sink built without options is disabled and every call is a no-op.
#[derive(Debug, Default)]
pub struct ExportSink {
    options: Option<ExportSinkOptions>,
    current: Option<PathBuf>,
}

impl ExportSink {
    pub fn new(options: Option<ExportSinkOptions>) -> Self {
        Self {
            options,
            current: None,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.options.is_some()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.options.as_ref().map(|o| o.dir.as_path())
    }

    /// File currently receiving statements, if a step is open.
    pub fn current_file(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Opens the export file for one migration or seed step.
    ///
    /// Without merging the file is rewritten and starts with `#start`.
    pub fn begin(&mut self, file_name: &str, kind: ExportKind) -> Result<()> {
        let Some(opts) = self.options.as_ref() else {
            return Ok(());
        };

        let dir = opts.dir.join(kind.to_string());
        fs::create_dir_all(&dir)?;

        let path = match &opts.merge {
            Some(merged) => dir.join(merged),
            None => {
                let path = dir.join(file_name);
                fs::write(&path, "#start\n")?;
                path
            }
        };
        self.current = Some(path);
        Ok(())
    }

    /// Appends one statement terminated by a single `;`.
    ///
    /// Returns false when nothing was written: no open step, or the statement
    /// references the ledger table or schema introspection.
    pub fn write_statement(&mut self, sql: &str, ledger_table: &str) -> Result<bool> {
        let Some(path) = self.current.as_ref() else {
            return Ok(false);
        };

        let lowered = sql.to_lowercase();
        if lowered.contains(&ledger_table.to_lowercase())
            || SKIPPED_MARKERS.iter().any(|m| lowered.contains(m))
        {
            return Ok(false);
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(format!("{};\n", sql.trim_end_matches(';')).as_bytes())?;
        Ok(true)
    }

    /// Closes the current step.
    pub fn finish(&mut self) {
        self.current = None;
    }
}
