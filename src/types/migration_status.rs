use colored::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Status of a single row in the status report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MigrationStatus {
    /// Known and present in the ledger.
    Up,
    /// Known but not in the ledger.
    Down,
    /// In the ledger but no longer known.
    Missing,
}

impl MigrationStatus {
    pub fn to_colored_string(&self) -> String {
        match self {
            MigrationStatus::Up => "up".green().to_string(),
            MigrationStatus::Down => "down".red().to_string(),
            MigrationStatus::Missing => "up".red().to_string(),
        }
    }
}

/// Result code of a status call; missing dominates down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExitStatus {
    #[default]
    Ok,
    HasDown,
    HasMissing,
}

impl ExitStatus {
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Ok => 0,
            ExitStatus::HasDown => 1,
            ExitStatus::HasMissing => 2,
        }
    }

    pub fn from_flags(has_down: bool, has_missing: bool) -> Self {
        if has_missing {
            ExitStatus::HasMissing
        } else if has_down {
            ExitStatus::HasDown
        } else {
            ExitStatus::Ok
        }
    }
}
