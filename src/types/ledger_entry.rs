use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row of the version ledger: a currently applied migration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub version: i64,
    pub migration_name: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub breakpoint: bool,
}

/// Applied migrations keyed by version, ascending.
pub type Ledger = BTreeMap<i64, LedgerEntry>;
