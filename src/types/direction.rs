use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Which way a migration runs.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Progressive verb used while the step runs.
    pub fn running_verb(&self) -> &'static str {
        match self {
            Direction::Up => "migrating",
            Direction::Down => "reverting",
        }
    }

    /// Past-tense verb used once the step is done.
    pub fn done_verb(&self) -> &'static str {
        match self {
            Direction::Up => "migrated",
            Direction::Down => "reverted",
        }
    }
}
