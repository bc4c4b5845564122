use std::fmt;

use tokio::sync::mpsc;

use crate::types::Direction;

/// Human-readable progress of a run, one event per line of output.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Migrating {
        version: i64,
        name: String,
        direction: Direction,
    },
    Migrated {
        version: i64,
        name: String,
        direction: Direction,
        elapsed: String,
    },
    Seeding {
        name: String,
    },
    Seeded {
        name: String,
        elapsed: String,
    },
    Warning(String),
    Notice(String),
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Migrating {
                version,
                name,
                direction,
            } => write!(f, " == {} {}: {}", version, name, direction.running_verb()),
            ProgressEvent::Migrated {
                version,
                name,
                direction,
                elapsed,
            } => write!(
                f,
                " == {} {}: {} {}",
                version,
                name,
                direction.done_verb(),
                elapsed
            ),
            ProgressEvent::Seeding { name } => write!(f, " == {}: seeding", name),
            ProgressEvent::Seeded { name, elapsed } => {
                write!(f, " == {}: seeded {}", name, elapsed)
            }
            ProgressEvent::Warning(message) => write!(f, "warning {}", message),
            ProgressEvent::Notice(message) => write!(f, "{}", message),
        }
    }
}

/// Optional sink for [`ProgressEvent`]s. Without a channel every report is
/// dropped; a closed receiver is ignored.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter(Option<mpsc::UnboundedSender<ProgressEvent>>);

impl ProgressReporter {
    pub fn new(tx: Option<mpsc::UnboundedSender<ProgressEvent>>) -> Self {
        Self(tx)
    }

    pub fn report(&self, event: ProgressEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }
}
