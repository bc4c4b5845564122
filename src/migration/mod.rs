//! Migration and seed descriptors, and the [`Schema`] facade their operations
//! run against.

pub mod identifier;
pub mod schema;

use std::fmt;
use std::sync::Arc;

use crate::errors::{MigrationError, MigrationResult};

pub use identifier::{MigrationIdentifier, is_valid_seed_name, snake_to_camel, version_from_datetime};
pub use schema::Schema;

/// A migration or seed body.
pub type Operation = Arc<dyn Fn(&mut Schema<'_>) -> anyhow::Result<()> + Send + Sync>;

/// How a migration is executed, chosen when the descriptor is built.
#[derive(Clone)]
pub enum MigrationKind {
    /// A single forward operation; reverted by recording and inverting it.
    Change(Operation),
    /// An explicit pair. A missing side is a no-op.
    Explicit {
        up: Option<Operation>,
        down: Option<Operation>,
    },
}

impl fmt::Debug for MigrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationKind::Change(_) => write!(f, "Change"),
            MigrationKind::Explicit { up, down } => f
                .debug_struct("Explicit")
                .field("up", &up.is_some())
                .field("down", &down.is_some())
                .finish(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Migration {
    pub version: i64,
    pub name: String,
    pub identifier: String,
    pub kind: MigrationKind,
}

impl Migration {
    fn build(identifier: &str, kind: MigrationKind) -> MigrationResult<Self> {
        let parsed = MigrationIdentifier::parse(identifier)?;
        Ok(Self {
            version: parsed.version,
            name: parsed.name,
            identifier: identifier.to_string(),
            kind,
        })
    }

    /// A forward-only migration, e.g. `20230101000000_create_users`.
    pub fn change<F>(identifier: &str, change: F) -> MigrationResult<Self>
    where
        F: Fn(&mut Schema<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::build(identifier, MigrationKind::Change(Arc::new(change)))
    }

    pub fn reversible<U, D>(identifier: &str, up: U, down: D) -> MigrationResult<Self>
    where
        U: Fn(&mut Schema<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
        D: Fn(&mut Schema<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::build(
            identifier,
            MigrationKind::Explicit {
                up: Some(Arc::new(up)),
                down: Some(Arc::new(down)),
            },
        )
    }

    /// A migration with nothing to execute. Applying or reverting it only
    /// touches the ledger.
    pub fn empty(identifier: &str) -> MigrationResult<Self> {
        Self::build(
            identifier,
            MigrationKind::Explicit {
                up: None,
                down: None,
            },
        )
    }

    pub fn is_change(&self) -> bool {
        matches!(self.kind, MigrationKind::Change(_))
    }
}

#[derive(Clone)]
pub struct Seed {
    pub name: String,
    pub run: Operation,
}

impl Seed {
    pub fn new<F>(name: &str, run: F) -> MigrationResult<Self>
    where
        F: Fn(&mut Schema<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        if !is_valid_seed_name(name) {
            return Err(MigrationError::InvalidSeedName(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            run: Arc::new(run),
        })
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed").field("name", &self.name).finish()
    }
}
