//! Loads migration and seed descriptors from a pluggable source and indexes
//! them by version.

use std::collections::BTreeMap;

use tracing::debug;

use crate::errors::{MigrationError, MigrationResult};
use crate::migration::{Migration, Seed};

/// Where migration descriptors come from (a directory scan, a static list
/// compiled into the binary, a test fixture).
pub trait MigrationSource {
    fn migrations(&self) -> MigrationResult<Vec<Migration>>;

    fn seeds(&self) -> MigrationResult<Vec<Seed>> {
        Ok(Vec::new())
    }
}

/// A source backed by descriptors built in code.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    migrations: Vec<Migration>,
    seeds: Vec<Seed>,
}

impl StaticSource {
    pub fn new(migrations: Vec<Migration>) -> Self {
        Self {
            migrations,
            seeds: Vec::new(),
        }
    }

    pub fn with_seeds(mut self, seeds: Vec<Seed>) -> Self {
        self.seeds = seeds;
        self
    }
}

impl MigrationSource for StaticSource {
    fn migrations(&self) -> MigrationResult<Vec<Migration>> {
        Ok(self.migrations.clone())
    }

    fn seeds(&self) -> MigrationResult<Vec<Seed>> {
        Ok(self.seeds.clone())
    }
}

/// Migrations keyed by version, seeds keyed by name. Both load on first use
/// and stay cached until replaced.
pub struct MigrationRegistry {
    source: Box<dyn MigrationSource>,
    migrations: Option<BTreeMap<i64, Migration>>,
    seeds: Option<BTreeMap<String, Seed>>,
}

impl MigrationRegistry {
    pub fn new(source: Box<dyn MigrationSource>) -> Self {
        Self {
            source,
            migrations: None,
            seeds: None,
        }
    }

    pub fn migrations(&mut self) -> MigrationResult<&BTreeMap<i64, Migration>> {
        if self.migrations.is_none() {
            let loaded = index_migrations(self.source.migrations()?)?;
            debug!("Loaded {} migrations", loaded.len());
            self.migrations = Some(loaded);
        }
        Ok(self.migrations.get_or_insert_with(BTreeMap::new))
    }

    pub fn seeds(&mut self) -> MigrationResult<&BTreeMap<String, Seed>> {
        if self.seeds.is_none() {
            let loaded = index_seeds(self.source.seeds()?)?;
            debug!("Loaded {} seeds", loaded.len());
            self.seeds = Some(loaded);
        }
        Ok(self.seeds.get_or_insert_with(BTreeMap::new))
    }

    /// Replaces the loaded set, bypassing the source.
    pub fn set_migrations(&mut self, migrations: Vec<Migration>) -> MigrationResult<()> {
        self.migrations = Some(index_migrations(migrations)?);
        Ok(())
    }

    pub fn set_seeds(&mut self, seeds: Vec<Seed>) -> MigrationResult<()> {
        self.seeds = Some(index_seeds(seeds)?);
        Ok(())
    }

    /// Drops both caches; the next access reloads from the source.
    pub fn invalidate(&mut self) {
        self.migrations = None;
        self.seeds = None;
    }
}

fn index_migrations(migrations: Vec<Migration>) -> MigrationResult<BTreeMap<i64, Migration>> {
    let mut by_version: BTreeMap<i64, Migration> = BTreeMap::new();
    let mut names: BTreeMap<String, String> = BTreeMap::new();

    for migration in migrations {
        if let Some(existing) = by_version.get(&migration.version) {
            return Err(MigrationError::DuplicateVersion {
                version: migration.version,
                identifier: migration.identifier.clone(),
                existing: existing.identifier.clone(),
            });
        }
        if let Some(existing) = names.get(&migration.name) {
            return Err(MigrationError::DuplicateName {
                name: migration.name.clone(),
                identifier: migration.identifier.clone(),
                existing: existing.clone(),
            });
        }
        names.insert(migration.name.clone(), migration.identifier.clone());
        by_version.insert(migration.version, migration);
    }

    Ok(by_version)
}

fn index_seeds(seeds: Vec<Seed>) -> MigrationResult<BTreeMap<String, Seed>> {
    let mut by_name = BTreeMap::new();
    for seed in seeds {
        if by_name.contains_key(&seed.name) {
            return Err(MigrationError::DuplicateSeed(seed.name));
        }
        by_name.insert(seed.name.clone(), seed);
    }
    Ok(by_name)
}
