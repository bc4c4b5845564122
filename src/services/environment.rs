use serde::Serialize;
use tracing::{debug, warn};

use crate::adapter::factory::PREFIX_WRAPPER;
use crate::adapter::{Adapter, AdapterFactory, ExportingAdapter, RecordingAdapter};
use crate::config::{DatabaseConfig, Settings};
use crate::errors::MigrationResult;
use crate::migration::{Migration, MigrationKind, Operation, Schema, Seed};
use crate::types::{Direction, Ledger};
use crate::utils::{ExportKind, ExportSink, ledger_now};

/// Where the environment's adapter points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterInfo {
    pub driver: String,
    pub database: String,
    pub host: String,
    pub table_prefix: Option<String>,
    pub ledger_table: String,
}

/// Execution context of one database connection.
///
/// The adapter is built on first use and kept until [`Environment::reset`].
/// Every primitive statement run through it is offered to the export sink.
pub struct Environment {
    name: String,
    database: DatabaseConfig,
    schema_table: String,
    factory: AdapterFactory,
    adapter: Option<Box<dyn Adapter>>,
    export: ExportSink,
}

impl Environment {
    pub fn new(name: &str, settings: &Settings) -> Self {
        Self {
            name: name.to_string(),
            database: settings.database.clone(),
            schema_table: settings.migrations.table.clone(),
            factory: AdapterFactory::default(),
            adapter: None,
            export: ExportSink::new(settings.export.sink_options()),
        }
    }

    /// Uses `factory` to resolve drivers, e.g. one with extra drivers
    /// registered.
    pub fn with_factory(mut self, factory: AdapterFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_export(mut self, export: ExportSink) -> Self {
        self.export = export;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_table_name(&self) -> &str {
        &self.schema_table
    }

    /// Applies to adapters built after the call.
    pub fn set_schema_table_name(&mut self, table: &str) {
        self.schema_table = table.to_string();
    }

    /// Replaces the memoized adapter. The adapter is used as given, without
    /// the prefix wrapper.
    pub fn set_adapter(&mut self, adapter: Box<dyn Adapter>) {
        self.adapter = Some(adapter);
    }

    pub fn factory_mut(&mut self) -> &mut AdapterFactory {
        &mut self.factory
    }

    pub fn export(&self) -> &ExportSink {
        &self.export
    }

    pub fn adapter(&mut self) -> MigrationResult<&mut dyn Adapter> {
        resolve_adapter(
            &mut self.adapter,
            &self.factory,
            &self.database,
            &self.schema_table,
        )
    }

    /// Drops the memoized adapter and closes any open export step.
    pub fn reset(&mut self) {
        self.adapter = None;
        self.export.finish();
    }

    pub fn adapter_info(&mut self) -> MigrationResult<AdapterInfo> {
        let ledger_table = self.schema_table.clone();
        let adapter = self.adapter()?;
        let options = adapter.options();
        Ok(AdapterInfo {
            driver: adapter.adapter_name().to_string(),
            database: options.name.clone(),
            host: match options.port {
                Some(port) => format!("{}:{}", options.host, port),
                None => options.host.clone(),
            },
            table_prefix: options.table_prefix.clone().filter(|p| !p.is_empty()),
            ledger_table,
        })
    }

    pub fn version_log(&mut self) -> MigrationResult<Ledger> {
        Ok(self.adapter()?.version_log()?)
    }

    pub fn versions(&mut self) -> MigrationResult<Vec<i64>> {
        Ok(self.adapter()?.versions()?)
    }

    /// Most recently applied version, 0 when nothing is applied.
    pub fn current_version(&mut self) -> MigrationResult<i64> {
        Ok(self.versions()?.last().copied().unwrap_or(0))
    }

    /// Runs one migration in `direction` and records it in the ledger.
    ///
    /// A forward-only migration is reverted by recording its forward
    /// commands and executing their inverses newest first. On failure the
    /// transaction is rolled back and the ledger is left alone.
    pub fn execute_migration(
        &mut self,
        migration: &Migration,
        direction: Direction,
    ) -> MigrationResult<()> {
        let start_time = ledger_now();
        let raw = resolve_adapter(
            &mut self.adapter,
            &self.factory,
            &self.database,
            &self.schema_table,
        )?;
        if let Err(err) = self
            .export
            .begin(&format!("{}.sql", migration.name), direction.into())
        {
            self.export.finish();
            return Err(err.into());
        }

        let mut adapter = ExportingAdapter::new(raw, &mut self.export, &self.schema_table);

        let result = in_transaction(&mut adapter, |adapter| {
            run_migration(adapter, migration, direction)
        })
        .and_then(|()| {
            adapter.migrated(
                migration.version,
                &migration.name,
                direction,
                start_time,
                ledger_now(),
            )?;
            Ok(())
        });

        self.export.finish();
        result
    }

    /// Runs a seed. Seeds never touch the ledger and cannot be reverted.
    pub fn execute_seed(&mut self, seed: &Seed) -> MigrationResult<()> {
        let raw = resolve_adapter(
            &mut self.adapter,
            &self.factory,
            &self.database,
            &self.schema_table,
        )?;
        if let Err(err) = self
            .export
            .begin(&format!("{}.sql", seed.name), ExportKind::Seed)
        {
            self.export.finish();
            return Err(err.into());
        }

        let mut adapter = ExportingAdapter::new(raw, &mut self.export, &self.schema_table);

        let result = in_transaction(&mut adapter, |adapter| {
            run_operation(Some(&seed.run), adapter)
        });

        self.export.finish();
        result
    }
}

fn resolve_adapter<'a>(
    slot: &'a mut Option<Box<dyn Adapter>>,
    factory: &AdapterFactory,
    database: &DatabaseConfig,
    schema_table: &str,
) -> MigrationResult<&'a mut dyn Adapter> {
    let adapter = match slot.take() {
        Some(adapter) => adapter,
        None => {
            let options = database.adapter_options(schema_table);
            let driver = database.driver_name();
            debug!("Resolving adapter '{}' from '{}'", driver, database.driver);

            let adapter = factory.get_adapter(&driver, &options)?;
            if options.has_table_prefix() || options.has_table_suffix() {
                factory.get_wrapper(PREFIX_WRAPPER, adapter)?
            } else {
                adapter
            }
        }
    };
    Ok(&mut **slot.insert(adapter))
}

/// Wraps `body` in a transaction when the adapter supports them.
fn in_transaction<F>(adapter: &mut dyn Adapter, body: F) -> MigrationResult<()>
where
    F: FnOnce(&mut dyn Adapter) -> MigrationResult<()>,
{
    if !adapter.has_transactions() {
        return body(adapter);
    }

    adapter.begin_transaction()?;
    match body(&mut *adapter) {
        Ok(()) => {
            adapter.commit_transaction()?;
            Ok(())
        }
        Err(err) => {
            if let Err(rollback_err) = adapter.rollback_transaction() {
                warn!("Failed to roll back transaction: {:#}", rollback_err);
            }
            Err(err)
        }
    }
}

fn run_migration(
    adapter: &mut dyn Adapter,
    migration: &Migration,
    direction: Direction,
) -> MigrationResult<()> {
    match (&migration.kind, direction) {
        (MigrationKind::Change(change), Direction::Down) => {
            let mut recorder = RecordingAdapter::new(adapter);
            change(&mut Schema::new(&mut recorder))?;
            debug!(
                "Recorded {} commands for {}",
                recorder.commands().len(),
                migration.name
            );
            recorder.execute_inverted(&migration.name)
        }
        (MigrationKind::Change(change), Direction::Up) => run_operation(Some(change), adapter),
        (MigrationKind::Explicit { up, .. }, Direction::Up) => run_operation(up.as_ref(), adapter),
        (MigrationKind::Explicit { down, .. }, Direction::Down) => {
            run_operation(down.as_ref(), adapter)
        }
    }
}

fn run_operation(operation: Option<&Operation>, adapter: &mut dyn Adapter) -> MigrationResult<()> {
    if let Some(operation) = operation {
        operation(&mut Schema::new(adapter))?;
    }
    Ok(())
}
