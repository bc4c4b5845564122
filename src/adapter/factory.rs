use std::collections::HashMap;

use anyhow::Result;
use tracing::debug;

use crate::adapter::{Adapter, AdapterOptions, MemoryAdapter, TablePrefixAdapter, memory};
use crate::errors::{MigrationError, MigrationResult};

pub type AdapterConstructor = Box<dyn Fn(&AdapterOptions) -> Result<Box<dyn Adapter>>>;
pub type WrapperConstructor = Box<dyn Fn(Box<dyn Adapter>) -> Box<dyn Adapter>>;

pub const PREFIX_WRAPPER: &str = "prefix";

/// Named driver constructors and adapter wrappers.
///
/// Fresh factories know the `memory` driver and the `prefix` wrapper; real
/// drivers are registered by the embedding application.
pub struct AdapterFactory {
    adapters: HashMap<String, AdapterConstructor>,
    wrappers: HashMap<String, WrapperConstructor>,
}

impl Default for AdapterFactory {
    fn default() -> Self {
        let mut factory = Self {
            adapters: HashMap::new(),
            wrappers: HashMap::new(),
        };
        factory.register_adapter(memory::MEMORY_ADAPTER, |options| {
            Ok(Box::new(MemoryAdapter::new(options.clone())))
        });
        factory.register_wrapper(PREFIX_WRAPPER, |adapter| {
            Box::new(TablePrefixAdapter::new(adapter))
        });
        factory
    }
}

impl AdapterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the constructor for `name`.
    pub fn register_adapter<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(&AdapterOptions) -> Result<Box<dyn Adapter>> + 'static,
    {
        self.adapters
            .insert(name.to_lowercase(), Box::new(constructor));
    }

    pub fn register_wrapper<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(Box<dyn Adapter>) -> Box<dyn Adapter> + 'static,
    {
        self.wrappers
            .insert(name.to_lowercase(), Box::new(constructor));
    }

    pub fn has_adapter(&self, name: &str) -> bool {
        self.adapters.contains_key(&name.to_lowercase())
    }

    pub fn get_adapter(
        &self,
        name: &str,
        options: &AdapterOptions,
    ) -> MigrationResult<Box<dyn Adapter>> {
        let constructor = self
            .adapters
            .get(&name.to_lowercase())
            .ok_or_else(|| MigrationError::UnknownAdapter(name.to_string()))?;
        debug!("Building '{}' adapter for database '{}'", name, options.name);
        Ok(constructor(options)?)
    }

    pub fn get_wrapper(
        &self,
        name: &str,
        adapter: Box<dyn Adapter>,
    ) -> MigrationResult<Box<dyn Adapter>> {
        let constructor = self
            .wrappers
            .get(&name.to_lowercase())
            .ok_or_else(|| MigrationError::UnknownWrapper(name.to_string()))?;
        Ok(constructor(adapter))
    }
}
