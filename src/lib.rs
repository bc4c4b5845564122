//! Versioned schema migrations with a persisted ledger.
//!
//! A [`services::Manager`] plans migrate and rollback calls from the known
//! migration set and the ledger, and runs each step through an
//! [`services::Environment`], which owns the adapter for one database.

pub mod adapter;
pub mod config;
pub mod errors;
pub mod migration;
pub mod registry;
pub mod services;
pub mod types;
pub mod utils;

pub use errors::{MigrationError, MigrationResult};
