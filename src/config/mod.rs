pub mod database;
pub mod export;
pub mod log;
pub mod migrations;
pub mod settings;

pub use database::DatabaseConfig;
pub use export::ExportConfig;
pub use log::LogConfig;
pub use migrations::MigrationsConfig;
pub use settings::Settings;
