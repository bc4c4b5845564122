use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error(
        "Invalid migration identifier '{0}': expected 'YYYYMMDDHHMMSS_snake_case_name'"
    )]
    InvalidIdentifier(String),

    #[error("Duplicate migration - '{identifier}' has the same version as '{existing}'")]
    DuplicateVersion {
        version: i64,
        identifier: String,
        existing: String,
    },

    #[error("Migration '{identifier}' has the same name '{name}' as '{existing}'")]
    DuplicateName {
        name: String,
        identifier: String,
        existing: String,
    },

    #[error("Invalid seed name '{0}': seed names must be CamelCase")]
    InvalidSeedName(String),

    #[error("Seed '{0}' is registered more than once")]
    DuplicateSeed(String),

    #[error("The seed '{0}' does not exist")]
    SeedNotFound(String),

    #[error("Migration '{migration}' is irreversible: '{command}' has no inverse")]
    IrreversibleOperation { migration: String, command: String },

    #[error("Unknown adapter '{0}'")]
    UnknownAdapter(String),

    #[error("Unknown adapter wrapper '{0}'")]
    UnknownWrapper(String),

    #[error("Failed to write export file: {0}")]
    Export(#[from] std::io::Error),

    #[error(transparent)]
    Adapter(#[from] anyhow::Error),
}

pub type MigrationResult<T> = Result<T, MigrationError>;
