use chrono::{NaiveDateTime, Timelike};

use crate::errors::{MigrationError, MigrationResult};

const VERSION_FORMAT: &str = "%Y%m%d%H%M%S";
const VERSION_LEN: usize = 14;

/// Version and code name parsed from `YYYYMMDDHHMMSS_snake_case_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationIdentifier {
    pub version: i64,
    pub name: String,
}

impl MigrationIdentifier {
    pub fn parse(identifier: &str) -> MigrationResult<Self> {
        let invalid = || MigrationError::InvalidIdentifier(identifier.to_string());

        let (stamp, rest) = identifier.split_once('_').ok_or_else(invalid)?;
        if stamp.len() != VERSION_LEN || !stamp.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        NaiveDateTime::parse_from_str(stamp, VERSION_FORMAT).map_err(|_| invalid())?;

        if !is_snake_case(rest) {
            return Err(invalid());
        }

        let version = stamp.parse::<i64>().map_err(|_| invalid())?;
        Ok(Self {
            version,
            name: snake_to_camel(rest),
        })
    }
}

fn is_snake_case(s: &str) -> bool {
    !s.is_empty()
        && s.split('_').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

/// `create_users_table` -> `CreateUsersTable`.
pub fn snake_to_camel(s: &str) -> String {
    s.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Seed names are CamelCase words: `UserSeeder`, `Posts2Seeder`.
pub fn is_valid_seed_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {}
        _ => return false,
    }
    name.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Version a migration created at `datetime` would carry. Seconds precision.
pub fn version_from_datetime(datetime: NaiveDateTime) -> i64 {
    let truncated = datetime.with_nanosecond(0).unwrap_or(datetime);
    truncated
        .format(VERSION_FORMAT)
        .to_string()
        .parse()
        .unwrap_or_default()
}
