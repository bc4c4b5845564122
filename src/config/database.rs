use serde::{Deserialize, Serialize};

use crate::adapter::AdapterOptions;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Driver identity. Only the first dot-separated segment selects the
    /// adapter, so `Mysql.Pdo` resolves to `mysql`.
    #[serde(default = "default_driver")]
    pub driver: String,

    /// `host` or `host:port`.
    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub charset: String,

    #[serde(default)]
    pub user: String,

    #[serde(default, skip_serializing)]
    pub pass: String,

    #[serde(default)]
    pub engine: String,

    #[serde(default)]
    pub table_prefix: Option<String>,

    #[serde(default)]
    pub table_suffix: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            host: String::new(),
            name: String::new(),
            charset: String::new(),
            user: String::new(),
            pass: String::new(),
            engine: String::new(),
            table_prefix: None,
            table_suffix: None,
        }
    }
}

fn default_driver() -> String {
    "memory".to_string()
}

impl DatabaseConfig {
    pub fn driver_name(&self) -> String {
        self.driver
            .split('.')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }

    /// Splits `host:port`. A port that is not a number is left in the host.
    pub fn host_and_port(&self) -> (String, Option<u16>) {
        match self.host.rsplit_once(':') {
            Some((host, port)) => match port.parse::<u16>() {
                Ok(port) => (host.to_string(), Some(port)),
                Err(_) => (self.host.clone(), None),
            },
            None => (self.host.clone(), None),
        }
    }

    pub fn adapter_options(&self, migration_table: &str) -> AdapterOptions {
        let (host, port) = self.host_and_port();
        AdapterOptions {
            host,
            port,
            name: self.name.clone(),
            charset: self.charset.clone(),
            user: self.user.clone(),
            pass: self.pass.clone(),
            engine: self.engine.clone(),
            table_prefix: self.table_prefix.clone(),
            table_suffix: self.table_suffix.clone(),
            default_migration_table: migration_table.to_string(),
        }
    }
}
