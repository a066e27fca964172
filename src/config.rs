//! Store connection settings.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `SYNAPSE_*` environment variables. Nothing here reads the environment on
//! its own behalf once a `StoreConfig` exists; stores receive the struct.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use validator::{Validate, ValidationError};

use crate::error::{AirQualityError, Result};
use crate::utils::constants::{DEFAULT_CONFIG_FILE, DEFAULT_TABLE, ENV_PREFIX};

#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct StoreConfig {
    /// Store endpoint address (for the embedded store: the directory holding it)
    #[serde(default)]
    pub server: Option<String>,

    /// Store name
    #[serde(default)]
    pub database: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Reading table name
    #[serde(default = "default_table")]
    #[validate(length(min = 1, max = 128), custom(function = "validate_table_name"))]
    pub table: String,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn validate_table_name(table: &str) -> std::result::Result<(), ValidationError> {
    if table
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        Err(ValidationError::new("table_name"))
    }
}

/// Fully populated settings, produced only by [`StoreConfig::require_credentials`].
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub server: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub table: String,
}

impl StoreConfig {
    pub fn new(
        server: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server: Some(server.into()),
            database: Some(database.into()),
            username: Some(username.into()),
            password: Some(password.into()),
            table: default_table(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Load settings from the config file (if present) and `SYNAPSE_*` variables.
    ///
    /// An explicitly given file must exist; the default `airquality.toml` is
    /// optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, ENV_PREFIX)
    }

    pub(crate) fn load_from(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let (file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let settings = config::Config::builder()
            .set_default("table", DEFAULT_TABLE)?
            .add_source(config::File::from(file.as_path()).required(required))
            .add_source(config::Environment::with_prefix(env_prefix))
            .build()?;

        Ok(settings.try_deserialize::<StoreConfig>()?)
    }

    /// Check that endpoint, store name and credential pair are all present.
    ///
    /// Missing values surface as `DataSourceUnavailable`, naming the
    /// environment variables that would supply them.
    pub fn require_credentials(&self) -> Result<ConnectionSettings> {
        let fields = [
            ("SERVER", &self.server),
            ("DATABASE", &self.database),
            ("USERNAME", &self.username),
            ("PASSWORD", &self.password),
        ];

        let missing: Vec<String> = fields
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(name, _)| format!("{}_{}", ENV_PREFIX, name))
            .collect();

        if !missing.is_empty() {
            return Err(AirQualityError::unavailable(format!(
                "credentials not configured (missing {})",
                missing.join(", ")
            )));
        }

        self.validate()?;

        let value = |field: &Option<String>| field.clone().unwrap_or_default().trim().to_string();
        Ok(ConnectionSettings {
            server: value(&self.server),
            database: value(&self.database),
            username: value(&self.username),
            password: value(&self.password),
            table: self.table.clone(),
        })
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("table", &self.table)
            .finish()
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_complete_config() {
        let config = StoreConfig::new("/var/lib/airq", "readings", "reader", "secret");
        let settings = config.require_credentials().unwrap();

        assert_eq!(settings.server, "/var/lib/airq");
        assert_eq!(settings.table, DEFAULT_TABLE);
    }

    #[test]
    fn test_missing_credentials_are_unavailable() {
        let config = StoreConfig {
            server: Some("/var/lib/airq".to_string()),
            database: Some("readings".to_string()),
            username: None,
            password: Some("   ".to_string()),
            table: default_table(),
        };

        let err = config.require_credentials().unwrap_err();
        assert!(err.is_recoverable());

        let message = err.to_string();
        assert!(message.contains("credentials not configured"));
        assert!(message.contains("SYNAPSE_USERNAME"));
        assert!(message.contains("SYNAPSE_PASSWORD"));
        assert!(!message.contains("SYNAPSE_SERVER"));
    }

    #[test]
    fn test_table_name_validation() {
        let config = StoreConfig::new("/tmp", "db", "u", "p").with_table("readings; DROP TABLE x");
        assert!(matches!(
            config.require_credentials(),
            Err(AirQualityError::Validation(_))
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = StoreConfig::new("/tmp", "db", "u", "hunter2");
        assert!(!format!("{:?}", config).contains("hunter2"));
        let settings = config.require_credentials().unwrap();
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "server = \"/data\"")?;
        writeln!(file, "database = \"air\"")?;
        writeln!(file, "username = \"reader\"")?;
        writeln!(file, "password = \"pw\"")?;

        let config = StoreConfig::load_from(Some(file.path()), "AIRQ_TEST_UNSET")?;

        assert_eq!(config.server.as_deref(), Some("/data"));
        assert_eq!(config.database.as_deref(), Some("air"));
        assert_eq!(config.table, DEFAULT_TABLE);
        assert!(config.require_credentials().is_ok());
        Ok(())
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = StoreConfig::load_from(
            Some(Path::new("/definitely/not/here/airquality.toml")),
            "AIRQ_TEST_UNSET",
        );
        assert!(matches!(result, Err(AirQualityError::Config(_))));
    }
}
