//! # Terminal Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     HEARTH_DB_PATH=/srv/hearth/hearth.db                               │
//! │     HEARTH_OPERATOR="Ana Cruz"                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/hearth/hearth.toml (Linux)                               │
//! │     ~/Library/Application Support/com.hearth.terminal/hearth.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "Hearth Bakery"
//! currency_symbol = "₱"
//! operator = "Ana Cruz"
//!
//! [database]
//! path = "/srv/hearth/hearth.db"
//! max_connections = 4
//!
//! [persistence]
//! max_attempts = 5
//! base_backoff_ms = 200
//!
//! [reports]
//! history_limit = 50
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::store::StoreSettings;

const CONFIG_FILE: &str = "hearth.toml";
const DATABASE_FILE: &str = "hearth.db";

// =============================================================================
// Sections
// =============================================================================

/// Who the store is and how amounts are printed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSection {
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Printed in front of every amount in reports.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Operator signed in automatically by the CLI.
    #[serde(default)]
    pub operator: Option<String>,
}

fn default_store_name() -> String {
    "Hearth Bakery".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for StoreSection {
    fn default() -> Self {
        StoreSection {
            name: default_store_name(),
            currency_symbol: default_currency_symbol(),
            operator: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSection {
    /// Database file. Defaults to `hearth.db` in the platform data folder.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    4
}

impl Default for DatabaseSection {
    fn default() -> Self {
        DatabaseSection {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Retry behaviour for queued writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceSection {
    /// Flush attempts `flush_pending` makes before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First delay between attempts; doubles each time.
    #[serde(default = "default_base_backoff")]
    pub base_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_backoff() -> u64 {
    200
}

impl Default for PersistenceSection {
    fn default() -> Self {
        PersistenceSection {
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportsSection {
    /// How many archived reports `history` shows by default.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

fn default_history_limit() -> u32 {
    50
}

impl Default for ReportsSection {
    fn default() -> Self {
        ReportsSection {
            history_limit: default_history_limit(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub persistence: PersistenceSection,

    #[serde(default)]
    pub reports: ReportsSection,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (an explicit path must exist; the default one may not)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(&path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Invalid("store.name must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }
        if self.persistence.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "persistence.max_attempts must be greater than 0".into(),
            ));
        }
        if self.reports.history_limit == 0 {
            return Err(ConfigError::Invalid(
                "reports.history_limit must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Applies `HEARTH_*` overrides read through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("HEARTH_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(name) = var("HEARTH_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(symbol) = var("HEARTH_CURRENCY_SYMBOL") {
            self.store.currency_symbol = symbol;
        }

        if let Some(operator) = var("HEARTH_OPERATOR") {
            let operator = operator.trim().to_string();
            self.store.operator = (!operator.is_empty()).then_some(operator);
        }

        if let Some(attempts) = var("HEARTH_MAX_ATTEMPTS") {
            match attempts.parse::<u32>() {
                Ok(n) => self.persistence.max_attempts = n,
                Err(_) => warn!(value = %attempts, "Ignoring non-numeric HEARTH_MAX_ATTEMPTS"),
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "hearth", "terminal")
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The database file to open, creating the data folder when defaulted.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = Self::project_dirs().ok_or(ConfigError::NoProjectDirs)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join(DATABASE_FILE))
    }

    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            max_attempts: self.persistence.max_attempts,
            base_backoff: Duration::from_millis(self.persistence.base_backoff_ms),
        }
    }
}
