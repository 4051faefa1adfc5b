//! Application settings loaded from `config.toml`.
//!
//! Every section is optional; a missing file yields the defaults so the binary can
//! start against a fresh checkout. `DATABASE_URL` in the environment (or `.env`)
//! always wins over `database.url`.

use crate::core::movement::NotificationPolicy;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default location of the settings file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Where the ledger lives
    #[serde(default)]
    pub database: DatabaseSettings,
    /// Money-movement behaviour
    #[serde(default)]
    pub workflow: WorkflowSettings,
    /// Bills to create on start-up if they are not present yet
    #[serde(default)]
    pub bills: Vec<BillSeed>,
}

/// `[database]` section
#[derive(Debug, Default, Deserialize)]
pub struct DatabaseSettings {
    /// SeaORM connection URL, overridden by `DATABASE_URL`
    pub url: Option<String>,
}

/// `[workflow]` section
#[derive(Debug, Default, Deserialize)]
pub struct WorkflowSettings {
    /// Whether a failed notification insert rolls back the movement
    #[serde(default)]
    pub notification_policy: NotificationPolicy,
}

/// A bill to seed, as written in `[[bills]]`
#[derive(Debug, Clone, Deserialize)]
pub struct BillSeed {
    /// Owner of the bill
    pub user_id: String,
    /// What the bill is for (e.g., "Electricity")
    pub bill_type: String,
    /// Amount due, as a decimal string (e.g., "500.00")
    pub amount: String,
    /// Due date in `YYYY-MM-DD` form
    pub due_date: chrono::NaiveDate,
}

impl AppConfig {
    /// The database URL after applying the environment override.
    #[must_use]
    pub fn database_url(&self) -> String {
        crate::config::database::get_database_url(self.database.url.as_deref())
    }
}

/// Loads the configuration from a TOML file.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type or an unknown notification policy
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads `config.toml` from the working directory, or defaults if it does not exist.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = Path::new(DEFAULT_CONFIG_PATH);
    if !path.exists() {
        warn!("{DEFAULT_CONFIG_PATH} not found, using default settings.");
        return Ok(AppConfig::default());
    }

    let config = load_config(path)?;
    info!(
        "Loaded configuration: notification policy {:?}, {} bill(s) to seed.",
        config.workflow.notification_policy,
        config.bills.len()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [database]
            url = "sqlite::memory:"

            [workflow]
            notification_policy = "best_effort"

            [[bills]]
            user_id = "user-1"
            bill_type = "Electricity"
            amount = "500.00"
            due_date = "2026-11-01"

            [[bills]]
            user_id = "user-1"
            bill_type = "Water"
            amount = "120.50"
            due_date = "2026-11-15"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database.url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(
            config.workflow.notification_policy,
            NotificationPolicy::BestEffort
        );
        assert_eq!(config.bills.len(), 2);
        assert_eq!(config.bills[0].bill_type, "Electricity");
        assert_eq!(config.bills[1].amount, "120.50");
        assert_eq!(
            config.bills[1].due_date,
            chrono::NaiveDate::from_ymd_opt(2026, 11, 15).unwrap()
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.database.url.is_none());
        assert_eq!(config.workflow.notification_policy, NotificationPolicy::Atomic);
        assert!(config.bills.is_empty());
    }

    #[test]
    fn test_unknown_notification_policy_is_rejected() {
        let result: std::result::Result<AppConfig, _> =
            toml::from_str("[workflow]\nnotification_policy = \"sometimes\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("does/not/exist.toml");
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }
}
