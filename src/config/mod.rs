/// Database connection and schema management
pub mod database;

/// Application settings loaded from config.toml
pub mod settings;

pub use settings::{AppConfig, BillSeed, load_app_configuration, load_config};
