//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `COFFEE__`-prefixed environment
//! variables (e.g. `COFFEE__SHOP__TIMEZONE=Europe/Rome`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

const DEFAULT_DATABASE_URL: &str = "sqlite:./coffee_loyalty.db?mode=rwc";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Shop {
    /// IANA timezone deciding the shop's calendar day.
    pub timezone: String,
    /// Flat delivery surcharge as a decimal string.
    pub delivery_fee: String,
}

impl Default for Shop {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            delivery_fee: "2.50".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Option<Database>,
    pub shop: Shop,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("COFFEE").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn database_url(&self) -> String {
        match &self.database {
            Some(Database::Memory) => String::from("sqlite::memory:"),
            Some(Database::Sqlite(path)) => format!("sqlite:{path}?mode=rwc"),
            None => DEFAULT_DATABASE_URL.to_string(),
        }
    }
}
