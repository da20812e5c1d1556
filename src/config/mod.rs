use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::Deserialize;

fn default_max_connections() -> u32 {
    5
}

fn default_percentage_tolerance() -> f64 {
    0.01
}

fn default_display_currency() -> String {
    "USD".to_string()
}

fn default_cop_rate() -> f64 {
    4000.0
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    /// Allowed distance from 100 when summing milestone percentages
    #[serde(default = "default_percentage_tolerance")]
    pub percentage_tolerance: f64,

    /// Session display currency for dashboard figures (USD or COP)
    #[serde(default = "default_display_currency")]
    pub display_currency: String,

    /// COP per USD used by the display toggle
    #[serde(default = "default_cop_rate")]
    pub display_cop_rate: f64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables from a `.env` file are loaded first if the file exists.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>().context("reading configuration from environment")?;

        Ok(config)
    }

    /// Database URL, required by every command that touches storage
    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL is not set")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            db_max_connections: default_max_connections(),
            percentage_tolerance: default_percentage_tolerance(),
            display_currency: default_display_currency(),
            display_cop_rate: default_cop_rate(),
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_only_url_is_set() {
        let vars = vec![("DATABASE_URL".to_string(), "postgres://localhost/epc".to_string())];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.database_url().unwrap(), "postgres://localhost/epc");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.percentage_tolerance, 0.01);
        assert_eq!(config.display_currency, "USD");
        assert!(!config.log_json);
    }

    #[test]
    fn missing_url_is_reported_on_use() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert!(config.database_url().is_err());
    }
}
