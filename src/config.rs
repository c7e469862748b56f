use eyre::{Result, WrapErr};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "hbtracker.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database: DatabaseConfig,
    pub repl: ReplConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/hackbright".to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplConfig {
    pub prompt: String,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "HBA Database".to_owned(),
        }
    }
}

impl Config {
    pub fn load(file_name: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(file_name)
            .wrap_err_with(|| format!("cannot load configuration file {}", file_name.display()))?;
        toml::from_str(&content)
            .wrap_err_with(|| format!("cannot parse configuration file {}", file_name.display()))
    }

    /// Load the default configuration file if it exists, use the built-in
    /// defaults otherwise.
    pub fn load_default() -> Result<Config> {
        let file_name = Path::new(DEFAULT_CONFIG_FILE);
        if file_name.exists() {
            Self::load(file_name)
        } else {
            Ok(Config::default())
        }
    }
}
