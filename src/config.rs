use crate::error::{EtlError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const INPUT_ENV: &str = "TITANIC_ETL_INPUT";
pub const DATABASE_ENV: &str = "TITANIC_ETL_DATABASE";
pub const METRICS_FILE_ENV: &str = "TITANIC_ETL_METRICS_FILE";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub database: DatabaseConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Where to write a Prometheus text snapshot after the run
    pub textfile: Option<PathBuf>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data").join("Titanic.csv"),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("etl.db"),
        }
    }
}

impl Config {
    /// Load configuration from defaults, an optional TOML file and the environment.
    ///
    /// With `path == None` the default `config.toml` is read only if it exists; an
    /// explicitly requested file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override fields from environment lookups; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get(INPUT_ENV) {
            self.input.path = PathBuf::from(v);
        }
        if let Some(v) = get(DATABASE_ENV) {
            self.database.path = PathBuf::from(v);
        }
        if let Some(v) = get(METRICS_FILE_ENV) {
            self.metrics.textfile = Some(PathBuf::from(v));
        }
    }
}
