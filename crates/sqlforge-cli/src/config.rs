//! Configuration for the sqlforge CLI
//!
//! Loads configuration from:
//! 1. sqlforge.yaml - target dialect and logging settings
//! 2. .env file - loaded into the process environment at startup
//!
//! Environment variables always override sqlforge.yaml values.

use serde::{Deserialize, Serialize};
use sqlforge_dialect::{DatabaseProduct, Dialect, DialectError, NullCollation, Version};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown dialect: {0}")]
    UnknownDialect(#[from] DialectError),
}

/// Target dialect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialectConfig {
    /// Database product: ansi, hive, spark, mysql, postgresql, bigquery
    pub product: String,

    /// Engine version, e.g. "2.1"
    #[serde(default)]
    pub version: Option<String>,

    /// Overrides the profile's null collation
    #[serde(default)]
    pub null_collation: Option<NullCollation>,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            product: "ansi".to_string(),
            version: None,
            null_collation: None,
        }
    }
}

impl DialectConfig {
    /// Builds the configured dialect profile.
    pub fn resolve(&self) -> Result<Dialect, ConfigError> {
        let product: DatabaseProduct = self.product.parse()?;
        let version = self.version.as_deref().map(str::parse::<Version>).transpose()?;
        let dialect = Dialect::for_product(product, version);

        Ok(match self.null_collation {
            Some(collation) => dialect.to_builder().null_collation(collation).build(),
            None => dialect,
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or module-specific
    pub level: String,

    /// Output format: pretty, json, compact
    pub format: String,

    /// Output destination: stderr, file, both
    pub output: String,

    /// Directory for log files
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
            output: "stderr".to_string(),
            directory: "./logs".to_string(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dialect: DialectConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from YAML file with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }
        let mut config = Config::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies overrides looked up by environment variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(product) = lookup("SQLFORGE_DIALECT") {
            self.dialect.product = product;
        }
        if let Some(version) = lookup("SQLFORGE_DIALECT_VERSION") {
            self.dialect.version = Some(version);
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(output) = lookup("LOG_OUTPUT") {
            self.logging.output = output;
        }
        if let Some(dir) = lookup("LOG_DIR") {
            self.logging.directory = dir;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlforge_dialect::Feature;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dialect.product, "ansi");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "compact");
        assert_eq!(config.logging.output, "stderr");
    }

    #[test]
    fn test_env_override() {
        let config_yaml = r#"
dialect:
  product: "mysql"
  version: "8.0"
logging:
  level: "info"
  format: "pretty"
  output: "stderr"
  directory: "./logs"
"#;
        let mut config: Config = serde_yaml::from_str(config_yaml).unwrap();
        let env: HashMap<&str, &str> = [("SQLFORGE_DIALECT", "hive"), ("SQLFORGE_DIALECT_VERSION", "2.0"), ("LOG_FORMAT", "json")]
            .into_iter()
            .collect();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.dialect.product, "hive"); // Overridden
        assert_eq!(config.dialect.version.as_deref(), Some("2.0")); // Overridden
        assert_eq!(config.logging.format, "json"); // Overridden
        assert_eq!(config.logging.level, "info");

        let dialect = config.dialect.resolve().unwrap();
        assert_eq!(dialect.product(), DatabaseProduct::Hive);
        assert!(!dialect.has(Feature::NativeNullsOrdering));
    }

    #[test]
    fn test_load_file() {
        let config_yaml = r#"
dialect:
  product: "postgresql"
  null_collation: "low"
"#;
        let temp_file = std::env::temp_dir().join("sqlforge_test_config.yaml");
        std::fs::write(&temp_file, config_yaml).unwrap();

        let config = Config::load(&temp_file).unwrap();
        assert_eq!(config.dialect.null_collation, Some(NullCollation::Low));

        std::fs::remove_file(temp_file).ok();
    }

    #[test]
    fn test_unknown_dialect() {
        let config = DialectConfig {
            product: "oracle".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.resolve(), Err(ConfigError::UnknownDialect(_))));

        let config = DialectConfig {
            product: "hive".to_string(),
            version: Some("two".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.resolve(), Err(ConfigError::UnknownDialect(_))));
    }
}
