use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::utils::naming::{is_known_generator, DEFAULT_TABLENAME_GENERATOR};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Compiler configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Common physical base recorded on every generated model
    #[validate(length(min = 1, message = "Model base cannot be empty"))]
    pub model_base: String,

    /// Database schema qualifying table full names
    #[validate(length(min = 1, message = "Schema cannot be empty when set"))]
    pub schema: Option<String>,

    /// Add an integer primary key to concrete resources that declare none
    pub auto_primary_key: bool,

    /// Column name used by the primary-key configurator
    #[validate(length(min = 1, message = "Primary key column cannot be empty"))]
    pub primary_key_column: String,

    /// Name of the default table-name generator
    #[validate(custom(function = "validate_generator_name"))]
    pub tablename_generator: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            model_base: "Model".to_string(),
            schema: None,
            auto_primary_key: true,
            primary_key_column: "id".to_string(),
            tablename_generator: DEFAULT_TABLENAME_GENERATOR.to_string(),
        }
    }
}

fn validate_generator_name(name: &str) -> Result<(), ValidationError> {
    if is_known_generator(name) {
        Ok(())
    } else {
        let mut error = ValidationError::new("unknown_tablename_generator");
        error.message = Some(format!("Unknown table name generator '{}'", name).into());
        Err(error)
    }
}

impl CompilerConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            model_base: optional_env_var("EMBER_MODEL_BASE")?
                .unwrap_or_else(|| "Model".to_string()),
            schema: optional_env_var("EMBER_SCHEMA")?,
            auto_primary_key: parse_env_var("EMBER_AUTO_PRIMARY_KEY", "true")?,
            primary_key_column: optional_env_var("EMBER_PRIMARY_KEY_COLUMN")?
                .unwrap_or_else(|| "id".to_string()),
            tablename_generator: optional_env_var("EMBER_TABLENAME_GENERATOR")?
                .unwrap_or_else(|| DEFAULT_TABLENAME_GENERATOR.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from CLI arguments with validation
    pub fn from_cli(cli: CliConfig) -> Result<Self, ConfigError> {
        let config = Self {
            model_base: cli.model_base,
            schema: cli.schema,
            auto_primary_key: cli.auto_primary_key,
            primary_key_column: cli.primary_key_column,
            tablename_generator: cli.tablename_generator,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub model_base: String,
    pub schema: Option<String>,
    pub auto_primary_key: bool,
    pub primary_key_column: String,
    pub tablename_generator: String,
}

/// Read an environment variable; unset is `None`, non-UTF-8 is an error
fn optional_env_var(key: &str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::EnvVar(e)),
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = optional_env_var(key)?.unwrap_or_else(|| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
