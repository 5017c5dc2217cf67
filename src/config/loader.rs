// src/config/loader.rs
//! Layered configuration loader
//!
//! Precedence, lowest first: built-in defaults (or a preset), system file,
//! user file, `config/default.toml`, `config/local.toml`, an explicit file,
//! then `FOCUS_EEG_<SECTION>_<KEY>` environment variables.

use crate::config::{constants::paths, SystemConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration validation errors:{}", format_violations(.0))]
    ValidationError(Vec<String>),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

fn format_violations(errors: &[String]) -> String {
    errors.iter().map(|e| format!("\n  {}", e)).collect()
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    explicit_path: Option<PathBuf>,
    base: SystemConfig,
    env_prefix: String,
    current_config: Option<SystemConfig>,
}

impl ConfigLoader {
    /// Loader over the standard search paths
    pub fn new() -> Self {
        Self::with_paths(Self::discover_config_paths())
    }

    /// Loader over custom optional paths
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            explicit_path: None,
            base: SystemConfig::default(),
            env_prefix: paths::ENV_PREFIX.to_string(),
            current_config: None,
        }
    }

    /// Highest-precedence file; unlike the search paths it must exist
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.explicit_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Start from a preset instead of the plain defaults
    pub fn with_base(mut self, base: SystemConfig) -> Self {
        self.base = base;
        self
    }

    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Merge every layer, deserialize and validate
    pub fn load_system_config(&mut self) -> Result<SystemConfig, ConfigError> {
        let config = self.load_and_merge_configs()?;
        config.validate().map_err(ConfigError::ValidationError)?;
        info!(
            preset = %config.synthesis.preset,
            backend = %config.camera.backend,
            sink = %config.telemetry.sink,
            "configuration loaded"
        );
        self.current_config = Some(config.clone());
        Ok(config)
    }

    /// Last successfully loaded configuration, or the base
    pub fn get_current_config(&self) -> SystemConfig {
        self.current_config.clone().unwrap_or_else(|| self.base.clone())
    }

    /// Check one file on top of the base, without environment overrides
    pub fn validate_config_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let mut merged = self.base_value()?;
        merge_toml_values(&mut merged, load_config_file(path)?);
        let config: SystemConfig = merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError(e.to_string()))?;
        config.validate().map_err(ConfigError::ValidationError)
    }

    /// Write the current configuration with key material redacted
    pub fn export_config<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let toml_content = toml::to_string_pretty(&self.get_current_config().redacted())
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    fn base_value(&self) -> Result<toml::Value, ConfigError> {
        toml::Value::try_from(&self.base).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn load_and_merge_configs(&self) -> Result<SystemConfig, ConfigError> {
        let mut merged = self.base_value()?;

        for path in &self.config_paths {
            if path.exists() {
                debug!(path = %path.display(), "merging config file");
                merge_toml_values(&mut merged, load_config_file(path)?);
            }
        }

        if let Some(path) = &self.explicit_path {
            debug!(path = %path.display(), "merging explicit config file");
            merge_toml_values(&mut merged, load_config_file(path)?);
        }

        self.apply_environment_overrides(&mut merged)?;

        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))
    }

    fn apply_environment_overrides(&self, config: &mut toml::Value) -> Result<(), ConfigError> {
        let mut overrides: Vec<(String, String)> = std::env::vars()
            .filter(|(key, _)| key.starts_with(&self.env_prefix))
            .collect();
        // Deterministic order when two variables name the same field
        overrides.sort();

        for (key, value) in overrides {
            let Some(rest) = key.strip_prefix(&self.env_prefix) else {
                continue;
            };
            let rest = rest.to_lowercase();
            let Some((section, field)) = rest.split_once('_') else {
                continue;
            };

            let toml::Value::Table(root) = config else {
                continue;
            };
            let section_value = root
                .entry(section.to_string())
                .or_insert_with(|| toml::Value::Table(toml::value::Table::new()));
            let toml::Value::Table(table) = section_value else {
                continue;
            };

            let parsed = coerce_env_value(table.get(field), &value)
                .map_err(|reason| ConfigError::ParseError(format!("{}: {}", key, reason)))?;
            debug!(variable = %key, "applying environment override");
            table.insert(field.to_string(), parsed);
        }
        Ok(())
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        let mut found = vec![PathBuf::from(paths::SYSTEM_CONFIG_PATH)];
        if let Some(home_dir) = dirs::home_dir() {
            found.push(home_dir.join(paths::USER_CONFIG_DIR).join("config.toml"));
        }
        found.push(PathBuf::from(paths::DEFAULT_CONFIG_FILE));
        found.push(PathBuf::from(paths::LOCAL_CONFIG_FILE));
        found
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn load_config_file<P: AsRef<Path>>(path: P) -> Result<toml::Value, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(base_value) => merge_toml_values(base_value, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base_value, overlay_value) => *base_value = overlay_value,
    }
}

/// Parse an environment value as the type already configured for the field.
/// Unknown fields fall back to integer, float, bool, then string.
fn coerce_env_value(existing: Option<&toml::Value>, raw: &str) -> Result<toml::Value, String> {
    let raw = raw.trim();
    match existing {
        Some(toml::Value::String(_)) => Ok(toml::Value::String(raw.to_string())),
        Some(toml::Value::Integer(_)) => raw
            .parse::<i64>()
            .map(toml::Value::Integer)
            .map_err(|_| format!("expected an integer, got '{}'", raw)),
        Some(toml::Value::Float(_)) => raw
            .parse::<f64>()
            .map(toml::Value::Float)
            .map_err(|_| format!("expected a number, got '{}'", raw)),
        Some(toml::Value::Boolean(_)) => raw
            .parse::<bool>()
            .map(toml::Value::Boolean)
            .map_err(|_| format!("expected true or false, got '{}'", raw)),
        Some(_) => Err("only scalar fields can be overridden".to_string()),
        None => Ok(if let Ok(v) = raw.parse::<i64>() {
            toml::Value::Integer(v)
        } else if let Ok(v) = raw.parse::<f64>() {
            toml::Value::Float(v)
        } else if let Ok(v) = raw.parse::<bool>() {
            toml::Value::Boolean(v)
        } else {
            toml::Value::String(raw.to_string())
        }),
    }
}

mod dirs {
    use std::path::PathBuf;

    pub fn home_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var_os("USERPROFILE").map(PathBuf::from)
        }
        #[cfg(not(target_os = "windows"))]
        {
            std::env::var_os("HOME").map(PathBuf::from)
        }
    }
}
