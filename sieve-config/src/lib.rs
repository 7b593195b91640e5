//! Configuration management for Sieve
//!
//! Loads key/value configuration from environment variables, `.env` files and
//! JSON / TOML files, derives [`ValidationSettings`] from it, and runs the
//! startup sequence that freezes a [`Validation`](sieve_validation::Validation).
//!
//! ```
//! use sieve_config::{ConfigManager, FileFormat};
//! use sieve_validation::LateRulePolicy;
//!
//! let config = ConfigManager::new();
//! config
//!     .load_str("[validation]\nlate_rules = \"ignore\"", FileFormat::Toml)
//!     .unwrap();
//! config.set("validation.error_status", 422).unwrap();
//!
//! let settings = config.validation_settings().unwrap();
//! assert_eq!(settings.late_rules, LateRulePolicy::Ignore);
//! assert_eq!(settings.error_status, 422);
//! ```

pub mod app;
pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use app::AppConfig;
pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::Validate;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sieve_validation::{LateRulePolicy, ValidationSettings};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Main configuration manager
#[derive(Clone)]
pub struct ConfigManager {
    config: Arc<RwLock<HashMap<String, Value>>>,
    env_prefix: Option<String>,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(HashMap::new())),
            env_prefix: None,
        }
    }

    /// Create with environment variable prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            config: Arc::new(RwLock::new(HashMap::new())),
            env_prefix: Some(prefix.into()),
        }
    }

    /// Load configuration from environment variables
    pub fn load_env(&self) -> Result<()> {
        let loader = EnvLoader::new(self.env_prefix.clone());
        let env_vars = loader.load()?;

        let mut config = self.config.write();
        for (key, value) in env_vars {
            config.insert(key, Value::String(value));
        }

        Ok(())
    }

    /// Load configuration from .env file
    pub fn load_dotenv(&self, path: Option<&str>) -> Result<()> {
        if let Some(path) = path {
            dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
        } else if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(error = %err, "No .env file loaded");
        }
        self.load_env()
    }

    /// Load configuration from file, detecting the format from its extension
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = ConfigLoader::auto(path.as_ref())?.load_file(path)?;
        self.insert_object(data);
        Ok(())
    }

    /// Load configuration from a string in the given format
    pub fn load_str(&self, content: &str, format: FileFormat) -> Result<()> {
        let data = ConfigLoader::new(format).parse(content)?;
        self.insert_object(data);
        Ok(())
    }

    fn insert_object(&self, data: Value) {
        if let Value::Object(map) = data {
            let mut config = self.config.write();
            for (key, value) in map {
                config.insert(key, value);
            }
        }
    }

    /// Set a configuration value
    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;

        self.config.write().insert(key.to_string(), json_value);

        Ok(())
    }

    /// Get a configuration value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let config = self.config.read();

        let value = config
            .get(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        serde_json::from_value(value.clone())
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Get a value that may have been loaded as text.
    ///
    /// Environment variables and `.env` files only produce strings, so a
    /// string value that does not deserialize directly is parsed as a JSON
    /// scalar (`"422"` becomes `422`, `"false"` becomes `false`). A missing
    /// key is `Ok(None)`.
    pub fn get_coerced<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let config = self.config.read();
        let Some(value) = config.get(key) else {
            return Ok(None);
        };

        match serde_json::from_value(value.clone()) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(err) => match value {
                Value::String(text) => serde_json::from_str(text)
                    .map(Some)
                    .map_err(|_| ConfigError::invalid(key, err.to_string())),
                _ => Err(ConfigError::invalid(key, err.to_string())),
            },
        }
    }

    /// Get a string value
    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)
    }

    /// Get a boolean value
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get(key)
    }

    /// Check if a key exists
    pub fn has(&self, key: &str) -> bool {
        self.config.read().contains_key(key)
    }

    /// Get all configuration keys
    pub fn keys(&self) -> Vec<String> {
        self.config.read().keys().cloned().collect()
    }

    /// Merge configuration from another manager
    pub fn merge(&self, other: &ConfigManager) {
        if Arc::ptr_eq(&self.config, &other.config) {
            return;
        }
        let other_config = other.config.read();
        let mut config = self.config.write();

        for (key, value) in other_config.iter() {
            config.insert(key.clone(), value.clone());
        }
    }

    /// Validation settings from the `validation` table and the
    /// `validation.*` keys, which take precedence.
    ///
    /// Missing keys keep their defaults; the result is validated.
    pub fn validation_settings(&self) -> Result<ValidationSettings> {
        let mut settings = match self.get_coerced::<ValidationSettings>("validation")? {
            Some(settings) => settings,
            None => ValidationSettings::default(),
        };

        if let Some(policy) = self.get_coerced::<LateRulePolicy>("validation.late_rules")? {
            settings.late_rules = policy;
        }
        if let Some(status) = self.get_coerced::<u16>("validation.error_status")? {
            settings.error_status = status;
        }
        if let Some(enabled) = self.get_coerced::<bool>("validation.log_failures")? {
            settings.log_failures = enabled;
        }

        settings.validate()?;
        tracing::debug!(?settings, "Loaded validation settings");
        Ok(settings)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let manager = ConfigManager::new();
        manager.set("test_key", "test_value").unwrap();

        let value: String = manager.get("test_key").unwrap();
        assert_eq!(value, "test_value");
        assert!(matches!(
            manager.get::<String>("missing"),
            Err(ConfigError::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_get_or_default() {
        let manager = ConfigManager::new();

        let value: String = manager.get_or("missing_key", "default_value".to_string());
        assert_eq!(value, "default_value");
    }

    #[test]
    fn test_has_key() {
        let manager = ConfigManager::new();
        manager.set("existing_key", "value").unwrap();

        assert!(manager.has("existing_key"));
        assert!(!manager.has("missing_key"));
    }

    #[test]
    fn test_get_coerced_parses_text() {
        let manager = ConfigManager::new();
        manager.set("port", "8080").unwrap();
        manager.set("debug", "true").unwrap();
        manager.set("name", "api").unwrap();

        assert_eq!(manager.get_coerced::<u16>("port").unwrap(), Some(8080));
        assert_eq!(manager.get_coerced::<bool>("debug").unwrap(), Some(true));
        assert_eq!(
            manager.get_coerced::<String>("name").unwrap(),
            Some("api".to_string())
        );
        assert_eq!(manager.get_coerced::<u16>("missing").unwrap(), None);
        assert!(matches!(
            manager.get_coerced::<u16>("name"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_default_validation_settings() {
        let settings = ConfigManager::new().validation_settings().unwrap();
        assert_eq!(settings, ValidationSettings::default());
    }

    #[test]
    fn test_validation_settings_from_text_values() {
        let manager = ConfigManager::new();
        manager
            .load_str(
                "VALIDATION__ERROR_STATUS=422\nVALIDATION__LOG_FAILURES=false",
                FileFormat::Env,
            )
            .unwrap();

        let settings = manager.validation_settings().unwrap();
        assert_eq!(settings.error_status, 422);
        assert!(!settings.log_failures);
        assert_eq!(settings.late_rules, LateRulePolicy::Warn);
    }

    #[test]
    fn test_dotted_keys_override_table() {
        let manager = ConfigManager::new();
        manager
            .load_str(
                r#"{"validation": {"error_status": 409, "late_rules": "ignore"}}"#,
                FileFormat::Json,
            )
            .unwrap();
        manager.set("validation.error_status", 422).unwrap();

        let settings = manager.validation_settings().unwrap();
        assert_eq!(settings.error_status, 422);
        assert_eq!(settings.late_rules, LateRulePolicy::Ignore);
    }

    #[test]
    fn test_invalid_validation_settings() {
        let manager = ConfigManager::new();
        manager.set("validation.error_status", 200).unwrap();
        assert!(manager.validation_settings().is_err());

        let manager = ConfigManager::new();
        manager.set("validation.late_rules", "panic").unwrap();
        assert!(matches!(
            manager.validation_settings(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_merge() {
        let base = ConfigManager::new();
        base.set("a", 1).unwrap();
        let overrides = ConfigManager::new();
        overrides.set("a", 2).unwrap();
        overrides.set("b", 3).unwrap();

        base.merge(&overrides);
        base.merge(&base.clone());
        assert_eq!(base.get::<i64>("a").unwrap(), 2);
        assert_eq!(base.keys().len(), 2);
    }
}
