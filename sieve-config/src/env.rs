// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Environment variable loader.
///
/// Variable names are lowercased and a double underscore becomes a dot, so
/// `APP_VALIDATION__ERROR_STATUS` with prefix `APP` loads as
/// `validation.error_status`.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load all matching environment variables
    pub fn load(&self) -> Result<HashMap<String, String>> {
        Ok(self.collect(env::vars()))
    }

    fn collect(&self, vars: impl IntoIterator<Item = (String, String)>) -> HashMap<String, String> {
        vars.into_iter()
            .filter_map(|(key, value)| {
                let key = match &self.prefix {
                    Some(prefix) => key.strip_prefix(prefix.as_str())?.strip_prefix('_')?,
                    None => key.as_str(),
                };
                Some((config_key(key), value))
            })
            .collect()
    }

    /// Load a specific environment variable; `key` may use dots
    pub fn load_var(&self, key: &str) -> Result<String> {
        let name = key.replace('.', "__").to_uppercase();
        let full_key = match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, name),
            None => name,
        };

        env::var(&full_key).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

fn config_key(name: &str) -> String {
    name.to_lowercase().replace("__", ".")
}
