// Configuration validation

use crate::{ConfigError, Result};
use sieve_validation::ValidationSettings;

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl Validate for ValidationSettings {
    fn validate(&self) -> Result<()> {
        if !(400..=599).contains(&self.error_status) {
            return Err(ConfigError::invalid(
                "validation.error_status",
                format!("{} is not an HTTP error status", self.error_status),
            ));
        }
        Ok(())
    }
}
