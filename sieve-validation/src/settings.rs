// Validation settings

use serde::{Deserialize, Serialize};

/// What to do when a rule is attached to an already-resolved validator.
///
/// The rule is never evaluated either way; the resolved errors are frozen at
/// the first read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LateRulePolicy {
    /// Drop the rule silently
    Ignore,
    /// Drop the rule and log a warning
    #[default]
    Warn,
}

/// Tunables shared by every validator built from one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Handling of rules attached after resolution
    pub late_rules: LateRulePolicy,

    /// Status code of the default validation error response
    pub error_status: u16,

    /// Log conversion and deserialization failures at info level
    pub log_failures: bool,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            late_rules: LateRulePolicy::Warn,
            error_status: 400,
            log_failures: true,
        }
    }
}

impl ValidationSettings {
    /// Set the late-rule policy
    pub fn with_late_rules(mut self, policy: LateRulePolicy) -> Self {
        self.late_rules = policy;
        self
    }

    /// Set the default error response status
    pub fn with_error_status(mut self, status: u16) -> Self {
        self.error_status = status;
        self
    }

    /// Enable or disable failure logging
    pub fn with_log_failures(mut self, enabled: bool) -> Self {
        self.log_failures = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings: ValidationSettings =
            serde_json::from_value(serde_json::json!({"late_rules": "ignore"})).unwrap();

        assert_eq!(settings.late_rules, LateRulePolicy::Ignore);
        assert_eq!(settings.error_status, 400);
        assert!(settings.log_failures);
    }
}
