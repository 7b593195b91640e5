// Validation rules

use crate::{ValidationEngine, ValidationError};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Predicate over a possibly-null typed value.
pub type Predicate<T> = Arc<dyn Fn(Option<&T>) -> bool + Send + Sync>;

/// A field name, a predicate, and the error contributed when the predicate
/// returns `false`.
///
/// The field name is independent of the validator the rule is attached to,
/// which lets one body validator report errors for nested fields.
pub struct Rule<T> {
    field: String,
    check: Predicate<T>,
    error: ValidationError,
}

impl<T> Rule<T> {
    /// Create a new rule
    pub fn new<F>(field: impl Into<String>, check: F, error: impl Into<ValidationError>) -> Self
    where
        F: Fn(Option<&T>) -> bool + Send + Sync + 'static,
    {
        Self {
            field: field.into(),
            check: Arc::new(check),
            error: error.into(),
        }
    }

    /// Field the error is reported under
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Error template; its `value` is filled in at resolution time
    pub fn error(&self) -> &ValidationError {
        &self.error
    }

    /// Evaluate the predicate
    pub fn test(&self, value: Option<&T>) -> bool {
        (self.check)(value)
    }

}

impl<T: Serialize + 'static> Rule<T> {
    /// Append this rule to `engine`
    pub fn attach(self, engine: &mut ValidationEngine<T>) {
        engine.attach(self);
    }
}

impl<T> Clone for Rule<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            check: Arc::clone(&self.check),
            error: self.error.clone(),
        }
    }
}

impl<T> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("field", &self.field)
            .field("error", &self.error.message)
            .finish()
    }
}
