// Validation errors

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Field name under which body deserialization failures are reported.
pub const REQUEST_BODY: &str = "REQUEST_BODY";

/// Raw input could not be converted to the target type.
pub const TYPE_CONVERSION_FAILED: &str = "TYPE_CONVERSION_FAILED";

/// Conversion succeeded but produced null for a non-nullable validator.
pub const NULLCHECK_FAILED: &str = "NULLCHECK_FAILED";

/// Document text could not be deserialized into the target type.
pub const DESERIALIZATION_FAILED: &str = "DESERIALIZATION_FAILED";

/// Resolved errors keyed by field name, in rule-registration order per field.
pub type ErrorMap = BTreeMap<String, Vec<ValidationError>>;

/// Category of a validation error, derived from its message key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Raw string or list element not representable as the target type
    Conversion,
    /// Conversion yielded null where a value is required
    NullCheck,
    /// Malformed or structurally invalid document
    Deserialization,
    /// Valid value rejected by a rule predicate
    RuleViolation,
}

/// A single validation failure.
///
/// `message` is a stable key (`TYPE_CONVERSION_FAILED`, `MIN_LENGTH`, or any
/// caller-defined key), `args` carries the parameters of the failed check and
/// `value` the offending input, filled in when the validator resolves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Message key
    pub message: String,

    /// Check arguments, e.g. `{"min": 3}`
    pub args: BTreeMap<String, Value>,

    /// Value that failed validation
    pub value: Option<Value>,
}

impl ValidationError {
    /// Create a new validation error with the given message key
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            args: BTreeMap::new(),
            value: None,
        }
    }

    /// Add a named argument
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.args.insert(key.into(), value);
        self
    }

    /// Set the offending value
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Classify this error by its message key
    pub fn kind(&self) -> ErrorKind {
        match self.message.as_str() {
            TYPE_CONVERSION_FAILED => ErrorKind::Conversion,
            NULLCHECK_FAILED => ErrorKind::NullCheck,
            DESERIALIZATION_FAILED => ErrorKind::Deserialization,
            _ => ErrorKind::RuleViolation,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} (value: {})", self.message, value),
            None => write!(f, "{}", self.message),
        }
    }
}

impl From<&str> for ValidationError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ValidationError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// All errors of one or more validators, grouped by field.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("validation failed for {}", field_list(.errors))]
pub struct ValidationException {
    errors: ErrorMap,
}

fn field_list(errors: &ErrorMap) -> String {
    errors.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
}

impl ValidationException {
    /// Create an exception from a resolved error mapping
    pub fn new(errors: ErrorMap) -> Self {
        Self { errors }
    }

    /// Errors grouped by field
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Consume the exception, returning the error mapping
    pub fn into_errors(self) -> ErrorMap {
        self.errors
    }

    /// Errors for a single field (empty if the field is valid)
    pub fn field_errors(&self, field: &str) -> &[ValidationError] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of all failing fields
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Convert to JSON representation: `{field: [{message, args, value}]}`
    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.errors).unwrap_or(Value::Null)
    }
}

impl From<ErrorMap> for ValidationException {
    fn from(errors: ErrorMap) -> Self {
        Self::new(errors)
    }
}

/// Failure to turn a raw string into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("no converter registered for type {type_name}")]
    MissingConverter { type_name: &'static str },

    #[error("'{value}' is not a valid {type_name}: {reason}")]
    Invalid {
        type_name: &'static str,
        value: String,
        reason: String,
    },

    #[error("converter for {type_name} produced null for list element '{value}'")]
    NullElement {
        type_name: &'static str,
        value: String,
    },
}

/// Failure to read a document into the target type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to deserialize document: {message}")]
pub struct DeserializationError {
    pub message: String,
}

impl DeserializationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for DeserializationError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Misuse of the validation API during setup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("allow_nullable must be called before adding rules to '{field}'")]
    RulesAlreadyAttached { field: String },

    #[error("'{field}' has already been resolved")]
    AlreadyResolved { field: String },

    #[error("a validation configuration is already installed")]
    AlreadyInstalled,
}
