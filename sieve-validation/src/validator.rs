//! Validator variants
//!
//! Three thin wrappers over [`ValidationEngine`]:
//!
//! - [`Validator`]: a value is required; `get()` never yields null.
//! - [`NullableValidator`]: null (an absent parameter) is a valid value.
//! - [`BodyValidator`]: a deserialized document whose rules may report errors
//!   under nested field names.
//!
//! ```
//! use sieve_validation::{ConversionRegistry, InputSource, Validator, Min};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ConversionRegistry::with_defaults());
//! let age = Validator::new("age", InputSource::<u32>::scalar(registry, Some("42")))
//!     .with(Min(18))
//!     .check(|age| *age < 150, "UNREALISTIC_AGE");
//!
//! assert_eq!(age.get().unwrap(), &42);
//! ```

use crate::{
    Check, DocumentMapper, ErrorMap, InputSource, Nullability, REQUEST_BODY, Rule, SetupError,
    ValidationEngine, ValidationError, ValidationException, ValidationSettings,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Anything that resolves into a per-field error mapping.
pub trait ErrorSource {
    /// Field name of the validator
    fn field_name(&self) -> &str;

    /// Resolved errors keyed by field
    fn errors(&self) -> &ErrorMap;
}

/// Merge the errors of several validators into one mapping.
///
/// Each validator resolves independently; errors reported for the same field
/// by different validators are concatenated in argument order.
pub fn collect_errors(validators: &[&dyn ErrorSource]) -> ErrorMap {
    let mut merged = ErrorMap::new();
    for validator in validators {
        for (field, errors) in validator.errors() {
            merged
                .entry(field.clone())
                .or_default()
                .extend(errors.iter().cloned());
        }
    }
    merged
}

/// Fail with one exception carrying the errors of all `validators`.
pub fn validate_all(validators: &[&dyn ErrorSource]) -> Result<(), ValidationException> {
    let errors = collect_errors(validators);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationException::new(errors))
    }
}

/// Validator for a required value.
pub struct Validator<T> {
    engine: ValidationEngine<T>,
}

impl<T: Serialize + 'static> Validator<T> {
    /// Validate the value converted from `source`
    pub fn new(field: impl Into<String>, source: InputSource<T>) -> Self {
        Self {
            engine: ValidationEngine::new(field, Nullability::NonNullable, source),
        }
    }

    /// Validate an already-typed value
    pub fn from_value(field: impl Into<String>, value: T) -> Self {
        Self {
            engine: ValidationEngine::from_value(field, Nullability::NonNullable, Some(value)),
        }
    }

    /// Apply shared settings
    pub fn with_settings(mut self, settings: &ValidationSettings) -> Self {
        self.engine = self.engine.with_settings(settings);
        self
    }

    /// Add a rule reported under this validator's field
    pub fn check<F>(mut self, check: F, error: impl Into<ValidationError>) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let field = self.engine.field().to_string();
        self.engine.attach(Rule::new(
            field,
            move |value: Option<&T>| value.is_some_and(&check),
            error,
        ));
        self
    }

    /// Add a built-in check
    pub fn with<C: Check<T>>(self, check: C) -> Self {
        let error = check.error();
        self.check(move |value| check.test(value), error)
    }

    /// Accept null as a valid value.
    ///
    /// Must be called before any rule is attached and before the validator is
    /// resolved.
    pub fn allow_nullable(mut self) -> Result<NullableValidator<T>, SetupError> {
        let field = self.engine.field().to_string();
        if self.engine.is_resolved() {
            return Err(SetupError::AlreadyResolved { field });
        }
        if self.engine.rule_count() > 0 {
            return Err(SetupError::RulesAlreadyAttached { field });
        }
        self.engine.set_nullability(Nullability::Nullable);
        Ok(NullableValidator {
            engine: self.engine,
        })
    }

    /// The validated value, or every error of this validator
    pub fn get(&self) -> Result<&T, ValidationException> {
        self.get_or_error(|errors| ValidationException::new(errors.clone()))
    }

    /// Like [`get`](Self::get), with a caller-built error
    pub fn get_or_error<E, F>(&self, error: F) -> Result<&T, E>
    where
        F: FnOnce(&ErrorMap) -> E,
    {
        let resolution = self.engine.resolve();
        match resolution.value() {
            Some(value) if resolution.is_valid() => Ok(value),
            _ => Err(error(resolution.errors())),
        }
    }

    /// `default` when no raw input was supplied, otherwise [`get`](Self::get)
    pub fn get_or_default(&self, default: T) -> Result<T, ValidationException>
    where
        T: Clone,
    {
        if !self.engine.raw_present() {
            return Ok(default);
        }
        self.get().cloned()
    }

    /// Consume the validator, returning the owned value
    pub fn into_inner(self) -> Result<T, ValidationException> {
        let (value, errors) = self.engine.into_resolution().into_parts();
        match value {
            Some(value) if errors.is_empty() => Ok(value),
            _ => Err(ValidationException::new(errors)),
        }
    }

    /// `true` when resolution produced no errors
    pub fn is_valid(&self) -> bool {
        self.engine.resolve().is_valid()
    }

    /// Resolved errors keyed by field
    pub fn errors(&self) -> &ErrorMap {
        self.engine.errors()
    }

    /// Field this validator checks
    pub fn field_name(&self) -> &str {
        self.engine.field()
    }
}

/// Validator for a value that may be null.
pub struct NullableValidator<T> {
    engine: ValidationEngine<T>,
}

impl<T: Serialize + 'static> NullableValidator<T> {
    /// Validator that converts `source` on first read; a missing value is accepted
    pub fn new(field: impl Into<String>, source: InputSource<T>) -> Self {
        Self {
            engine: ValidationEngine::new(field, Nullability::Nullable, source),
        }
    }

    /// Validator over an already-typed value that may be `None`
    pub fn from_value(field: impl Into<String>, value: Option<T>) -> Self {
        Self {
            engine: ValidationEngine::from_value(field, Nullability::Nullable, value),
        }
    }

    /// Apply shared settings
    pub fn with_settings(mut self, settings: &ValidationSettings) -> Self {
        self.engine = self.engine.with_settings(settings);
        self
    }

    /// Add a rule; the predicate sees `None` for a null value
    pub fn check<F>(mut self, check: F, error: impl Into<ValidationError>) -> Self
    where
        F: Fn(Option<&T>) -> bool + Send + Sync + 'static,
    {
        let field = self.engine.field().to_string();
        self.engine.attach(Rule::new(field, check, error));
        self
    }

    /// Add a built-in check applied only when a value is present
    pub fn with<C: Check<T>>(self, check: C) -> Self {
        let error = check.error();
        self.check(move |value| value.is_none_or(|v| check.test(v)), error)
    }

    /// The value, or every collected error
    pub fn get(&self) -> Result<Option<&T>, ValidationException> {
        self.get_or_error(|errors| ValidationException::new(errors.clone()))
    }

    /// The value, or the error built by `error` from the collected errors
    pub fn get_or_error<E, F>(&self, error: F) -> Result<Option<&T>, E>
    where
        F: FnOnce(&ErrorMap) -> E,
    {
        let resolution = self.engine.resolve();
        if resolution.is_valid() {
            Ok(resolution.value())
        } else {
            Err(error(resolution.errors()))
        }
    }

    /// Consume the validator and return the owned value
    pub fn into_inner(self) -> Result<Option<T>, ValidationException> {
        let (value, errors) = self.engine.into_resolution().into_parts();
        if errors.is_empty() {
            Ok(value)
        } else {
            Err(ValidationException::new(errors))
        }
    }

    /// `true` when the value is valid and not null
    pub fn has_value(&self) -> bool {
        let resolution = self.engine.resolve();
        resolution.is_valid() && resolution.value().is_some()
    }

    /// `true` when no errors were recorded; `None` counts as valid
    pub fn is_valid(&self) -> bool {
        self.engine.resolve().is_valid()
    }

    /// Errors keyed by field; triggers resolution
    pub fn errors(&self) -> &ErrorMap {
        self.engine.errors()
    }

    /// Field this validator reports under
    pub fn field_name(&self) -> &str {
        self.engine.field()
    }
}

/// Validator for a deserialized request body.
///
/// Rules added with [`check`](Self::check) report under `REQUEST_BODY`;
/// [`check_field`](Self::check_field) reports under any nested field name.
pub struct BodyValidator<T> {
    engine: ValidationEngine<T>,
}

impl<T: DeserializeOwned + Serialize + 'static> BodyValidator<T> {
    /// Validate `raw` as decoded by `mapper`
    pub fn new(mapper: Arc<dyn DocumentMapper>, raw: impl Into<String>) -> Self {
        Self {
            engine: ValidationEngine::new(
                REQUEST_BODY,
                Nullability::NonNullable,
                InputSource::document(mapper, raw),
            ),
        }
    }

    /// Apply shared settings
    pub fn with_settings(mut self, settings: &ValidationSettings) -> Self {
        self.engine = self.engine.with_settings(settings);
        self
    }

    /// Add a rule reported under `REQUEST_BODY`
    pub fn check<F>(self, check: F, error: impl Into<ValidationError>) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.check_field(REQUEST_BODY, check, error)
    }

    /// Add a rule reported under `field`, e.g. `"address.zip"`
    pub fn check_field<F>(
        mut self,
        field: impl Into<String>,
        check: F,
        error: impl Into<ValidationError>,
    ) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.engine.attach(Rule::new(
            field,
            move |value: Option<&T>| value.is_some_and(&check),
            error,
        ));
        self
    }

    /// The decoded body, or every collected error
    pub fn get(&self) -> Result<&T, ValidationException> {
        self.get_or_error(|errors| ValidationException::new(errors.clone()))
    }

    /// The decoded body, or the error built by `error` from the collected errors
    pub fn get_or_error<E, F>(&self, error: F) -> Result<&T, E>
    where
        F: FnOnce(&ErrorMap) -> E,
    {
        let resolution = self.engine.resolve();
        match resolution.value() {
            Some(value) if resolution.is_valid() => Ok(value),
            _ => Err(error(resolution.errors())),
        }
    }

    /// Consume the validator and return the owned body
    pub fn into_inner(self) -> Result<T, ValidationException> {
        let (value, errors) = self.engine.into_resolution().into_parts();
        match value {
            Some(value) if errors.is_empty() => Ok(value),
            _ => Err(ValidationException::new(errors)),
        }
    }

    /// `true` when the body decoded and every rule passed
    pub fn is_valid(&self) -> bool {
        self.engine.resolve().is_valid()
    }

    /// Errors keyed by field; triggers resolution
    pub fn errors(&self) -> &ErrorMap {
        self.engine.errors()
    }
}

impl<T: Serialize + 'static> ErrorSource for Validator<T> {
    fn field_name(&self) -> &str {
        self.engine.field()
    }

    fn errors(&self) -> &ErrorMap {
        self.engine.errors()
    }
}

impl<T: Serialize + 'static> ErrorSource for NullableValidator<T> {
    fn field_name(&self) -> &str {
        self.engine.field()
    }

    fn errors(&self) -> &ErrorMap {
        self.engine.errors()
    }
}

impl<T: DeserializeOwned + Serialize + 'static> ErrorSource for BodyValidator<T> {
    fn field_name(&self) -> &str {
        REQUEST_BODY
    }

    fn errors(&self) -> &ErrorMap {
        self.engine.errors()
    }
}
