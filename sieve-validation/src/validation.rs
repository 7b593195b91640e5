//! Validation configuration
//!
//! A [`Validation`] bundles everything a validator needs at request time: the
//! conversion registry, the document mapper, the exception mapper and the
//! shared [`ValidationSettings`]. It is assembled once with a
//! [`ValidationBuilder`] and is immutable afterwards; cloning it only bumps
//! reference counts.
//!
//! ```
//! use sieve_validation::{MinLength, Validation};
//!
//! let validation = Validation::builder().build();
//!
//! let name = validation.scalar::<String>("name", Some("sieve")).with(MinLength(3));
//! let tags = validation.list::<u8>("tag", vec!["1".into(), "2".into()]);
//!
//! assert_eq!(name.get().unwrap(), "sieve");
//! assert_eq!(tags.get().unwrap(), &vec![1, 2]);
//! ```

use crate::{
    BodyValidator, ConversionError, ConversionRegistry, DocumentMapper, ErrorResponse,
    ExceptionMapper, ExceptionMappers, InputSource, JsonMapper, NullableValidator, SetupError,
    ValidationException, ValidationSettings, Validator,
};
use once_cell::sync::{Lazy, OnceCell};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

static INSTALLED: OnceCell<Validation> = OnceCell::new();
static FALLBACK: Lazy<Validation> = Lazy::new(|| Validation::builder().build());

/// Immutable validation configuration.
#[derive(Clone)]
pub struct Validation {
    registry: Arc<ConversionRegistry>,
    mapper: Arc<dyn DocumentMapper>,
    exception_mappers: ExceptionMappers,
    settings: ValidationSettings,
}

impl Validation {
    pub fn builder() -> ValidationBuilder {
        ValidationBuilder::new()
    }

    /// Validator for a required string parameter
    pub fn scalar<T: Serialize + 'static>(
        &self,
        field: impl Into<String>,
        raw: Option<&str>,
    ) -> Validator<T> {
        Validator::new(field, InputSource::scalar(self.registry.clone(), raw))
            .with_settings(&self.settings)
    }

    /// Validator for an optional string parameter
    pub fn nullable<T: Serialize + 'static>(
        &self,
        field: impl Into<String>,
        raw: Option<&str>,
    ) -> NullableValidator<T> {
        NullableValidator::new(field, InputSource::scalar(self.registry.clone(), raw))
            .with_settings(&self.settings)
    }

    /// Validator for a repeated parameter
    pub fn list<E: Serialize + 'static>(
        &self,
        field: impl Into<String>,
        raw: Vec<String>,
    ) -> Validator<Vec<E>> {
        Validator::new(field, InputSource::list(self.registry.clone(), raw))
            .with_settings(&self.settings)
    }

    /// Validator for a request body
    pub fn body<T: DeserializeOwned + Serialize + 'static>(
        &self,
        raw: impl Into<String>,
    ) -> BodyValidator<T> {
        BodyValidator::new(self.mapper.clone(), raw).with_settings(&self.settings)
    }

    /// Validator for an already-typed value
    pub fn value<T: Serialize + 'static>(&self, field: impl Into<String>, value: T) -> Validator<T> {
        Validator::from_value(field, value).with_settings(&self.settings)
    }

    /// Convert one raw string without building a validator
    pub fn convert<T: 'static>(&self, raw: &str) -> Result<Option<T>, ConversionError> {
        self.registry.convert(raw)
    }

    /// Render `exception` through the configured exception mapper
    pub fn render(&self, exception: &ValidationException) -> ErrorResponse {
        self.exception_mappers.render(exception)
    }

    pub fn registry(&self) -> &Arc<ConversionRegistry> {
        &self.registry
    }

    pub fn document_mapper(&self) -> &Arc<dyn DocumentMapper> {
        &self.mapper
    }

    pub fn exception_mappers(&self) -> &ExceptionMappers {
        &self.exception_mappers
    }

    pub fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    /// Make this configuration the process-wide one.
    ///
    /// Only the first call succeeds.
    pub fn install(self) -> Result<&'static Validation, SetupError> {
        let mut installed = false;
        let validation = INSTALLED.get_or_init(|| {
            installed = true;
            self
        });
        if !installed {
            return Err(SetupError::AlreadyInstalled);
        }
        tracing::debug!(
            mapper = validation.mapper.name(),
            converters = validation.registry.len(),
            "Installed validation configuration"
        );
        Ok(validation)
    }

    /// The installed configuration, or defaults when none was installed
    pub fn global() -> &'static Validation {
        INSTALLED.get().unwrap_or_else(|| &*FALLBACK)
    }
}

impl Default for Validation {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validation")
            .field("converters", &self.registry.len())
            .field("mapper", &self.mapper.name())
            .field("exception_mapper", &self.exception_mappers.mapper_name())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Mutable configuration, consumed by [`build`](Self::build).
pub struct ValidationBuilder {
    registry: ConversionRegistry,
    mapper: Option<Arc<dyn DocumentMapper>>,
    exception_mappers: ExceptionMappers,
    settings: ValidationSettings,
}

impl ValidationBuilder {
    /// Builder with the built-in converters and no mappers
    pub fn new() -> Self {
        Self {
            registry: ConversionRegistry::with_defaults(),
            mapper: None,
            exception_mappers: ExceptionMappers::new(),
            settings: ValidationSettings::default(),
        }
    }

    /// Register a converter for `T`
    pub fn converter<T, E, F>(&mut self, converter: F) -> &mut Self
    where
        T: 'static,
        E: fmt::Display,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        self.registry.register(converter);
        self
    }

    /// Register `T`'s [`FromStr`] implementation as its converter
    pub fn from_str_converter<T>(&mut self) -> &mut Self
    where
        T: FromStr + 'static,
        T::Err: fmt::Display,
    {
        self.registry.register_from_str::<T>();
        self
    }

    pub fn registry_mut(&mut self) -> &mut ConversionRegistry {
        &mut self.registry
    }

    /// Use `mapper` for request bodies
    pub fn document_mapper<M: DocumentMapper>(&mut self, mapper: M) -> &mut Self {
        tracing::debug!(mapper = mapper.name(), "Registered document mapper");
        self.mapper = Some(Arc::new(mapper));
        self
    }

    pub fn has_document_mapper(&self) -> bool {
        self.mapper.is_some()
    }

    /// Replace the exception mapper
    pub fn exception_mapper<M: ExceptionMapper>(&mut self, mapper: M) -> &mut Self {
        self.exception_mappers.register(mapper);
        self
    }

    pub fn exception_mappers_mut(&mut self) -> &mut ExceptionMappers {
        &mut self.exception_mappers
    }

    pub fn settings(&mut self, settings: ValidationSettings) -> &mut Self {
        self.settings = settings;
        self
    }

    pub fn current_settings(&self) -> &ValidationSettings {
        &self.settings
    }

    /// Freeze the configuration.
    ///
    /// Missing pieces get defaults: [`JsonMapper`] for documents and the
    /// default exception mapper with the configured error status.
    pub fn build(mut self) -> Validation {
        self.exception_mappers
            .register_default(self.settings.error_status);
        let mapper = self.mapper.unwrap_or_else(|| Arc::new(JsonMapper));
        Validation {
            registry: Arc::new(self.registry),
            mapper,
            exception_mappers: self.exception_mappers,
            settings: self.settings,
        }
    }
}

impl Default for ValidationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorMap, LateRulePolicy, TYPE_CONVERSION_FAILED, ValidationError};
    use serde::Deserialize;

    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    enum Order {
        Asc,
        Desc,
    }

    impl FromStr for Order {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "asc" => Ok(Order::Asc),
                "desc" => Ok(Order::Desc),
                other => Err(format!("unknown order '{other}'")),
            }
        }
    }

    #[derive(Debug, Deserialize, Serialize)]
    struct Note {
        text: String,
    }

    #[test]
    fn test_defaults() {
        let validation = Validation::default();

        assert_eq!(validation.document_mapper().name(), "json");
        assert_eq!(validation.exception_mappers().mapper_name(), Some("default"));
        assert!(validation.registry().contains::<i64>());
        assert_eq!(validation.convert::<i64>("12").unwrap(), Some(12));
    }

    #[test]
    fn test_custom_converter() {
        let mut builder = Validation::builder();
        builder.from_str_converter::<Order>();
        let validation = builder.build();

        let order = validation.scalar::<Order>("order", Some("desc"));
        assert_eq!(order.get().unwrap(), &Order::Desc);

        let order = validation.scalar::<Order>("order", Some("sideways"));
        assert_eq!(order.errors()["order"][0].message, TYPE_CONVERSION_FAILED);
    }

    #[test]
    fn test_unregistered_type_fails_conversion() {
        let validation = Validation::default();
        let order = validation.scalar::<Order>("order", Some("asc"));

        assert_eq!(order.errors()["order"][0].message, TYPE_CONVERSION_FAILED);
    }

    #[test]
    fn test_settings_flow_into_validators() {
        let mut builder = Validation::builder();
        builder.settings(
            ValidationSettings::default()
                .with_error_status(422)
                .with_late_rules(LateRulePolicy::Ignore),
        );
        let validation = builder.build();

        let mut errors = ErrorMap::new();
        errors.insert("q".to_string(), vec![ValidationError::new("NOT_EMPTY")]);
        let response = validation.render(&ValidationException::new(errors));
        assert_eq!(response.status, 422);
    }

    #[test]
    fn test_body_factory_uses_mapper() {
        let validation = Validation::default();
        let note = validation
            .body::<Note>(r#"{"text": "hi"}"#)
            .check_field("text", |n| !n.text.is_empty(), "TEXT_REQUIRED");

        assert_eq!(note.get().unwrap().text, "hi");
    }

    #[test]
    fn test_user_exception_mapper_wins() {
        let mut builder = Validation::builder();
        builder.exception_mapper(|_: &ValidationException| ErrorResponse::new(409));
        let validation = builder.build();

        let response = validation.render(&ValidationException::new(ErrorMap::new()));
        assert_eq!(response.status, 409);
    }
}
