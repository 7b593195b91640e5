// Application startup wiring

use crate::{ConfigManager, Result, Validate};
use sieve_validation::{JsonMapper, Validation, ValidationBuilder, ValidationSettings};

/// Startup configuration of the validation layer.
///
/// [`apply_user_config`](Self::apply_user_config) runs the startup sequence:
///
/// 1. register the default exception mapper
/// 2. run the user configuration closure
/// 3. use [`JsonMapper`] if no document mapper was configured
/// 4. register the default exception mapper again (a no-op once any mapper
///    is present, so a user mapper is never replaced)
/// 5. freeze the result into a [`Validation`]
///
/// ```
/// use sieve_config::AppConfig;
/// use sieve_validation::{ErrorResponse, ValidationException};
///
/// let validation = AppConfig::default()
///     .apply_user_config(|builder| {
///         builder.exception_mapper(|_: &ValidationException| ErrorResponse::new(422));
///     })
///     .unwrap();
///
/// assert_eq!(validation.document_mapper().name(), "json");
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    settings: ValidationSettings,
}

impl AppConfig {
    pub fn new(settings: ValidationSettings) -> Self {
        Self { settings }
    }

    /// Read validation settings from `config`
    pub fn from_config(config: &ConfigManager) -> Result<Self> {
        Ok(Self::new(config.validation_settings()?))
    }

    pub fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    /// Build the validation configuration, letting `user` customize it
    pub fn apply_user_config<F>(&self, user: F) -> Result<Validation>
    where
        F: FnOnce(&mut ValidationBuilder),
    {
        self.settings.validate()?;

        let mut builder = Validation::builder();
        builder.settings(self.settings.clone());
        builder
            .exception_mappers_mut()
            .register_default(self.settings.error_status);

        user(&mut builder);

        if !builder.has_document_mapper() {
            builder.document_mapper(JsonMapper);
        }
        let status = builder.current_settings().error_status;
        if !builder.exception_mappers_mut().register_default(status) {
            tracing::debug!("Exception mapper already registered; keeping it");
        }

        let validation = builder.build();
        tracing::info!(
            mapper = validation.document_mapper().name(),
            exception_mapper = validation.exception_mappers().mapper_name().unwrap_or("none"),
            converters = validation.registry().len(),
            "Validation configured"
        );
        Ok(validation)
    }

    /// Apply the user configuration and install the result process-wide
    pub fn install<F>(&self, user: F) -> Result<&'static Validation>
    where
        F: FnOnce(&mut ValidationBuilder),
    {
        Ok(self.apply_user_config(user)?.install()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_validation::{
        DeserializationError, DocumentMapper, ErrorMap, ErrorResponse, ValidationException,
    };

    struct UpperMapper;

    impl DocumentMapper for UpperMapper {
        fn parse_tree(
            &self,
            raw: &str,
        ) -> std::result::Result<serde_json::Value, DeserializationError> {
            Ok(serde_json::Value::String(raw.to_uppercase()))
        }

        fn name(&self) -> &str {
            "upper"
        }
    }

    fn render_status(validation: &Validation) -> u16 {
        validation
            .render(&ValidationException::new(ErrorMap::new()))
            .status
    }

    #[test]
    fn test_defaults_are_filled() {
        let validation = AppConfig::default().apply_user_config(|_| {}).unwrap();

        assert_eq!(validation.document_mapper().name(), "json");
        assert_eq!(validation.exception_mappers().mapper_name(), Some("default"));
        assert_eq!(render_status(&validation), 400);
    }

    #[test]
    fn test_configured_status_reaches_default_mapper() {
        let config = AppConfig::new(ValidationSettings::default().with_error_status(422));
        let validation = config.apply_user_config(|_| {}).unwrap();

        assert_eq!(render_status(&validation), 422);
    }

    #[test]
    fn test_user_choices_survive_defaults() {
        let validation = AppConfig::default()
            .apply_user_config(|builder| {
                builder
                    .document_mapper(UpperMapper)
                    .exception_mapper(|_: &ValidationException| ErrorResponse::new(418));
            })
            .unwrap();

        assert_eq!(validation.document_mapper().name(), "upper");
        assert_eq!(render_status(&validation), 418);

        let shout = validation.body::<String>("hi");
        assert_eq!(shout.get().unwrap(), "HI");
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let config = AppConfig::new(ValidationSettings::default().with_error_status(302));
        assert!(config.apply_user_config(|_| {}).is_err());
    }
}
