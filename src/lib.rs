// Sieve - lazy type coercion and validation for request input
//
// This library turns raw request parameters and bodies into typed values or
// per-field validation errors, resolving each validator exactly once.

// Re-export core functionality
pub use sieve_validation::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use sieve_config;

#[cfg(feature = "config")]
pub use sieve_config::{AppConfig, ConfigError, ConfigManager, FileFormat};

// Prelude for common imports
pub mod prelude {
    #[cfg(feature = "config")]
    pub use crate::{AppConfig, ConfigManager};
    pub use crate::{
        BodyValidator,
        Check,
        ConversionRegistry,
        DocumentMapper,
        ErrorMap,
        ErrorResponse,
        ExceptionMapper,
        InputSource,
        JsonMapper,
        NullableValidator,
        Validation,
        ValidationError,
        ValidationException,
        ValidationSettings,
        Validator,
        collect_errors,
        validate_all,
        // Built-in checks
        InRange,
        IsEmail,
        IsPositive,
        Matches,
        Max,
        MaxLength,
        Min,
        MinLength,
        NotEmpty,
    };
}
