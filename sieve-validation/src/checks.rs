// Built-in checks

use crate::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// Common regex patterns
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHANUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// A reusable predicate with the error it contributes when it fails.
///
/// Attach with `Validator::with`.
pub trait Check<T: ?Sized>: Send + Sync + 'static {
    /// `true` if `value` passes
    fn test(&self, value: &T) -> bool;

    /// Error template reported on failure
    fn error(&self) -> ValidationError;
}

// String checks

/// String is not empty or whitespace-only
pub struct NotEmpty;

impl Check<String> for NotEmpty {
    fn test(&self, value: &String) -> bool {
        !value.trim().is_empty()
    }

    fn error(&self) -> ValidationError {
        ValidationError::new("NOT_EMPTY")
    }
}

/// Minimum string length in characters
pub struct MinLength(pub usize);

impl Check<String> for MinLength {
    fn test(&self, value: &String) -> bool {
        value.chars().count() >= self.0
    }

    fn error(&self) -> ValidationError {
        ValidationError::new("MIN_LENGTH").with_arg("min", self.0)
    }
}

/// Maximum string length in characters
pub struct MaxLength(pub usize);

impl Check<String> for MaxLength {
    fn test(&self, value: &String) -> bool {
        value.chars().count() <= self.0
    }

    fn error(&self) -> ValidationError {
        ValidationError::new("MAX_LENGTH").with_arg("max", self.0)
    }
}

macro_rules! pattern_check {
    ($(#[$doc:meta])* $name:ident, $regex:ident, $key:literal) => {
        $(#[$doc])*
        pub struct $name;

        impl Check<String> for $name {
            fn test(&self, value: &String) -> bool {
                $regex.is_match(value)
            }

            fn error(&self) -> ValidationError {
                ValidationError::new($key)
            }
        }
    };
}

pattern_check!(
    /// Email address format
    IsEmail, EMAIL_REGEX, "IS_EMAIL"
);
pattern_check!(
    /// `http` or `https` URL
    IsUrl, URL_REGEX, "IS_URL"
);
pattern_check!(
    /// Lowercase hyphenated UUID
    IsUuid, UUID_REGEX, "IS_UUID"
);
pattern_check!(
    /// ASCII letters only
    IsAlpha, ALPHA_REGEX, "IS_ALPHA"
);
pattern_check!(
    /// ASCII letters and digits only
    IsAlphanumeric, ALPHANUMERIC_REGEX, "IS_ALPHANUMERIC"
);
pattern_check!(
    /// ASCII digits only
    IsNumeric, NUMERIC_REGEX, "IS_NUMERIC"
);

/// Custom regex check
pub struct Matches(pub Regex);

impl Matches {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self(Regex::new(pattern)?))
    }
}

impl Check<String> for Matches {
    fn test(&self, value: &String) -> bool {
        self.0.is_match(value)
    }

    fn error(&self) -> ValidationError {
        ValidationError::new("MATCHES").with_arg("pattern", self.0.as_str())
    }
}

// Number checks

/// Value is at least the bound
pub struct Min<N>(pub N);

impl<N> Check<N> for Min<N>
where
    N: PartialOrd + Serialize + Send + Sync + 'static,
{
    fn test(&self, value: &N) -> bool {
        *value >= self.0
    }

    fn error(&self) -> ValidationError {
        ValidationError::new("MIN").with_arg("min", &self.0)
    }
}

/// Value is at most the bound
pub struct Max<N>(pub N);

impl<N> Check<N> for Max<N>
where
    N: PartialOrd + Serialize + Send + Sync + 'static,
{
    fn test(&self, value: &N) -> bool {
        *value <= self.0
    }

    fn error(&self) -> ValidationError {
        ValidationError::new("MAX").with_arg("max", &self.0)
    }
}

/// Value lies in `min..=max`
pub struct InRange<N> {
    pub min: N,
    pub max: N,
}

impl<N> Check<N> for InRange<N>
where
    N: PartialOrd + Serialize + Send + Sync + 'static,
{
    fn test(&self, value: &N) -> bool {
        *value >= self.min && *value <= self.max
    }

    fn error(&self) -> ValidationError {
        ValidationError::new("IN_RANGE")
            .with_arg("min", &self.min)
            .with_arg("max", &self.max)
    }
}

/// Value is strictly greater than zero
pub struct IsPositive;

macro_rules! positive {
    ($($ty:ty),+) => {
        $(
            impl Check<$ty> for IsPositive {
                fn test(&self, value: &$ty) -> bool {
                    *value > <$ty>::default()
                }

                fn error(&self) -> ValidationError {
                    ValidationError::new("IS_POSITIVE")
                }
            }
        )+
    };
}

positive!(i8, i16, i32, i64, i128, isize, f32, f64);
