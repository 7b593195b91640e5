//! Document mappers
//!
//! A [`DocumentMapper`] turns raw document text (a request body) into a
//! `serde_json::Value` tree; [`deserialize`] then decodes that tree into the
//! target type with serde. Splitting the two steps keeps the mapper object-safe
//! so a single configured instance can serve every body type.
//!
//! ```
//! use sieve_validation::{deserialize, JsonMapper};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Login {
//!     user: String,
//! }
//!
//! let login: Login = deserialize(&JsonMapper, r#"{"user": "alice"}"#).unwrap();
//! assert_eq!(login.user, "alice");
//! ```

use crate::DeserializationError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Capability that parses document text into a structured tree.
pub trait DocumentMapper: Send + Sync + 'static {
    /// Parse raw text; malformed input is a [`DeserializationError`].
    fn parse_tree(&self, raw: &str) -> Result<Value, DeserializationError>;

    /// Mapper name for diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// JSON document mapper backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMapper;

impl DocumentMapper for JsonMapper {
    fn parse_tree(&self, raw: &str) -> Result<Value, DeserializationError> {
        serde_json::from_str(raw).map_err(DeserializationError::from)
    }

    fn name(&self) -> &str {
        "json"
    }
}

/// Parse `raw` with `mapper` and decode it into `T`.
///
/// Both malformed text and a well-formed document of the wrong shape are
/// reported as [`DeserializationError`].
pub fn deserialize<T: DeserializeOwned>(
    mapper: &dyn DocumentMapper,
    raw: &str,
) -> Result<T, DeserializationError> {
    let tree = mapper.parse_tree(raw)?;
    serde_json::from_value(tree).map_err(DeserializationError::from)
}
