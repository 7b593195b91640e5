// Input sources

use crate::{
    ConversionError, ConversionRegistry, DeserializationError, DocumentMapper, TypeKey,
    deserialize,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type ListCollector<T> = fn(&ConversionRegistry, &[String]) -> Result<Option<T>, ConversionError>;
type DocumentDecoder<T> = fn(&dyn DocumentMapper, &str) -> Result<T, DeserializationError>;

/// Shape of the raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Scalar,
    List,
    Document,
}

pub(crate) enum Payload<T> {
    Scalar {
        raw: Option<String>,
        registry: Arc<ConversionRegistry>,
    },
    List {
        raw: Vec<String>,
        registry: Arc<ConversionRegistry>,
        collect: ListCollector<T>,
    },
    Document {
        raw: String,
        mapper: Arc<dyn DocumentMapper>,
        decode: DocumentDecoder<T>,
    },
}

/// Raw, untyped input together with the type it must become.
///
/// Scalar and list sources convert through a [`ConversionRegistry`]; document
/// sources go through a [`DocumentMapper`].
pub struct InputSource<T> {
    target: TypeKey,
    pub(crate) payload: Payload<T>,
}

impl<T: 'static> InputSource<T> {
    /// A single string parameter; `None` means the parameter was absent
    pub fn scalar(registry: Arc<ConversionRegistry>, raw: Option<&str>) -> Self {
        Self {
            target: TypeKey::of::<T>(),
            payload: Payload::Scalar {
                raw: raw.map(str::to_string),
                registry,
            },
        }
    }

    /// Target type of the conversion
    pub fn target(&self) -> TypeKey {
        self.target
    }

    /// Shape of the raw input
    pub fn kind(&self) -> InputKind {
        match self.payload {
            Payload::Scalar { .. } => InputKind::Scalar,
            Payload::List { .. } => InputKind::List,
            Payload::Document { .. } => InputKind::Document,
        }
    }

    /// Whether any raw input was supplied
    pub fn is_present(&self) -> bool {
        match &self.payload {
            Payload::Scalar { raw, .. } => raw.is_some(),
            Payload::List { raw, .. } => !raw.is_empty(),
            Payload::Document { .. } => true,
        }
    }

    /// The original raw input, as reported in conversion-stage errors
    pub fn raw_value(&self) -> Value {
        match &self.payload {
            Payload::Scalar { raw, .. } => raw.clone().map(Value::String).unwrap_or(Value::Null),
            Payload::List { raw, .. } => {
                Value::Array(raw.iter().cloned().map(Value::String).collect())
            }
            Payload::Document { raw, .. } => Value::String(raw.clone()),
        }
    }
}

impl<E: 'static> InputSource<Vec<E>> {
    /// A repeated parameter; every element converts to `E`
    pub fn list(registry: Arc<ConversionRegistry>, raw: Vec<String>) -> Self {
        Self {
            target: TypeKey::of::<Vec<E>>(),
            payload: Payload::List {
                raw,
                registry,
                collect: ConversionRegistry::convert_list::<E>,
            },
        }
    }
}

impl<T: DeserializeOwned + 'static> InputSource<T> {
    /// Document text decoded through `mapper`
    pub fn document(mapper: Arc<dyn DocumentMapper>, raw: impl Into<String>) -> Self {
        Self {
            target: TypeKey::of::<T>(),
            payload: Payload::Document {
                raw: raw.into(),
                mapper,
                decode: deserialize::<T>,
            },
        }
    }
}

impl<T> fmt::Debug for InputSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("InputSource");
        debug.field("target", &self.target);
        match &self.payload {
            Payload::Scalar { raw, .. } => debug.field("scalar", raw),
            Payload::List { raw, .. } => debug.field("list", raw),
            Payload::Document { raw, mapper, .. } => {
                debug.field("document", raw).field("mapper", &mapper.name())
            }
        };
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonMapper;
    use serde_json::json;

    #[test]
    fn test_scalar_source() {
        let registry = Arc::new(ConversionRegistry::with_defaults());
        let source = InputSource::<i32>::scalar(registry.clone(), Some("42"));

        assert_eq!(source.kind(), InputKind::Scalar);
        assert!(source.is_present());
        assert_eq!(source.raw_value(), json!("42"));
        assert_eq!(source.target(), TypeKey::of::<i32>());

        let absent = InputSource::<i32>::scalar(registry, None);
        assert!(!absent.is_present());
        assert_eq!(absent.raw_value(), Value::Null);
    }

    #[test]
    fn test_list_source() {
        let registry = Arc::new(ConversionRegistry::with_defaults());
        let source = InputSource::<Vec<i32>>::list(registry, vec!["1".into(), "x".into()]);

        assert_eq!(source.kind(), InputKind::List);
        assert_eq!(source.raw_value(), json!(["1", "x"]));
        assert_eq!(source.target().short_name(), "Vec<i32>");
    }

    #[test]
    fn test_document_source() {
        let source = InputSource::<serde_json::Value>::document(Arc::new(JsonMapper), "{}");

        assert_eq!(source.kind(), InputKind::Document);
        assert!(source.is_present());
        assert_eq!(source.raw_value(), json!("{}"));
    }
}
