// Conversion registry

use crate::ConversionError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

type ConvertFn<T> = dyn Fn(&str) -> Result<Option<T>, ConversionError> + Send + Sync;

/// Stable identifier of a conversion target type.
///
/// Equality and hashing use the [`TypeId`]; the type name is kept for
/// diagnostics only.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for the type `T`
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path, e.g. `Vec<i32>` for `alloc::vec::Vec<i32>`
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        match base.rfind("::") {
            Some(idx) => &self.name[idx + 2..],
            None => self.name,
        }
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Maps target types to string converters.
///
/// Converters are registered while the registry is still exclusively owned
/// (`&mut self`); once it is shared behind an `Arc` it is read-only, so
/// registration can never race with lookups.
pub struct ConversionRegistry {
    converters: HashMap<TypeKey, Box<dyn Any + Send + Sync>>,
}

impl ConversionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in primitive converters
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_defaults();
        registry
    }

    /// Register converters for `String`, `bool`, `char`, and all primitive
    /// integer and float types
    pub fn register_defaults(&mut self) -> &mut Self {
        macro_rules! from_str {
            ($registry:expr; $($ty:ty),+ $(,)?) => {
                $( $registry.register_from_str::<$ty>(); )+
            };
        }

        self.register::<String, std::convert::Infallible, _>(|raw| Ok(raw.to_string()));
        self.register::<bool, _, _>(parse_bool);
        from_str!(self; char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
        self
    }

    /// Register a converter for `T`, replacing any previous one
    pub fn register<T, E, F>(&mut self, converter: F) -> &mut Self
    where
        T: 'static,
        E: fmt::Display,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        let key = TypeKey::of::<T>();
        self.insert::<T>(Box::new(move |raw: &str| {
            converter(raw)
                .map(Some)
                .map_err(|e| invalid(key, raw, e))
        }))
    }

    /// Register a converter for `T` that may legitimately produce null
    pub fn register_nullable<T, E, F>(&mut self, converter: F) -> &mut Self
    where
        T: 'static,
        E: fmt::Display,
        F: Fn(&str) -> Result<Option<T>, E> + Send + Sync + 'static,
    {
        let key = TypeKey::of::<T>();
        self.insert::<T>(Box::new(move |raw: &str| {
            converter(raw).map_err(|e| invalid(key, raw, e))
        }))
    }

    /// Register `T`'s [`FromStr`] implementation, typically for enum-like types
    pub fn register_from_str<T>(&mut self) -> &mut Self
    where
        T: FromStr + 'static,
        T::Err: fmt::Display,
    {
        self.register::<T, T::Err, _>(|raw| raw.parse::<T>())
    }

    fn insert<T: 'static>(&mut self, converter: Box<ConvertFn<T>>) -> &mut Self {
        let key = TypeKey::of::<T>();
        if self.converters.insert(key, Box::new(converter)).is_some() {
            tracing::debug!(target_type = %key, "Replaced converter");
        }
        self
    }

    /// Check whether a converter is registered for `T`
    pub fn contains<T: 'static>(&self) -> bool {
        self.converters.contains_key(&TypeKey::of::<T>())
    }

    /// Number of registered converters
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Check if no converters are registered
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Convert a raw string to `T`
    pub fn convert<T: 'static>(&self, raw: &str) -> Result<Option<T>, ConversionError> {
        let converter = self.converter::<T>()?;
        converter(raw)
    }

    /// Convert an optional raw string; an absent value converts to null.
    ///
    /// The converter lookup happens first, so a missing converter is reported
    /// even when there is nothing to convert.
    pub fn convert_optional<T: 'static>(
        &self,
        raw: Option<&str>,
    ) -> Result<Option<T>, ConversionError> {
        let converter = self.converter::<T>()?;
        match raw {
            Some(raw) => converter(raw),
            None => Ok(None),
        }
    }

    /// Convert every element of a list; any failure fails the whole list.
    ///
    /// An empty list converts to null. A converter producing null for an
    /// element is a conversion failure, since a list never holds nulls.
    pub fn convert_list<T: 'static>(
        &self,
        raw: &[String],
    ) -> Result<Option<Vec<T>>, ConversionError> {
        let converter = self.converter::<T>()?;
        if raw.is_empty() {
            return Ok(None);
        }

        raw.iter()
            .map(|element| {
                converter(element)?.ok_or_else(|| ConversionError::NullElement {
                    type_name: TypeKey::of::<T>().short_name(),
                    value: element.clone(),
                })
            })
            .collect::<Result<Vec<T>, _>>()
            .map(Some)
    }

    fn converter<T: 'static>(&self) -> Result<&ConvertFn<T>, ConversionError> {
        let key = TypeKey::of::<T>();
        self.converters
            .get(&key)
            .and_then(|boxed| boxed.downcast_ref::<Box<ConvertFn<T>>>())
            .map(|converter| converter.as_ref())
            .ok_or(ConversionError::MissingConverter {
                type_name: key.short_name(),
            })
    }
}

impl Default for ConversionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ConversionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.converters.keys()).finish()
    }
}

fn invalid(key: TypeKey, raw: &str, reason: impl fmt::Display) -> ConversionError {
    ConversionError::Invalid {
        type_name: key.short_name(),
        value: raw.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err("expected 'true' or 'false'".to_string())
    }
}
