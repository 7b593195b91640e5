// Exception mapping

use crate::ValidationException;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Rendered error response
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl ErrorResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Response with a JSON body and content type
    pub fn json<T: Serialize>(status: u16, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(body))
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Parse the body back into JSON
    pub fn body_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Turns a [`ValidationException`] into a response.
pub trait ExceptionMapper: Send + Sync + 'static {
    fn map(&self, exception: &ValidationException) -> ErrorResponse;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> ExceptionMapper for F
where
    F: Fn(&ValidationException) -> ErrorResponse + Send + Sync + 'static,
{
    fn map(&self, exception: &ValidationException) -> ErrorResponse {
        self(exception)
    }
}

/// Renders the error mapping as a JSON object keyed by field.
#[derive(Debug, Clone, Copy)]
pub struct DefaultExceptionMapper {
    status: u16,
}

impl DefaultExceptionMapper {
    pub fn new(status: u16) -> Self {
        Self { status }
    }

    pub fn status(&self) -> u16 {
        self.status
    }
}

impl Default for DefaultExceptionMapper {
    fn default() -> Self {
        Self::new(400)
    }
}

impl ExceptionMapper for DefaultExceptionMapper {
    fn map(&self, exception: &ValidationException) -> ErrorResponse {
        let body = exception.to_json().to_string().into_bytes();
        ErrorResponse::new(self.status)
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    fn name(&self) -> &str {
        "default"
    }
}

/// The exception mapper slot of a validation configuration.
///
/// A user mapper always wins: [`register_default`](Self::register_default)
/// only fills an empty slot, so registering the default before and after user
/// configuration leaves a user mapper in place.
#[derive(Clone, Default)]
pub struct ExceptionMappers {
    mapper: Option<Arc<dyn ExceptionMapper>>,
}

impl ExceptionMappers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `mapper`, replacing any previous one
    pub fn register<M: ExceptionMapper>(&mut self, mapper: M) -> &mut Self {
        self.register_arc(Arc::new(mapper))
    }

    pub fn register_arc(&mut self, mapper: Arc<dyn ExceptionMapper>) -> &mut Self {
        tracing::debug!(mapper = mapper.name(), "Registered exception mapper");
        self.mapper = Some(mapper);
        self
    }

    /// Install the default mapper unless one is already present.
    ///
    /// Returns `true` if the default was installed.
    pub fn register_default(&mut self, status: u16) -> bool {
        if self.mapper.is_some() {
            return false;
        }
        self.register(DefaultExceptionMapper::new(status));
        true
    }

    pub fn is_registered(&self) -> bool {
        self.mapper.is_some()
    }

    pub fn mapper_name(&self) -> Option<&str> {
        self.mapper.as_deref().map(|m| m.name())
    }

    /// Render `exception` with the installed mapper, or the default one
    pub fn render(&self, exception: &ValidationException) -> ErrorResponse {
        match &self.mapper {
            Some(mapper) => mapper.map(exception),
            None => DefaultExceptionMapper::default().map(exception),
        }
    }
}
