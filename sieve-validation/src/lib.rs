//! Lazy type coercion and rule validation for Sieve
//!
//! Turns raw, untyped input (a single string parameter, a repeated parameter,
//! or a request body) into a typed value, or into a per-field collection of
//! validation errors. Every validator resolves exactly once, on first read,
//! no matter how many times or from how many threads it is queried.
//!
//! # Examples
//!
//! ## Request parameters
//!
//! ```
//! use sieve_validation::{InRange, Validation, NULLCHECK_FAILED};
//!
//! let validation = Validation::builder().build();
//!
//! let page = validation
//!     .scalar::<u32>("page", Some("3"))
//!     .with(InRange { min: 1, max: 100 });
//! assert_eq!(page.get().unwrap(), &3);
//!
//! let limit = validation.scalar::<u32>("limit", None);
//! let err = limit.get().unwrap_err();
//! assert_eq!(err.field_errors("limit")[0].message, NULLCHECK_FAILED);
//! ```
//!
//! ## Optional parameters
//!
//! ```
//! use sieve_validation::{MinLength, Validation};
//!
//! let validation = Validation::default();
//! let search = validation.nullable::<String>("q", None).with(MinLength(2));
//!
//! assert_eq!(search.get().unwrap(), None);
//! ```
//!
//! ## Request bodies
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use sieve_validation::{Validation, REQUEST_BODY};
//!
//! #[derive(Deserialize, Serialize)]
//! struct Signup {
//!     email: String,
//!     password: String,
//! }
//!
//! let validation = Validation::default();
//! let body = validation
//!     .body::<Signup>(r#"{"email": "a@b.io", "password": "123"}"#)
//!     .check_field("password", |s| s.password.len() >= 8, "PASSWORD_TOO_SHORT")
//!     .check(|s| s.email != s.password, "PASSWORD_EQUALS_EMAIL");
//!
//! let errors = body.errors();
//! assert_eq!(errors["password"][0].message, "PASSWORD_TOO_SHORT");
//! assert!(!errors.contains_key(REQUEST_BODY));
//! ```
//!
//! ## Rendering errors
//!
//! ```
//! use sieve_validation::{validate_all, Validation};
//!
//! let validation = Validation::default();
//! let id = validation.scalar::<u64>("id", Some("abc"));
//! let size = validation.scalar::<u8>("size", Some("999"));
//!
//! let err = validate_all(&[&id, &size]).unwrap_err();
//! let response = validation.render(&err);
//!
//! assert_eq!(response.status, 400);
//! assert_eq!(err.fields().collect::<Vec<_>>(), vec!["id", "size"]);
//! ```

mod checks;
mod engine;
mod errors;
mod mapper;
mod registry;
mod response;
mod rules;
mod settings;
mod source;
mod validation;
mod validator;

pub use checks::*;
pub use engine::*;
pub use errors::*;
pub use mapper::*;
pub use registry::*;
pub use response::*;
pub use rules::*;
pub use settings::*;
pub use source::*;
pub use validation::*;
pub use validator::*;
