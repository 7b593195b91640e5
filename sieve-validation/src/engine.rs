//! Validation engine
//!
//! [`ValidationEngine`] is the state machine shared by every validator
//! variant. It starts unresolved; the first query converts the raw input,
//! evaluates the attached rules, and publishes the outcome through a
//! [`OnceCell`]. Concurrent first queries block on the cell, so resolution
//! (and every converter call) happens exactly once per engine.
//!
//! Resolution order:
//!
//! 1. A preset typed value skips conversion.
//! 2. Documents are deserialized; failure reports `DESERIALIZATION_FAILED`
//!    under `REQUEST_BODY` and skips rules.
//! 3. Scalars and lists are converted through the registry; failure reports
//!    `TYPE_CONVERSION_FAILED`, a null result on a non-nullable engine
//!    reports `NULLCHECK_FAILED`. Both skip rules.
//! 4. Every rule runs in attachment order and each failure is appended under
//!    the rule's own field.

use crate::source::Payload;
use crate::{
    DESERIALIZATION_FAILED, ErrorMap, InputSource, LateRulePolicy, NULLCHECK_FAILED,
    REQUEST_BODY, Rule, TYPE_CONVERSION_FAILED, TypeKey, ValidationError, ValidationSettings,
};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

/// Whether a null conversion result is an accepted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    NonNullable,
    Nullable,
}

enum Seed<T> {
    Value(Option<T>),
    Source(InputSource<T>),
}

/// Outcome of resolving an engine: the typed value and the per-field errors.
#[derive(Debug)]
pub struct Resolution<T> {
    value: Option<T>,
    errors: ErrorMap,
}

impl<T> Resolution<T> {
    /// The resolved value; `None` if conversion failed or produced null
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Errors keyed by field
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// `true` when no errors were recorded
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Split into value and errors
    pub fn into_parts(self) -> (Option<T>, ErrorMap) {
        (self.value, self.errors)
    }
}

/// Lazy, resolve-once conversion and rule evaluation for one field.
pub struct ValidationEngine<T> {
    field: String,
    nullability: Nullability,
    target: TypeKey,
    raw_present: bool,
    seed: Mutex<Option<Seed<T>>>,
    rules: Vec<Rule<T>>,
    settings: ValidationSettings,
    resolution: OnceCell<Resolution<T>>,
}

impl<T: Serialize + 'static> ValidationEngine<T> {
    /// Engine that converts `source` on first read
    pub fn new(field: impl Into<String>, nullability: Nullability, source: InputSource<T>) -> Self {
        Self {
            field: field.into(),
            nullability,
            target: source.target(),
            raw_present: source.is_present(),
            seed: Mutex::new(Some(Seed::Source(source))),
            rules: Vec::new(),
            settings: ValidationSettings::default(),
            resolution: OnceCell::new(),
        }
    }

    /// Engine over an already-typed value; conversion is skipped
    pub fn from_value(field: impl Into<String>, nullability: Nullability, value: Option<T>) -> Self {
        Self {
            field: field.into(),
            nullability,
            target: TypeKey::of::<T>(),
            raw_present: value.is_some(),
            seed: Mutex::new(Some(Seed::Value(value))),
            rules: Vec::new(),
            settings: ValidationSettings::default(),
            resolution: OnceCell::new(),
        }
    }

    /// Apply shared settings
    pub fn with_settings(mut self, settings: &ValidationSettings) -> Self {
        self.settings = settings.clone();
        self
    }

    pub(crate) fn set_nullability(&mut self, nullability: Nullability) {
        self.nullability = nullability;
    }

    /// Field this engine validates
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Target type of the conversion
    pub fn target(&self) -> TypeKey {
        self.target
    }

    /// Current nullability policy
    pub fn nullability(&self) -> Nullability {
        self.nullability
    }

    /// Whether any raw input (or preset value) was supplied
    pub fn raw_present(&self) -> bool {
        self.raw_present
    }

    /// Number of attached rules
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Whether resolution has already happened
    pub fn is_resolved(&self) -> bool {
        self.resolution.get().is_some()
    }

    /// Append a rule.
    ///
    /// Rules attached after resolution are never evaluated; the policy in
    /// [`ValidationSettings::late_rules`] decides whether that is logged.
    pub fn attach(&mut self, rule: Rule<T>) {
        if self.is_resolved() {
            if self.settings.late_rules == LateRulePolicy::Warn {
                tracing::warn!(
                    field = %self.field,
                    rule_field = %rule.field(),
                    error = %rule.error().message,
                    "Rule attached after validator was resolved; it will not be evaluated"
                );
            }
            return;
        }
        self.rules.push(rule);
    }

    /// Resolve (at most once) and return the outcome.
    ///
    /// The seed is only consumed once evaluation completes, so a panicking
    /// converter or predicate leaves the engine unresolved and the next read
    /// evaluates the original input again.
    pub fn resolve(&self) -> &Resolution<T> {
        self.resolution.get_or_init(|| {
            let mut seed = self.seed.lock();
            self.evaluate(&mut seed)
        })
    }

    /// Errors keyed by field; triggers resolution
    pub fn errors(&self) -> &ErrorMap {
        self.resolve().errors()
    }

    /// Resolve if needed and take ownership of the outcome
    pub fn into_resolution(mut self) -> Resolution<T> {
        match self.resolution.take() {
            Some(resolution) => resolution,
            None => {
                let mut seed = self.seed.get_mut().take();
                self.evaluate(&mut seed)
            }
        }
    }

    fn evaluate(&self, seed: &mut Option<Seed<T>>) -> Resolution<T> {
        let converted = match seed.as_ref() {
            Some(Seed::Source(source)) => match self.coerce(source) {
                Ok(value) => Some(value),
                Err(errors) => {
                    seed.take();
                    return self.finish(None, errors);
                }
            },
            Some(Seed::Value(_)) => None,
            None => {
                // The seed is only taken by a completed evaluation
                let errors = match self.nullability {
                    Nullability::NonNullable => single(&self.field, NULLCHECK_FAILED, Value::Null),
                    Nullability::Nullable => ErrorMap::new(),
                };
                return self.finish(None, errors);
            }
        };

        let errors = match (&converted, seed.as_ref()) {
            (Some(value), _) => self.check_rules(value.as_ref()),
            (None, Some(Seed::Value(value))) => self.check_rules(value.as_ref()),
            _ => ErrorMap::new(),
        };

        let value = match (converted, seed.take()) {
            (Some(value), _) => value,
            (None, Some(Seed::Value(value))) => value,
            _ => None,
        };
        self.finish(value, errors)
    }

    fn check_rules(&self, value: Option<&T>) -> ErrorMap {
        let mut errors = ErrorMap::new();
        let mut snapshot: Option<Option<Value>> = None;
        for rule in &self.rules {
            if rule.test(value) {
                continue;
            }
            let rendered = snapshot
                .get_or_insert_with(|| value.and_then(|v| serde_json::to_value(v).ok()))
                .clone();
            let mut error = rule.error().clone();
            error.value = rendered;
            errors.entry(rule.field().to_string()).or_default().push(error);
        }
        errors
    }

    fn coerce(&self, source: &InputSource<T>) -> Result<Option<T>, ErrorMap> {
        let raw = source.raw_value();
        let converted = match &source.payload {
            Payload::Document {
                raw: text,
                mapper,
                decode,
            } => {
                return decode(mapper.as_ref(), text).map(Some).map_err(|err| {
                    if self.settings.log_failures {
                        tracing::info!(
                            target_type = %self.target,
                            mapper = mapper.name(),
                            error = %err,
                            "Couldn't deserialize body"
                        );
                    }
                    single(REQUEST_BODY, DESERIALIZATION_FAILED, raw)
                });
            }
            Payload::Scalar { raw: text, registry } => {
                registry.convert_optional::<T>(text.as_deref())
            }
            Payload::List {
                raw: items,
                registry,
                collect,
            } => collect(registry, items),
        };

        match converted {
            Ok(None) if self.nullability == Nullability::NonNullable => {
                Err(single(&self.field, NULLCHECK_FAILED, raw))
            }
            Ok(value) => Ok(value),
            Err(err) => {
                if self.settings.log_failures {
                    tracing::info!(
                        field = %self.field,
                        value = %raw,
                        target_type = %self.target,
                        error = %err,
                        "Parameter is not a valid value of the target type"
                    );
                }
                Err(single(&self.field, TYPE_CONVERSION_FAILED, raw))
            }
        }
    }

    fn finish(&self, value: Option<T>, errors: ErrorMap) -> Resolution<T> {
        tracing::debug!(
            field = %self.field,
            target_type = %self.target,
            failed_fields = errors.len(),
            "Resolved validator"
        );
        Resolution { value, errors }
    }
}

fn single(field: &str, message: &str, raw: Value) -> ErrorMap {
    let mut errors = ErrorMap::new();
    errors.insert(
        field.to_string(),
        vec![ValidationError::new(message).with_value(raw)],
    );
    errors
}
