//! Integration tests for common Sieve workflows.
//!
//! These tests drive the validation layer the way a request handler would:
//! configure once at startup, then validate query parameters and bodies per
//! request.

use serde::{Deserialize, Serialize};
use sieve::prelude::*;
use sieve::{FileFormat, LateRulePolicy, NULLCHECK_FAILED, REQUEST_BODY, TYPE_CONVERSION_FAILED};
use std::collections::HashMap;
use std::str::FromStr;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
enum Sort {
    Newest,
    Oldest,
}

impl FromStr for Sort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "newest" => Ok(Sort::Newest),
            "oldest" => Ok(Sort::Oldest),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct Address {
    street: String,
    zip: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct Order {
    customer_email: String,
    quantity: u32,
    address: Address,
}

// =============================================================================
// Startup
// =============================================================================

fn configure() -> Validation {
    let config = ConfigManager::new();
    config
        .load_str("[validation]\nerror_status = 422", FileFormat::Toml)
        .unwrap();

    AppConfig::from_config(&config)
        .unwrap()
        .apply_user_config(|builder| {
            builder.from_str_converter::<Sort>();
        })
        .unwrap()
}

fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// =============================================================================
// Query parameters
// =============================================================================

#[test]
fn test_list_endpoint_parameters() {
    init_tracing();
    let validation = configure();
    let params = query(&[("page", "2"), ("sort", "Oldest")]);

    let page = validation
        .scalar::<u32>("page", params.get("page").map(String::as_str))
        .with(Min(1));
    let per_page = validation
        .scalar::<u32>("per_page", params.get("per_page").map(String::as_str))
        .with(InRange { min: 1, max: 100 });
    let sort = validation.nullable::<Sort>("sort", params.get("sort").map(String::as_str));

    validate_all(&[&page, &sort]).unwrap();
    assert_eq!(page.get().unwrap(), &2);
    assert_eq!(per_page.get_or_default(20).unwrap(), 20);
    assert_eq!(sort.get().unwrap(), Some(&Sort::Oldest));
}

#[test]
fn test_invalid_parameters_render_one_response() {
    init_tracing();
    let validation = configure();
    let params = query(&[("page", "two"), ("sort", "random")]);

    let page = validation.scalar::<u32>("page", params.get("page").map(String::as_str));
    let limit = validation.scalar::<u32>("limit", params.get("limit").map(String::as_str));
    let sort = validation.nullable::<Sort>("sort", params.get("sort").map(String::as_str));

    let err = validate_all(&[&page, &limit, &sort]).unwrap_err();
    let response = validation.render(&err);

    assert_eq!(response.status, 422);
    let body = response.body_json().unwrap();
    assert_eq!(body["page"][0]["message"], TYPE_CONVERSION_FAILED);
    assert_eq!(body["page"][0]["value"], "two");
    assert_eq!(body["limit"][0]["message"], NULLCHECK_FAILED);
    assert_eq!(body["sort"][0]["message"], TYPE_CONVERSION_FAILED);
}

#[test]
fn test_repeated_parameter() {
    let validation = configure();

    let ids = validation
        .list::<u64>("id", vec!["4".into(), "8".into(), "15".into()])
        .check(|ids| ids.len() <= 10, "TOO_MANY_IDS");
    assert_eq!(ids.into_inner().unwrap(), vec![4, 8, 15]);

    let ids = validation.list::<u64>("id", vec!["4".into(), "-8".into()]);
    assert_eq!(ids.errors()["id"][0].message, TYPE_CONVERSION_FAILED);
}

// =============================================================================
// Request bodies
// =============================================================================

#[test]
fn test_order_body() {
    init_tracing();
    let validation = configure();
    let raw = r#"{
        "customer_email": "buyer@example.com",
        "quantity": 0,
        "address": {"street": "1 Main St", "zip": "ABCDE"}
    }"#;

    let zip = Matches::new(r"^\d{5}$").unwrap();
    let order = validation
        .body::<Order>(raw)
        .check_field("customer_email", |o| IsEmail.test(&o.customer_email), "IS_EMAIL")
        .check_field("quantity", |o| o.quantity > 0, "QUANTITY_REQUIRED")
        .check_field("address.zip", move |o| zip.test(&o.address.zip), "ZIP_INVALID");

    let errors = order.errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors["quantity"][0].message, "QUANTITY_REQUIRED");
    assert_eq!(errors["address.zip"][0].message, "ZIP_INVALID");
    assert_eq!(errors["address.zip"][0].value.as_ref().unwrap()["quantity"], 0);
}

#[test]
fn test_malformed_body() {
    let validation = configure();
    let order = validation
        .body::<Order>("{\"customer_email\": ")
        .check(|o| o.quantity < 1000, "TOO_MANY");

    let err = order.get().unwrap_err();
    assert_eq!(err.fields().collect::<Vec<_>>(), vec![REQUEST_BODY]);

    let body = validation.render(&err).body_json().unwrap();
    assert_eq!(body[REQUEST_BODY][0]["message"], "DESERIALIZATION_FAILED");
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_env_style_settings() {
    let config = ConfigManager::new();
    config
        .load_str(
            "VALIDATION__LATE_RULES=ignore\nVALIDATION__LOG_FAILURES=false",
            FileFormat::Env,
        )
        .unwrap();

    let validation = AppConfig::from_config(&config)
        .unwrap()
        .apply_user_config(|_| {})
        .unwrap();

    assert_eq!(validation.settings().late_rules, LateRulePolicy::Ignore);
    assert!(!validation.settings().log_failures);
    assert_eq!(validation.render(&ValidationException::new(ErrorMap::new())).status, 400);
}

#[test]
fn test_global_installation() {
    let validation = AppConfig::default()
        .install(|builder| {
            builder.from_str_converter::<Sort>();
        })
        .unwrap();

    assert!(std::ptr::eq(validation, Validation::global()));
    assert!(Validation::global().registry().contains::<Sort>());
    assert!(matches!(
        Validation::default().install(),
        Err(sieve::SetupError::AlreadyInstalled)
    ));
}
