use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde::{Deserialize, Serialize};
use sieve::*;
use std::sync::Arc;

#[derive(Deserialize, Serialize)]
struct Signup {
    name: String,
    email: String,
    age: u32,
}

const SIGNUP: &str = r#"{"name": "Ada", "email": "ada@example.com", "age": 36}"#;

fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion");
    let registry = ConversionRegistry::with_defaults();

    group.bench_function("i64", |b| {
        b.iter(|| registry.convert::<i64>(black_box("1234567")))
    });

    group.bench_function("bool", |b| {
        b.iter(|| registry.convert::<bool>(black_box("TRUE")))
    });

    let items: Vec<String> = (0..32).map(|i| i.to_string()).collect();
    group.bench_function("list_32_u32", |b| {
        b.iter(|| registry.convert_list::<u32>(black_box(&items)))
    });

    group.finish();
}

fn bench_scalar_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalar_resolution");
    let validation = Validation::default();

    group.bench_function("valid_no_rules", |b| {
        b.iter(|| {
            let page = validation.scalar::<u32>("page", black_box(Some("42")));
            page.is_valid()
        })
    });

    group.bench_function("valid_three_checks", |b| {
        b.iter(|| {
            let email = validation
                .scalar::<String>("email", black_box(Some("user@example.com")))
                .with(NotEmpty)
                .with(MaxLength(254))
                .with(IsEmail);
            email.is_valid()
        })
    });

    group.bench_function("conversion_failure", |b| {
        b.iter(|| {
            let page = validation.scalar::<u32>("page", black_box(Some("forty-two")));
            page.errors().len()
        })
    });

    group.finish();
}

fn bench_cached_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_reads");
    let registry = Arc::new(ConversionRegistry::with_defaults());
    let page = Validator::<u32>::new("page", InputSource::scalar(registry, Some("7")));
    page.is_valid();

    group.bench_function("get_after_resolution", |b| {
        b.iter(|| black_box(&page).get().is_ok())
    });

    group.finish();
}

fn bench_body_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("body_resolution");
    let validation = Validation::default();

    group.bench_function("signup_with_rules", |b| {
        b.iter(|| {
            let body = validation
                .body::<Signup>(black_box(SIGNUP))
                .check_field("name", |s| !s.name.is_empty(), "NAME_REQUIRED")
                .check_field("email", |s| IsEmail.test(&s.email), "IS_EMAIL")
                .check_field("age", |s| s.age >= 18, "TOO_YOUNG");
            body.is_valid()
        })
    });

    group.bench_function("malformed", |b| {
        b.iter(|| {
            let body = validation.body::<Signup>(black_box("{\"name\": "));
            body.errors().len()
        })
    });

    group.finish();
}

fn bench_checks(c: &mut Criterion) {
    use regex::Regex;

    let mut group = c.benchmark_group("checks");
    let text = "Hello World 123".to_string();
    let uuid = "550e8400-e29b-41d4-a716-446655440000".to_string();
    let phone = Matches(Regex::new(r"^\d{3}-\d{3}-\d{4}$").unwrap());
    let phone_number = "123-456-7890".to_string();

    group.bench_function("min_length", |b| {
        b.iter(|| MinLength(5).test(black_box(&text)))
    });

    group.bench_function("is_uuid", |b| b.iter(|| IsUuid.test(black_box(&uuid))));

    group.bench_function("matches_phone", |b| {
        b.iter(|| phone.test(black_box(&phone_number)))
    });

    group.bench_function("in_range_i32", |b| {
        let range = InRange { min: 1, max: 100 };
        b.iter(|| range.test(black_box(&50i32)))
    });

    group.finish();
}

criterion_group!(
    validation_benches,
    bench_conversion,
    bench_scalar_resolution,
    bench_cached_reads,
    bench_body_resolution,
    bench_checks,
);

criterion_main!(validation_benches);
