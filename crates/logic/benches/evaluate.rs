//! Expression parsing and evaluation benchmarks
//!
//! Measures the two hot paths of rule validation:
//! - Parse throughput over expression trees of varying width
//! - Evaluation throughput over arrays of varying length
//!
//! Run benchmarks: `cargo bench --bench evaluate`
//!
//! Compare a specific group:
//! ```
//! cargo bench --bench evaluate -- "evaluate_scaling"
//! cargo bench --bench evaluate -- "parse"
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lattice_logic::{GasConfig, GasLimit, evaluate, evaluate_json, parse_expression, parse_value};
use serde_json::json;
use std::hint::black_box;

/// A rule in the shape the transaction layer actually evaluates:
/// bounds checks plus a sum over an array field.
fn transfer_rule() -> serde_json::Value {
    json!({"and": [
        {">": [{"var": "amount"}, 0]},
        {"<=": [{"var": "amount"}, {"var": "limits.max"}]},
        {"<": [
            {"reduce": [
                {"var": "recent"},
                {"+": [{"var": "accumulator"}, {"var": "current"}]},
                0
            ]},
            {"var": "limits.daily"}
        ]}
    ]})
}

fn transfer_payload(recent: usize) -> serde_json::Value {
    json!({
        "amount": 250,
        "limits": {"max": 1000, "daily": 1_000_000},
        "recent": (0..recent).map(|i| i as i64).collect::<Vec<_>>(),
    })
}

/// Parse throughput over rules with a growing operator count.
fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for clauses in [1, 8, 64] {
        let conjuncts: Vec<serde_json::Value> = (0..clauses)
            .map(|i| json!({"==": [{"var": format!("f{i}")}, i]}))
            .collect();
        let rule = json!({"and": conjuncts});

        group.throughput(Throughput::Elements(clauses as u64));
        group.bench_with_input(BenchmarkId::new("clauses", clauses), &rule, |b, rule| {
            b.iter(|| parse_expression(black_box(rule)).expect("parse"));
        });
    }

    group.finish();
}

/// Evaluation throughput as the iterated array grows.
fn benchmark_evaluate_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_scaling");
    let config = GasConfig::default();
    let rule = transfer_rule();

    for elements in [1, 10, 100, 1000] {
        let payload = transfer_payload(elements);

        group.throughput(Throughput::Elements(elements as u64));
        group.bench_with_input(
            BenchmarkId::new("recent_transfers", elements),
            &payload,
            |b, payload| {
                b.iter(|| {
                    evaluate_json(black_box(&rule), black_box(payload), &config, GasLimit::MAX)
                        .expect("evaluate")
                });
            },
        );
    }

    group.finish();
}

/// Cost of the JSON boundary: pre-parsed evaluation against the
/// parse-and-evaluate convenience path.
fn benchmark_reuse_vs_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("reuse_vs_json");
    let config = GasConfig::default();
    let rule = transfer_rule();
    let payload = transfer_payload(100);

    let parsed = parse_expression(&rule).expect("parse");
    let document = parse_value(&payload);

    group.bench_function("parsed_once", |b| {
        b.iter(|| {
            evaluate(
                black_box(&parsed),
                black_box(&document),
                &config,
                GasLimit::MAX,
            )
            .expect("evaluate")
        });
    });

    group.bench_function("json_every_call", |b| {
        b.iter(|| {
            evaluate_json(black_box(&rule), black_box(&payload), &config, GasLimit::MAX)
                .expect("evaluate")
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parse,
    benchmark_evaluate_scaling,
    benchmark_reuse_vs_json
);
criterion_main!(benches);
