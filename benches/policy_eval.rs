use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pbac::{Condition, ConditionOperator, Effect, PatternMatcher, Policy, PolicyEngine, Request};
use serde_json::json;

/// Create a mixed policy set with windows, wildcards and conditions
fn create_complex_policies() -> Vec<Policy> {
    vec![
        Policy::new("public-read", Effect::Allow, ["read:*"], ["*"], ["public/*"]),
        Policy::new("user-docs", Effect::Allow, ["read:*", "write:*"], ["user:*"], ["users/*/documents/*"])
            .with_window("2024-01-01 00:00", "2025-01-01 00:00"),
        Policy::new("it-admin", Effect::Allow, ["*"], ["admin:*"], ["system/*"])
            .with_condition(Condition::builtin(ConditionOperator::StringEquals, "department", json!("IT"))),
        Policy::new("system-freeze", Effect::Deny, ["write:*"], ["*"], ["system/*"]),
    ]
}

/// Benchmark a full evaluation for requests that end in each outcome
fn bench_policy_eval(c: &mut Criterion) {
    let policies = create_complex_policies();
    let engine = PolicyEngine::new();

    let mut group = c.benchmark_group("policy_eval");

    let cases = [
        ("allow", Request::new("read:md", "guest", "public/readme", "2024-06-01 12:00")),
        ("deny", Request::new("write:cfg", "admin:root", "system/cfg", "2024-06-01 12:00").with_attribute("department", "IT")),
        ("no_match", Request::new("delete", "guest", "private/x", "2024-06-01 12:00")),
    ];

    for (name, request) in cases.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(name), request, |b, request| {
            b.iter(|| black_box(engine.is_allowed(&policies, request).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark policy sets of growing size where nothing applies until the end
fn bench_policy_count(c: &mut Criterion) {
    let engine = PolicyEngine::new();
    let request = Request::new("read:txt", "alice", "bucket/last", "2024-06-01 12:00");

    let mut group = c.benchmark_group("policy_count");

    for count in [10usize, 100, 1_000] {
        let mut policies: Vec<Policy> = (0..count)
            .map(|i| Policy::new(format!("p{i}"), Effect::Allow, ["read:*"], ["*"], [format!("bucket/{i}/*")]))
            .collect();
        policies.push(Policy::new("last", Effect::Allow, ["read:*"], ["*"], ["bucket/last"]));

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &policies, |b, policies| {
            b.iter(|| black_box(engine.is_allowed(policies, &request).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark wildcard pattern matching performance
fn bench_wildcard_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("wildcard_matching");

    group.bench_function("literal", |b| {
        b.iter(|| black_box(PatternMatcher::matches_pattern("users/alice/documents", "users/alice/documents")));
    });

    group.bench_function("suffix_wildcard", |b| {
        b.iter(|| black_box(PatternMatcher::matches_pattern("users/*", "users/alice/documents/report.pdf")));
    });

    group.bench_function("infix_wildcards", |b| {
        b.iter(|| black_box(PatternMatcher::matches_pattern("projects/*/code/*.rs", "projects/p1/code/src/main.rs")));
    });

    group.finish();
}

criterion_group!(benches, bench_policy_eval, bench_policy_count, bench_wildcard_matching);
criterion_main!(benches);
