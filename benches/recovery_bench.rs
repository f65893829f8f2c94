//! Benchmarks for lockscreen credential recovery.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use droid_triage::config::PinLengths;
use droid_triage::credential::{
    pattern_digest, recover_pattern, CredentialHash, CredentialRecoveryEngine, HashScheme,
};

/// Single-candidate cost of each scheme
fn bench_scheme_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheme_digest");

    for scheme in [HashScheme::LegacyOneRound, HashScheme::Strengthened1024Round] {
        group.bench_with_input(BenchmarkId::new("digest", scheme), &scheme, |b, scheme| {
            b.iter(|| scheme.digest(black_box("4821"), black_box(-6_917_529_027_641_081_856)));
        });
    }

    group.finish();
}

/// Full four-digit search for the worst-case PIN, by worker count
fn bench_legacy_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("legacy_pin_search");
    group.throughput(Throughput::Elements(10_000));
    let hash = CredentialHash::for_pin("9999", 1_234_567_890, HashScheme::LegacyOneRound);

    for workers in [1, 2, 4, num_cpus::get()] {
        let engine = CredentialRecoveryEngine::new(PinLengths::default(), workers);
        group.bench_with_input(BenchmarkId::new("workers", workers), &engine, |b, engine| {
            b.iter(|| engine.recover(black_box(&hash)));
        });
    }

    group.finish();
}

fn bench_strengthened_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("strengthened_pin_search");
    group.sample_size(10);
    let hash = CredentialHash::for_pin("0500", 1_234_567_890, HashScheme::Strengthened1024Round);
    let engine = CredentialRecoveryEngine::new(PinLengths::default(), num_cpus::get());

    group.bench_function("pin_0500", |b| {
        b.iter(|| engine.recover(black_box(&hash)));
    });

    group.finish();
}

fn bench_gesture_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("gesture_search");
    group.sample_size(10);

    for nodes in [vec![8, 7, 6, 5], vec![8, 7, 6, 5, 4, 3, 2]] {
        let digest = pattern_digest(&nodes);
        group.bench_with_input(BenchmarkId::new("nodes", nodes.len()), &digest, |b, digest| {
            b.iter(|| recover_pattern(black_box(digest), num_cpus::get()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_scheme_digest,
    bench_legacy_search,
    bench_strengthened_search,
    bench_gesture_search
);
criterion_main!(benches);
