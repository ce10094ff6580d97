//! Benchmarks for budget-conserving allocation

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use regen_economics::*;

fn bench_allocate(c: &mut Criterion) {
    let weights: Vec<f64> = (0..128).map(|i| 1.0 + (i % 7) as f64 * 0.025).collect();

    c.bench_function("allocate_128_recipients", |b| {
        b.iter(|| allocate(black_box(1_000_000_007), black_box(&weights)))
    });
}

fn bench_authority_epoch(c: &mut Criterion) {
    let config = AllocationConfig {
        fee_total: 25_000_000,
        validator_fraction: 0.5,
        burn_fraction: 0.2,
        beta_max: DEFAULT_BETA_MAX,
    };
    let authorities: Vec<Authority> = (0..21)
        .map(|i| Authority::new(format!("regen-auth-{i}"), (i % 4) as f64 * 0.05))
        .collect();

    c.bench_function("simulate_authority_epoch", |b| {
        b.iter(|| simulate_epoch(black_box(&config), black_box(&authorities)))
    });
}

criterion_group!(benches, bench_allocate, bench_authority_epoch);
criterion_main!(benches);
