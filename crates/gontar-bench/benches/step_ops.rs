//! Criterion benchmarks for full vessel steps.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use gontar_bench::{reference_profile, seeded_vessel, stress_profile};
use gontar_engine::VesselConfig;

fn bench_step_10k(c: &mut Criterion) {
    let mut vessel = seeded_vessel(reference_profile(), 16, 42);

    // Warm up: apply the boundary and fault in all buffers.
    vessel.step();

    c.bench_function("step_10k", |b| {
        b.iter(|| {
            let frame = vessel.step();
            black_box(&frame);
        });
    });
}

fn bench_step_100k(c: &mut Criterion) {
    let mut vessel = seeded_vessel(stress_profile(), 64, 42);
    vessel.step();

    c.bench_function("step_100k", |b| {
        b.iter(|| {
            let frame = vessel.step();
            black_box(&frame);
        });
    });
}

fn bench_step_default_with_observer(c: &mut Criterion) {
    let mut vessel = seeded_vessel(VesselConfig::default(), 16, 7);
    let frames = vessel.frame_channel();
    vessel.step();

    c.bench_function("step_200x200_channel", |b| {
        b.iter(|| {
            vessel.step();
            black_box(frames.try_recv().ok());
        });
    });
}

criterion_group!(
    benches,
    bench_step_10k,
    bench_step_100k,
    bench_step_default_with_observer
);
criterion_main!(benches);
