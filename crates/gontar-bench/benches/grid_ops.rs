//! Criterion benchmarks for grid-level operations: injection, the
//! buffer transfer, boundary application, and the interior reaction pass.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use gontar_core::{BoundaryCondition, Iteration, KineticParams};
use gontar_grid::{BufferPair, ConcentrationGrid};
use gontar_kinetics::{apply_boundary, GontarKinetics};
use gontar_test_utils::{scatter_injections, small_vessel};

fn bench_inject(c: &mut Criterion) {
    let vessel = small_vessel(200, 200);
    let handle = vessel.handle();
    let pattern = scatter_injections(42, 256, (200, 200));

    c.bench_function("inject_256", |b| {
        b.iter(|| {
            for s in &pattern {
                black_box(handle.inject(s.x, s.y, s.injection));
            }
        });
    });
}

fn bench_transfer(c: &mut Criterion) {
    let mut pair = BufferPair::new(ConcentrationGrid::new(200, 200));

    c.bench_function("begin_step_publish_200x200", |b| {
        b.iter(|| {
            let guard = pair.begin_step();
            black_box(&guard.current);
            black_box(pair.publish(Iteration(1)));
        });
    });
}

fn bench_apply_boundary(c: &mut Criterion) {
    let mut grid = ConcentrationGrid::new(1000, 1000);

    c.bench_function("apply_boundary_1000x1000", |b| {
        b.iter(|| {
            black_box(apply_boundary(&mut grid, BoundaryCondition::YSine));
        });
    });
}

fn bench_react_interior(c: &mut Criterion) {
    let kinetics = GontarKinetics::new(KineticParams::default());
    let current = ConcentrationGrid::new(100, 100);
    let mut next = current.clone();

    c.bench_function("react_interior_10k", |b| {
        b.iter(|| {
            black_box(kinetics.react_interior(&current, &mut next));
        });
    });
}

criterion_group!(
    benches,
    bench_inject,
    bench_transfer,
    bench_apply_boundary,
    bench_react_interior
);
criterion_main!(benches);
