// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_benches::{clustered_points, uniform_points};
use understory_point_index::{Aabb2D, Backend, PointIndex, PointIndexGeneric};

/// Build over `points`, then run one footprint-sized query per point.
fn build_and_sweep<B: Backend<f64>>(mut idx: PointIndexGeneric<f64, u32, B>, points: &[(f64, f64)]) {
    idx.build(
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| (x, y, i as u32)),
    );
    let mut hits = 0_usize;
    for &(x, y) in points {
        idx.visit_range(Aabb2D::new(x - 85.0, y - 85.0, x + 85.0, y + 85.0), |_, _| {
            hits += 1;
        });
    }
    black_box(hits);
}

fn bench_backends(c: &mut Criterion) {
    for (name, points) in [
        ("uniform_4096", uniform_points(4096, 1920.0, 1080.0)),
        ("clustered_64x64", clustered_points(64, 64, 30.0)),
    ] {
        let mut group = c.benchmark_group(name);
        group.throughput(Throughput::Elements(points.len() as u64));
        group.bench_function("kdtree", |b| {
            b.iter_batched(
                PointIndex::<f64, u32>::new,
                |idx| build_and_sweep(idx, &points),
                BatchSize::SmallInput,
            );
        });
        group.bench_function("grid", |b| {
            b.iter_batched(
                || PointIndex::<f64, u32>::with_grid(170.0),
                |idx| build_and_sweep(idx, &points),
                BatchSize::SmallInput,
            );
        });
        group.bench_function("flat", |b| {
            b.iter_batched(
                PointIndex::<f64, u32>::with_flat,
                |idx| build_and_sweep(idx, &points),
                BatchSize::SmallInput,
            );
        });
        group.finish();
    }
}

criterion_group!(benches, bench_backends);
criterion_main!(benches);
