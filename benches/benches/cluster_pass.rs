// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::DVec3;
use kurbo::Point;
use understory_benches::{clustered_points, uniform_points};
use understory_cluster::{ClusterOptions, Clustering, SceneView};

struct Screen {
    height: f64,
}

impl SceneView for Screen {
    fn project(&self, p: DVec3) -> Option<Point> {
        Some(Point::new(p.x, p.y))
    }

    fn is_visible(&self, _: DVec3) -> bool {
        true
    }

    fn camera_height(&self) -> f64 {
        self.height
    }
}

fn populated(points: &[(f64, f64)]) -> Clustering<u32> {
    let mut clustering = Clustering::new(ClusterOptions::default().with_enabled(true));
    for (id, &(x, y)) in (0_u32..).zip(points) {
        clustering.acquire_point(id).position = DVec3::new(x, y, 0.0);
    }
    clustering
}

fn bench_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster_pass");
    for (name, points) in [
        ("uniform_10k", uniform_points(10_000, 4000.0, 4000.0)),
        ("clustered_100x50", clustered_points(100, 50, 40.0)),
    ] {
        group.throughput(Throughput::Elements(points.len() as u64));
        group.bench_function(name, |b| {
            b.iter_batched(
                || populated(&points),
                |mut clustering| {
                    clustering.camera_changed(&Screen { height: 1000.0 }, None);
                    black_box(clustering.clusters().len());
                },
                BatchSize::LargeInput,
            );
        });
        // Second pass while zooming in exercises the tracker.
        group.bench_function(format!("{name}_zoom_in"), |b| {
            b.iter_batched(
                || {
                    let mut clustering = populated(&points);
                    clustering.camera_changed(&Screen { height: 1000.0 }, None);
                    clustering
                },
                |mut clustering| {
                    clustering.camera_changed(&Screen { height: 900.0 }, None);
                    black_box(clustering.clusters().len());
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pass);
criterion_main!(benches);
