// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared inputs for the Understory benchmarks.

/// Deterministic xorshift generator so runs are comparable.
#[derive(Clone, Debug)]
pub struct Rng(u64);

impl Rng {
    /// Seeded generator. The seed must be non-zero.
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Next raw value.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1_u64 << 53) as f64)
    }
}

/// `count` points uniformly spread over a `width` x `height` screen.
pub fn uniform_points(count: usize, width: f64, height: f64) -> Vec<(f64, f64)> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| (rng.next_f64() * width, rng.next_f64() * height))
        .collect()
}

/// `clusters * per_cluster` points in tight groups of radius `spread`.
pub fn clustered_points(clusters: usize, per_cluster: usize, spread: f64) -> Vec<(f64, f64)> {
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut out = Vec::with_capacity(clusters * per_cluster);
    for _ in 0..clusters {
        let (cx, cy) = (rng.next_f64() * 2000.0, rng.next_f64() * 2000.0);
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * 2.0 * spread;
            let dy = (rng.next_f64() - 0.5) * 2.0 * spread;
            out.push((cx + dx, cy + dy));
        }
    }
    out
}
