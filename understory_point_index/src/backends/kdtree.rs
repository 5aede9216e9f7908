// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static k-d tree backend over points.
//!
//! The tree is implicit: all items live in one flat vector which is recursively partitioned
//! around the median of alternating axes, the same layout used by `kdbush`. Ranges shorter than
//! `node_size` are left unsorted and scanned linearly at query time.

use alloc::vec::Vec;
use core::fmt::Debug;

use smallvec::SmallVec;

use crate::backend::Backend;
use crate::types::{Aabb2D, Scalar};

/// Default number of items per leaf.
pub const DEFAULT_NODE_SIZE: usize = 64;

#[derive(Copy, Clone, Debug)]
struct Item<T> {
    slot: usize,
    x: T,
    y: T,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    const fn flip(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }
}

/// Static k-d tree backend.
///
/// Build once per frame (or whenever the point set changes), then issue any number of
/// rectangle range queries.
pub struct KdTree<T: Scalar> {
    node_size: usize,
    items: Vec<Item<T>>,
}

impl<T: Scalar> Default for KdTree<T> {
    fn default() -> Self {
        Self::new(DEFAULT_NODE_SIZE)
    }
}

impl<T: Scalar> Debug for KdTree<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KdTree")
            .field("node_size", &self.node_size)
            .field("len", &self.items.len())
            .finish_non_exhaustive()
    }
}

impl<T: Scalar> KdTree<T> {
    /// Create an empty tree with the given leaf size (clamped to at least 1).
    pub fn new(node_size: usize) -> Self {
        Self {
            node_size: node_size.max(1),
            items: Vec::new(),
        }
    }

    /// Maximum number of items scanned linearly per leaf.
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    fn coord(item: &Item<T>, axis: Axis) -> T {
        match axis {
            Axis::X => item.x,
            Axis::Y => item.y,
        }
    }

    // Partition `items[left..=right]` so that the median sits at its sorted position, then
    // recurse into both halves along the other axis.
    fn sort(&mut self, left: usize, right: usize, axis: Axis) {
        if right - left <= self.node_size {
            return;
        }
        let mid = (left + right) / 2;
        self.items[left..=right].select_nth_unstable_by(mid - left, |a, b| {
            T::order(Self::coord(a, axis), Self::coord(b, axis))
        });
        self.sort(left, mid - 1, axis.flip());
        self.sort(mid + 1, right, axis.flip());
    }
}

impl<T: Scalar> Backend<T> for KdTree<T> {
    fn build(&mut self, coords: &[(T, T)]) {
        self.items.clear();
        self.items.extend(
            coords
                .iter()
                .enumerate()
                .map(|(slot, &(x, y))| Item { slot, x, y }),
        );
        if !self.items.is_empty() {
            self.sort(0, self.items.len() - 1, Axis::X);
        }
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn visit_rect<F: FnMut(usize)>(&self, rect: Aabb2D<T>, mut f: F) {
        if self.items.is_empty() || rect.is_empty() {
            return;
        }

        let mut stack: SmallVec<[(usize, usize, Axis); 32]> = SmallVec::new();
        stack.push((0, self.items.len() - 1, Axis::X));

        while let Some((left, right, axis)) = stack.pop() {
            if right - left <= self.node_size {
                for item in &self.items[left..=right] {
                    if rect.contains_point(item.x, item.y) {
                        f(item.slot);
                    }
                }
                continue;
            }

            let mid = (left + right) / 2;
            let item = &self.items[mid];
            if rect.contains_point(item.x, item.y) {
                f(item.slot);
            }

            let (lo, hi, value) = match axis {
                Axis::X => (rect.min_x, rect.max_x, item.x),
                Axis::Y => (rect.min_y, rect.max_y, item.y),
            };
            if lo <= value && mid > left {
                stack.push((left, mid - 1, axis.flip()));
            }
            if hi >= value && mid < right {
                stack.push((mid + 1, right, axis.flip()));
            }
        }
    }
}

/// K-d tree backend over `f32` coordinates.
pub type KdTreeF32 = KdTree<f32>;
/// K-d tree backend over `f64` coordinates.
pub type KdTreeF64 = KdTree<f64>;
/// K-d tree backend over `i64` coordinates.
pub type KdTreeI64 = KdTree<i64>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn brute(coords: &[(i64, i64)], rect: Aabb2D<i64>) -> Vec<usize> {
        coords
            .iter()
            .enumerate()
            .filter(|(_, (x, y))| rect.contains_point(*x, *y))
            .map(|(i, _)| i)
            .collect()
    }

    // Small deterministic LCG so the test does not need an RNG dependency.
    fn scatter(n: usize) -> Vec<(i64, i64)> {
        let mut state = 0x2545_f491_u64;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                let x = ((state >> 33) % 1000) as i64;
                state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                let y = ((state >> 33) % 1000) as i64;
                (x, y)
            })
            .collect()
    }

    #[test]
    fn empty_tree_answers_nothing() {
        let mut tree = KdTreeF64::default();
        tree.build(&[]);
        let mut hits = Vec::new();
        tree.visit_rect(Aabb2D::new(-1e9, -1e9, 1e9, 1e9), |s| hits.push(s));
        assert!(hits.is_empty());
        assert!(tree.is_empty());
    }

    #[test]
    fn matches_brute_force_with_small_leaves() {
        let coords = scatter(500);
        let mut tree = KdTreeI64::new(4);
        tree.build(&coords);
        assert_eq!(tree.len(), 500);

        for rect in [
            Aabb2D::new(0, 0, 1000, 1000),
            Aabb2D::new(100, 200, 300, 260),
            Aabb2D::new(999, 999, 999, 999),
            Aabb2D::new(-50, -50, 10, 10),
        ] {
            let mut hits = Vec::new();
            tree.visit_rect(rect, |s| hits.push(s));
            hits.sort_unstable();
            assert_eq!(hits, brute(&coords, rect), "mismatch for {rect:?}");
        }
    }

    #[test]
    fn coincident_points_are_all_reported() {
        let coords = vec![(5.0_f32, 5.0); 200];
        let mut tree = KdTreeF32::new(8);
        tree.build(&coords);
        let hits: Vec<_> = tree.query_rect(Aabb2D::new(5.0, 5.0, 5.0, 5.0)).collect();
        assert_eq!(hits.len(), 200);
    }

    #[test]
    fn rebuild_replaces_content() {
        let mut tree = KdTreeF64::default();
        tree.build(&[(0.0, 0.0), (1.0, 1.0)]);
        tree.build(&[(50.0, 50.0)]);
        let hits: Vec<_> = tree.query_rect(Aabb2D::new(0.0, 0.0, 60.0, 60.0)).collect();
        assert_eq!(hits, vec![0]);
    }
}
