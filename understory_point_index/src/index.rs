// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `PointIndex` API and generic implementation over a pluggable backend.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::backends::{FlatVec, KdTree};
use crate::types::{Aabb2D, Scalar};

/// A static point index parameterized by a spatial backend.
///
/// Every point carries a `Copy` payload. Slots are dense and follow insertion order: the
/// `i`-th point handed to [`build`][Self::build] is slot `i`.
#[derive(Debug)]
pub struct PointIndexGeneric<T: Scalar, P: Copy + Debug, B: Backend<T>> {
    coords: Vec<(T, T)>,
    payloads: Vec<P>,
    backend: B,
}

impl<T, P, B> PointIndexGeneric<T, P, B>
where
    T: Scalar,
    P: Copy + Debug,
    B: Backend<T> + Default,
{
    /// Create an empty index using the backend's default constructor.
    pub fn new() -> Self {
        Self::with_backend(B::default())
    }

    /// Create an index over `points` using the backend's default constructor.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (T, T, P)>,
    {
        let mut idx = Self::new();
        idx.build(points);
        idx
    }
}

impl<T, P, B> Default for PointIndexGeneric<T, P, B>
where
    T: Scalar,
    P: Copy + Debug,
    B: Backend<T> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, B> PointIndexGeneric<T, P, B>
where
    T: Scalar,
    P: Copy + Debug,
    B: Backend<T>,
{
    /// Create an empty index using an explicit backend instance.
    ///
    /// This is useful when higher layers want to choose a backend type or
    /// configure it (leaf size, grid cell size) before wiring it into the index.
    pub fn with_backend(backend: B) -> Self {
        Self {
            coords: Vec::new(),
            payloads: Vec::new(),
            backend,
        }
    }

    /// Replace the indexed points. Previous slots become invalid.
    pub fn build<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = (T, T, P)>,
    {
        self.coords.clear();
        self.payloads.clear();
        for (x, y, payload) in points {
            self.coords.push((x, y));
            self.payloads.push(payload);
        }
        self.backend.build(&self.coords);
    }

    /// Remove every point.
    pub fn clear(&mut self) {
        self.coords.clear();
        self.payloads.clear();
        self.backend.clear();
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Whether the index holds no points.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Coordinate and payload of a slot.
    pub fn point(&self, slot: usize) -> Option<(T, T, P)> {
        let (x, y) = *self.coords.get(slot)?;
        Some((x, y, self.payloads[slot]))
    }

    /// Query for points inside the given rectangle (edges inclusive).
    pub fn range(&self, rect: Aabb2D<T>) -> impl Iterator<Item = (usize, P)> + '_ {
        let mut out = Vec::new();
        self.visit_range(rect, |slot, p| out.push((slot, p)));
        out.into_iter()
    }

    /// Visit points inside the given rectangle (does not allocate result storage).
    ///
    /// Calls `f(slot, payload)` for each match. The order is backend-dependent.
    pub fn visit_range<F: FnMut(usize, P)>(&self, rect: Aabb2D<T>, mut f: F) {
        self.backend.visit_rect(rect, |slot| f(slot, self.payloads[slot]));
    }

    /// The backend in use.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Default index using a k-d tree backend.
pub type PointIndex<T, P> = PointIndexGeneric<T, P, KdTree<T>>;

impl<T: Scalar, P: Copy + Debug> PointIndex<T, P> {
    /// Create a k-d tree index with a custom leaf size.
    pub fn with_node_size(node_size: usize) -> Self {
        Self::with_backend(KdTree::new(node_size))
    }

    /// Create an index that answers queries with a linear scan.
    pub fn with_flat() -> PointIndexGeneric<T, P, FlatVec<T>> {
        PointIndexGeneric::with_backend(FlatVec::default())
    }
}

#[cfg(feature = "backend_grid")]
impl<T: crate::backends::GridScalar, P: Copy + Debug> PointIndex<T, P> {
    /// Create a grid-backed index with the given cell size.
    pub fn with_grid(cell_size: T) -> PointIndexGeneric<T, P, crate::backends::Grid<T>> {
        PointIndexGeneric::with_backend(crate::backends::Grid::new(cell_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn sample() -> Vec<(f64, f64, u32)> {
        vec![
            (0.0, 0.0, 10),
            (4.0, 4.0, 11),
            (50.0, 50.0, 12),
            (52.0, 49.0, 13),
        ]
    }

    fn sorted<I: Iterator<Item = (usize, u32)>>(it: I) -> Vec<(usize, u32)> {
        let mut v: Vec<_> = it.collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn range_returns_slots_and_payloads() {
        let idx = PointIndex::<f64, u32>::from_points(sample());
        assert_eq!(idx.len(), 4);
        let hits = sorted(idx.range(Aabb2D::new(45.0, 45.0, 55.0, 55.0)));
        assert_eq!(hits, vec![(2, 12), (3, 13)]);
        assert_eq!(idx.point(1), Some((4.0, 4.0, 11)));
        assert_eq!(idx.point(4), None);
    }

    #[test]
    fn empty_index_is_queryable() {
        let idx = PointIndex::<f64, u32>::new();
        assert!(idx.is_empty());
        assert_eq!(idx.range(Aabb2D::new(0.0, 0.0, 1.0, 1.0)).count(), 0);
    }

    #[test]
    fn backends_agree() {
        let rect = Aabb2D::new(-1.0, -1.0, 5.0, 5.0);

        let kd = PointIndex::<f64, u32>::from_points(sample());
        let mut flat = PointIndex::<f64, u32>::with_flat();
        flat.build(sample());
        let expected = sorted(kd.range(rect));
        assert_eq!(expected, vec![(0, 10), (1, 11)]);
        assert_eq!(sorted(flat.range(rect)), expected);

        #[cfg(feature = "backend_grid")]
        {
            let mut grid = PointIndex::<f64, u32>::with_grid(8.0);
            grid.build(sample());
            assert_eq!(sorted(grid.range(rect)), expected);
        }
    }

    #[test]
    fn visit_and_range_match_counts() {
        let mut idx = PointIndex::<f64, u32>::with_node_size(1);
        idx.build(sample());
        let rect = Aabb2D::new(0.0, 0.0, 60.0, 60.0);
        let mut visited = 0;
        idx.visit_range(rect, |_, _| visited += 1);
        assert_eq!(visited, idx.range(rect).count());
        assert_eq!(visited, 4);
    }

    #[test]
    fn clear_forgets_points() {
        let mut idx = PointIndex::<f64, u32>::from_points(sample());
        idx.clear();
        assert!(idx.is_empty());
        assert!(idx.backend().is_empty());
    }
}
