// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_point_index --heading-base-level=0

//! Understory Point Index: a static 2D point index with rectangle range queries.
//!
//! Understory Point Index is the broad phase for screen-space work that rebuilds its inputs every
//! frame, such as clustering overlapping markers.
//!
//! - Build once from a batch of points, each with a `Copy` payload.
//! - Query every point inside an axis-aligned rectangle (edges inclusive).
//! - No incremental updates: rebuild when the point set changes.
//!
//! It is generic over the scalar type `T` and does not depend on any geometry crate.
//!
//! Backends are pluggable via a simple trait so you can swap the spatial strategy without API churn.
//! The default backend is a static k-d tree. A flat vector (linear scan) and a uniform grid
//! (feature `backend_grid`) are also available.
//!
//! ## Features
//!
//! - `backend_grid` *(default)*: enables a uniform grid backend backed by `hashbrown`. Disable
//!   this feature to avoid the `hashbrown` dependency and grid types.
//!
//! # Example
//!
//! ```rust
//! use understory_point_index::{Aabb2D, PointIndex};
//!
//! // Index three screen positions; the payload is the caller's own id.
//! let idx = PointIndex::<f64, u32>::from_points([
//!     (10.0, 10.0, 1),
//!     (12.0, 14.0, 2),
//!     (300.0, 40.0, 3),
//! ]);
//!
//! let mut hits: Vec<_> = idx.range(Aabb2D::new(0.0, 0.0, 20.0, 20.0)).map(|(_, id)| id).collect();
//! hits.sort_unstable();
//! assert_eq!(hits, [1, 2]);
//! ```
//!
//! With the `backend_grid` feature enabled (default), you can also use a uniform grid backend:
//!
//! ```rust
//! # #[cfg(feature = "backend_grid")]
//! # {
//! use understory_point_index::{Aabb2D, PointIndex};
//!
//! let mut idx = PointIndex::<f32, u32>::with_grid(64.0);
//! idx.build([(5.0, 5.0, 7)]);
//! assert_eq!(idx.range(Aabb2D::new(0.0, 0.0, 10.0, 10.0)).count(), 1);
//! # }
//! ```
//!
//! ## Choosing a backend
//!
//! - `KdTree` (default): O(n log n) build, roughly O(sqrt(n) + k) queries regardless of how the
//!   points are distributed. Leaf size is configurable via [`PointIndex::with_node_size`].
//! - `FlatVec`: simplest and smallest, linear scans. Good for a handful of points.
//! - `GridF32`/`GridF64`/`GridI64` *(feature `backend_grid`)*: uniform grid with configurable
//!   cell size. Cheapest to build; a good fit when points are spread evenly and query rectangles
//!   are close to the cell size.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates.

#![no_std]

extern crate alloc;

mod backend;
pub mod backends;
mod index;
mod types;

pub use backend::Backend;
pub use index::{PointIndex, PointIndexGeneric};
pub use types::{Aabb2D, Scalar};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_points_in_a_footprint() {
        // Five markers stacked near (100, 100) plus one far away.
        let idx = PointIndex::<f64, usize>::from_points(
            [
                (100.0, 100.0),
                (101.0, 99.0),
                (98.0, 102.0),
                (100.0, 103.0),
                (97.0, 97.0),
                (600.0, 100.0),
            ]
            .into_iter()
            .enumerate()
            .map(|(i, (x, y))| (x, y, i)),
        );
        let footprint = Aabb2D::from_xywh(20.0, 20.0, 160.0, 160.0);
        assert_eq!(idx.range(footprint).count(), 5);
    }
}
