// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid backend for 2D points.
//!
//! This backend buckets points into fixed-size grid cells and answers range
//! queries by touching only the cells overlapping the query rectangle. It is a
//! good fit when:
//! - points are roughly uniformly spread over the screen, and
//! - query rectangles are a few cells wide at most.
//!
//! Very large query rectangles over a small cell size visit many empty cells;
//! prefer the k-d tree backend for those.

use alloc::vec::Vec;
use core::fmt::Debug;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::backend::Backend;
use crate::types::{Aabb2D, Scalar};

/// Scalar types supported by the grid backend.
///
/// This is kept separate from [`Scalar`] so that the grid implementation can
/// use type-specific logic (e.g., Euclidean division for integers).
pub trait GridScalar: Scalar {
    /// Map a scalar coordinate to a grid coordinate along one axis.
    ///
    /// The mapping is based on an origin and uniform cell size. Implementations
    /// are expected to be monotonic in `value` for fixed `origin` and
    /// `cell_size`.
    fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32;
}

impl GridScalar for f32 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Grid cell indices are intentionally i32; out-of-range values are saturated."
    )]
    #[inline]
    fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32 {
        debug_assert!(
            cell_size > 0.0,
            "grid cell_size must be strictly positive (f32)"
        );
        let t = (value - origin) / cell_size;
        let coord = t as i32;

        // Round towards -∞ (the cast above has already truncated).
        if t < 0.0 && (coord as Self) > t {
            coord.saturating_sub(1)
        } else {
            coord
        }
    }
}

impl GridScalar for f64 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Grid cell indices are intentionally i32; out-of-range values are saturated."
    )]
    #[inline]
    fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32 {
        debug_assert!(
            cell_size > 0.0,
            "grid cell_size must be strictly positive (f64)"
        );
        let t = (value - origin) / cell_size;
        let coord = t as i32;

        // Round towards -∞ (the cast above has already truncated).
        if t < 0.0 && (coord as Self) > t {
            coord.saturating_sub(1)
        } else {
            coord
        }
    }
}

impl GridScalar for i64 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Grid cell indices are intentionally i32; out-of-range values are saturated."
    )]
    #[inline]
    fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32 {
        debug_assert!(
            cell_size > 0,
            "grid cell_size must be strictly positive (i64)"
        );
        // Euclidean division rounds toward -∞, which matches floor for all
        // integer values.
        let coord = (value - origin).div_euclid(cell_size);

        if coord >= Self::from(i32::MAX) {
            i32::MAX
        } else if coord <= Self::from(i32::MIN) {
            i32::MIN
        } else {
            coord as i32
        }
    }
}

/// Uniform grid backend with fixed cell size.
pub struct Grid<T: GridScalar> {
    cell_size: T,
    origin_x: T,
    origin_y: T,
    cells: HashMap<(i32, i32), SmallVec<[usize; 8]>>,
    coords: Vec<(T, T)>,
}

impl<T: GridScalar> Debug for Grid<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Grid")
            .field("cell_size", &self.cell_size)
            .field("origin_x", &self.origin_x)
            .field("origin_y", &self.origin_y)
            .field("len", &self.coords.len())
            .field("cells", &self.cells.len())
            .finish_non_exhaustive()
    }
}

impl<T: GridScalar> Grid<T> {
    /// Create a new grid backend with the given cell size and origin at (0, 0).
    pub fn new(cell_size: T) -> Self {
        Self::with_origin(cell_size, T::zero(), T::zero())
    }

    /// Create a new grid backend with the given cell size and origin.
    pub fn with_origin(cell_size: T, origin_x: T, origin_y: T) -> Self {
        debug_assert!(cell_size > T::zero(), "cell_size must be strictly positive");
        Self {
            cell_size,
            origin_x,
            origin_y,
            cells: HashMap::new(),
            coords: Vec::new(),
        }
    }

    fn cell_of(&self, x: T, y: T) -> (i32, i32) {
        (
            T::cell_coord(x, self.origin_x, self.cell_size),
            T::cell_coord(y, self.origin_y, self.cell_size),
        )
    }
}

impl<T: GridScalar> Backend<T> for Grid<T> {
    fn build(&mut self, coords: &[(T, T)]) {
        self.cells.clear();
        self.coords.clear();
        self.coords.extend_from_slice(coords);
        for (slot, &(x, y)) in coords.iter().enumerate() {
            let cell = self.cell_of(x, y);
            self.cells.entry(cell).or_default().push(slot);
        }
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.coords.clear();
    }

    fn len(&self) -> usize {
        self.coords.len()
    }

    fn visit_rect<F: FnMut(usize)>(&self, rect: Aabb2D<T>, mut f: F) {
        if rect.is_empty() {
            return;
        }
        let (ix0, iy0) = self.cell_of(rect.min_x, rect.min_y);
        let (ix1, iy1) = self.cell_of(rect.max_x, rect.max_y);

        // Each point lives in exactly one cell, so no deduplication is needed.
        for ix in ix0..=ix1 {
            for iy in iy0..=iy1 {
                let Some(cell) = self.cells.get(&(ix, iy)) else {
                    continue;
                };
                for &slot in cell {
                    let (x, y) = self.coords[slot];
                    if rect.contains_point(x, y) {
                        f(slot);
                    }
                }
            }
        }
    }
}

/// Grid backend over `f32` coordinates.
pub type GridF32 = Grid<f32>;
/// Grid backend over `f64` coordinates.
pub type GridF64 = Grid<f64>;
/// Grid backend over `i64` coordinates.
pub type GridI64 = Grid<i64>;
