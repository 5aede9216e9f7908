// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector backend with linear scans. Small and simple; good for tiny sets.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::{Aabb2D, Scalar};

/// Flat vector backend with linear scans.
pub struct FlatVec<T: Scalar> {
    coords: Vec<(T, T)>,
}

impl<T: Scalar> Default for FlatVec<T> {
    fn default() -> Self {
        Self { coords: Vec::new() }
    }
}

impl<T: Scalar> Debug for FlatVec<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlatVec")
            .field("len", &self.coords.len())
            .finish_non_exhaustive()
    }
}

impl<T: Scalar> Backend<T> for FlatVec<T> {
    fn build(&mut self, coords: &[(T, T)]) {
        self.coords.clear();
        self.coords.extend_from_slice(coords);
    }

    fn clear(&mut self) {
        self.coords.clear();
    }

    fn len(&self) -> usize {
        self.coords.len()
    }

    fn visit_rect<F: FnMut(usize)>(&self, rect: Aabb2D<T>, mut f: F) {
        for (i, &(x, y)) in self.coords.iter().enumerate() {
            if rect.contains_point(x, y) {
                f(i);
            }
        }
    }
}
