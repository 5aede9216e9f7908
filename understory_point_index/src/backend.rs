// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for static point indexing implementations.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::types::{Aabb2D, Scalar};

/// Spatial backend abstraction used by [`PointIndexGeneric`][crate::PointIndexGeneric].
///
/// Backends are static: [`build`][Backend::build] replaces the whole content and there is no
/// incremental insert or removal. Slot `i` always refers to the `i`-th coordinate passed to the
/// last `build` call.
pub trait Backend<T: Scalar> {
    /// Rebuild the spatial structure over `coords`.
    fn build(&mut self, coords: &[(T, T)]);

    /// Clear all spatial structures.
    fn clear(&mut self);

    /// Number of indexed points.
    fn len(&self) -> usize;

    /// Whether the backend indexes no points.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit slots whose coordinate lies inside the rectangle (edges inclusive).
    fn visit_rect<F: FnMut(usize)>(&self, rect: Aabb2D<T>, f: F);

    /// Query slots whose coordinate lies inside the rectangle.
    ///
    /// The default implementation collects [`visit_rect`][Backend::visit_rect].
    fn query_rect<'a>(&'a self, rect: Aabb2D<T>) -> Box<dyn Iterator<Item = usize> + 'a> {
        let mut out = Vec::new();
        self.visit_rect(rect, |i| out.push(i));
        Box::new(out.into_iter())
    }
}
