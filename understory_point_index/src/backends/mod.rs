// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `kdtree`: static k-d tree with median splits (aliases: `KdTreeF32`, `KdTreeF64`, `KdTreeI64`).
//! - `flatvec`: flat vector with linear scans (small, simple).
//! - `grid` (feature `backend_grid`): uniform grid with configurable cell size.
//!
//! k-d tree layout
//! ---------------
//! Items are stored in a single vector. Building partitions the range `[left, right]` around its
//! median `m` along the current axis, so every item left of `m` compares `<=` and every item right
//! of `m` compares `>=`, then recurses on both halves with the other axis until a range holds at
//! most `node_size` items. A query walks the implicit tree with an explicit stack, descending into
//! a half only when the query rectangle reaches across the median's coordinate.

pub(crate) mod flatvec;
#[cfg(feature = "backend_grid")]
pub(crate) mod grid;
pub(crate) mod kdtree;

pub use flatvec::FlatVec;
#[cfg(feature = "backend_grid")]
pub use grid::{Grid, GridF32, GridF64, GridI64, GridScalar};
pub use kdtree::{DEFAULT_NODE_SIZE, KdTree, KdTreeF32, KdTreeF64, KdTreeI64};
