// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator interfaces: the scene a pass reads from and the renderer frames flush to.

use glam::DVec3;
use kurbo::Point;

use crate::primitive::{Collection, Label, Marker, PointPrimitive};

/// What a clustering pass needs to know about the current camera.
pub trait SceneView {
    /// Project a world position to screen pixels, or `None` when it is not on screen.
    fn project(&self, position: DVec3) -> Option<Point>;

    /// Whether a world position is in front of the horizon.
    fn is_visible(&self, position: DVec3) -> bool;

    /// Camera height above the surface. Decreasing height means zooming in.
    fn camera_height(&self) -> f64;
}

/// Which set of collections is being flushed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Primitives standing in for clusters.
    Clustered,
    /// Per-entity primitives; only those flagged drawable should be drawn.
    Direct,
}

/// Receives the live primitive collections once per frame.
///
/// Implementations typically upload [`Collection::drawable`] primitives to the GPU.
pub trait RenderSink<K> {
    /// Flush a label collection.
    fn labels(&mut self, layer: Layer, labels: &Collection<Label<K>>);

    /// Flush a marker collection.
    fn markers(&mut self, layer: Layer, markers: &Collection<Marker<K>>);

    /// Flush a point collection.
    fn points(&mut self, layer: Layer, points: &Collection<PointPrimitive<K>>);
}
