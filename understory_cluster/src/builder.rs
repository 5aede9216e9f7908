// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy screen-space clustering over the gathered annotations.

use core::fmt::Debug;
use core::hash::Hash;

use glam::DVec3;
use kurbo::{Point, Rect};
use smallvec::SmallVec;
use understory_point_index::PointIndex;

use crate::footprint::{AnnotationKind, VisualKind};
use crate::pool::Pool;
use crate::primitive::{Label, Marker, PointPrimitive, Primitive, PrimitiveFlags};
use crate::tracker::Cluster;
use crate::util::rect_to_aabb;
use crate::view::SceneView;

/// Neighbor buffer; most footprints only catch a handful of points.
pub(crate) type Neighbors = SmallVec<[usize; 16]>;

/// One on-screen annotation taking part in a pass.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ScreenPoint<K> {
    pub(crate) kind: AnnotationKind,
    pub(crate) slot: usize,
    pub(crate) owner: K,
    pub(crate) position: DVec3,
    pub(crate) coord: Point,
    pub(crate) footprint: Rect,
    pub(crate) clustered: bool,
}

/// A cluster that survived the pass, with the owners it absorbed.
#[derive(Clone, Debug)]
pub(crate) struct Finalized<K> {
    pub(crate) cluster: Cluster,
    pub(crate) members: Vec<K>,
}

/// Whether `owner` also holds a shown marker or point, making its label a companion.
fn has_companion<K>(
    owner: K,
    markers: &Pool<Marker<K>>,
    points: &Pool<PointPrimitive<K>>,
) -> bool
where
    K: Copy + Eq + Hash,
{
    let shown = |flags: PrimitiveFlags| flags.contains(PrimitiveFlags::SHOW);
    markers.get(owner).is_some_and(|m| shown(m.flags))
        || points.get(owner).is_some_and(|p| shown(p.flags))
}

/// The shown companion label of `owner`, if any.
fn companion_label<K>(owner: K, labels: &Pool<Label<K>>) -> Option<&Label<K>>
where
    K: Copy + Eq + Hash,
{
    labels
        .get(owner)
        .filter(|l| l.flags.contains(PrimitiveFlags::SHOW))
}

/// Clear `RENDER` on `primitive` and, if it can take part in a pass, return its owner, world
/// position and screen coordinate.
fn eligible<P, V>(primitive: &mut P, view: &V) -> Option<(P::Owner, DVec3, Point)>
where
    P: Primitive,
    V: SceneView + ?Sized,
{
    primitive.flags_mut().remove(PrimitiveFlags::RENDER);
    let owner = primitive.owner()?;
    let position = primitive.position();
    if !primitive.flags().contains(PrimitiveFlags::SHOW) || !view.is_visible(position) {
        return None;
    }
    Some((owner, position, view.project(position)?))
}

impl<K> ScreenPoint<K> {
    fn new(
        visual: VisualKind<'_, K>,
        slot: usize,
        owner: K,
        position: DVec3,
        coord: Point,
        footprint: Rect,
    ) -> Self {
        Self {
            kind: visual.kind(),
            slot,
            owner,
            position,
            coord,
            footprint,
            clustered: false,
        }
    }
}

/// Clear `RENDER` on every pooled primitive and collect the ones eligible for clustering.
///
/// Order is labels, then markers, then points; each in slot order.
pub(crate) fn gather<K, V>(
    labels: &mut Pool<Label<K>>,
    markers: &mut Pool<Marker<K>>,
    points: &mut Pool<PointPrimitive<K>>,
    view: &V,
    pixel_range: f64,
) -> Vec<ScreenPoint<K>>
where
    K: Copy + Eq + Hash,
    V: SceneView + ?Sized,
{
    let mut out = Vec::new();

    if let Some(collection) = labels.collection_mut() {
        for (slot, label) in collection.iter_mut().enumerate() {
            let Some((owner, position, coord)) = eligible(label, view) else {
                continue;
            };
            if has_companion(owner, markers, points) {
                continue;
            }
            let visual = VisualKind::Label(label);
            let footprint = visual.footprint(coord, pixel_range);
            out.push(ScreenPoint::new(visual, slot, owner, position, coord, footprint));
        }
    }

    if let Some(collection) = markers.collection_mut() {
        for (slot, marker) in collection.iter_mut().enumerate() {
            let Some((owner, position, coord)) = eligible(marker, view) else {
                continue;
            };
            let visual = VisualKind::Marker(marker);
            let mut footprint = visual.footprint(coord, pixel_range);
            if let Some(label) = companion_label(owner, labels) {
                footprint = footprint.union(VisualKind::Label(label).footprint(coord, pixel_range));
            }
            out.push(ScreenPoint::new(visual, slot, owner, position, coord, footprint));
        }
    }

    if let Some(collection) = points.collection_mut() {
        for (slot, point) in collection.iter_mut().enumerate() {
            let Some((owner, position, coord)) = eligible(point, view) else {
                continue;
            };
            let visual = VisualKind::Point(point);
            let mut footprint = visual.footprint(coord, pixel_range);
            if let Some(label) = companion_label(owner, labels) {
                footprint = footprint.union(VisualKind::Label(label).footprint(coord, pixel_range));
            }
            out.push(ScreenPoint::new(visual, slot, owner, position, coord, footprint));
        }
    }

    out
}

/// Set `RENDER` on the annotation behind `point` and on its companion label.
pub(crate) fn render_directly<K>(
    point: &ScreenPoint<K>,
    labels: &mut Pool<Label<K>>,
    markers: &mut Pool<Marker<K>>,
    points: &mut Pool<PointPrimitive<K>>,
) where
    K: Copy + Eq + Hash,
{
    let render = |flags: &mut PrimitiveFlags| flags.insert(PrimitiveFlags::RENDER);
    match point.kind {
        AnnotationKind::Label => {
            if let Some(label) = labels
                .collection_mut()
                .and_then(|c| c.get_mut(point.slot))
            {
                render(label.flags_mut());
            }
            return;
        }
        AnnotationKind::Marker => {
            if let Some(marker) = markers
                .collection_mut()
                .and_then(|c| c.get_mut(point.slot))
            {
                render(marker.flags_mut());
            }
        }
        AnnotationKind::Point => {
            if let Some(p) = points.collection_mut().and_then(|c| c.get_mut(point.slot)) {
                render(p.flags_mut());
            }
        }
    }
    if let Some(label) = labels.get_mut(point.owner) {
        render(label.flags_mut());
    }
}

/// The screen points of one pass, indexed by their screen coordinates.
#[derive(Debug)]
pub(crate) struct ClusterPass<K> {
    points: Vec<ScreenPoint<K>>,
    index: PointIndex<f64, usize>,
}

impl<K: Copy + Debug> ClusterPass<K> {
    pub(crate) fn new(points: Vec<ScreenPoint<K>>) -> Self {
        let index = PointIndex::from_points(
            points
                .iter()
                .enumerate()
                .map(|(i, p)| (p.coord.x, p.coord.y, i)),
        );
        Self { points, index }
    }

    pub(crate) fn points(&self) -> &[ScreenPoint<K>] {
        &self.points
    }

    /// Indices of the unclustered points whose coordinates fall inside `rect`, ascending.
    pub(crate) fn unclustered_in(&self, rect: Rect) -> Neighbors {
        let mut out = Neighbors::new();
        self.index.visit_range(rect_to_aabb(rect), |_, i| {
            if !self.points[i].clustered {
                out.push(i);
            }
        });
        out.sort_unstable();
        out
    }

    pub(crate) fn mark_clustered(&mut self, members: &[usize]) {
        for &i in members {
            self.points[i].clustered = true;
        }
    }

    pub(crate) fn owners(&self, members: &[usize]) -> Vec<K> {
        members.iter().map(|&i| self.points[i].owner).collect()
    }

    /// Run the greedy merge over every point not yet clustered.
    ///
    /// Returns the new clusters and the indices of the points left to render directly.
    pub(crate) fn build(&mut self, minimum_cluster_size: usize) -> (Vec<Finalized<K>>, Vec<usize>) {
        let mut clusters = Vec::new();
        let mut direct = Vec::new();

        for seed in 0..self.points.len() {
            if self.points[seed].clustered {
                continue;
            }
            self.points[seed].clustered = true;

            let seed_point = self.points[seed];
            let neighbors = self.unclustered_in(seed_point.footprint);

            let mut sum = seed_point.position;
            let mut total = seed_point.footprint;
            for &n in &neighbors {
                sum += self.points[n].position;
                total = total.union(self.points[n].footprint);
            }

            let count = neighbors.len() + 1;
            if count < minimum_cluster_size {
                direct.push(seed);
                continue;
            }

            let position = sum / count as f64;

            let mut members = Neighbors::with_capacity(count);
            members.push(seed);
            members.extend_from_slice(&neighbors);
            self.mark_clustered(&neighbors);

            clusters.push(Finalized {
                cluster: Cluster {
                    position,
                    width: total.width(),
                    height: total.height(),
                    minimum_width: seed_point.footprint.width(),
                    minimum_height: seed_point.footprint.height(),
                },
                members: self.owners(&members),
            });
        }

        (clusters, direct)
    }
}
