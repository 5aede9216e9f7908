// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Zoom-in stabilization: clusters from the previous pass survive while they still hold
//! enough members inside a shrinking box.

use core::fmt::Debug;

use glam::DVec3;
use kurbo::{Point, Rect};
use tracing::trace;

use crate::builder::{ClusterPass, Finalized};
use crate::view::SceneView;

/// A finalized cluster as remembered between passes.
///
/// `width`/`height` are the screen extent the cluster covered; `minimum_*` is the floor it
/// may shrink to while zooming in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cluster {
    /// World position the cluster is drawn at.
    pub position: DVec3,
    /// Screen-space width in pixels.
    pub width: f64,
    /// Screen-space height in pixels.
    pub height: f64,
    /// Lower bound for `width`.
    pub minimum_width: f64,
    /// Lower bound for `height`.
    pub minimum_height: f64,
}

impl Cluster {
    /// Scale the extent by `factor`, never going below the minimum.
    ///
    /// ```
    /// use glam::DVec3;
    /// use understory_cluster::Cluster;
    ///
    /// let mut c = Cluster {
    ///     position: DVec3::ZERO,
    ///     width: 400.0,
    ///     height: 300.0,
    ///     minimum_width: 180.0,
    ///     minimum_height: 180.0,
    /// };
    /// c.shrink(0.5);
    /// assert_eq!((c.width, c.height), (200.0, 180.0));
    /// ```
    pub fn shrink(&mut self, factor: f64) {
        self.width = (self.width * factor).max(self.minimum_width);
        self.height = (self.height * factor).max(self.minimum_height);
    }

    /// Query box of the given size centered on `center`.
    fn query_box(&self, center: Point) -> Rect {
        Rect::from_center_size(center, (self.width, self.height))
    }
}

/// Shrink factor applied to remembered clusters, or `None` unless the camera moved closer.
pub(crate) fn zoom_factor(previous_height: Option<f64>, current_height: f64) -> Option<f64> {
    let previous = previous_height?;
    (previous > 0.0 && current_height < previous).then(|| 1.0 - current_height / previous)
}

/// Clusters and camera height remembered from the last pass.
#[derive(Clone, Debug, Default)]
pub(crate) struct ClusterTracker {
    previous: Vec<Cluster>,
    previous_height: Option<f64>,
}

impl ClusterTracker {
    pub(crate) fn clusters(&self) -> &[Cluster] {
        &self.previous
    }

    pub(crate) fn previous_height(&self) -> Option<f64> {
        self.previous_height
    }

    /// Remember the outcome of a pass.
    pub(crate) fn record(&mut self, clusters: Vec<Cluster>, height: f64) {
        self.previous = clusters;
        self.previous_height = Some(height);
    }

    pub(crate) fn clear(&mut self) {
        self.previous.clear();
        self.previous_height = None;
    }

    /// Re-establish remembered clusters that still hold at least `minimum_cluster_size`
    /// unclustered points after shrinking.
    ///
    /// Kept clusters stay at their previous position and claim the points they cover. Returns
    /// nothing unless the camera moved closer since the last pass.
    pub(crate) fn carry_forward<K, V>(
        &self,
        pass: &mut ClusterPass<K>,
        view: &V,
        minimum_cluster_size: usize,
    ) -> Vec<Finalized<K>>
    where
        K: Copy + Debug,
        V: SceneView + ?Sized,
    {
        let Some(factor) = zoom_factor(self.previous_height, view.camera_height()) else {
            return Vec::new();
        };

        let mut kept = Vec::new();
        for previous in &self.previous {
            if !view.is_visible(previous.position) {
                continue;
            }
            let Some(center) = view.project(previous.position) else {
                continue;
            };

            let mut cluster = *previous;
            cluster.shrink(factor);
            let members = pass.unclustered_in(cluster.query_box(center));
            if members.len() < minimum_cluster_size {
                trace!(
                    members = members.len(),
                    width = cluster.width,
                    height = cluster.height,
                    "tracked cluster dissolved"
                );
                continue;
            }

            pass.mark_clustered(&members);
            kept.push(Finalized {
                cluster,
                members: pass.owners(&members),
            });
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ScreenPoint;
    use crate::footprint::AnnotationKind;

    struct Flat {
        height: f64,
    }

    impl SceneView for Flat {
        fn project(&self, position: DVec3) -> Option<Point> {
            Some(Point::new(position.x, position.y))
        }

        fn is_visible(&self, _: DVec3) -> bool {
            true
        }

        fn camera_height(&self) -> f64 {
            self.height
        }
    }

    fn pass_at(coords: &[(f64, f64)]) -> ClusterPass<usize> {
        let points = coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| ScreenPoint {
                kind: AnnotationKind::Point,
                slot: i,
                owner: i,
                position: DVec3::new(x, y, 0.0),
                coord: Point::new(x, y),
                footprint: Rect::from_center_size((x, y), (20.0, 20.0)),
                clustered: false,
            })
            .collect();
        ClusterPass::new(points)
    }

    fn remembered(width: f64, minimum: f64) -> Cluster {
        Cluster {
            position: DVec3::ZERO,
            width,
            height: width,
            minimum_width: minimum,
            minimum_height: minimum,
        }
    }

    #[test]
    fn factor_only_when_zooming_in() {
        assert_eq!(zoom_factor(None, 10.0), None);
        assert_eq!(zoom_factor(Some(1000.0), 1000.0), None);
        assert_eq!(zoom_factor(Some(1000.0), 2000.0), None);
        assert_eq!(zoom_factor(Some(1000.0), 600.0), Some(0.4));
        assert_eq!(zoom_factor(Some(0.0), -1.0), None);
    }

    #[test]
    fn shrink_floors_at_minimum() {
        let mut c = remembered(400.0, 180.0);
        c.shrink(0.4);
        assert_eq!(c.width, 180.0);
        let mut c = remembered(400.0, 100.0);
        c.shrink(0.4);
        assert_eq!(c.width, 160.0);
    }

    #[test]
    fn kept_cluster_keeps_position_and_claims_members() {
        let mut tracker = ClusterTracker::default();
        tracker.record(vec![remembered(400.0, 40.0)], 1000.0);

        // Box shrinks to 200x200 centered on the origin.
        let mut pass = pass_at(&[(-90.0, 0.0), (90.0, 10.0), (150.0, 0.0)]);
        let kept = tracker.carry_forward(&mut pass, &Flat { height: 500.0 }, 2);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].members, vec![0, 1]);
        assert_eq!(kept[0].cluster.position, DVec3::ZERO);
        assert_eq!(kept[0].cluster.width, 200.0);
        assert!(pass.points()[0].clustered);
        assert!(!pass.points()[2].clustered);
    }

    #[test]
    fn dissolves_when_too_few_remain() {
        let mut tracker = ClusterTracker::default();
        tracker.record(vec![remembered(400.0, 40.0)], 1000.0);
        let mut pass = pass_at(&[(-90.0, 0.0), (150.0, 0.0)]);
        let kept = tracker.carry_forward(&mut pass, &Flat { height: 500.0 }, 2);
        assert!(kept.is_empty());
        assert!(pass.points().iter().all(|p| !p.clustered));
    }

    #[test]
    fn zooming_out_skips_stabilization() {
        let mut tracker = ClusterTracker::default();
        tracker.record(vec![remembered(400.0, 40.0)], 1000.0);
        let mut pass = pass_at(&[(0.0, 0.0), (1.0, 1.0)]);
        let kept = tracker.carry_forward(&mut pass, &Flat { height: 1500.0 }, 2);
        assert!(kept.is_empty());
        assert_eq!(tracker.previous_height(), Some(1000.0));
        tracker.clear();
        assert!(tracker.clusters().is_empty());
    }
}
