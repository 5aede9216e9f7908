// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The clustering state machine: owns the pools, runs passes, and flushes frames.

use core::fmt::Debug;
use core::hash::Hash;

use tracing::{debug, trace};

use crate::builder::{ClusterPass, gather, render_directly};
use crate::draft::{ClusterDraft, materialize};
use crate::event::ClusterEvent;
use crate::options::{ClusterOptions, OptionsError};
use crate::pool::Pool;
use crate::primitive::{Collection, Label, Marker, PointPrimitive, Primitive, PrimitiveFlags};
use crate::tracker::{Cluster, ClusterTracker};
use crate::view::{Layer, RenderSink, SceneView};

/// Camera notifications reporting less movement than this are ignored.
pub const MIN_CAMERA_MOVEMENT: f64 = 0.05;

/// Where the driver is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClusterState {
    /// Clustering is off; every shown annotation renders directly.
    Disabled,
    /// Cluster collections reflect the last pass.
    Idle,
    /// A pass is in progress.
    Clustering,
}

/// Screen-space clustering of the labels, markers, and points owned by scene entities.
///
/// Annotations are bound with the `acquire_*` methods and styled through the returned
/// primitive. A pass runs on [`camera_changed`](Self::camera_changed) and whenever an option
/// changes. [`update`](Self::update) hands the live collections to the renderer every frame.
///
/// ```
/// use glam::DVec3;
/// use kurbo::Point;
/// use understory_cluster::{ClusterOptions, Clustering, SceneView};
///
/// struct TopDown;
///
/// impl SceneView for TopDown {
///     fn project(&self, p: DVec3) -> Option<Point> {
///         Some(Point::new(p.x, p.y))
///     }
///     fn is_visible(&self, _: DVec3) -> bool {
///         true
///     }
///     fn camera_height(&self) -> f64 {
///         1000.0
///     }
/// }
///
/// let mut clustering = Clustering::<u32>::new(ClusterOptions::default().with_enabled(true));
/// for id in 0..3 {
///     clustering.acquire_point(id).position = DVec3::new(10.0, 10.0, 0.0);
/// }
/// assert!(clustering.camera_changed(&TopDown, None));
///
/// let labels = clustering.cluster_labels().unwrap();
/// assert_eq!(labels.len(), 1);
/// assert_eq!(labels[0].text, "3");
/// ```
pub struct Clustering<K: Copy> {
    options: ClusterOptions,
    state: ClusterState,
    labels: Pool<Label<K>>,
    markers: Pool<Marker<K>>,
    points: Pool<PointPrimitive<K>>,
    cluster_labels: Option<Collection<Label<K>>>,
    cluster_markers: Option<Collection<Marker<K>>>,
    cluster_points: Option<Collection<PointPrimitive<K>>>,
    tracker: ClusterTracker,
    events: ClusterEvent<K>,
}

impl<K: Copy> Debug for Clustering<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Clustering")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("labels", &self.labels)
            .field("markers", &self.markers)
            .field("points", &self.points)
            .field("clusters", &self.tracker.clusters().len())
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl<K> Default for Clustering<K>
where
    K: Copy + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new(ClusterOptions::default())
    }
}

impl<K> Clustering<K>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Create a driver with no annotations.
    ///
    /// No pass runs until the first camera notification.
    pub fn new(options: ClusterOptions) -> Self {
        debug_assert!(options.validate().is_ok(), "invalid {options:?}");
        Self {
            options,
            state: resting_state(options.enabled),
            labels: Pool::new(),
            markers: Pool::new(),
            points: Pool::new(),
            cluster_labels: None,
            cluster_markers: None,
            cluster_points: None,
            tracker: ClusterTracker::default(),
            events: ClusterEvent::new(),
        }
    }

    /// Like [`new`](Self::new), rejecting invalid options.
    pub fn try_new(options: ClusterOptions) -> Result<Self, OptionsError> {
        options.validate()?;
        Ok(Self::new(options))
    }

    /// Current options.
    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ClusterState {
        self.state
    }

    /// Clusters finalized by the last pass.
    pub fn clusters(&self) -> &[Cluster] {
        self.tracker.clusters()
    }

    /// The "new cluster" event, for subscribing styling hooks.
    pub fn cluster_event(&mut self) -> &mut ClusterEvent<K> {
        &mut self.events
    }

    // --- Binding surface ---

    /// Label owned by `owner`, allocating one if needed.
    pub fn acquire_label(&mut self, owner: K) -> &mut Label<K> {
        self.labels.acquire_mut(owner)
    }

    /// Marker owned by `owner`, allocating one if needed.
    pub fn acquire_marker(&mut self, owner: K) -> &mut Marker<K> {
        self.markers.acquire_mut(owner)
    }

    /// Point owned by `owner`, allocating one if needed.
    pub fn acquire_point(&mut self, owner: K) -> &mut PointPrimitive<K> {
        self.points.acquire_mut(owner)
    }

    /// Hide `owner`'s label and recycle its slot. Returns whether one was held.
    pub fn release_label(&mut self, owner: K) -> bool {
        self.labels.release(owner).is_some()
    }

    /// Hide `owner`'s marker and recycle its slot. Returns whether one was held.
    pub fn release_marker(&mut self, owner: K) -> bool {
        self.markers.release(owner).is_some()
    }

    /// Hide `owner`'s point and recycle its slot. Returns whether one was held.
    pub fn release_point(&mut self, owner: K) -> bool {
        self.points.release(owner).is_some()
    }

    /// Label held by `owner`.
    pub fn label(&self, owner: K) -> Option<&Label<K>> {
        self.labels.get(owner)
    }

    /// Marker held by `owner`.
    pub fn marker(&self, owner: K) -> Option<&Marker<K>> {
        self.markers.get(owner)
    }

    /// Point held by `owner`.
    pub fn point(&self, owner: K) -> Option<&PointPrimitive<K>> {
        self.points.get(owner)
    }

    /// Pool of directly rendered labels.
    pub fn label_pool(&self) -> &Pool<Label<K>> {
        &self.labels
    }

    /// Pool of directly rendered markers.
    pub fn marker_pool(&self) -> &Pool<Marker<K>> {
        &self.markers
    }

    /// Pool of directly rendered points.
    pub fn point_pool(&self) -> &Pool<PointPrimitive<K>> {
        &self.points
    }

    /// Labels standing in for clusters, if the last pass produced any.
    pub fn cluster_labels(&self) -> Option<&Collection<Label<K>>> {
        self.cluster_labels.as_ref()
    }

    /// Markers standing in for clusters, if the last pass produced any.
    pub fn cluster_markers(&self) -> Option<&Collection<Marker<K>>> {
        self.cluster_markers.as_ref()
    }

    /// Points standing in for clusters, if the last pass produced any.
    pub fn cluster_points(&self) -> Option<&Collection<PointPrimitive<K>>> {
        self.cluster_points.as_ref()
    }

    // --- Transitions ---

    /// Notify the driver that the camera moved by `amount` (`None` when unknown).
    ///
    /// Runs a pass unless clustering is disabled or the movement is below
    /// [`MIN_CAMERA_MOVEMENT`]. Returns whether a pass ran.
    pub fn camera_changed<V: SceneView + ?Sized>(&mut self, view: &V, amount: Option<f64>) -> bool {
        if !self.options.enabled {
            return false;
        }
        if let Some(amount) = amount
            && amount < MIN_CAMERA_MOVEMENT
        {
            trace!(amount, "camera movement ignored");
            return false;
        }
        self.recluster(view)
    }

    /// Turn clustering on or off.
    ///
    /// Enabling runs a pass. Disabling drops every cluster collection and marks every
    /// annotation for direct rendering.
    pub fn set_enabled<V: SceneView + ?Sized>(&mut self, view: &V, enabled: bool) {
        if self.options.enabled == enabled {
            return;
        }
        self.options.enabled = enabled;
        if enabled {
            debug!("clustering enabled");
            self.state = ClusterState::Idle;
            self.recluster(view);
        } else {
            debug!("clustering disabled");
            self.disable();
        }
    }

    /// Change the footprint inflation. A changed value re-clusters immediately.
    pub fn set_pixel_range<V: SceneView + ?Sized>(&mut self, view: &V, pixel_range: f64) {
        debug_assert!(
            pixel_range.is_finite() && pixel_range >= 0.0,
            "invalid pixel range {pixel_range}"
        );
        if self.options.pixel_range == pixel_range {
            return;
        }
        self.options.pixel_range = pixel_range;
        self.recluster(view);
    }

    /// Change the minimum cluster size. A changed value re-clusters immediately.
    pub fn set_minimum_cluster_size<V: SceneView + ?Sized>(&mut self, view: &V, size: usize) {
        debug_assert!(size > 0, "minimum cluster size must be at least 1");
        if self.options.minimum_cluster_size == size {
            return;
        }
        self.options.minimum_cluster_size = size;
        self.recluster(view);
    }

    /// Run a pass now. Returns `false` without doing anything while disabled.
    pub fn recluster<V: SceneView + ?Sized>(&mut self, view: &V) -> bool {
        if !self.options.enabled {
            return false;
        }
        self.run_pass(view);
        true
    }

    /// Flush the live collections: cluster collections first, then the direct ones.
    pub fn update<S: RenderSink<K> + ?Sized>(&self, sink: &mut S) {
        if let Some(labels) = &self.cluster_labels {
            sink.labels(Layer::Clustered, labels);
        }
        if let Some(markers) = &self.cluster_markers {
            sink.markers(Layer::Clustered, markers);
        }
        if let Some(points) = &self.cluster_points {
            sink.points(Layer::Clustered, points);
        }
        if let Some(labels) = self.labels.collection() {
            sink.labels(Layer::Direct, labels);
        }
        if let Some(markers) = self.markers.collection() {
            sink.markers(Layer::Direct, markers);
        }
        if let Some(points) = self.points.collection() {
            sink.points(Layer::Direct, points);
        }
    }

    /// Drop every collection, binding, listener, and remembered cluster.
    ///
    /// Options are left as they are; no pass runs.
    pub fn destroy(&mut self) {
        self.labels.clear();
        self.markers.clear();
        self.points.clear();
        self.drop_cluster_collections();
        self.tracker.clear();
        self.events.clear();
        self.state = resting_state(self.options.enabled);
    }

    fn drop_cluster_collections(&mut self) {
        self.cluster_labels = None;
        self.cluster_markers = None;
        self.cluster_points = None;
    }

    /// Remembered clusters survive, so re-enabling while zoomed in can still keep them.
    fn disable(&mut self) {
        self.drop_cluster_collections();
        mark_all_rendered(self.labels.collection_mut());
        mark_all_rendered(self.markers.collection_mut());
        mark_all_rendered(self.points.collection_mut());
        self.state = ClusterState::Disabled;
    }

    fn run_pass<V: SceneView + ?Sized>(&mut self, view: &V) {
        if self.labels.collection().is_none()
            && self.markers.collection().is_none()
            && self.points.collection().is_none()
        {
            return;
        }
        self.state = ClusterState::Clustering;

        let height = view.camera_height();
        let minimum_cluster_size = self.options.minimum_cluster_size;
        let gathered = gather(
            &mut self.labels,
            &mut self.markers,
            &mut self.points,
            view,
            self.options.pixel_range,
        );
        let gathered_len = gathered.len();

        let mut pass = ClusterPass::new(gathered);
        let kept = self
            .tracker
            .carry_forward(&mut pass, view, minimum_cluster_size);
        let kept_len = kept.len();
        let (built, direct) = pass.build(minimum_cluster_size);
        let built_len = built.len();

        for &i in &direct {
            render_directly(
                &pass.points()[i],
                &mut self.labels,
                &mut self.markers,
                &mut self.points,
            );
        }

        let mut labels = self.cluster_labels.take().unwrap_or_default();
        let mut markers = self.cluster_markers.take().unwrap_or_default();
        let mut points = self.cluster_points.take().unwrap_or_default();
        labels.remove_all();
        markers.remove_all();
        points.remove_all();

        let mut clusters = Vec::with_capacity(kept_len + built_len);
        for finalized in kept.into_iter().chain(built) {
            let mut draft = ClusterDraft::new(finalized.cluster.position, finalized.members.len());
            self.events.raise(&finalized.members, &mut draft);
            let emitted = materialize(&draft, &mut labels, &mut markers, &mut points);
            if emitted.is_empty() {
                trace!(members = finalized.members.len(), "cluster has no geometry");
            }
            clusters.push(finalized.cluster);
        }

        self.cluster_labels = (!labels.is_empty()).then_some(labels);
        self.cluster_markers = (!markers.is_empty()).then_some(markers);
        self.cluster_points = (!points.is_empty()).then_some(points);

        debug!(
            gathered = gathered_len,
            kept = kept_len,
            built = built_len,
            direct = direct.len(),
            height,
            previous_height = ?self.tracker.previous_height(),
            "clustering pass"
        );
        self.tracker.record(clusters, height);
        self.state = ClusterState::Idle;
    }
}

fn resting_state(enabled: bool) -> ClusterState {
    if enabled {
        ClusterState::Idle
    } else {
        ClusterState::Disabled
    }
}

fn mark_all_rendered<P: Primitive>(collection: Option<&mut Collection<P>>) {
    for primitive in collection.into_iter().flat_map(Collection::iter_mut) {
        primitive.flags_mut().insert(PrimitiveFlags::RENDER);
    }
}
