// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_cluster --heading-base-level=0

//! Understory Cluster: screen-space decluttering of map annotations.
//!
//! Scenes with thousands of labels, image markers, and points anchored in world space become
//! unreadable once they overlap on screen. This crate replaces each group of overlapping
//! annotations with a single cluster annotation and lets everything else render as usual.
//!
//! - Annotations are bound per owning entity through pooled slots that are reused on release.
//! - Each pass projects every shown annotation, indexes the screen coordinates with
//!   [`understory_point_index`], and merges greedily in collection order.
//! - While the camera zooms in, clusters from the previous pass are kept where they still hold
//!   enough members inside a shrinking box, so they do not flicker apart.
//! - A subscribable [`ClusterEvent`] lets the host restyle, or remove, each cluster's label,
//!   marker, and point before they are emitted.
//!
//! ## Where this fits
//!
//! The crate owns no renderer and no camera. A host implements [`SceneView`] to project world
//! positions and test horizon occlusion, and [`RenderSink`] to receive the live primitive
//! collections every frame. Text shaping and image loading stay with the host: a label's
//! [`glyph_extent`](Label::glyph_extent) and a marker's `width`/`height` are what the overlap
//! test sees.
//!
//! ## API overview
//!
//! - [`Clustering`]: the driver. Owns the pools, runs passes, flushes frames.
//! - [`ClusterOptions`]: enabled flag, pixel range, minimum cluster size.
//! - [`Label`], [`Marker`], [`PointPrimitive`]: plain render data with [`PrimitiveFlags`].
//! - [`Pool`]: owner-keyed slot allocator over a [`Collection`].
//! - [`ClusterDraft`]: the styled cluster annotation handed to listeners.
//! - [`Cluster`]: a finalized cluster as remembered between passes.
//!
//! Key operations:
//! - [`Clustering::acquire_label`] / [`Clustering::acquire_marker`] /
//!   [`Clustering::acquire_point`] and the matching `release_*`.
//! - [`Clustering::camera_changed`] runs a pass unless the movement is below
//!   [`MIN_CAMERA_MOVEMENT`].
//! - [`Clustering::set_enabled`], [`Clustering::set_pixel_range`], and
//!   [`Clustering::set_minimum_cluster_size`] re-cluster immediately on change.
//! - [`Clustering::update`] flushes cluster collections, then direct ones.
//!
//! # Example
//!
//! ```rust
//! use glam::DVec3;
//! use kurbo::Point;
//! use understory_cluster::{ClusterOptions, Clustering, LabelGraphics, SceneView};
//!
//! struct Ortho {
//!     height: f64,
//! }
//!
//! impl SceneView for Ortho {
//!     fn project(&self, p: DVec3) -> Option<Point> {
//!         Some(Point::new(p.x, p.y))
//!     }
//!     fn is_visible(&self, p: DVec3) -> bool {
//!         p.z >= 0.0
//!     }
//!     fn camera_height(&self) -> f64 {
//!         self.height
//!     }
//! }
//!
//! let mut clustering = Clustering::<u64>::new(ClusterOptions::default().with_enabled(true));
//! clustering.cluster_event().subscribe(|members, draft| {
//!     draft.label = Some(LabelGraphics::with_text(format!("{} stops", members.len())));
//! });
//!
//! clustering.acquire_point(1).position = DVec3::new(100.0, 100.0, 0.0);
//! clustering.acquire_point(2).position = DVec3::new(120.0, 100.0, 0.0);
//! clustering.acquire_point(3).position = DVec3::new(900.0, 600.0, 0.0);
//! clustering.camera_changed(&Ortho { height: 5_000.0 }, None);
//!
//! assert_eq!(clustering.clusters().len(), 1);
//! assert_eq!(clustering.cluster_labels().unwrap()[0].text, "2 stops");
//! // The lone point keeps rendering on its own.
//! assert!(clustering.point(3).unwrap().flags.is_drawable());
//! assert!(!clustering.point(1).unwrap().flags.is_drawable());
//! ```
//!
//! ## Features
//!
//! - `serde`: derives `Serialize`/`Deserialize` for [`ClusterOptions`].

mod builder;
mod draft;
mod driver;
mod event;
mod footprint;
mod options;
mod pool;
mod primitive;
mod tracker;
mod util;
mod view;

pub use draft::{
    ClusterDraft, DEFAULT_OUTLINE_WIDTH, DEFAULT_POINT_SIZE, Emitted, LabelGraphics,
    MarkerGraphics, PointGraphics, Property, format_count,
};
pub use driver::{ClusterState, Clustering, MIN_CAMERA_MOVEMENT};
pub use event::{ClusterEvent, ListenerId};
pub use footprint::{AnnotationKind, VisualKind};
pub use options::{ClusterOptions, DEFAULT_MINIMUM_CLUSTER_SIZE, DEFAULT_PIXEL_RANGE, OptionsError};
pub use pool::Pool;
pub use primitive::{
    Collection, Color, DEFAULT_FONT, HorizontalOrigin, Label, LabelStyle, Marker, PointPrimitive,
    Primitive, PrimitiveFlags, VerticalOrigin,
};
pub use tracker::Cluster;
pub use view::{Layer, RenderSink, SceneView};
