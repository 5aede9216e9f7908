// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clustering a handful of map pins while the camera zooms in.
//!
//! This example shows how to:
//! - implement `SceneView` with a simple perspective-style projection,
//! - bind markers and companion labels to entity ids,
//! - restyle clusters from a `ClusterEvent` listener,
//! - flush the live collections through a `RenderSink`.
//!
//! Run:
//! - `cargo run -p understory_demos --example cluster_zoom`

use glam::DVec3;
use kurbo::{Point, Size};
use understory_cluster::{
    ClusterOptions, Clustering, Collection, Label, LabelGraphics, Layer, Marker, PointPrimitive,
    RenderSink, SceneView,
};

/// Looks straight down at the XY plane; screen scale is inversely proportional to height.
struct Camera {
    center: DVec3,
    height: f64,
    viewport: Size,
}

impl Camera {
    fn scale(&self) -> f64 {
        1000.0 / self.height
    }
}

impl SceneView for Camera {
    fn project(&self, position: DVec3) -> Option<Point> {
        let offset = (position - self.center) * self.scale();
        let p = Point::new(
            self.viewport.width * 0.5 + offset.x,
            self.viewport.height * 0.5 - offset.y,
        );
        let on_screen = (0.0..=self.viewport.width).contains(&p.x)
            && (0.0..=self.viewport.height).contains(&p.y);
        on_screen.then_some(p)
    }

    fn is_visible(&self, position: DVec3) -> bool {
        position.z >= 0.0
    }

    fn camera_height(&self) -> f64 {
        self.height
    }
}

/// Prints what a renderer would draw.
struct Printer;

impl RenderSink<u32> for Printer {
    fn labels(&mut self, layer: Layer, labels: &Collection<Label<u32>>) {
        for label in labels.iter().filter(|l| l.flags.is_drawable()) {
            println!("  {layer:?} label {:?} at {:?}", label.text, label.position);
        }
    }

    fn markers(&mut self, layer: Layer, markers: &Collection<Marker<u32>>) {
        for marker in markers.iter().filter(|m| m.flags.is_drawable()) {
            println!("  {layer:?} marker {:?} at {:?}", marker.image, marker.position);
        }
    }

    fn points(&mut self, layer: Layer, points: &Collection<PointPrimitive<u32>>) {
        for point in points.iter().filter(|p| p.flags.is_drawable()) {
            println!("  {layer:?} point at {:?}", point.position);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let stops = [
        (1, "Harbor", DVec3::new(0.0, 0.0, 0.0)),
        (2, "Market", DVec3::new(6.0, 2.0, 0.0)),
        (3, "Museum", DVec3::new(3.0, -5.0, 0.0)),
        (4, "Station", DVec3::new(60.0, 40.0, 0.0)),
        (5, "Airport", DVec3::new(-120.0, 90.0, 0.0)),
    ];

    let mut clustering = Clustering::new(ClusterOptions::default().with_pixel_range(20.0));
    for (id, name, position) in stops {
        let marker = clustering.acquire_marker(id);
        marker.position = position;
        marker.image = Some(String::from("pin.png"));
        marker.width = 24.0;
        marker.height = 24.0;

        let label = clustering.acquire_label(id);
        label.position = position;
        label.text = String::from(name);
        // Rough monospace metrics; a real host measures shaped glyphs.
        label.glyph_extent = Size::new(9.0 * name.len() as f64, 16.0);
    }

    clustering.cluster_event().subscribe(|members, draft| {
        draft.label = Some(LabelGraphics::with_text(format!("{} stops", members.len())));
    });

    let mut camera = Camera {
        center: DVec3::ZERO,
        height: 4000.0,
        viewport: Size::new(800.0, 600.0),
    };
    clustering.set_enabled(&camera, true);

    for height in [4000.0, 2000.0, 500.0, 150.0] {
        let amount = (camera.height - height).abs() / camera.height;
        camera.height = height;
        let ran = clustering.camera_changed(&camera, Some(amount));
        println!(
            "height {height}: pass ran = {ran}, clusters = {}",
            clustering.clusters().len()
        );
        clustering.update(&mut Printer);
    }

    clustering.set_enabled(&camera, false);
    println!("clustering off:");
    clustering.update(&mut Printer);
}
