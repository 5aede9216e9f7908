// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen-space footprints used for overlap testing.

use kurbo::{Point, Rect, Size};

use crate::primitive::{HorizontalOrigin, Label, Marker, PointPrimitive, VerticalOrigin};

/// Which collection an annotation lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// Text label.
    Label,
    /// Image marker.
    Marker,
    /// Simple point.
    Point,
}

/// A borrowed annotation tagged with its visual kind.
#[derive(Clone, Copy, Debug)]
pub enum VisualKind<'a, K> {
    /// Text label.
    Label(&'a Label<K>),
    /// Image marker.
    Marker(&'a Marker<K>),
    /// Simple point.
    Point(&'a PointPrimitive<K>),
}

impl<K> VisualKind<'_, K> {
    /// The collection this annotation belongs to.
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Self::Label(_) => AnnotationKind::Label,
            Self::Marker(_) => AnnotationKind::Marker,
            Self::Point(_) => AnnotationKind::Point,
        }
    }

    /// Inflated screen-space footprint of the annotation drawn at `coord`.
    ///
    /// ```
    /// use kurbo::{Point, Rect};
    /// use understory_cluster::{PointPrimitive, VisualKind};
    ///
    /// let point = PointPrimitive::<u32> { pixel_size: 10.0, ..Default::default() };
    /// let footprint = VisualKind::Point(&point).footprint(Point::new(100.0, 50.0), 20.0);
    /// assert_eq!(footprint, Rect::new(75.0, 25.0, 125.0, 75.0));
    /// ```
    pub fn footprint(&self, coord: Point, pixel_range: f64) -> Rect {
        let bounds = match self {
            Self::Label(label) => label_bounds(label, coord),
            Self::Marker(marker) => marker_bounds(marker, coord),
            Self::Point(point) => Rect::from_center_size(
                coord,
                Size::new(point.pixel_size, point.pixel_size),
            ),
        };
        bounds.inflate(pixel_range, pixel_range)
    }
}

fn label_bounds<K>(label: &Label<K>, coord: Point) -> Rect {
    let size = label.glyph_extent * label.scale;
    anchored(coord, size, label.horizontal_origin, label.vertical_origin)
}

fn marker_bounds<K>(marker: &Marker<K>, coord: Point) -> Rect {
    let size = Size::new(marker.width, marker.height) * marker.scale;
    anchored(coord, size, marker.horizontal_origin, marker.vertical_origin)
}

fn anchored(
    coord: Point,
    size: Size,
    horizontal: HorizontalOrigin,
    vertical: VerticalOrigin,
) -> Rect {
    let x = match horizontal {
        HorizontalOrigin::Left => coord.x,
        HorizontalOrigin::Center => coord.x - size.width * 0.5,
        HorizontalOrigin::Right => coord.x - size.width,
    };
    let y = match vertical {
        VerticalOrigin::Top => coord.y,
        VerticalOrigin::Center => coord.y - size.height * 0.5,
        VerticalOrigin::Baseline | VerticalOrigin::Bottom => coord.y - size.height,
    };
    Rect::from_origin_size((x, y), size)
}
