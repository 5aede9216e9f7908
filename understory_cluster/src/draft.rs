// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cluster drafts: the styleable stand-in handed to cluster listeners, and how a finished
//! draft turns into cluster primitives.

use core::fmt::Debug;

use glam::DVec3;

use crate::primitive::{
    Collection, Color, DEFAULT_FONT, Label, LabelStyle, Marker, PointPrimitive, PrimitiveFlags,
};

/// Default outline width of cluster labels.
pub const DEFAULT_OUTLINE_WIDTH: f64 = 1.0;

/// Default pixel size of cluster points.
pub const DEFAULT_POINT_SIZE: f64 = 10.0;

/// A styling value that is either fixed or varies with time.
///
/// Clusters are rebuilt from scratch on every pass, so only [`Property::Constant`] values are
/// honored when a draft is materialized. A draft field holding a [`Property::Dynamic`] value is
/// treated as unusable.
pub enum Property<T> {
    /// A fixed value.
    Constant(T),
    /// A value sampled at a time in seconds.
    Dynamic(Box<dyn Fn(f64) -> T>),
}

impl<T: Debug> Debug for Property<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl<T> From<T> for Property<T> {
    fn from(value: T) -> Self {
        Self::Constant(value)
    }
}

impl<T> Property<T> {
    /// Wrap a time-varying function.
    pub fn dynamic<F: Fn(f64) -> T + 'static>(f: F) -> Self {
        Self::Dynamic(Box::new(f))
    }

    /// Whether the value is fixed.
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// The fixed value, if any.
    pub fn constant(&self) -> Option<&T> {
        match self {
            Self::Constant(value) => Some(value),
            Self::Dynamic(_) => None,
        }
    }
}

/// Label styling of a cluster draft. Unset fields fall back to the cluster defaults.
#[derive(Debug, Default)]
pub struct LabelGraphics {
    /// Text. Required for a label to be emitted.
    pub text: Option<Property<String>>,
    /// Font description.
    pub font: Option<Property<String>>,
    /// Fill/outline style.
    pub style: Option<Property<LabelStyle>>,
    /// Fill color.
    pub fill_color: Option<Property<Color>>,
    /// Outline color.
    pub outline_color: Option<Property<Color>>,
    /// Outline width in pixels.
    pub outline_width: Option<Property<f64>>,
}

impl LabelGraphics {
    /// Label graphics with only the text set.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(Property::Constant(text.into())),
            ..Self::default()
        }
    }
}

/// Image marker styling of a cluster draft.
#[derive(Debug, Default)]
pub struct MarkerGraphics {
    /// Image reference. Required for a marker to be emitted.
    pub image: Option<Property<String>>,
}

/// Point styling of a cluster draft.
#[derive(Debug, Default)]
pub struct PointGraphics {
    /// Diameter in pixels.
    pub pixel_size: Option<Property<f64>>,
    /// Fill color.
    pub color: Option<Property<Color>>,
}

/// The styleable stand-in for one cluster, passed to every cluster listener.
///
/// A fresh draft carries a label whose text is the member count. Listeners may replace or
/// remove the label and attach a marker or point. A draft left without any usable graphics
/// produces no primitive; its members stay hidden.
#[derive(Debug)]
pub struct ClusterDraft {
    /// World-space position of the cluster.
    pub position: DVec3,
    /// Label graphics.
    pub label: Option<LabelGraphics>,
    /// Image marker graphics.
    pub marker: Option<MarkerGraphics>,
    /// Point graphics.
    pub point: Option<PointGraphics>,
}

impl ClusterDraft {
    /// A draft labelled with `member_count`.
    ///
    /// ```
    /// use glam::DVec3;
    /// use understory_cluster::ClusterDraft;
    ///
    /// let draft = ClusterDraft::new(DVec3::ZERO, 12_500);
    /// let text = draft.label.unwrap().text.unwrap();
    /// assert_eq!(text.constant().map(String::as_str), Some("12,500"));
    /// ```
    pub fn new(position: DVec3, member_count: usize) -> Self {
        Self {
            position,
            label: Some(LabelGraphics::with_text(format_count(member_count))),
            marker: None,
            point: None,
        }
    }
}

/// Format a count with `,` thousands separators.
pub fn format_count(count: usize) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

/// Which primitives a draft produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Emitted {
    /// A cluster label was added.
    pub label: bool,
    /// A cluster marker was added.
    pub marker: bool,
    /// A cluster point was added.
    pub point: bool,
}

impl Emitted {
    /// Whether the draft produced no primitive at all.
    pub fn is_empty(&self) -> bool {
        !(self.label || self.marker || self.point)
    }
}

// Unset resolves to the default, a constant to its value, a dynamic value to nothing.
fn resolve<T: Clone>(property: Option<&Property<T>>, default: T) -> Option<T> {
    match property {
        None => Some(default),
        Some(property) => property.constant().cloned(),
    }
}

fn label_from<K>(graphics: &LabelGraphics, position: DVec3) -> Option<Label<K>> {
    let text = graphics.text.as_ref()?.constant()?.clone();
    Some(Label {
        flags: PrimitiveFlags::SHOW | PrimitiveFlags::RENDER,
        position,
        owner: None,
        text,
        font: resolve(graphics.font.as_ref(), String::from(DEFAULT_FONT))?,
        style: resolve(graphics.style.as_ref(), LabelStyle::Fill)?,
        fill_color: resolve(graphics.fill_color.as_ref(), Color::WHITE)?,
        outline_color: resolve(graphics.outline_color.as_ref(), Color::BLACK)?,
        outline_width: resolve(graphics.outline_width.as_ref(), DEFAULT_OUTLINE_WIDTH)?,
        ..Label::default()
    })
}

fn marker_from<K>(graphics: &MarkerGraphics, position: DVec3) -> Option<Marker<K>> {
    let image = graphics.image.as_ref()?.constant()?.clone();
    Some(Marker {
        flags: PrimitiveFlags::SHOW | PrimitiveFlags::RENDER,
        position,
        owner: None,
        image: Some(image),
        ..Marker::default()
    })
}

fn point_from<K>(graphics: &PointGraphics, position: DVec3) -> Option<PointPrimitive<K>> {
    Some(PointPrimitive {
        flags: PrimitiveFlags::SHOW | PrimitiveFlags::RENDER,
        position,
        owner: None,
        pixel_size: resolve(graphics.pixel_size.as_ref(), DEFAULT_POINT_SIZE)?,
        color: resolve(graphics.color.as_ref(), Color::WHITE)?,
    })
}

/// Turn a styled draft into cluster primitives.
pub(crate) fn materialize<K>(
    draft: &ClusterDraft,
    labels: &mut Collection<Label<K>>,
    markers: &mut Collection<Marker<K>>,
    points: &mut Collection<PointPrimitive<K>>,
) -> Emitted {
    let mut emitted = Emitted::default();
    if let Some(label) = draft
        .label
        .as_ref()
        .and_then(|g| label_from(g, draft.position))
    {
        labels.add(label);
        emitted.label = true;
    }
    if let Some(marker) = draft
        .marker
        .as_ref()
        .and_then(|g| marker_from(g, draft.position))
    {
        markers.add(marker);
        emitted.marker = true;
    }
    if let Some(point) = draft
        .point
        .as_ref()
        .and_then(|g| point_from(g, draft.position))
    {
        points.add(point);
        emitted.point = true;
    }
    emitted
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sinks {
        labels: Collection<Label<u32>>,
        markers: Collection<Marker<u32>>,
        points: Collection<PointPrimitive<u32>>,
    }

    impl Sinks {
        fn new() -> Self {
            Self {
                labels: Collection::new(),
                markers: Collection::new(),
                points: Collection::new(),
            }
        }

        fn run(&mut self, draft: &ClusterDraft) -> Emitted {
            materialize(draft, &mut self.labels, &mut self.markers, &mut self.points)
        }
    }

    #[test]
    fn count_formatting() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(5), "5");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn default_draft_emits_count_label() {
        let mut sinks = Sinks::new();
        let position = DVec3::new(1.0, 2.0, 3.0);
        let emitted = sinks.run(&ClusterDraft::new(position, 5));
        assert_eq!(
            emitted,
            Emitted {
                label: true,
                ..Emitted::default()
            }
        );
        let label = sinks.labels.get(0).unwrap();
        assert_eq!(label.text, "5");
        assert_eq!(label.font, DEFAULT_FONT);
        assert_eq!(label.fill_color, Color::WHITE);
        assert_eq!(label.outline_color, Color::BLACK);
        assert_eq!(label.outline_width, 1.0);
        assert_eq!(label.position, position);
        assert_eq!(label.owner, None);
        assert!(label.flags.is_drawable());
    }

    #[test]
    fn dynamic_label_fields_suppress_the_label() {
        let mut sinks = Sinks::new();
        let mut draft = ClusterDraft::new(DVec3::ZERO, 3);
        draft.label.as_mut().unwrap().outline_width = Some(Property::dynamic(|t| t * 2.0));
        assert!(sinks.run(&draft).is_empty());

        let mut draft = ClusterDraft::new(DVec3::ZERO, 3);
        draft.label.as_mut().unwrap().text = Some(Property::dynamic(|_| String::from("x")));
        assert!(sinks.run(&draft).is_empty());
        assert!(sinks.labels.is_empty());
    }

    #[test]
    fn custom_marker_without_label() {
        let mut sinks = Sinks::new();
        let mut draft = ClusterDraft::new(DVec3::ZERO, 3);
        draft.label = None;
        draft.marker = Some(MarkerGraphics {
            image: Some("cluster.png".to_string().into()),
        });
        let emitted = sinks.run(&draft);
        assert!(emitted.marker && !emitted.label);
        assert_eq!(
            sinks.markers.get(0).unwrap().image.as_deref(),
            Some("cluster.png")
        );

        draft.marker = Some(MarkerGraphics {
            image: Some(Property::dynamic(|_| String::from("anim.png"))),
        });
        assert!(sinks.run(&draft).is_empty());
    }

    #[test]
    fn point_graphics_use_defaults() {
        let mut sinks = Sinks::new();
        let mut draft = ClusterDraft::new(DVec3::ZERO, 2);
        draft.point = Some(PointGraphics {
            color: Some(Color::BLACK.into()),
            ..PointGraphics::default()
        });
        let emitted = sinks.run(&draft);
        assert!(emitted.point && emitted.label);
        let point = sinks.points.get(0).unwrap();
        assert_eq!(point.pixel_size, DEFAULT_POINT_SIZE);
        assert_eq!(point.color, Color::BLACK);
    }

    #[test]
    fn property_sampling() {
        let fixed: Property<f64> = 2.0.into();
        let ramp = Property::dynamic(|t| t * 10.0);
        assert!(fixed.is_constant());
        assert!(!ramp.is_constant());
        assert_eq!(fixed.constant(), Some(&2.0));
        assert_eq!(ramp.constant(), None);
        assert_eq!(format!("{ramp:?}"), "Dynamic(..)");
    }
}
