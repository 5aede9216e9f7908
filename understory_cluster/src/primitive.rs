// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render primitives (labels, markers, points) and the collections holding them.
//!
//! These are plain data. Geometry and texture generation, and the actual draw calls, belong to
//! the rendering collaborator which receives the collections through
//! [`RenderSink`](crate::RenderSink).

use glam::DVec3;
use kurbo::Size;

/// Default label font.
pub const DEFAULT_FONT: &str = "30px sans-serif";

bitflags::bitflags! {
    /// Per-primitive visibility flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PrimitiveFlags: u8 {
        /// Shown by the binding layer. Hidden primitives never take part in clustering.
        const SHOW   = 0b0000_0001;
        /// Drawn individually. Cleared for annotations absorbed into a cluster.
        const RENDER = 0b0000_0010;
    }
}

impl Default for PrimitiveFlags {
    fn default() -> Self {
        Self::SHOW | Self::RENDER
    }
}

impl PrimitiveFlags {
    /// Whether a primitive with these flags should be drawn.
    pub fn is_drawable(self) -> bool {
        self.contains(Self::SHOW | Self::RENDER)
    }
}

/// Straight RGBA color with `f32` channels in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Create a color from its channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// How label glyphs are painted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LabelStyle {
    /// Fill only.
    #[default]
    Fill,
    /// Outline only.
    Outline,
    /// Fill, then outline.
    FillAndOutline,
}

/// Horizontal anchor of a primitive relative to its projected position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HorizontalOrigin {
    /// The position is the left edge.
    Left,
    /// The position is the horizontal center.
    Center,
    /// The position is the right edge.
    Right,
}

/// Vertical anchor of a primitive relative to its projected position.
///
/// Screen space grows downwards, so `Bottom` means the primitive sits above the position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VerticalOrigin {
    /// The position is the top edge.
    Top,
    /// The position is the vertical center.
    Center,
    /// The position is the text baseline (treated as the bottom edge).
    Baseline,
    /// The position is the bottom edge.
    Bottom,
}

/// Common access to the fields clustering and pooling need.
pub trait Primitive: Default {
    /// Identifier of the scene entity owning a primitive.
    type Owner: Copy;

    /// Visibility flags.
    fn flags(&self) -> PrimitiveFlags;

    /// Mutable visibility flags.
    fn flags_mut(&mut self) -> &mut PrimitiveFlags;

    /// World-space position.
    fn position(&self) -> DVec3;

    /// Owning entity, if any. Cluster primitives have none.
    fn owner(&self) -> Option<Self::Owner>;

    /// Set the owning entity.
    fn set_owner(&mut self, owner: Option<Self::Owner>);

    /// Clear styling and ownership, and hide the primitive.
    fn reset(&mut self) {
        *self = Self::default();
        self.flags_mut().remove(PrimitiveFlags::SHOW);
    }
}

/// A text label.
#[derive(Clone, Debug, PartialEq)]
pub struct Label<K> {
    /// Visibility flags.
    pub flags: PrimitiveFlags,
    /// World-space anchor position.
    pub position: DVec3,
    /// Owning entity.
    pub owner: Option<K>,
    /// Text to draw.
    pub text: String,
    /// CSS-style font description.
    pub font: String,
    /// Fill/outline style.
    pub style: LabelStyle,
    /// Glyph fill color.
    pub fill_color: Color,
    /// Glyph outline color.
    pub outline_color: Color,
    /// Glyph outline width in pixels.
    pub outline_width: f64,
    /// Uniform scale applied to the glyph run.
    pub scale: f64,
    /// Horizontal anchor.
    pub horizontal_origin: HorizontalOrigin,
    /// Vertical anchor.
    pub vertical_origin: VerticalOrigin,
    /// Unscaled extent of the laid-out glyph run, provided by the glyph layout collaborator.
    pub glyph_extent: Size,
}

impl<K> Default for Label<K> {
    fn default() -> Self {
        Self {
            flags: PrimitiveFlags::default(),
            position: DVec3::ZERO,
            owner: None,
            text: String::new(),
            font: String::from(DEFAULT_FONT),
            style: LabelStyle::Fill,
            fill_color: Color::WHITE,
            outline_color: Color::BLACK,
            outline_width: 1.0,
            scale: 1.0,
            horizontal_origin: HorizontalOrigin::Left,
            vertical_origin: VerticalOrigin::Baseline,
            glyph_extent: Size::ZERO,
        }
    }
}

impl<K> Label<K> {
    /// Set [`glyph_extent`](Self::glyph_extent) from per-glyph sizes: widths add up, the
    /// height is the tallest glyph.
    ///
    /// ```
    /// use kurbo::Size;
    /// use understory_cluster::Label;
    ///
    /// let mut label = Label::<u32>::default();
    /// label.set_glyph_run([Size::new(10.0, 20.0), Size::new(12.0, 24.0)]);
    /// assert_eq!(label.glyph_extent, Size::new(22.0, 24.0));
    /// ```
    pub fn set_glyph_run<I: IntoIterator<Item = Size>>(&mut self, glyphs: I) {
        let mut extent = Size::ZERO;
        for glyph in glyphs {
            extent.width += glyph.width;
            extent.height = extent.height.max(glyph.height);
        }
        self.glyph_extent = extent;
    }
}

/// An image marker (billboard).
#[derive(Clone, Debug, PartialEq)]
pub struct Marker<K> {
    /// Visibility flags.
    pub flags: PrimitiveFlags,
    /// World-space anchor position.
    pub position: DVec3,
    /// Owning entity.
    pub owner: Option<K>,
    /// Image reference understood by the rendering collaborator (URL, atlas key, ...).
    pub image: Option<String>,
    /// Image width in pixels.
    pub width: f64,
    /// Image height in pixels.
    pub height: f64,
    /// Uniform scale applied to the image.
    pub scale: f64,
    /// Horizontal anchor.
    pub horizontal_origin: HorizontalOrigin,
    /// Vertical anchor.
    pub vertical_origin: VerticalOrigin,
}

impl<K> Default for Marker<K> {
    fn default() -> Self {
        Self {
            flags: PrimitiveFlags::default(),
            position: DVec3::ZERO,
            owner: None,
            image: None,
            width: 0.0,
            height: 0.0,
            scale: 1.0,
            horizontal_origin: HorizontalOrigin::Center,
            vertical_origin: VerticalOrigin::Center,
        }
    }
}

/// A screen-aligned dot of fixed pixel size.
#[derive(Clone, Debug, PartialEq)]
pub struct PointPrimitive<K> {
    /// Visibility flags.
    pub flags: PrimitiveFlags,
    /// World-space position.
    pub position: DVec3,
    /// Owning entity.
    pub owner: Option<K>,
    /// Diameter in pixels.
    pub pixel_size: f64,
    /// Fill color.
    pub color: Color,
}

impl<K> Default for PointPrimitive<K> {
    fn default() -> Self {
        Self {
            flags: PrimitiveFlags::default(),
            position: DVec3::ZERO,
            owner: None,
            pixel_size: 10.0,
            color: Color::WHITE,
        }
    }
}

macro_rules! impl_primitive {
    ($ty:ident) => {
        impl<K: Copy> Primitive for $ty<K> {
            type Owner = K;

            fn flags(&self) -> PrimitiveFlags {
                self.flags
            }

            fn flags_mut(&mut self) -> &mut PrimitiveFlags {
                &mut self.flags
            }

            fn position(&self) -> DVec3 {
                self.position
            }

            fn owner(&self) -> Option<K> {
                self.owner
            }

            fn set_owner(&mut self, owner: Option<K>) {
                self.owner = owner;
            }
        }
    };
}

impl_primitive!(Label);
impl_primitive!(Marker);
impl_primitive!(PointPrimitive);

/// Growable collection of primitives addressed by slot index.
#[derive(Clone, Debug, PartialEq)]
pub struct Collection<P> {
    items: Vec<P>,
}

impl<P> Default for Collection<P> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<P> Collection<P> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a primitive and return its slot.
    pub fn add(&mut self, primitive: P) -> usize {
        self.items.push(primitive);
        self.items.len() - 1
    }

    /// Primitive in `slot`.
    pub fn get(&self, slot: usize) -> Option<&P> {
        self.items.get(slot)
    }

    /// Mutable primitive in `slot`.
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut P> {
        self.items.get_mut(slot)
    }

    /// Number of slots, including hidden ones.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection has no slots.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove every primitive.
    pub fn remove_all(&mut self) {
        self.items.clear();
    }

    /// All primitives in slot order.
    pub fn iter(&self) -> core::slice::Iter<'_, P> {
        self.items.iter()
    }

    /// All primitives in slot order, mutably.
    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, P> {
        self.items.iter_mut()
    }
}

impl<P> core::ops::Index<usize> for Collection<P> {
    type Output = P;

    fn index(&self, slot: usize) -> &P {
        &self.items[slot]
    }
}

impl<P> core::ops::IndexMut<usize> for Collection<P> {
    fn index_mut(&mut self, slot: usize) -> &mut P {
        &mut self.items[slot]
    }
}

impl<P: Primitive> Collection<P> {
    /// Primitives that are both shown and rendered individually.
    pub fn drawable(&self) -> impl Iterator<Item = &P> + '_ {
        self.items.iter().filter(|p| p.flags().is_drawable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_hides_and_clears() {
        let mut marker = Marker::<u32> {
            owner: Some(7),
            image: Some("pin.png".into()),
            width: 32.0,
            ..Marker::default()
        };
        marker.reset();
        assert_eq!(marker.owner, None);
        assert_eq!(marker.image, None);
        assert!(!marker.flags.contains(PrimitiveFlags::SHOW));
        assert!(!marker.flags.is_drawable());
    }

    #[test]
    fn drawable_needs_show_and_render() {
        let mut points = Collection::new();
        points.add(PointPrimitive::<u32>::default());
        let hidden = points.add(PointPrimitive::default());
        let clustered = points.add(PointPrimitive::default());
        points.get_mut(hidden).unwrap().flags.remove(PrimitiveFlags::SHOW);
        points
            .get_mut(clustered)
            .unwrap()
            .flags
            .remove(PrimitiveFlags::RENDER);

        assert_eq!(points.len(), 3);
        assert_eq!(points.drawable().count(), 1);

        points.remove_all();
        assert!(points.is_empty());
    }
}
