//! Drawing contract between the compositor and a host backend.
//!
//! The engine only ever talks to `Surface`. The web crate implements it over
//! a Canvas2D context; tests use the recording `DrawList`.

use glam::Vec2;

use crate::systems::effects::Color;

/// Position along a gradient (0..=1) and its color.
pub type ColorStop = (f32, Color);

/// Compositing mode for subsequent draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    /// Lighter: colors add up. Used for glows and trails.
    Additive,
    /// Keeps the darker of source and destination. Used for dust lanes.
    Darken,
    Screen,
}

/// Radial gradient in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient<'a> {
    pub center: Vec2,
    pub r0: f32,
    pub r1: f32,
    pub stops: &'a [ColorStop],
}

/// How a shape is filled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill<'a> {
    Solid(Color),
    /// Radial falloff from the shape's center to its edge.
    Glow(&'a [ColorStop]),
    /// Top-to-bottom gradient across the shape's bounds.
    Vertical(&'a [ColorStop]),
    /// Explicit radial gradient.
    Radial(Gradient<'a>),
}

/// Handle to an offscreen layer owned by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub u32);

/// A 2D drawing target.
///
/// All coordinates are surface pixels. Callers never pass non-finite values.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn set_blend(&mut self, mode: BlendMode);

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, fill: &Fill);
    fn fill_circle(&mut self, center: Vec2, radius: f32, fill: &Fill);
    /// `radii` are the semi-axes before rotation (radians).
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, fill: &Fill);
    /// Round-capped polyline of uniform width and color.
    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color);

    /// Redirect drawing into a fresh offscreen layer of the given size.
    fn begin_layer(&mut self, width: f32, height: f32) -> LayerId;
    /// Return drawing to the main surface.
    fn end_layer(&mut self);
    /// Composite a finished layer at `offset` with the current blend mode.
    fn draw_layer(&mut self, layer: LayerId, offset: Vec2);
    fn release_layer(&mut self, layer: LayerId);
}

/// Cache key for baked layers. A change in any field invalidates the bake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BakeKey {
    pub width: u32,
    pub height: u32,
    /// Scene generation counter for dirty detection.
    pub generation: u32,
}

impl BakeKey {
    pub fn new(width: f32, height: f32, generation: u32) -> Self {
        Self {
            width: width.max(0.0).round() as u32,
            height: height.max(0.0).round() as u32,
            generation,
        }
    }
}
