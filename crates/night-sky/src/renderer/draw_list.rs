//! Recording surface: stores every draw call instead of rasterizing.
//! Used by tests and headless hosts to inspect what a frame would draw.

use glam::Vec2;

use crate::systems::effects::Color;

use super::traits::{BlendMode, ColorStop, Fill, LayerId, Surface};

/// Owned copy of a `Fill`.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Glow(Vec<ColorStop>),
    Vertical(Vec<ColorStop>),
    Radial { center: Vec2, r0: f32, r1: f32, stops: Vec<ColorStop> },
}

impl From<&Fill<'_>> for Paint {
    fn from(fill: &Fill<'_>) -> Self {
        match fill {
            Fill::Solid(c) => Paint::Solid(*c),
            Fill::Glow(stops) => Paint::Glow(stops.to_vec()),
            Fill::Vertical(stops) => Paint::Vertical(stops.to_vec()),
            Fill::Radial(g) => Paint::Radial { center: g.center, r0: g.r0, r1: g.r1, stops: g.stops.to_vec() },
        }
    }
}

impl Paint {
    fn colors(&self) -> Vec<Color> {
        match self {
            Paint::Solid(c) => vec![*c],
            Paint::Glow(s) | Paint::Vertical(s) | Paint::Radial { stops: s, .. } => s.iter().map(|(_, c)| *c).collect(),
        }
    }

    fn scalars(&self) -> Vec<f32> {
        match self {
            Paint::Solid(_) => Vec::new(),
            Paint::Glow(s) | Paint::Vertical(s) => s.iter().map(|(t, _)| *t).collect(),
            Paint::Radial { center, r0, r1, stops } => {
                let mut v = vec![center.x, center.y, *r0, *r1];
                v.extend(stops.iter().map(|(t, _)| *t));
                v
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Blend(BlendMode),
    Rect { origin: Vec2, size: Vec2, paint: Paint },
    Circle { center: Vec2, radius: f32, paint: Paint },
    Ellipse { center: Vec2, radii: Vec2, rotation: f32, paint: Paint },
    Polyline { points: Vec<Vec2>, width: f32, color: Color },
    Ring { center: Vec2, radius: f32, width: f32, color: Color },
    BeginLayer(LayerId),
    EndLayer,
    DrawLayer(LayerId, Vec2),
    ReleaseLayer(LayerId),
}

impl DrawCmd {
    /// Every float carried by the command, colors included.
    fn scalars(&self) -> Vec<f32> {
        let color = |c: &Color| [c.r, c.g, c.b, c.a];
        let mut v = Vec::new();
        match self {
            DrawCmd::Rect { origin, size, paint } => {
                v.extend([origin.x, origin.y, size.x, size.y]);
                v.extend(paint.scalars());
                v.extend(paint.colors().iter().flat_map(color));
            }
            DrawCmd::Circle { center, radius, paint } => {
                v.extend([center.x, center.y, *radius]);
                v.extend(paint.scalars());
                v.extend(paint.colors().iter().flat_map(color));
            }
            DrawCmd::Ellipse { center, radii, rotation, paint } => {
                v.extend([center.x, center.y, radii.x, radii.y, *rotation]);
                v.extend(paint.scalars());
                v.extend(paint.colors().iter().flat_map(color));
            }
            DrawCmd::Polyline { points, width, color: c } => {
                v.extend(points.iter().flat_map(|p| [p.x, p.y]));
                v.push(*width);
                v.extend(color(c));
            }
            DrawCmd::Ring { center, radius, width, color: c } => {
                v.extend([center.x, center.y, *radius, *width]);
                v.extend(color(c));
            }
            DrawCmd::DrawLayer(_, offset) => v.extend([offset.x, offset.y]),
            DrawCmd::Blend(_) | DrawCmd::BeginLayer(_) | DrawCmd::EndLayer | DrawCmd::ReleaseLayer(_) => {}
        }
        v
    }
}

#[derive(Debug, Clone, Default)]
pub struct DrawList {
    width: f32,
    height: f32,
    commands: Vec<DrawCmd>,
    next_layer: u32,
    live_layers: Vec<LayerId>,
    layers_built: u32,
}

impl DrawList {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height, ..Default::default() }
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    /// Forget recorded commands; layers stay alive.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn count(&self, pred: impl Fn(&DrawCmd) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    /// Layers ever begun on this surface.
    pub fn layers_built(&self) -> u32 {
        self.layers_built
    }

    /// Layers begun and not yet released.
    pub fn live_layers(&self) -> &[LayerId] {
        &self.live_layers
    }

    pub fn all_finite(&self) -> bool {
        self.commands.iter().all(|c| c.scalars().iter().all(|v| v.is_finite()))
    }
}

impl Surface for DrawList {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }


    fn set_blend(&mut self, mode: BlendMode) {
        self.commands.push(DrawCmd::Blend(mode));
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, fill: &Fill) {
        self.commands.push(DrawCmd::Rect { origin, size, paint: fill.into() });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, fill: &Fill) {
        self.commands.push(DrawCmd::Circle { center, radius, paint: fill.into() });
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, fill: &Fill) {
        self.commands.push(DrawCmd::Ellipse { center, radii, rotation, paint: fill.into() });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color) {
        self.commands.push(DrawCmd::Polyline { points: points.to_vec(), width, color });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        self.commands.push(DrawCmd::Ring { center, radius, width, color });
    }

    fn begin_layer(&mut self, _width: f32, _height: f32) -> LayerId {
        let id = LayerId(self.next_layer);
        self.next_layer += 1;
        self.layers_built += 1;
        self.live_layers.push(id);
        self.commands.push(DrawCmd::BeginLayer(id));
        id
    }

    fn end_layer(&mut self) {
        self.commands.push(DrawCmd::EndLayer);
    }

    fn draw_layer(&mut self, layer: LayerId, offset: Vec2) {
        self.commands.push(DrawCmd::DrawLayer(layer, offset));
    }

    fn release_layer(&mut self, layer: LayerId) {
        self.live_layers.retain(|l| *l != layer);
        self.commands.push(DrawCmd::ReleaseLayer(layer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut list = DrawList::new(100.0, 50.0);
        list.set_blend(BlendMode::Additive);
        list.fill_circle(Vec2::new(5.0, 5.0), 2.0, &Fill::Solid(Color::WHITE));
        assert_eq!(list.commands().len(), 2);
        assert_eq!(list.commands()[0], DrawCmd::Blend(BlendMode::Additive));
        assert_eq!(list.count(|c| matches!(c, DrawCmd::Circle { .. })), 1);
    }

    #[test]
    fn tracks_layer_lifetimes() {
        let mut list = DrawList::new(100.0, 50.0);
        let a = list.begin_layer(100.0, 50.0);
        list.end_layer();
        let b = list.begin_layer(100.0, 50.0);
        list.end_layer();
        assert_ne!(a, b);
        list.release_layer(a);
        assert_eq!(list.live_layers(), &[b]);
        assert_eq!(list.layers_built(), 2);
    }

    #[test]
    fn detects_non_finite_values() {
        let mut list = DrawList::new(10.0, 10.0);
        let stops = [(0.0, Color::WHITE), (1.0, Color::TRANSPARENT)];
        list.fill_circle(Vec2::ONE, 1.0, &Fill::Glow(&stops));
        assert!(list.all_finite());
        list.stroke_polyline(&[Vec2::ZERO, Vec2::new(f32::NAN, 0.0)], 1.0, Color::WHITE);
        assert!(!list.all_finite());
    }
}
