pub mod compositor;
pub mod draw_list;
pub mod explosion_pass;
pub mod meteor_pass;
pub mod probe;
pub mod raster;
pub mod traits;

// Re-export key types for convenient access
pub use compositor::Compositor;
pub use draw_list::{DrawCmd, DrawList, Paint};
pub use probe::{CapabilityProbe, HardwareHints, ProbeError, ProbeOutcome, ProbeSurface, PROBE_FILLS};
pub use raster::BandRaster;
pub use traits::{BakeKey, BlendMode, ColorStop, Fill, Gradient, LayerId, Surface};

use glam::Vec2;

use crate::systems::effects::Color;

/// Soft three-stop falloff from `color` at the center to transparent.
pub(crate) fn glow_stops(color: Color) -> [ColorStop; 3] {
    [(0.0, color), (0.45, color.fade(0.45)), (1.0, color.with_alpha(0.0))]
}

/// Radius or width safe to hand to a surface: finite and non-negative.
pub(crate) fn radius(r: f32) -> f32 {
    if r.is_finite() { r.max(0.0) } else { 0.0 }
}

pub(crate) fn drawable(p: Vec2) -> bool {
    p.is_finite()
}
