//! Easing curves for trail tapers and remnant fades.
//!
//! Input is normalized progress; anything outside [0, 1] (NaN included)
//! is pinned to the nearest end before the curve is applied.

use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Slow start; used for trail taper.
    QuadIn,
    QuadOut,
    /// Smooth at both ends; used for remnant fade-in.
    SineInOut,
}

impl Easing {
    pub const ALL: [Easing; 4] = [Easing::Linear, Easing::QuadIn, Easing::QuadOut, Easing::SineInOut];

    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::SineInOut => 0.5 - 0.5 * (PI * t).cos(),
        }
    }

    /// Mirror of `apply`: 1 at the start, 0 at the end.
    #[inline]
    pub fn falloff(self, t: f32) -> f32 {
        1.0 - self.apply(t)
    }
}
