//! Point particle used for meteor sparkles and explosion debris.

use glam::Vec2;

use super::color::Color;

/// A single particle with physics and rendering state.
///
/// Time is measured in frame units (`k = dt * 60`), so a particle with
/// `decay = 0.02` lives roughly 50 frames at 60 Hz.
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: Color,
    /// 1.0 → 0.0.
    pub life: f32,
    pub decay: f32,
    /// Fraction of velocity lost per frame.
    pub drag: f32,
    /// Downward acceleration per frame.
    pub gravity: f32,
}

impl Particle {
    pub const DEFAULT_DRAG: f32 = 0.04;

    pub fn new(pos: Vec2, vel: Vec2, size: f32, color: Color, decay: f32) -> Self {
        Particle {
            pos,
            vel,
            size,
            color,
            life: 1.0,
            decay,
            drag: Self::DEFAULT_DRAG,
            gravity: 0.0,
        }
    }

    pub fn with_drag(mut self, drag: f32) -> Self {
        self.drag = drag;
        self
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Advance particle physics. Returns false when expired.
    pub fn tick(&mut self, k: f32) -> bool {
        self.life -= self.decay * k;
        if self.life <= 0.0 {
            self.life = 0.0;
            return false;
        }

        self.vel.y += self.gravity * k;
        self.vel *= (1.0 - self.drag).max(0.0).powf(k);
        self.pos += self.vel * k;

        true
    }

    /// Current speed in pixels per frame.
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}
