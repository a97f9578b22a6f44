//! Ambient nebulae: large faint colored ellipses drifting imperceptibly.

use glam::Vec2;

use crate::systems::effects::{Color, Rng};

/// Slow positional drift in normalized units per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Drift {
    pub velocity: Vec2,
}

impl Drift {
    /// Wrap margin so drifting shapes leave fully before reappearing.
    const MARGIN: f32 = 0.25;

    pub fn random(rng: &mut Rng, max_speed: f32) -> Self {
        Self {
            velocity: Vec2::new(rng.range(-max_speed, max_speed), rng.range(-max_speed, max_speed) * 0.5),
        }
    }

    /// Position of a shape that started at `origin`, `t` seconds later.
    pub fn apply(&self, origin: Vec2, t: f32) -> Vec2 {
        let span = 1.0 + 2.0 * Self::MARGIN;
        let p = origin + self.velocity * t;
        Vec2::new(
            (p.x + Self::MARGIN).rem_euclid(span) - Self::MARGIN,
            (p.y + Self::MARGIN).rem_euclid(span) - Self::MARGIN,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nebula {
    /// Normalized starting position.
    pub pos: Vec2,
    /// Extents normalized to the longer surface side.
    pub rx: f32,
    pub ry: f32,
    pub rotation: f32,
    pub inner: Color,
    pub outer: Color,
    pub drift: Drift,
}

const NEBULA_TINTS: [Color; 4] = [
    Color::rgb(0.45, 0.25, 0.7),
    Color::rgb(0.2, 0.35, 0.75),
    Color::rgb(0.15, 0.55, 0.6),
    Color::rgb(0.65, 0.25, 0.45),
];

pub fn generate_nebulae(count: usize, rng: &mut Rng) -> Vec<Nebula> {
    (0..count)
        .map(|_| {
            let tint = NEBULA_TINTS[rng.next_int(NEBULA_TINTS.len() as u32) as usize];
            let alpha = rng.range(0.025, 0.06);
            Nebula {
                pos: Vec2::new(rng.next_f32(), rng.next_f32()),
                rx: rng.range(0.15, 0.35),
                ry: rng.range(0.1, 0.25),
                rotation: rng.range(0.0, std::f32::consts::PI),
                inner: tint.with_alpha(alpha),
                outer: tint.with_alpha(0.0),
                drift: Drift::random(rng, 0.0006),
            }
        })
        .collect()
}
