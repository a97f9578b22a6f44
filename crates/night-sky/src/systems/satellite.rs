//! Satellite pass: a faint dot crossing the upper sky in a straight line,
//! glinting periodically.

use glam::Vec2;

use crate::systems::effects::Rng;

const EDGE_MARGIN: f32 = 30.0;
const GLINT_FADE: f32 = 0.06;

#[derive(Debug, Clone, PartialEq)]
pub struct Satellite {
    pub pos: Vec2,
    /// Pixels per frame.
    pub vel: Vec2,
    pub radius: f32,
    pub alpha: f32,
    /// Frames between glints.
    pub glint_period: f32,
    glint_timer: f32,
    /// Current glint intensity, 0 when dark.
    pub glint: f32,
}

impl Satellite {
    /// Start a pass from the left or right edge across the upper half.
    pub fn spawn(width: f32, height: f32, rng: &mut Rng) -> Self {
        let from_left = rng.chance(0.5);
        let y0 = rng.range(0.05, 0.4) * height;
        let y1 = rng.range(0.05, 0.4) * height;
        let (start, end) = if from_left {
            (Vec2::new(-EDGE_MARGIN, y0), Vec2::new(width + EDGE_MARGIN, y1))
        } else {
            (Vec2::new(width + EDGE_MARGIN, y0), Vec2::new(-EDGE_MARGIN, y1))
        };
        let speed = rng.range(0.6, 1.2);
        let period = rng.range(90.0, 240.0);
        Self {
            pos: start,
            vel: (end - start).normalize_or(Vec2::X) * speed,
            radius: rng.range(0.8, 1.3),
            alpha: rng.range(0.45, 0.75),
            glint_period: period,
            glint_timer: rng.range(0.0, period),
            glint: 0.0,
        }
    }

    /// Advance by `k` frame units. Returns false once the pass is over.
    pub fn update(&mut self, k: f32, bounds: Vec2) -> bool {
        self.pos += self.vel * k;
        self.glint = (self.glint - GLINT_FADE * k).max(0.0);
        self.glint_timer -= k;
        if self.glint_timer <= 0.0 {
            self.glint = 1.0;
            self.glint_timer += self.glint_period.max(1.0);
        }
        self.pos.x >= -EDGE_MARGIN * 2.0
            && self.pos.x <= bounds.x + EDGE_MARGIN * 2.0
            && self.pos.y >= -EDGE_MARGIN * 2.0
            && self.pos.y <= bounds.y + EDGE_MARGIN * 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crosses_and_leaves() {
        let bounds = Vec2::new(800.0, 600.0);
        let mut sat = Satellite::spawn(bounds.x, bounds.y, &mut Rng::new(3));
        let mut frames = 0;
        while sat.update(1.0, bounds) {
            assert!(sat.pos.y < bounds.y * 0.5);
            frames += 1;
            assert!(frames < 5000, "satellite never left");
        }
        assert!(frames > 500);
    }

    #[test]
    fn glints_periodically() {
        let bounds = Vec2::new(10_000.0, 600.0);
        let mut sat = Satellite::spawn(bounds.x, bounds.y, &mut Rng::new(5));
        let mut glints = 0;
        let mut last = 0.0;
        for _ in 0..1000 {
            sat.update(1.0, bounds);
            if sat.glint == 1.0 && last < 1.0 {
                glints += 1;
            }
            last = sat.glint;
        }
        assert!(glints >= 4, "glints {}", glints);
    }
}
