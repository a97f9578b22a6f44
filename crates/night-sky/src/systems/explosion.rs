//! Multi-phase burst spawned where a target meteor lands.
//!
//! Nova, fireball, shock rings, debris and remnant run concurrently on their
//! own clocks. The explosion stays live while any of them is active.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::api::types::EntityId;
use crate::extensions::Easing;
use crate::systems::effects::{Color, Particle, Rng};

/// Nova intensity below this counts as exhausted.
pub const NOVA_THRESHOLD: f32 = 0.01;
/// Debris slower than this (px/frame) is drawn as a dot without a streak.
pub const STREAK_SPEED: f32 = 1.5;

const DEBRIS_GRAVITY: f32 = 0.035;
const REMNANT_COUNT: (u32, u32) = (35, 40);

/// Concentric radial blooms with linearly falling intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct Nova {
    pub intensity: f32,
    pub decay: f32,
    /// Bloom radii, innermost first.
    pub blooms: [f32; 3],
}

impl Nova {
    pub fn is_active(&self) -> bool {
        self.intensity > NOVA_THRESHOLD
    }

    fn update(&mut self, k: f32) {
        self.intensity = (self.intensity - self.decay * k).max(0.0);
    }
}

/// Hot core that swells toward `max_radius` while fading.
#[derive(Debug, Clone, PartialEq)]
pub struct Fireball {
    pub radius: f32,
    pub max_radius: f32,
    pub life: f32,
    pub decay: f32,
}

impl Fireball {
    pub fn is_active(&self) -> bool {
        self.life > 0.0
    }

    fn update(&mut self, k: f32) {
        let approach = 1.0 - 0.88f32.powf(k);
        self.radius += (self.max_radius - self.radius) * approach;
        self.life = (self.life - self.decay * k).max(0.0);
    }
}

/// Expanding shock front.
#[derive(Debug, Clone, PartialEq)]
pub struct ShockRing {
    pub radius: f32,
    pub max_radius: f32,
    /// Pixels per frame.
    pub speed: f32,
    pub life: f32,
    pub decay: f32,
    pub width: f32,
    pub color: Color,
}

impl ShockRing {
    pub fn is_active(&self) -> bool {
        self.life > 0.0
    }

    fn update(&mut self, k: f32) {
        self.radius = (self.radius + self.speed * k).min(self.max_radius);
        self.life = (self.life - self.decay * k).max(0.0);
    }
}

/// Lingering glow puff: waits `delay`, ramps in, holds, then decays.
#[derive(Debug, Clone, PartialEq)]
pub struct RemnantParticle {
    /// Offset from the explosion origin.
    pub offset: Vec2,
    /// Pixels per frame.
    pub drift: Vec2,
    pub size: f32,
    pub color: Color,
    /// Frames.
    pub delay: f32,
    pub ramp: f32,
    pub hold: f32,
    pub decay: f32,
    pub age: f32,
    /// Stays 1.0 until the decay phase, then falls to 0.
    pub life: f32,
}

impl RemnantParticle {
    pub fn is_active(&self) -> bool {
        self.life > 0.0
    }

    pub fn is_visible(&self) -> bool {
        self.age >= self.delay && self.is_active()
    }

    /// Draw opacity in [0, 1].
    pub fn opacity(&self) -> f32 {
        let local = self.age - self.delay;
        if local < 0.0 {
            0.0
        } else if local < self.ramp {
            Easing::SineInOut.apply(local / self.ramp)
        } else {
            self.life.clamp(0.0, 1.0)
        }
    }

    fn update(&mut self, k: f32) {
        self.age += k;
        let local = self.age - self.delay;
        if local <= 0.0 {
            return;
        }
        self.offset += self.drift * k;
        if local > self.ramp + self.hold {
            self.life = (self.life - self.decay * k).max(0.0);
        }
    }
}

#[derive(Debug, Clone)]
pub struct Explosion {
    pub id: EntityId,
    pub origin: Vec2,
    pub nova: Nova,
    pub fireball: Fireball,
    pub rings: Vec<ShockRing>,
    pub debris: Vec<Particle>,
    pub remnant: Vec<RemnantParticle>,
}

impl Explosion {
    /// Build every sub-effect at `origin`. `debris` is the tier's particle range.
    pub fn new(origin: Vec2, debris: (u32, u32), rng: &mut Rng) -> Self {
        let nova = Nova {
            intensity: 1.0,
            decay: rng.range(0.03, 0.045),
            blooms: [rng.range(18.0, 26.0), rng.range(45.0, 60.0), rng.range(90.0, 130.0)],
        };
        let fireball = Fireball {
            radius: 2.0,
            max_radius: rng.range(40.0, 70.0),
            life: 1.0,
            decay: rng.range(0.012, 0.02),
        };

        let ring_colors = [Color::rgb(1.0, 0.85, 0.6), Color::rgb(0.7, 0.85, 1.0), Color::rgb(1.0, 0.6, 0.4)];
        let rings = (0..rng.range_inclusive(3, 4))
            .map(|i| ShockRing {
                radius: 0.0,
                max_radius: rng.range(90.0, 200.0),
                speed: rng.range(2.5, 5.0) * (1.0 - i as f32 * 0.12),
                life: 1.0,
                decay: rng.range(0.012, 0.022),
                width: rng.range(2.0, 5.0),
                color: ring_colors[i as usize % ring_colors.len()],
            })
            .collect();

        let hot = Color::rgb(1.0, 0.95, 0.85);
        let ember = Color::rgb(1.0, 0.5, 0.15);
        let (lo, hi) = (debris.0.min(debris.1), debris.0.max(debris.1));
        let debris = (0..rng.range_inclusive(lo, hi))
            .map(|_| {
                let angle = rng.range(0.0, TAU);
                let vel = Vec2::from_angle(angle) * rng.range(1.0, 7.0);
                Particle::new(origin, vel, rng.range(0.6, 2.2), hot.lerp(ember, rng.next_f32()), rng.range(0.008, 0.02))
                    .with_drag(rng.range(0.02, 0.05))
                    .with_gravity(DEBRIS_GRAVITY)
            })
            .collect();

        let remnant_tints = [Color::rgb(0.85, 0.35, 0.7), Color::rgb(0.35, 0.7, 0.85), Color::rgb(0.95, 0.55, 0.4)];
        let remnant = (0..rng.range_inclusive(REMNANT_COUNT.0, REMNANT_COUNT.1))
            .map(|_| RemnantParticle {
                offset: Vec2::new(rng.gaussian(), rng.gaussian()) * 40.0,
                drift: Vec2::new(rng.range(-0.12, 0.12), rng.range(-0.12, 0.12)),
                size: rng.range(12.0, 34.0),
                color: remnant_tints[rng.next_int(remnant_tints.len() as u32) as usize],
                delay: rng.range(10.0, 60.0),
                ramp: rng.range(20.0, 40.0),
                hold: rng.range(30.0, 90.0),
                decay: rng.range(0.004, 0.008),
                age: 0.0,
                life: 1.0,
            })
            .collect();

        log::debug!("explosion at ({:.0}, {:.0})", origin.x, origin.y);
        Self {
            id: EntityId(0),
            origin,
            nova,
            fireball,
            rings,
            debris,
            remnant,
        }
    }

    /// Advance every sub-effect by `k` frame units.
    pub fn update(&mut self, k: f32) {
        let k = if k.is_finite() { k.max(0.0) } else { 0.0 };
        self.nova.update(k);
        self.fireball.update(k);
        for ring in self.rings.iter_mut() {
            ring.update(k);
        }
        self.debris.retain_mut(|p| p.tick(k));
        for p in self.remnant.iter_mut() {
            p.update(k);
        }
    }

    pub fn is_active(&self) -> bool {
        self.nova.is_active()
            || self.fireball.is_active()
            || !self.debris.is_empty()
            || self.rings.iter().any(ShockRing::is_active)
            || self.remnant.iter().any(RemnantParticle::is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boom(seed: u64) -> Explosion {
        Explosion::new(Vec2::new(400.0, 300.0), (90, 120), &mut Rng::new(seed))
    }

    fn exhaust(e: &mut Explosion) {
        e.nova.intensity = 0.0;
        e.fireball.life = 0.0;
        e.debris.clear();
        for r in e.rings.iter_mut() {
            r.life = 0.0;
        }
        for p in e.remnant.iter_mut() {
            p.life = 0.0;
        }
    }

    #[test]
    fn sub_effect_counts() {
        let e = boom(1);
        assert!((3..=4).contains(&e.rings.len()));
        assert!((90..=120).contains(&e.debris.len()));
        assert!((35..=40).contains(&e.remnant.len()));
        assert!(e.is_active());
    }

    #[test]
    fn reversed_debris_range_is_tolerated() {
        let e = Explosion::new(Vec2::ZERO, (120, 90), &mut Rng::new(2));
        assert!((90..=120).contains(&e.debris.len()));
    }

    #[test]
    fn inactive_once_everything_is_exhausted() {
        let mut e = boom(3);
        exhaust(&mut e);
        assert!(!e.is_active());
    }

    #[test]
    fn any_single_sub_effect_keeps_it_alive() {
        let mut e = boom(4);
        exhaust(&mut e);
        e.rings[0].life = 0.1;
        assert!(e.is_active());

        exhaust(&mut e);
        e.remnant[0].life = 0.5;
        assert!(e.is_active());

        exhaust(&mut e);
        e.nova.intensity = 0.5;
        assert!(e.is_active());

        exhaust(&mut e);
        e.debris.push(Particle::new(Vec2::ZERO, Vec2::ZERO, 1.0, Color::WHITE, 0.1));
        assert!(e.is_active());
    }

    #[test]
    fn eventually_burns_out() {
        let mut e = boom(5);
        let mut frames = 0;
        while e.is_active() {
            e.update(1.0);
            frames += 1;
            assert!(frames < 2000, "explosion never ended");
        }
        assert!(e.debris.is_empty());
        assert!(frames > 60);
    }

    #[test]
    fn fireball_grows_toward_max() {
        let mut e = boom(6);
        let max = e.fireball.max_radius;
        for _ in 0..30 {
            e.update(1.0);
        }
        assert!(e.fireball.radius > max * 0.9 && e.fireball.radius <= max);
    }

    #[test]
    fn rings_stop_at_max_radius() {
        let mut e = boom(7);
        for _ in 0..200 {
            e.update(1.0);
        }
        for r in &e.rings {
            assert!(r.radius <= r.max_radius);
        }
    }

    #[test]
    fn remnant_waits_then_ramps_and_fades() {
        let mut p = RemnantParticle {
            offset: Vec2::ZERO,
            drift: Vec2::ZERO,
            size: 10.0,
            color: Color::WHITE,
            delay: 10.0,
            ramp: 10.0,
            hold: 10.0,
            decay: 0.1,
            age: 0.0,
            life: 1.0,
        };
        p.update(5.0);
        assert_eq!(p.opacity(), 0.0);
        assert!(!p.is_visible() && p.is_active());
        p.update(10.0);
        assert!(p.opacity() > 0.0 && p.opacity() < 1.0);
        p.update(10.0);
        assert_eq!(p.opacity(), 1.0);
        for _ in 0..20 {
            p.update(1.0);
        }
        assert!(!p.is_active());
    }

    #[test]
    fn two_explosions_decay_independently() {
        let mut a = boom(8);
        let b = boom(9);
        for _ in 0..10 {
            a.update(1.0);
        }
        assert!(a.nova.intensity < b.nova.intensity);
        assert_eq!(b.nova.intensity, 1.0);
    }
}
