//! Meteor lifecycle: spawn, flight, optional fragmentation, expiry.
//!
//! Time is in frame units (`k = dt * 60`). A meteor's `life` runs from 1.0
//! down to 0.0 and never increases.

use std::collections::VecDeque;
use std::f32::consts::PI;

use glam::Vec2;

use crate::api::types::EntityId;
use crate::core::quality::TierSettings;
use crate::systems::effects::{MeteorPalette, Particle, Rng};

/// Meteors are kept until this far past the surface edge so long trails
/// never pop out mid-screen.
pub const OFFSCREEN_MARGIN: f32 = 160.0;
/// A target meteor impacts when its path passes within this distance.
pub const IMPACT_RADIUS: f32 = 18.0;
pub const IMPACT_RADIUS_SQ: f32 = IMPACT_RADIUS * IMPACT_RADIUS;
/// Upper bound on the drawn trail length in pixels.
pub const MAX_TRAIL_DISTANCE: f32 = 480.0;

const ION_MAX_SAMPLES: usize = 90;
const ION_FADE: f32 = 0.011;
const ENTRY_FLASH_FADE: f32 = 0.08;
const SPARKLE_CAP: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeteorPhase {
    /// Created, not yet stepped.
    Spawned,
    Flying,
    /// Split into fragments; fading fast.
    Fragmented,
    /// Less than a fifth of its life left.
    Expiring,
}

/// Scheduled transient brightening. Onset and duration are fractions of
/// elapsed life (0 at spawn, 1 at expiry).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flare {
    pub onset: f32,
    pub peak: f32,
    pub duration: f32,
}

impl Flare {
    /// Extra brightness contributed at `elapsed`.
    pub fn intensity(&self, elapsed: f32) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        let local = (elapsed - self.onset) / self.duration;
        if (0.0..=1.0).contains(&local) {
            self.peak * (PI * local).sin()
        } else {
            0.0
        }
    }
}

/// Fragmentation eligibility. `done` flips once and never resets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragmentation {
    /// Elapsed-life fraction at which the meteor splits.
    pub threshold: f32,
    pub done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IonSample {
    pub pos: Vec2,
    pub alpha: f32,
}

/// Persistent glowing wake that fades slower than the trail.
#[derive(Debug, Clone, PartialEq)]
pub struct IonTrail {
    pub samples: VecDeque<IonSample>,
    pub width: f32,
}

impl IonTrail {
    pub fn new(width: f32) -> Self {
        Self {
            samples: VecDeque::with_capacity(ION_MAX_SAMPLES),
            width,
        }
    }

    fn advance(&mut self, head: Vec2, emitting: bool, k: f32) {
        for s in self.samples.iter_mut() {
            s.alpha -= ION_FADE * k;
        }
        while self.samples.back().is_some_and(|s| s.alpha <= 0.0) {
            self.samples.pop_back();
        }
        if emitting {
            self.samples.push_front(IonSample { pos: head, alpha: 1.0 });
            self.samples.truncate(ION_MAX_SAMPLES);
        }
    }
}

/// Outcome of one meteor step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeteorFate {
    Alive,
    /// Life reached zero.
    Expired,
    /// Left the surface plus margin.
    OutOfBounds,
    /// Target meteor reached its target point.
    Impact(Vec2),
}

impl MeteorFate {
    pub fn is_alive(&self) -> bool {
        matches!(self, MeteorFate::Alive)
    }
}

#[derive(Debug, Clone)]
pub struct Meteor {
    /// Assigned when admitted to the live list.
    pub id: EntityId,
    pub pos: Vec2,
    /// Pixels per frame.
    pub vel: Vec2,
    /// Fraction of velocity lost per frame.
    pub drag: f32,
    pub head_radius: f32,
    pub life: f32,
    /// Life lost per frame.
    pub decay: f32,
    pub palette: MeteorPalette,
    /// Recent head positions, newest first.
    pub trail: VecDeque<Vec2>,
    pub max_trail: usize,
    pub flares: Vec<Flare>,
    /// Current flare multiplier (1.0 when no flare is active).
    pub brightness: f32,
    pub fragmentation: Option<Fragmentation>,
    pub ion_trail: Option<IonTrail>,
    pub sparkles: Vec<Particle>,
    sparkle_timer: f32,
    pub entry_flash: f32,
    /// Impact point for explosion ("egg") meteors.
    pub target: Option<Vec2>,
    pub is_fragment: bool,
    pub phase: MeteorPhase,
}

impl Meteor {
    pub fn new(pos: Vec2, vel: Vec2, head_radius: f32, palette: MeteorPalette) -> Self {
        Self {
            id: EntityId(0),
            pos,
            vel,
            drag: 0.0,
            head_radius: head_radius.max(0.1),
            life: 1.0,
            decay: 0.01,
            palette,
            trail: VecDeque::with_capacity(24),
            max_trail: 24,
            flares: Vec::new(),
            brightness: 1.0,
            fragmentation: None,
            ion_trail: None,
            sparkles: Vec::new(),
            sparkle_timer: 0.0,
            entry_flash: 0.0,
            target: None,
            is_fragment: false,
            phase: MeteorPhase::Spawned,
        }
    }

    // -- Builder pattern --

    pub fn with_decay(mut self, decay: f32) -> Self {
        self.decay = decay.max(0.0);
        self
    }

    pub fn with_drag(mut self, drag: f32) -> Self {
        self.drag = drag.clamp(0.0, 0.5);
        self
    }

    pub fn with_trail_length(mut self, len: usize) -> Self {
        self.max_trail = len.max(2);
        self
    }

    pub fn with_flares(mut self, flares: Vec<Flare>) -> Self {
        self.flares = flares;
        self
    }

    pub fn with_fragmentation(mut self, threshold: f32) -> Self {
        self.fragmentation = Some(Fragmentation { threshold: threshold.clamp(0.05, 0.95), done: false });
        self
    }

    pub fn with_ion_trail(mut self) -> Self {
        self.ion_trail = Some(IonTrail::new(self.head_radius * 1.6));
        self
    }

    pub fn with_entry_flash(mut self, intensity: f32) -> Self {
        self.entry_flash = intensity.clamp(0.0, 1.0);
        self
    }

    pub fn with_target(mut self, target: Vec2) -> Self {
        self.target = Some(target);
        self
    }

    /// Launch a meteor along `heading` (radians, y down) with tier-driven
    /// size, decay and optional extras.
    pub fn launch(pos: Vec2, heading: f32, speed: f32, settings: &TierSettings, rng: &mut Rng) -> Self {
        let vel = Vec2::from_angle(heading) * speed;
        let head = rng.range(settings.meteor_head.0, settings.meteor_head.1);
        let mut meteor = Meteor::new(pos, vel, head, MeteorPalette::random(rng))
            .with_decay(rng.range(0.006, 0.014))
            .with_drag(rng.range(0.0, 0.004))
            .with_trail_length(settings.trail_length);

        if settings.flares {
            let count = rng.weighted(&[0.5, 0.35, 0.15]);
            meteor.flares = (0..count)
                .map(|_| Flare {
                    onset: rng.range(0.15, 0.75),
                    peak: rng.range(0.6, 1.8),
                    duration: rng.range(0.06, 0.18),
                })
                .collect();
        }
        if settings.fragmentation && rng.chance(0.3) {
            meteor = meteor.with_fragmentation(rng.range(0.35, 0.65));
        }
        if settings.ion_trails && rng.chance(0.35) {
            meteor = meteor.with_ion_trail();
        }
        if rng.chance(0.4) {
            meteor = meteor.with_entry_flash(rng.range(0.5, 1.0));
        }
        meteor
    }

    /// Sporadic meteor entering from a random edge.
    pub fn spawn_random(settings: &TierSettings, width: f32, height: f32, rng: &mut Rng) -> Self {
        let speed = rng.range(settings.meteor_speed.0, settings.meteor_speed.1);
        let (pos, heading) = match rng.weighted(&[0.6, 0.2, 0.2]) {
            0 => {
                let x = rng.range(-0.1, 1.1) * width;
                let mut heading = rng.range(0.2 * PI, 0.8 * PI);
                // Aim toward the middle when starting near a side.
                if (x < 0.3 * width && heading > 0.5 * PI) || (x > 0.7 * width && heading < 0.5 * PI) {
                    heading = PI - heading;
                }
                (Vec2::new(x, -20.0), heading)
            }
            1 => (Vec2::new(-20.0, rng.range(0.0, 0.5) * height), rng.range(0.05 * PI, 0.35 * PI)),
            _ => (Vec2::new(width + 20.0, rng.range(0.0, 0.5) * height), rng.range(0.65 * PI, 0.95 * PI)),
        };
        Self::launch(pos, heading, speed, settings, rng)
    }

    /// Egg meteor: flies straight at `target` and never decays on the way.
    pub fn aimed(from: Vec2, target: Vec2, speed: f32, rng: &mut Rng) -> Self {
        let dir = (target - from).normalize_or(Vec2::Y);
        Meteor::new(from, dir * speed.max(1.0), rng.range(2.6, 3.4), MeteorPalette::IRON)
            .with_decay(0.0)
            .with_trail_length(36)
            .with_entry_flash(1.0)
            .with_target(target)
    }

    /// Elapsed fraction of life (0 at spawn).
    pub fn elapsed(&self) -> f32 {
        1.0 - self.life.clamp(0.0, 1.0)
    }

    /// Unit heading.
    pub fn direction(&self) -> Vec2 {
        self.vel.normalize_or_zero()
    }

    /// End-of-life fade in [0, 1], ignoring flares.
    pub fn fade(&self) -> f32 {
        (self.life * 1.6).clamp(0.0, 1.0)
    }

    /// Overall draw intensity: the fade boosted by flares. Exceeds 1 while
    /// a flare is active.
    pub fn intensity(&self) -> f32 {
        self.fade() * self.brightness
    }

    /// Advance one step of `k` frame units.
    ///
    /// Fragments created this step are pushed to `spawned`; the caller
    /// admits them after iterating the live list.
    pub fn update(&mut self, k: f32, bounds: Vec2, rng: &mut Rng, spawned: &mut Vec<Meteor>) -> MeteorFate {
        let k = if k.is_finite() { k.max(0.0) } else { 0.0 };
        if self.phase == MeteorPhase::Spawned {
            self.phase = MeteorPhase::Flying;
        }

        let prev = self.pos;
        self.vel *= (1.0 - self.drag).powf(k);
        self.pos += self.vel * k;
        self.push_trail();

        self.life = (self.life - self.decay * k).max(0.0);
        let elapsed = self.elapsed();
        self.brightness = 1.0 + self.flares.iter().map(|f| f.intensity(elapsed)).sum::<f32>();

        let head = self.pos;
        let emitting = self.life > 0.0;
        if let Some(ion) = self.ion_trail.as_mut() {
            ion.advance(head, emitting, k);
        }
        self.advance_sparkles(k, rng);
        self.entry_flash = (self.entry_flash - ENTRY_FLASH_FADE * k).max(0.0);

        let due = self
            .fragmentation
            .is_some_and(|f| !f.done && elapsed >= f.threshold);
        if due && self.life > 0.0 {
            self.fragment(rng, spawned);
        }
        if self.phase == MeteorPhase::Flying && self.life < 0.2 {
            self.phase = MeteorPhase::Expiring;
        }

        if let Some(target) = self.target {
            if segment_distance_sq(prev, self.pos, target) <= IMPACT_RADIUS_SQ {
                return MeteorFate::Impact(target);
            }
        }
        if self.life <= 0.0 {
            return MeteorFate::Expired;
        }
        let out = self.pos.x < -OFFSCREEN_MARGIN
            || self.pos.y < -OFFSCREEN_MARGIN
            || self.pos.x > bounds.x + OFFSCREEN_MARGIN
            || self.pos.y > bounds.y + OFFSCREEN_MARGIN;
        if out {
            return MeteorFate::OutOfBounds;
        }
        MeteorFate::Alive
    }

    fn push_trail(&mut self) {
        self.trail.push_front(self.pos);
        self.trail.truncate(self.max_trail);

        let mut length = 0.0;
        let mut keep = self.trail.len();
        for i in 1..self.trail.len() {
            length += self.trail[i - 1].distance(self.trail[i]);
            if length > MAX_TRAIL_DISTANCE {
                keep = i;
                break;
            }
        }
        self.trail.truncate(keep);
    }

    fn advance_sparkles(&mut self, k: f32, rng: &mut Rng) {
        self.sparkles.retain_mut(|p| p.tick(k));

        self.sparkle_timer -= k;
        if self.sparkle_timer > 0.0 || self.life <= 0.1 {
            return;
        }
        self.sparkle_timer = rng.range(2.0, 6.0);
        let count = rng.range_inclusive(1, 2);
        for _ in 0..count {
            if self.sparkles.len() >= SPARKLE_CAP {
                break;
            }
            let jitter = Vec2::new(rng.range(-1.0, 1.0), rng.range(-1.0, 1.0)) * self.head_radius;
            let kick = Vec2::new(rng.range(-0.4, 0.4), rng.range(-0.4, 0.4));
            let vel = -self.vel * rng.range(0.05, 0.15) + kick;
            let size = rng.range(0.4, 1.1) * self.head_radius * 0.5;
            self.sparkles.push(
                Particle::new(self.pos + jitter, vel, size, self.palette.mid, rng.range(0.03, 0.06))
                    .with_drag(0.08),
            );
        }
    }

    fn fragment(&mut self, rng: &mut Rng, spawned: &mut Vec<Meteor>) {
        let Some(frag) = self.fragmentation.as_mut() else {
            return;
        };
        frag.done = true;

        let speed = self.vel.length();
        let heading = self.vel.y.atan2(self.vel.x);
        let count = rng.range_inclusive(2, 3);
        for _ in 0..count {
            let angle = heading + rng.range(-0.35, 0.35);
            let offset = Vec2::new(rng.range(-1.0, 1.0), rng.range(-1.0, 1.0)) * self.head_radius;
            let mut child = Meteor::new(
                self.pos + offset,
                Vec2::from_angle(angle) * speed * rng.range(0.8, 1.05),
                self.head_radius * rng.range(0.45, 0.65),
                self.palette,
            )
            .with_decay(self.decay * rng.range(1.2, 1.8))
            .with_drag(self.drag + 0.004)
            .with_trail_length((self.max_trail * 2 / 3).max(4))
            .with_entry_flash(0.6);
            child.life = self.life * rng.range(0.45, 0.8);
            child.is_fragment = true;
            spawned.push(child);
        }

        self.decay *= 3.0;
        self.phase = MeteorPhase::Fragmented;
        log::debug!("meteor {:?} fragmented into {} pieces", self.id, count);
    }
}

/// Squared distance from `p` to the segment `a`–`b`.
pub fn segment_distance_sq(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a.distance_squared(p);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t).distance_squared(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Tier;

    const BOUNDS: Vec2 = Vec2::new(800.0, 600.0);

    fn basic() -> Meteor {
        Meteor::new(Vec2::new(100.0, 100.0), Vec2::new(4.0, 3.0), 2.0, MeteorPalette::SODIUM)
    }

    fn step(m: &mut Meteor, rng: &mut Rng) -> (MeteorFate, Vec<Meteor>) {
        let mut spawned = Vec::new();
        let fate = m.update(1.0, BOUNDS, rng, &mut spawned);
        (fate, spawned)
    }

    #[test]
    fn instant_decay_removes_on_next_step() {
        let mut rng = Rng::new(1);
        let mut m = basic().with_decay(1.0);
        let (fate, _) = step(&mut m, &mut rng);
        assert_eq!(fate, MeteorFate::Expired);
    }

    #[test]
    fn life_is_monotonic_and_removal_is_bounded() {
        let mut rng = Rng::new(2);
        let settings = TierSettings::for_tier(Tier::High);
        for _ in 0..50 {
            let mut m = Meteor::launch(Vec2::new(400.0, 0.0), PI / 2.0, 0.5, &settings, &mut rng);
            let mut last = m.life;
            let mut frames = 0;
            let mut spawned = Vec::new();
            loop {
                let fate = m.update(1.0, BOUNDS, &mut rng, &mut spawned);
                assert!(m.life <= last, "life went up: {} -> {}", last, m.life);
                last = m.life;
                frames += 1;
                if !fate.is_alive() {
                    break;
                }
                assert!(frames < 1000, "meteor never removed");
            }
            assert!(frames <= 170, "took {} frames", frames);
        }
    }

    #[test]
    fn fragments_at_most_once_with_shorter_children() {
        let mut rng = Rng::new(3);
        let mut m = basic().with_decay(0.05).with_fragmentation(0.3);
        let mut splits = 0;
        let mut spawned = Vec::new();
        while m.update(1.0, Vec2::splat(1.0e6), &mut rng, &mut spawned).is_alive() {
            if !spawned.is_empty() {
                splits += 1;
                assert!(spawned.len() == 2 || spawned.len() == 3);
                for child in &spawned {
                    assert!(child.life <= m.life);
                    assert!(child.head_radius < m.head_radius);
                    assert!(child.is_fragment);
                    assert!(child.fragmentation.is_none());
                }
                spawned.clear();
            }
        }
        assert_eq!(splits, 1);
        assert_eq!(m.phase, MeteorPhase::Fragmented);
    }

    #[test]
    fn fragmentation_speeds_up_parent_decay() {
        let mut rng = Rng::new(4);
        let mut m = basic().with_decay(0.1).with_fragmentation(0.05);
        let before = m.decay;
        step(&mut m, &mut rng);
        assert!((m.decay - before * 3.0).abs() < 1e-6);
    }

    #[test]
    fn out_of_bounds_after_margin() {
        let mut rng = Rng::new(5);
        let mut m = Meteor::new(Vec2::new(790.0, 300.0), Vec2::new(200.0, 0.0), 2.0, MeteorPalette::IRON)
            .with_decay(0.0);
        assert_eq!(step(&mut m, &mut rng).0, MeteorFate::OutOfBounds);
    }

    #[test]
    fn egg_meteor_impacts_target() {
        let mut rng = Rng::new(6);
        let target = Vec2::new(400.0, 300.0);
        let mut m = Meteor::aimed(Vec2::new(0.0, -20.0), target, 9.0, &mut rng);
        let mut spawned = Vec::new();
        let mut fate = MeteorFate::Alive;
        for _ in 0..500 {
            fate = m.update(1.0, BOUNDS, &mut rng, &mut spawned);
            if !fate.is_alive() {
                break;
            }
        }
        assert_eq!(fate, MeteorFate::Impact(target));
    }

    #[test]
    fn fast_egg_does_not_tunnel_past_target() {
        let mut rng = Rng::new(7);
        let target = Vec2::new(400.0, 300.0);
        let mut m = Meteor::aimed(Vec2::new(350.0, 300.0), target, 100.0, &mut rng);
        assert_eq!(step(&mut m, &mut rng).0, MeteorFate::Impact(target));
    }

    #[test]
    fn trail_is_bounded() {
        let mut rng = Rng::new(8);
        let mut m = basic().with_decay(0.0).with_trail_length(10);
        for _ in 0..50 {
            step(&mut m, &mut rng);
        }
        assert_eq!(m.trail.len(), 10);

        let mut fast = Meteor::new(Vec2::ZERO, Vec2::new(100.0, 0.0), 2.0, MeteorPalette::IRON)
            .with_decay(0.0)
            .with_trail_length(50);
        let mut spawned = Vec::new();
        for _ in 0..20 {
            fast.update(1.0, Vec2::splat(1.0e6), &mut rng, &mut spawned);
        }
        assert!(fast.trail.len() <= (MAX_TRAIL_DISTANCE / 100.0) as usize + 1);
    }

    #[test]
    fn flare_brightens_during_window() {
        let flare = Flare { onset: 0.2, peak: 1.0, duration: 0.2 };
        assert_eq!(flare.intensity(0.1), 0.0);
        assert!((flare.intensity(0.3) - 1.0).abs() < 1e-5);
        assert_eq!(flare.intensity(0.5), 0.0);
    }

    #[test]
    fn ion_trail_outlives_emission() {
        let mut rng = Rng::new(9);
        let mut m = basic().with_decay(0.0).with_ion_trail();
        for _ in 0..10 {
            step(&mut m, &mut rng);
        }
        let ion = m.ion_trail.as_ref().unwrap();
        assert_eq!(ion.samples.len(), 10);
        assert!(ion.samples.front().unwrap().alpha > ion.samples.back().unwrap().alpha);
    }

    #[test]
    fn entry_flash_fades_to_zero() {
        let mut rng = Rng::new(10);
        let mut m = basic().with_decay(0.0).with_entry_flash(1.0);
        for _ in 0..20 {
            step(&mut m, &mut rng);
        }
        assert_eq!(m.entry_flash, 0.0);
    }

    #[test]
    fn classic_profile_launch_has_no_extras() {
        let mut rng = Rng::new(11);
        let config = crate::api::config::SkyConfig {
            profile: crate::api::config::Profile::Classic,
            ..Default::default()
        };
        let settings = TierSettings::resolve(Tier::High, &config);
        for _ in 0..100 {
            let m = Meteor::spawn_random(&settings, 800.0, 600.0, &mut rng);
            assert!(m.flares.is_empty());
            assert!(m.fragmentation.is_none());
            assert!(m.ion_trail.is_none());
        }
    }

    #[test]
    fn random_spawns_start_near_the_surface_heading_inward() {
        let mut rng = Rng::new(12);
        let settings = TierSettings::for_tier(Tier::Mid);
        for _ in 0..200 {
            let m = Meteor::spawn_random(&settings, 800.0, 600.0, &mut rng);
            assert!(m.pos.y <= 300.0);
            assert!(m.vel.y > 0.0, "should head downward: {:?}", m.vel);
        }
    }
}
