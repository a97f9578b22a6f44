//! Foreground star layers and animated micro-stars.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

use crate::core::quality::TierSettings;
use crate::systems::effects::{clamp_unit, Color, Rng, SpectralClass};

/// Number of foreground depth layers, far to near.
pub const STAR_LAYERS: usize = 3;
/// Population share per layer.
const LAYER_SHARE: [f32; STAR_LAYERS] = [0.3, 0.4, 0.3];
/// Radius multiplier per layer.
const LAYER_SCALE: [f32; STAR_LAYERS] = [0.7, 1.0, 1.3];
/// Horizontal drift per layer in pixels per second (nearer drifts faster).
const LAYER_PARALLAX: [f32; STAR_LAYERS] = [0.15, 0.35, 0.7];
/// Magnitude above which a star counts as bright.
pub const BRIGHT_MAGNITUDE: f32 = 0.82;

/// Brief occultation: the star dips for `duration` once every `period`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wink {
    pub period: f32,
    pub offset: f32,
    pub duration: f32,
}

impl Wink {
    /// Brightness factor at time `t` (1.0 outside the dip).
    pub fn factor(&self, t: f32) -> f32 {
        if self.period <= 0.0 || self.duration <= 0.0 {
            return 1.0;
        }
        let local = (t + self.offset).rem_euclid(self.period);
        if local < self.duration {
            1.0 - 0.85 * (PI * local / self.duration).sin()
        } else {
            1.0
        }
    }
}

/// One procedurally placed star. Position is normalized to the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct StarRecord {
    pub pos: Vec2,
    /// Pixels.
    pub radius: f32,
    pub alpha: f32,
    pub color: Color,
    /// 0 (faint) → 1 (brightest).
    pub magnitude: f32,
    pub twinkle_phase: f32,
    /// Radians per second.
    pub twinkle_rate: f32,
    pub twinkle_depth: f32,
    pub wink: Option<Wink>,
    /// Draw directional diffraction spikes.
    pub spike: bool,
}

impl StarRecord {
    /// Apparent alpha at session time `t`. Pure: nothing is stored.
    pub fn brightness(&self, t: f32) -> f32 {
        let twinkle = 1.0 - self.twinkle_depth * 0.5 * (1.0 + (t * self.twinkle_rate + self.twinkle_phase).sin());
        let wink = self.wink.map_or(1.0, |w| w.factor(t));
        clamp_unit(self.alpha * twinkle * wink)
    }

    pub fn is_bright(&self) -> bool {
        self.magnitude > BRIGHT_MAGNITUDE
    }
}

/// A depth layer of stars sharing one parallax rate.
#[derive(Debug, Clone, PartialEq)]
pub struct StarLayer {
    pub depth: usize,
    /// Horizontal drift in pixels per second.
    pub parallax: f32,
    pub stars: Vec<StarRecord>,
}

/// Split `total` stars into the three layer populations.
pub fn layer_counts(total: usize) -> [usize; STAR_LAYERS] {
    let far = ((total as f32 * LAYER_SHARE[0]).round() as usize).min(total);
    let mid = ((total as f32 * LAYER_SHARE[1]).round() as usize).min(total - far);
    [far, mid, total - far - mid]
}

pub fn generate_star_layers(settings: &TierSettings, rng: &mut Rng) -> [StarLayer; STAR_LAYERS] {
    let counts = layer_counts(settings.star_count);
    std::array::from_fn(|depth| StarLayer {
        depth,
        parallax: LAYER_PARALLAX[depth],
        stars: (0..counts[depth])
            .map(|_| random_star(depth, settings.star_spikes, rng))
            .collect(),
    })
}

fn random_star(depth: usize, spikes: bool, rng: &mut Rng) -> StarRecord {
    // Cubing a uniform skews the distribution heavily toward faint stars.
    let magnitude = rng.next_f32().powi(3);
    let scale = LAYER_SCALE[depth];
    let bright = magnitude > BRIGHT_MAGNITUDE;
    let wink = rng.chance(0.08).then(|| Wink {
        period: rng.range(6.0, 20.0),
        offset: rng.range(0.0, 20.0),
        duration: rng.range(0.15, 0.4),
    });
    StarRecord {
        pos: Vec2::new(rng.next_f32(), rng.next_f32()),
        radius: (0.35 + magnitude * 1.6) * scale,
        alpha: clamp_unit(0.2 + magnitude * 0.75 + depth as f32 * 0.03),
        color: SpectralClass::random(rng).color(),
        magnitude,
        twinkle_phase: rng.range(0.0, TAU),
        twinkle_rate: rng.range(0.4, 2.2),
        twinkle_depth: rng.range(0.1, 0.45),
        wink,
        spike: bright && spikes,
    }
}

/// Faint background stars that twinkle quickly. Empty when the tier
/// disables animated micro-stars.
pub fn generate_micro_stars(settings: &TierSettings, rng: &mut Rng) -> Vec<StarRecord> {
    if !settings.animated_micro_stars {
        return Vec::new();
    }
    (0..settings.micro_stars)
        .map(|_| StarRecord {
            pos: Vec2::new(rng.next_f32(), rng.next_f32()),
            radius: rng.range(0.25, 0.6),
            alpha: rng.range(0.15, 0.45),
            color: Color::WHITE,
            magnitude: 0.0,
            twinkle_phase: rng.range(0.0, TAU),
            twinkle_rate: rng.range(1.5, 4.5),
            twinkle_depth: rng.range(0.4, 0.9),
            wink: None,
            spike: false,
        })
        .collect()
}
