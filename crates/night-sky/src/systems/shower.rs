//! Shower patterns: batches of meteors with staggered spawn delays.
//!
//! Each pattern is a pure function of surface size, tier settings and the
//! rng. The caller schedules every entry at `now + delay`.

use std::f32::consts::PI;

use glam::Vec2;

use crate::api::types::ShowerPattern;
use crate::core::quality::TierSettings;
use crate::systems::effects::Rng;
use crate::systems::meteor::Meteor;

/// Pick weights for `ShowerPattern::Random`, in `ShowerPattern::CONCRETE` order.
const RANDOM_WEIGHTS: [f32; 5] = [0.4, 0.15, 0.15, 0.15, 0.15];

/// One meteor of a batch and its spawn delay in seconds.
#[derive(Debug, Clone)]
pub struct ShowerEntry {
    pub meteor: Meteor,
    pub delay: f32,
}

/// Resolve `Random` to a concrete pattern; concrete patterns pass through.
pub fn resolve_pattern(pattern: ShowerPattern, rng: &mut Rng) -> ShowerPattern {
    match pattern {
        ShowerPattern::Random => ShowerPattern::CONCRETE[rng.weighted(&RANDOM_WEIGHTS)],
        other => other,
    }
}

pub fn generate_shower(
    pattern: ShowerPattern,
    width: f32,
    height: f32,
    settings: &TierSettings,
    rng: &mut Rng,
) -> Vec<ShowerEntry> {
    let width = if width.is_finite() { width.max(1.0) } else { 1.0 };
    let height = if height.is_finite() { height.max(1.0) } else { 1.0 };
    let speed = |rng: &mut Rng| rng.range(settings.meteor_speed.0, settings.meteor_speed.1);

    match resolve_pattern(pattern, rng) {
        ShowerPattern::Single | ShowerPattern::Random => vec![ShowerEntry {
            meteor: Meteor::spawn_random(settings, width, height, rng),
            delay: 0.0,
        }],

        ShowerPattern::Parallel => {
            let count = rng.range_inclusive(3, 5);
            let leftward = rng.chance(0.5);
            let base = rng.range(0.2 * PI, 0.35 * PI);
            let heading = if leftward { PI - base } else { base };
            let shared_speed = speed(rng);
            let start = rng.range(0.0, 0.5) * width;
            let spacing = width * rng.range(0.06, 0.12);
            let stagger = rng.range(0.15, 0.35);
            (0..count)
                .map(|i| {
                    let x = if leftward { width - start - spacing * i as f32 } else { start + spacing * i as f32 };
                    let pos = Vec2::new(x, -20.0 - rng.range(0.0, 30.0));
                    ShowerEntry {
                        meteor: Meteor::launch(pos, heading, shared_speed * rng.range(0.92, 1.08), settings, rng),
                        delay: i as f32 * stagger,
                    }
                })
                .collect()
        }

        ShowerPattern::Radial => {
            let count = rng.range_inclusive(4, 7);
            let origin = Vec2::new(rng.range(0.3, 0.7) * width, -20.0);
            let (from, to) = (0.25 * PI, 0.75 * PI);
            let step = (to - from) / (count - 1) as f32;
            (0..count)
                .map(|i| {
                    let heading = from + step * i as f32 + rng.range(-0.05, 0.05);
                    ShowerEntry {
                        meteor: Meteor::launch(origin, heading, speed(rng), settings, rng),
                        delay: rng.range(0.0, 0.4),
                    }
                })
                .collect()
        }

        ShowerPattern::VFormation => {
            let pairs = rng.range_inclusive(2, 3);
            let shared_speed = speed(rng);
            let heading = rng.range(0.12 * PI, 0.25 * PI);
            let stagger = rng.range(0.2, 0.4);
            let mut entries = Vec::with_capacity(pairs as usize * 2);
            for i in 0..pairs {
                let y = height * (0.05 + 0.08 * i as f32);
                let delay = i as f32 * stagger;
                entries.push(ShowerEntry {
                    meteor: Meteor::launch(Vec2::new(-20.0, y), heading, shared_speed, settings, rng),
                    delay,
                });
                entries.push(ShowerEntry {
                    meteor: Meteor::launch(Vec2::new(width + 20.0, y), PI - heading, shared_speed, settings, rng),
                    delay,
                });
            }
            entries
        }

        ShowerPattern::Cluster => {
            let count = rng.range_inclusive(4, 9);
            let center = Vec2::new(rng.range(0.2, 0.8) * width, rng.range(0.05, 0.3) * height);
            (0..count)
                .map(|_| {
                    let pos = center + Vec2::new(rng.gaussian(), rng.gaussian()) * 60.0;
                    let heading = rng.range(0.15 * PI, 0.85 * PI);
                    ShowerEntry {
                        meteor: Meteor::launch(pos, heading, speed(rng), settings, rng),
                        delay: rng.range(0.0, 1.2),
                    }
                })
                .collect()
        }
    }
}
