//! Meteor drawing: tapered trail passes, head glow, spike, sparkles, ion wake.

use crate::extensions::Easing;
use crate::systems::effects::{clamp_unit, Color};
use crate::systems::meteor::Meteor;

use super::traits::{BlendMode, Fill, Surface};
use super::{drawable, radius};

/// (width multiplier of head radius, peak alpha) for glow, mid and core passes.
const TRAIL_PASSES: [(f32, f32); 3] = [(3.2, 0.12), (1.8, 0.3), (0.7, 0.85)];
/// Heads larger than this get a forward spike when bright.
const SPIKE_HEAD: f32 = 2.2;
/// Ceiling on the flare multiplier handed to the draw passes.
pub const MAX_FLARE: f32 = 3.0;

pub fn draw_meteor(surface: &mut dyn Surface, meteor: &Meteor) {
    if !drawable(meteor.pos) || !meteor.vel.is_finite() {
        return;
    }
    let fade = clamp_unit(meteor.fade());
    let flare = flare_boost(meteor);
    surface.set_blend(BlendMode::Additive);

    if let Some(ion) = &meteor.ion_trail {
        let color = meteor.palette.tail;
        for (a, b) in ion.samples.iter().zip(ion.samples.iter().skip(1)) {
            let alpha = clamp_unit(a.alpha) * 0.22;
            if alpha <= 0.0 {
                continue;
            }
            surface.stroke_polyline(&[a.pos, b.pos], radius(ion.width), color.with_alpha(alpha));
        }
    }

    draw_trail(surface, meteor, fade);
    draw_head(surface, meteor, fade, flare);

    for p in &meteor.sparkles {
        if drawable(p.pos) {
            surface.fill_circle(p.pos, radius(p.size), &Fill::Solid(p.color.with_alpha(p.life)));
        }
    }
}

fn draw_trail(surface: &mut dyn Surface, meteor: &Meteor, intensity: f32) {
    let n = meteor.trail.len();
    if n < 2 || intensity <= 0.0 {
        return;
    }
    let last = (n - 1) as f32;
    for (width_mul, peak) in TRAIL_PASSES {
        for i in 0..n - 1 {
            let (a, b) = (meteor.trail[i], meteor.trail[i + 1]);
            if a == b {
                continue;
            }
            let u = i as f32 / last;
            let taper = Easing::QuadIn.falloff(u);
            let width = meteor.head_radius * width_mul * taper.max(0.15);
            let color = meteor.palette.at(u).with_alpha(peak * intensity * taper);
            surface.stroke_polyline(&[a, b], radius(width), color);
        }
    }
}

/// Flare multiplier in [1, MAX_FLARE]; 1 when no flare is active.
fn flare_boost(meteor: &Meteor) -> f32 {
    if meteor.brightness.is_finite() {
        meteor.brightness.clamp(1.0, MAX_FLARE)
    } else {
        1.0
    }
}

/// `fade` is in [0, 1]; `flare` swells the glows and lifts their alpha.
fn draw_head(surface: &mut dyn Surface, meteor: &Meteor, fade: f32, flare: f32) {
    let head = meteor.head_radius;
    let palette = &meteor.palette;
    let lit = fade * flare;
    let swell = flare.sqrt();

    let corona = [
        (0.0, palette.mid.with_alpha(clamp_unit(0.15 * lit))),
        (1.0, palette.tail.with_alpha(0.0)),
    ];
    surface.fill_circle(meteor.pos, radius(head * 6.0 * swell), &Fill::Glow(&corona));

    let coma = [
        (0.0, palette.head.with_alpha(clamp_unit(0.5 * lit))),
        (0.6, palette.mid.with_alpha(clamp_unit(0.2 * lit))),
        (1.0, palette.mid.with_alpha(0.0)),
    ];
    surface.fill_circle(meteor.pos, radius(head * 3.0 * swell), &Fill::Glow(&coma));

    let nucleus = [
        (0.0, Color::WHITE.with_alpha(fade)),
        (0.5, palette.head.with_alpha(clamp_unit(0.8 * lit))),
        (1.0, palette.head.with_alpha(0.0)),
    ];
    surface.fill_circle(meteor.pos, radius(head * 1.2), &Fill::Glow(&nucleus));

    if head > SPIKE_HEAD && lit > 0.9 {
        let tip = meteor.pos + meteor.direction() * head * 8.0;
        surface.stroke_polyline(&[meteor.pos, tip], radius(head * 0.4), Color::WHITE.with_alpha(0.4));
    }

    if meteor.entry_flash > 0.0 {
        let flash = clamp_unit(meteor.entry_flash);
        let stops = [
            (0.0, Color::WHITE.with_alpha(0.6 * flash)),
            (1.0, palette.head.with_alpha(0.0)),
        ];
        surface.fill_circle(meteor.pos, radius(head * 10.0 * flash), &Fill::Glow(&stops));
    }
}
