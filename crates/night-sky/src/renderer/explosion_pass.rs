//! Explosion drawing. Each sub-effect is skipped once exhausted.

use crate::systems::effects::{clamp_unit, Color};
use crate::systems::explosion::{Explosion, STREAK_SPEED};

use super::traits::{BlendMode, Fill, Surface};
use super::{drawable, glow_stops, radius};

const NOVA_TINT: Color = Color::rgb(0.85, 0.92, 1.0);
const NOVA_ALPHA: [f32; 3] = [0.9, 0.5, 0.25];
const FIREBALL_CORE: Color = Color::rgb(1.0, 0.95, 0.8);
const FIREBALL_HALO: Color = Color::rgb(1.0, 0.55, 0.2);

pub fn draw_explosion(surface: &mut dyn Surface, explosion: &Explosion) {
    let origin = explosion.origin;
    if !drawable(origin) {
        return;
    }
    surface.set_blend(BlendMode::Additive);

    // Remnant first so the bright phases sit on top of it.
    for p in explosion.remnant.iter().filter(|p| p.is_visible()) {
        let alpha = p.opacity() * 0.35;
        let center = origin + p.offset;
        if alpha > 0.0 && drawable(center) {
            let stops = glow_stops(p.color.with_alpha(alpha));
            surface.fill_circle(center, radius(p.size), &Fill::Glow(&stops));
        }
    }

    let nova = &explosion.nova;
    if nova.is_active() {
        let swell = 1.0 + (1.0 - nova.intensity) * 0.5;
        for (bloom, alpha) in nova.blooms.iter().zip(NOVA_ALPHA) {
            let stops = glow_stops(NOVA_TINT.with_alpha(alpha * nova.intensity));
            surface.fill_circle(origin, radius(bloom * swell), &Fill::Glow(&stops));
        }
    }

    let fireball = &explosion.fireball;
    if fireball.is_active() {
        let life = clamp_unit(fireball.life);
        let halo = glow_stops(FIREBALL_HALO.with_alpha(0.5 * life));
        surface.fill_circle(origin, radius(fireball.radius * 2.0), &Fill::Glow(&halo));
        let core = [
            (0.0, Color::WHITE.with_alpha(life)),
            (0.4, FIREBALL_CORE.with_alpha(0.8 * life)),
            (1.0, FIREBALL_HALO.with_alpha(0.0)),
        ];
        surface.fill_circle(origin, radius(fireball.radius), &Fill::Glow(&core));
    }

    for ring in explosion.rings.iter().filter(|r| r.is_active()) {
        let life = clamp_unit(ring.life);
        surface.stroke_circle(origin, radius(ring.radius), radius(ring.width * 4.0), ring.color.with_alpha(0.25 * life));
        surface.stroke_circle(origin, radius(ring.radius), radius(ring.width), ring.color.with_alpha(0.8 * life));
    }

    for p in &explosion.debris {
        if !drawable(p.pos) {
            continue;
        }
        let color = p.color.with_alpha(p.life);
        if p.speed() > STREAK_SPEED {
            let tail = p.pos - p.vel * 2.5;
            surface.stroke_polyline(&[p.pos, tail], radius(p.size * 0.6), color);
        }
        surface.fill_circle(p.pos, radius(p.size), &Fill::Solid(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::draw_list::{DrawCmd, DrawList};
    use crate::systems::effects::Rng;
    use glam::Vec2;

    fn boom() -> Explosion {
        Explosion::new(Vec2::new(200.0, 200.0), (70, 90), &mut Rng::new(4))
    }

    #[test]
    fn fresh_explosion_draws_every_phase() {
        let e = boom();
        let mut list = DrawList::new(400.0, 400.0);
        draw_explosion(&mut list, &e);
        assert_eq!(list.count(|c| matches!(c, DrawCmd::Ring { .. })), e.rings.len() * 2);
        // Debris all start fast enough to streak.
        let streaks = list.count(|c| matches!(c, DrawCmd::Polyline { .. }));
        assert_eq!(streaks, e.debris.iter().filter(|p| p.speed() > STREAK_SPEED).count());
        assert!(list.all_finite());
    }

    #[test]
    fn exhausted_phases_are_skipped() {
        let mut e = boom();
        e.nova.intensity = 0.0;
        e.fireball.life = 0.0;
        e.debris.clear();
        for r in e.rings.iter_mut() {
            r.life = 0.0;
        }
        let mut list = DrawList::new(400.0, 400.0);
        draw_explosion(&mut list, &e);
        // Remnant has not started yet, so nothing but the blend switch.
        assert_eq!(list.commands().len(), 1);
    }

    #[test]
    fn remnant_appears_after_its_delay() {
        let mut e = boom();
        for _ in 0..80 {
            e.update(1.0);
        }
        e.nova.intensity = 0.0;
        e.fireball.life = 0.0;
        e.debris.clear();
        e.rings.clear();
        let mut list = DrawList::new(400.0, 400.0);
        draw_explosion(&mut list, &e);
        let visible = e.remnant.iter().filter(|p| p.is_visible() && p.opacity() > 0.0).count();
        assert!(visible > 0);
        assert_eq!(list.count(|c| matches!(c, DrawCmd::Circle { .. })), visible);
    }
}
