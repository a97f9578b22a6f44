//! Back-to-front frame composition.
//!
//! background → nebulae → zodiacal light → band blit (+ live emission
//! regions) → star layers → micro-stars → airglow → satellite → meteors →
//! explosions → vignette.

use glam::Vec2;

use crate::core::sky::Sky;
use crate::scene::{SceneData, StarRecord};
use crate::systems::effects::{clamp_unit, Color};
use crate::systems::satellite::Satellite;

use super::explosion_pass::draw_explosion;
use super::meteor_pass::draw_meteor;
use super::raster::BandRaster;
use super::traits::{BlendMode, Fill, Gradient, Surface};
use super::{drawable, glow_stops, radius};

const SKY_GRADIENT: [(f32, Color); 3] = [
    (0.0, Color::NIGHT),
    (0.7, Color::rgb(0.02, 0.03, 0.07)),
    (1.0, Color::rgb(0.04, 0.05, 0.1)),
];
const ZODIACAL: Color = Color::new(0.95, 0.85, 0.7, 0.05);
const AIRGLOW: Color = Color::new(0.25, 0.55, 0.4, 0.06);
const VIGNETTE: Color = Color::new(0.0, 0.0, 0.0, 0.55);

#[derive(Debug, Default)]
pub struct Compositor {
    raster: BandRaster,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw one full frame of `sky` into `surface`.
    pub fn draw(&mut self, surface: &mut dyn Surface, sky: &Sky) {
        let scene = sky.scene();
        let t = sky.time();

        surface.set_blend(BlendMode::Normal);
        surface.fill_rect(Vec2::ZERO, Vec2::new(scene.width, scene.height), &Fill::Vertical(&SKY_GRADIENT));

        draw_nebulae(surface, scene, t);
        draw_zodiacal(surface, scene);

        let band = self.raster.ensure(surface, scene, sky.scene_generation());
        surface.set_blend(BlendMode::Normal);
        surface.draw_layer(band, Vec2::ZERO);
        draw_emission(surface, scene, t);

        draw_stars(surface, scene, t);
        draw_airglow(surface, scene);

        if let Some(sat) = sky.satellite() {
            draw_satellite(surface, sat);
        }
        for meteor in sky.meteors() {
            draw_meteor(surface, meteor);
        }
        for explosion in sky.explosions() {
            draw_explosion(surface, explosion);
        }

        draw_vignette(surface, scene);
    }

    /// Free the cached band layer.
    pub fn release(&mut self, surface: &mut dyn Surface) {
        self.raster.release(surface);
    }

    pub fn raster(&self) -> &BandRaster {
        &self.raster
    }
}

fn draw_nebulae(surface: &mut dyn Surface, scene: &SceneData, t: f32) {
    let extent = scene.extent();
    surface.set_blend(BlendMode::Screen);
    for nebula in &scene.nebulae {
        let center = scene.to_pixels(nebula.drift.apply(nebula.pos, t));
        let stops = [(0.0, nebula.inner), (0.55, nebula.inner.fade(0.4)), (1.0, nebula.outer)];
        surface.fill_ellipse(
            center,
            Vec2::new(nebula.rx, nebula.ry) * extent,
            nebula.rotation,
            &Fill::Glow(&stops),
        );
    }
}

/// Faint cone of light rising from the lower left along the ecliptic.
fn draw_zodiacal(surface: &mut dyn Surface, scene: &SceneData) {
    let stops = glow_stops(ZODIACAL);
    surface.set_blend(BlendMode::Additive);
    surface.fill_ellipse(
        Vec2::new(scene.width * 0.18, scene.height * 1.02),
        Vec2::new(scene.extent() * 0.22, scene.extent() * 0.6),
        0.55,
        &Fill::Glow(&stops),
    );
}

fn draw_emission(surface: &mut dyn Surface, scene: &SceneData, t: f32) {
    let extent = scene.extent();
    surface.set_blend(BlendMode::Screen);
    for region in &scene.band.emission {
        let center = scene.to_pixels(region.drift.apply(region.pos, t));
        let stops = glow_stops(region.color);
        surface.fill_ellipse(
            center,
            Vec2::new(region.rx, region.ry) * extent,
            region.rotation,
            &Fill::Glow(&stops),
        );
    }
}

fn draw_stars(surface: &mut dyn Surface, scene: &SceneData, t: f32) {
    surface.set_blend(BlendMode::Normal);
    for layer in &scene.layers {
        let drift = layer.parallax * t;
        for star in &layer.stars {
            draw_star(surface, scene, star, drift, t);
        }
    }
    for star in &scene.micro_stars {
        draw_star(surface, scene, star, 0.0, t);
    }
}

fn draw_star(surface: &mut dyn Surface, scene: &SceneData, star: &StarRecord, drift: f32, t: f32) {
    let alpha = star.brightness(t);
    if alpha <= 0.01 {
        return;
    }
    let pos = scene.to_pixels(star.pos);
    let pos = Vec2::new((pos.x + drift).rem_euclid(scene.width), pos.y);
    if !drawable(pos) {
        return;
    }

    if star.is_bright() {
        let halo = glow_stops(star.color.with_alpha(alpha * 0.25));
        surface.fill_circle(pos, radius(star.radius * 3.5), &Fill::Glow(&halo));
    }
    surface.fill_circle(pos, radius(star.radius), &Fill::Solid(star.color.with_alpha(alpha)));

    if star.spike {
        let len = star.radius * 6.0;
        let color = star.color.with_alpha(alpha * 0.35);
        surface.stroke_polyline(&[pos - Vec2::X * len, pos + Vec2::X * len], 0.5, color);
        surface.stroke_polyline(&[pos - Vec2::Y * len, pos + Vec2::Y * len], 0.5, color);
    }
}

/// Greenish glow hugging the horizon.
fn draw_airglow(surface: &mut dyn Surface, scene: &SceneData) {
    let top = scene.height * 0.78;
    let stops = [(0.0, AIRGLOW.with_alpha(0.0)), (1.0, AIRGLOW)];
    surface.set_blend(BlendMode::Additive);
    surface.fill_rect(Vec2::new(0.0, top), Vec2::new(scene.width, scene.height - top), &Fill::Vertical(&stops));
}

fn draw_satellite(surface: &mut dyn Surface, sat: &Satellite) {
    if !drawable(sat.pos) {
        return;
    }
    surface.set_blend(BlendMode::Additive);
    surface.fill_circle(sat.pos, radius(sat.radius), &Fill::Solid(Color::WHITE.with_alpha(sat.alpha)));
    if sat.glint > 0.0 {
        let stops = glow_stops(Color::WHITE.with_alpha(clamp_unit(sat.glint) * 0.8));
        surface.fill_circle(sat.pos, radius(sat.radius * 6.0), &Fill::Glow(&stops));
    }
}

fn draw_vignette(surface: &mut dyn Surface, scene: &SceneData) {
    let extent = scene.extent();
    let stops = [(0.0, VIGNETTE.with_alpha(0.0)), (1.0, VIGNETTE)];
    let gradient = Gradient {
        center: Vec2::new(scene.width, scene.height) * 0.5,
        r0: extent * 0.35,
        r1: extent * 0.8,
        stops: &stops,
    };
    surface.set_blend(BlendMode::Normal);
    surface.fill_rect(Vec2::ZERO, Vec2::new(scene.width, scene.height), &Fill::Radial(gradient));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::SkyConfig;
    use crate::api::types::{ShowerPattern, Tier};
    use crate::renderer::draw_list::{DrawCmd, DrawList, Paint};

    const DT: f32 = 1.0 / 60.0;

    fn sky(tier: Tier) -> Sky {
        Sky::new(tier, SkyConfig { seed: Some(11), ..SkyConfig::default() }, 800.0, 600.0)
    }

    fn position(list: &DrawList, pred: impl Fn(&DrawCmd) -> bool) -> Option<usize> {
        list.commands().iter().position(pred)
    }

    #[test]
    fn layers_are_drawn_back_to_front() {
        let sky = sky(Tier::Mid);
        let mut list = DrawList::new(800.0, 600.0);
        Compositor::new().draw(&mut list, &sky);

        let cmds = list.commands();
        let background = position(&list, |c| matches!(c, DrawCmd::Rect { paint: Paint::Vertical(_), .. }));
        let band = position(&list, |c| matches!(c, DrawCmd::DrawLayer(..)));
        let vignette = position(&list, |c| matches!(c, DrawCmd::Rect { paint: Paint::Radial { .. }, .. }));
        assert_eq!(background, Some(1));
        assert!(band.is_some() && band > background);
        assert_eq!(vignette, Some(cmds.len() - 1));
    }

    #[test]
    fn band_is_baked_once_until_resize() {
        let mut sky = sky(Tier::Low);
        let mut list = DrawList::new(800.0, 600.0);
        let mut compositor = Compositor::new();
        for _ in 0..3 {
            sky.step(DT);
            compositor.draw(&mut list, &sky);
        }
        assert_eq!(list.layers_built(), 1);

        sky.resize(1024.0, 768.0);
        list.resize(1024.0, 768.0);
        compositor.draw(&mut list, &sky);
        assert_eq!(list.layers_built(), 2);
        assert_eq!(list.live_layers().len(), 1);
        assert_eq!(compositor.raster().rebuilds(), 2);
    }

    #[test]
    fn busy_frame_is_finite() {
        let mut sky = sky(Tier::High);
        sky.trigger_explosion();
        sky.trigger_shower(ShowerPattern::Cluster);
        let mut list = DrawList::new(800.0, 600.0);
        let mut compositor = Compositor::new();
        for _ in 0..120 {
            sky.step(DT);
            list.clear_commands();
            compositor.draw(&mut list, &sky);
            assert!(list.all_finite());
        }
    }

    #[test]
    fn parallax_wraps_horizontally() {
        let sky = sky(Tier::Mid);
        let mut list = DrawList::new(800.0, 600.0);
        draw_stars(&mut list, sky.scene(), 5000.0);
        let mut stars = 0;
        for c in list.commands() {
            if let DrawCmd::Circle { center, paint: Paint::Solid(_), .. } = c {
                assert!(center.x >= 0.0 && center.x <= 800.0, "{:?}", center);
                stars += 1;
            }
        }
        assert!(stars > 0);
    }

    #[test]
    fn spikes_only_when_tier_allows() {
        let low = sky(Tier::Low);
        let mut list = DrawList::new(800.0, 600.0);
        Compositor::new().draw(&mut list, &low);
        let lines = list.count(|c| matches!(c, DrawCmd::Polyline { .. }));
        assert_eq!(lines, 0);

        let high = sky(Tier::High);
        let mut list = DrawList::new(800.0, 600.0);
        Compositor::new().draw(&mut list, &high);
        assert!(list.count(|c| matches!(c, DrawCmd::Polyline { .. })) > 0);
    }
}
