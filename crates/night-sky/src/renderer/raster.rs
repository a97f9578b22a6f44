//! Offscreen cache for the galactic band.
//!
//! Thousands of band stars plus glow and dust are too many fills to redo
//! every frame, so they are baked once into a surface layer and blitted.
//! The bake is keyed by (width, height, scene generation).

use glam::Vec2;

use crate::scene::{GalacticBand, SceneData};
use crate::systems::effects::Color;

use super::traits::{BakeKey, BlendMode, Fill, LayerId, Surface};
use super::{glow_stops, radius};

#[derive(Debug, Default)]
pub struct BandRaster {
    key: Option<BakeKey>,
    layer: Option<LayerId>,
    rebuilds: u32,
}

impl BandRaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the baked layer for `scene`, rebuilding it when the key changed.
    pub fn ensure(&mut self, surface: &mut dyn Surface, scene: &SceneData, generation: u32) -> LayerId {
        let key = BakeKey::new(scene.width, scene.height, generation);
        if let (Some(current), Some(layer)) = (self.key, self.layer) {
            if current == key {
                return layer;
            }
        }
        if let Some(old) = self.layer.take() {
            surface.release_layer(old);
        }

        let layer = surface.begin_layer(scene.width, scene.height);
        bake_band(surface, &scene.band, scene.width, scene.height);
        surface.set_blend(BlendMode::Normal);
        surface.end_layer();

        self.key = Some(key);
        self.layer = Some(layer);
        self.rebuilds += 1;
        log::debug!("band raster baked for {}x{} (generation {})", key.width, key.height, generation);
        layer
    }

    /// Drop the cached layer, e.g. on teardown.
    pub fn release(&mut self, surface: &mut dyn Surface) {
        if let Some(layer) = self.layer.take() {
            surface.release_layer(layer);
        }
        self.key = None;
    }

    pub fn rebuilds(&self) -> u32 {
        self.rebuilds
    }

    pub fn key(&self) -> Option<BakeKey> {
        self.key
    }
}

fn bake_band(surface: &mut dyn Surface, band: &GalacticBand, width: f32, height: f32) {
    let extent = width.max(height);
    let px = |p: Vec2| Vec2::new(p.x * width, p.y * height);

    surface.set_blend(BlendMode::Additive);
    for blob in &band.glow {
        let stops = glow_stops(blob.color);
        surface.fill_ellipse(
            px(blob.pos),
            Vec2::new(blob.rx, blob.ry) * extent,
            blob.rotation,
            &Fill::Glow(&stops),
        );
    }

    surface.set_blend(BlendMode::Normal);
    for star in &band.stars {
        surface.fill_circle(
            px(star.pos),
            radius(star.radius),
            &Fill::Solid(star.color.with_alpha(star.alpha)),
        );
    }

    surface.set_blend(BlendMode::Darken);
    for dust in &band.dust {
        let shade = Color::NIGHT.with_alpha(dust.opacity);
        let stops = [(0.0, shade), (0.6, shade.fade(0.5)), (1.0, shade.with_alpha(0.0))];
        surface.fill_ellipse(
            px(dust.pos),
            Vec2::new(dust.rx, dust.ry) * extent,
            dust.rotation,
            &Fill::Glow(&stops),
        );
    }

    for cluster in &band.clusters {
        surface.set_blend(BlendMode::Additive);
        let halo = glow_stops(cluster.halo);
        surface.fill_circle(px(cluster.center), radius(cluster.radius * extent * 1.8), &Fill::Glow(&halo));
        surface.set_blend(BlendMode::Normal);
        for star in &cluster.stars {
            surface.fill_circle(
                px(star.pos),
                radius(star.radius),
                &Fill::Solid(star.color.with_alpha(star.alpha)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Tier;
    use crate::core::quality::TierSettings;
    use crate::renderer::draw_list::{DrawCmd, DrawList};
    use crate::scene::generate_scene;
    use crate::systems::effects::Rng;

    fn scene(w: f32, h: f32) -> SceneData {
        generate_scene(&TierSettings::for_tier(Tier::Low), w, h, &mut Rng::new(1))
    }

    #[test]
    fn bakes_once_per_key() {
        let mut surface = DrawList::new(800.0, 600.0);
        let mut raster = BandRaster::new();
        let s = scene(800.0, 600.0);
        let a = raster.ensure(&mut surface, &s, 0);
        let b = raster.ensure(&mut surface, &s, 0);
        assert_eq!(a, b);
        assert_eq!(raster.rebuilds(), 1);
        assert_eq!(surface.count(|c| matches!(c, DrawCmd::BeginLayer(_))), 1);
    }

    #[test]
    fn rebakes_on_new_generation_and_releases_old_layer() {
        let mut surface = DrawList::new(800.0, 600.0);
        let mut raster = BandRaster::new();
        let a = raster.ensure(&mut surface, &scene(800.0, 600.0), 0);
        let b = raster.ensure(&mut surface, &scene(1024.0, 768.0), 1);
        assert_ne!(a, b);
        assert_eq!(raster.rebuilds(), 2);
        assert_eq!(surface.live_layers(), &[b]);
    }

    #[test]
    fn bake_draws_every_band_star() {
        let mut surface = DrawList::new(800.0, 600.0);
        let s = scene(800.0, 600.0);
        BandRaster::new().ensure(&mut surface, &s, 0);
        let cluster_stars: usize = s.band.clusters.iter().map(|c| c.stars.len()).sum();
        let solid_circles = surface.count(|c| matches!(c, DrawCmd::Circle { paint: crate::renderer::Paint::Solid(_), .. }));
        assert_eq!(solid_circles, s.band.stars.len() + cluster_stars);
        assert!(surface.all_finite());
    }

    #[test]
    fn release_forgets_the_key() {
        let mut surface = DrawList::new(800.0, 600.0);
        let mut raster = BandRaster::new();
        raster.ensure(&mut surface, &scene(800.0, 600.0), 0);
        raster.release(&mut surface);
        assert!(raster.key().is_none());
        assert!(surface.live_layers().is_empty());
    }
}
