//! Scene generator: the static procedural datasets of the sky.
//!
//! `generate_scene` is a pure function of (tier settings, surface size, rng).
//! It is run at mount and on resize only; the compositor caches the galactic
//! band into an offscreen raster so frames never re-run generation.

pub mod galaxy;
pub mod nebula;
pub mod stars;

use glam::Vec2;

use crate::core::quality::TierSettings;
use crate::systems::effects::Rng;

pub use galaxy::{
    BandAxis, BandStar, ClusterStar, DustPatch, EmissionRegion, GalacticBand, GlowBlob, StarCluster,
};
pub use nebula::{Drift, Nebula};
pub use stars::{StarLayer, StarRecord, Wink, STAR_LAYERS};

/// Everything the generator produces for one surface size.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneData {
    pub width: f32,
    pub height: f32,
    pub layers: [StarLayer; STAR_LAYERS],
    pub micro_stars: Vec<StarRecord>,
    pub band: GalacticBand,
    pub nebulae: Vec<Nebula>,
}

impl SceneData {
    /// Total foreground stars across all layers.
    pub fn star_count(&self) -> usize {
        self.layers.iter().map(|l| l.stars.len()).sum()
    }

    /// Stars bright enough to be an explosion target.
    pub fn bright_stars(&self) -> impl Iterator<Item = &StarRecord> {
        self.layers.iter().flat_map(|l| l.stars.iter()).filter(|s| s.is_bright())
    }

    /// Normalized → pixel coordinates.
    pub fn to_pixels(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x * self.width, p.y * self.height)
    }

    /// Longer surface side; scales normalized extents.
    pub fn extent(&self) -> f32 {
        self.width.max(self.height)
    }

    /// Pixel position of a randomly chosen bright star, kept away from the
    /// edges. Falls back to any star, then to a point in the upper sky.
    pub fn pick_target(&self, rng: &mut Rng) -> Vec2 {
        let inset = |p: Vec2| Vec2::new(p.x.clamp(0.1, 0.9), p.y.clamp(0.1, 0.75));
        let bright: Vec<&StarRecord> = self.bright_stars().collect();
        let pool: Vec<&StarRecord> = if bright.is_empty() {
            self.layers.iter().flat_map(|l| l.stars.iter()).collect()
        } else {
            bright
        };
        let normalized = if pool.is_empty() {
            Vec2::new(rng.range(0.2, 0.8), rng.range(0.15, 0.5))
        } else {
            pool[rng.next_int(pool.len() as u32) as usize].pos
        };
        self.to_pixels(inset(normalized))
    }
}

/// Build all static datasets for a `width` × `height` surface.
pub fn generate_scene(settings: &TierSettings, width: f32, height: f32, rng: &mut Rng) -> SceneData {
    let width = if width.is_finite() { width.max(1.0) } else { 1.0 };
    let height = if height.is_finite() { height.max(1.0) } else { 1.0 };
    SceneData {
        width,
        height,
        layers: stars::generate_star_layers(settings, rng),
        micro_stars: stars::generate_micro_stars(settings, rng),
        band: galaxy::generate_band(settings, rng),
        nebulae: nebula::generate_nebulae(settings.nebulae, rng),
    }
}
