//! Galactic band: a diagonal Milky-Way composite of stars, dark dust lanes,
//! diffuse glow, open clusters and emission regions.
//!
//! Positions are normalized to the surface. Extents (`rx`, `ry`, cluster
//! radius) are normalized to the longer surface side so ellipses keep their
//! shape under any aspect ratio.

use glam::Vec2;

use crate::core::quality::TierSettings;
use crate::systems::effects::{clamp_unit, Color, Rng};

use super::nebula::Drift;

/// Share of band stars concentrated around the core.
const CORE_SHARE: f32 = 0.65;
/// Mean distance (in axis parameter) of core-concentrated stars.
const CORE_FALLOFF: f32 = 0.16;

/// The band's central line in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandAxis {
    pub start: Vec2,
    pub end: Vec2,
    /// Axis parameter of the bright core.
    pub core: f32,
}

impl Default for BandAxis {
    fn default() -> Self {
        Self {
            start: Vec2::new(0.0, 0.82),
            end: Vec2::new(1.0, 0.18),
            core: 0.56,
        }
    }
}

impl BandAxis {
    pub fn point(&self, t: f32) -> Vec2 {
        self.start + (self.end - self.start) * t
    }

    /// Unit normal to the axis.
    pub fn normal(&self) -> Vec2 {
        (self.end - self.start).perp().normalize_or_zero()
    }

    /// Axis angle in radians.
    pub fn angle(&self) -> f32 {
        let d = self.end - self.start;
        d.y.atan2(d.x)
    }

    /// Perpendicular scatter width at `t`; widens away from the core.
    pub fn width(&self, t: f32) -> f32 {
        0.035 + 0.09 * (t - self.core).abs()
    }

    /// 1.0 at the core, falling off exponentially along the axis.
    pub fn core_weight(&self, t: f32) -> f32 {
        (-(t - self.core).abs() * 3.0).exp()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandStar {
    pub pos: Vec2,
    pub radius: f32,
    pub alpha: f32,
    pub color: Color,
}

/// Dark absorbing patch, composited with a darken blend.
#[derive(Debug, Clone, PartialEq)]
pub struct DustPatch {
    pub pos: Vec2,
    pub rx: f32,
    pub ry: f32,
    pub rotation: f32,
    pub opacity: f32,
}

/// Soft diffuse glow ellipse.
#[derive(Debug, Clone, PartialEq)]
pub struct GlowBlob {
    pub pos: Vec2,
    pub rx: f32,
    pub ry: f32,
    pub rotation: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterStar {
    pub pos: Vec2,
    pub radius: f32,
    pub alpha: f32,
    pub color: Color,
}

/// Open cluster: a tight knot of stars around a faint halo.
#[derive(Debug, Clone, PartialEq)]
pub struct StarCluster {
    pub center: Vec2,
    pub radius: f32,
    pub halo: Color,
    pub stars: Vec<ClusterStar>,
}

/// Small colored gas cloud (H-alpha red or O-III teal) that drifts slowly.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionRegion {
    pub pos: Vec2,
    pub rx: f32,
    pub ry: f32,
    pub rotation: f32,
    pub color: Color,
    pub drift: Drift,
}

/// All static records of the galactic band.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GalacticBand {
    pub axis: BandAxis,
    pub stars: Vec<BandStar>,
    pub dust: Vec<DustPatch>,
    pub glow: Vec<GlowBlob>,
    pub clusters: Vec<StarCluster>,
    pub emission: Vec<EmissionRegion>,
}

fn clamp_pos(p: Vec2) -> Vec2 {
    Vec2::new(clamp_unit(p.x), clamp_unit(p.y))
}

pub fn generate_band(settings: &TierSettings, rng: &mut Rng) -> GalacticBand {
    let axis = BandAxis::default();
    let normal = axis.normal();
    let angle = axis.angle();

    let warm = Color::rgb(1.0, 0.9, 0.75);
    let cool = Color::rgb(0.8, 0.86, 1.0);

    let stars = (0..settings.band_stars)
        .map(|_| {
            let t = if rng.chance(CORE_SHARE) {
                axis.core + rng.sign() * rng.exponential(CORE_FALLOFF)
            } else {
                rng.next_f32()
            };
            let t = clamp_unit(t);
            let offset = rng.gaussian() * axis.width(t);
            let core = axis.core_weight(t);
            BandStar {
                pos: clamp_pos(axis.point(t) + normal * offset),
                radius: rng.range(0.25, 0.9) + core * rng.range(0.0, 0.3),
                alpha: clamp_unit(0.12 + 0.55 * core * rng.next_f32() + 0.15 * rng.next_f32()),
                color: cool.lerp(warm, core * rng.next_f32()),
            }
        })
        .collect();

    let dust = if settings.dust_lanes {
        (0..settings.dust_patches)
            .map(|_| {
                let t = rng.range(0.08, 0.95);
                let offset = rng.gaussian() * axis.width(t) * 0.5;
                DustPatch {
                    pos: clamp_pos(axis.point(t) + normal * offset),
                    rx: rng.range(0.02, 0.07),
                    ry: rng.range(0.006, 0.022),
                    rotation: angle + rng.range(-0.25, 0.25),
                    opacity: rng.range(0.25, 0.6),
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    let glow = (0..settings.glow_blobs)
        .map(|_| {
            let t = clamp_unit(axis.core + rng.gaussian() * 0.22);
            let offset = rng.gaussian() * axis.width(t) * 0.4;
            let core = axis.core_weight(t);
            GlowBlob {
                pos: clamp_pos(axis.point(t) + normal * offset),
                rx: rng.range(0.08, 0.2),
                ry: rng.range(0.03, 0.08),
                rotation: angle + rng.range(-0.15, 0.15),
                color: cool.lerp(warm, core).with_alpha(rng.range(0.03, 0.08) + core * 0.04),
            }
        })
        .collect();

    let clusters = (0..settings.clusters)
        .map(|_| {
            let t = rng.range(0.1, 0.9);
            let center = clamp_pos(axis.point(t) + normal * rng.gaussian() * axis.width(t) * 1.5);
            let radius = rng.range(0.008, 0.025);
            let count = rng.range_inclusive(12, 40);
            let stars = (0..count)
                .map(|_| ClusterStar {
                    pos: clamp_pos(center + Vec2::new(rng.gaussian(), rng.gaussian()) * radius * 0.5),
                    radius: rng.range(0.3, 1.1),
                    alpha: rng.range(0.35, 0.9),
                    color: cool.lerp(Color::WHITE, rng.next_f32()),
                })
                .collect();
            StarCluster {
                center,
                radius,
                halo: cool.with_alpha(rng.range(0.04, 0.09)),
                stars,
            }
        })
        .collect();

    let emission = (0..settings.emission_regions)
        .map(|_| {
            let t = rng.range(0.05, 0.95);
            let h_alpha = rng.chance(0.7);
            let color = if h_alpha {
                Color::rgb(1.0, 0.32, 0.42)
            } else {
                Color::rgb(0.3, 0.85, 0.8)
            };
            EmissionRegion {
                pos: clamp_pos(axis.point(t) + normal * rng.gaussian() * axis.width(t)),
                rx: rng.range(0.02, 0.06),
                ry: rng.range(0.015, 0.045),
                rotation: rng.range(0.0, std::f32::consts::PI),
                color: color.with_alpha(rng.range(0.05, 0.12)),
                drift: Drift::random(rng, 0.0004),
            }
        })
        .collect();

    GalacticBand { axis, stars, dust, glow, clusters, emission }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Tier;

    fn in_unit(p: Vec2) -> bool {
        (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)
    }

    #[test]
    fn band_counts_follow_tier() {
        let mut rng = Rng::new(4);
        for tier in [Tier::Low, Tier::Mid, Tier::High] {
            let s = TierSettings::for_tier(tier);
            let band = generate_band(&s, &mut rng);
            assert_eq!(band.stars.len(), s.band_stars);
            assert_eq!(band.clusters.len(), s.clusters);
            assert_eq!(band.emission.len(), s.emission_regions);
        }
    }

    #[test]
    fn low_tier_has_no_dust_lanes() {
        let mut rng = Rng::new(4);
        let band = generate_band(&TierSettings::for_tier(Tier::Low), &mut rng);
        assert!(band.dust.is_empty());
    }

    #[test]
    fn all_records_are_normalized() {
        let mut rng = Rng::new(12);
        let band = generate_band(&TierSettings::for_tier(Tier::High), &mut rng);
        assert!(band.stars.iter().all(|s| in_unit(s.pos)));
        assert!(band.dust.iter().all(|d| in_unit(d.pos)));
        assert!(band.glow.iter().all(|g| in_unit(g.pos)));
        assert!(band.clusters.iter().all(|c| in_unit(c.center) && c.stars.iter().all(|s| in_unit(s.pos))));
        assert!(band.emission.iter().all(|e| in_unit(e.pos)));
    }

    #[test]
    fn stars_concentrate_near_the_axis_core() {
        let mut rng = Rng::new(21);
        let band = generate_band(&TierSettings::for_tier(Tier::High), &mut rng);
        let core = band.axis.point(band.axis.core);
        let near = band.stars.iter().filter(|s| s.pos.distance(core) < 0.25).count();
        // A uniform spread would put far fewer than a third of the stars here.
        assert!(near * 3 > band.stars.len(), "near {} of {}", near, band.stars.len());
    }

    #[test]
    fn width_grows_away_from_core() {
        let axis = BandAxis::default();
        assert!(axis.width(axis.core) < axis.width(0.0));
        assert!(axis.width(axis.core) < axis.width(1.0));
    }
}
