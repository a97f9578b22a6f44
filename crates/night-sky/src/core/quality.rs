use crate::api::config::{Profile, SkyConfig, MAX_STAR_COUNT};
use crate::api::types::Tier;

/// Everything the tier decides: population counts, feature toggles and the
/// frame-rate cap. Resolved once from (tier, config) at mount.
#[derive(Debug, Clone, PartialEq)]
pub struct TierSettings {
    pub tier: Tier,
    pub profile: Profile,

    // Populations
    /// Foreground stars across all three depth layers.
    pub star_count: usize,
    pub band_stars: usize,
    pub dust_patches: usize,
    pub glow_blobs: usize,
    pub clusters: usize,
    pub emission_regions: usize,
    pub nebulae: usize,
    pub micro_stars: usize,

    // Feature toggles
    pub star_spikes: bool,
    pub dust_lanes: bool,
    pub animated_micro_stars: bool,
    pub ion_trails: bool,
    pub satellites: bool,
    pub flares: bool,
    pub fragmentation: bool,

    // Meteors and explosions
    pub max_meteors: usize,
    pub trail_length: usize,
    /// Pixels per frame.
    pub meteor_speed: (f32, f32),
    pub meteor_head: (f32, f32),
    pub debris: (u32, u32),
    /// Seconds between sporadic single meteors.
    pub sporadic_interval: (f32, f32),

    /// Frame-rate cap; `None` runs at the display refresh rate.
    pub target_fps: Option<f32>,
}

impl TierSettings {
    /// Documented foreground star range per tier (before any override).
    pub const fn star_bounds(tier: Tier) -> (usize, usize) {
        match tier {
            Tier::Low => (300, 600),
            Tier::Mid => (700, 1200),
            Tier::High => (1200, 2000),
        }
    }

    /// Documented galactic-band star range per tier.
    pub const fn band_bounds(tier: Tier) -> (usize, usize) {
        match tier {
            Tier::Low => (1200, 1600),
            Tier::Mid => (4000, 5000),
            Tier::High => (8000, 9000),
        }
    }

    pub fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::Low => Self {
                tier,
                profile: Profile::Full,
                star_count: 450,
                band_stars: 1400,
                dust_patches: 0,
                glow_blobs: 14,
                clusters: 2,
                emission_regions: 3,
                nebulae: 3,
                micro_stars: 0,
                star_spikes: false,
                dust_lanes: false,
                animated_micro_stars: false,
                ion_trails: false,
                satellites: false,
                flares: true,
                fragmentation: true,
                max_meteors: 6,
                trail_length: 16,
                meteor_speed: (6.0, 10.0),
                meteor_head: (1.2, 2.2),
                debris: (70, 90),
                sporadic_interval: (10.0, 22.0),
                target_fps: Some(30.0),
            },
            Tier::Mid => Self {
                tier,
                profile: Profile::Full,
                star_count: 950,
                band_stars: 4500,
                dust_patches: 90,
                glow_blobs: 22,
                clusters: 4,
                emission_regions: 5,
                nebulae: 4,
                micro_stars: 250,
                star_spikes: true,
                dust_lanes: true,
                animated_micro_stars: true,
                ion_trails: true,
                satellites: true,
                flares: true,
                fragmentation: true,
                max_meteors: 10,
                trail_length: 24,
                meteor_speed: (5.0, 11.0),
                meteor_head: (1.3, 2.6),
                debris: (90, 120),
                sporadic_interval: (7.0, 16.0),
                target_fps: None,
            },
            Tier::High => Self {
                tier,
                profile: Profile::Full,
                star_count: 1600,
                band_stars: 9000,
                dust_patches: 160,
                glow_blobs: 30,
                clusters: 6,
                emission_regions: 7,
                nebulae: 5,
                micro_stars: 500,
                star_spikes: true,
                dust_lanes: true,
                animated_micro_stars: true,
                ion_trails: true,
                satellites: true,
                flares: true,
                fragmentation: true,
                max_meteors: 14,
                trail_length: 32,
                meteor_speed: (5.0, 12.0),
                meteor_head: (1.4, 3.0),
                debris: (110, 140),
                sporadic_interval: (5.0, 12.0),
                target_fps: None,
            },
        }
    }

    /// Resolve the tier table against the host configuration.
    pub fn resolve(tier: Tier, config: &SkyConfig) -> Self {
        let mut settings = Self::for_tier(tier);
        settings.profile = config.profile;
        if config.profile == Profile::Classic {
            settings.flares = false;
            settings.fragmentation = false;
            settings.ion_trails = false;
        }
        if let Some(count) = config.star_count {
            settings.star_count = count.min(MAX_STAR_COUNT);
        }
        settings
    }

    /// Minimum seconds between simulated frames (0 when uncapped).
    pub fn min_frame_interval(&self) -> f32 {
        match self.target_fps {
            Some(fps) if fps > 0.0 => 1.0 / fps,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIERS: [Tier; 3] = [Tier::Low, Tier::Mid, Tier::High];

    #[test]
    fn defaults_sit_inside_documented_bounds() {
        for tier in TIERS {
            let s = TierSettings::for_tier(tier);
            let (lo, hi) = TierSettings::star_bounds(tier);
            assert!(s.star_count >= lo && s.star_count <= hi, "{:?}", tier);
            let (lo, hi) = TierSettings::band_bounds(tier);
            assert!(s.band_stars >= lo && s.band_stars <= hi, "{:?}", tier);
        }
    }

    #[test]
    fn low_disables_expensive_features() {
        let s = TierSettings::for_tier(Tier::Low);
        assert!(!s.dust_lanes);
        assert!(!s.animated_micro_stars);
        assert!(!s.star_spikes);
        assert!(!s.satellites);
        assert!(s.min_frame_interval() > 0.03);
    }

    #[test]
    fn higher_tiers_are_uncapped() {
        assert_eq!(TierSettings::for_tier(Tier::Mid).min_frame_interval(), 0.0);
        assert_eq!(TierSettings::for_tier(Tier::High).min_frame_interval(), 0.0);
    }

    #[test]
    fn classic_profile_strips_extras() {
        let config = SkyConfig { profile: Profile::Classic, ..SkyConfig::default() };
        let s = TierSettings::resolve(Tier::High, &config);
        assert!(!s.flares && !s.fragmentation && !s.ion_trails);
        assert!(s.star_spikes, "tier features stay on");
    }

    #[test]
    fn star_override_applies() {
        let config = SkyConfig { star_count: Some(42), ..SkyConfig::default() };
        assert_eq!(TierSettings::resolve(Tier::Mid, &config).star_count, 42);
    }

    #[test]
    fn unnormalized_star_override_is_capped() {
        let config = SkyConfig { star_count: Some(usize::MAX), ..SkyConfig::default() };
        assert_eq!(TierSettings::resolve(Tier::Low, &config).star_count, MAX_STAR_COUNT);
    }
}
