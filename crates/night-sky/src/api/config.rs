use serde::{Deserialize, Serialize};

use crate::api::types::Tier;
use crate::core::quality::TierSettings;

/// Largest accepted `starCount` override.
pub const MAX_STAR_COUNT: usize = TierSettings::star_bounds(Tier::High).1 * 4;
/// Shortest accepted gap between automatic showers or satellite passes (s).
pub const MIN_EVENT_INTERVAL: f32 = 1.0;

/// Feature profile. `Classic` is the lean feature set (no flares,
/// fragmentation or ion trails); `Full` enables them where the tier allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Classic,
    #[default]
    Full,
}

/// Host-provided configuration for one sky instance.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkyConfig {
    /// Pin the canvas behind the page. Layout only; the simulation ignores it.
    pub fixed_position: bool,
    /// Replaces the tier's foreground star count when set.
    pub star_count: Option<usize>,
    pub profile: Profile,
    /// Seconds of session time before the automatic explosion fires.
    pub auto_explosion_after: f32,
    /// Min/max seconds between automatic showers.
    pub shower_interval: (f32, f32),
    /// Min/max seconds between satellite passes.
    pub satellite_interval: (f32, f32),
    /// Largest simulated step after a stall, in seconds.
    pub max_step: f32,
    /// Fixed RNG seed; hosts usually leave this unset.
    pub seed: Option<u64>,
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            fixed_position: true,
            star_count: None,
            profile: Profile::Full,
            auto_explosion_after: 300.0,
            shower_interval: (45.0, 120.0),
            satellite_interval: (60.0, 180.0),
            max_step: 0.1,
            seed: None,
        }
    }
}

impl SkyConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: SkyConfig = serde_json::from_str(json)?;
        config.normalize();
        Ok(config)
    }

    /// Repair out-of-range values instead of rejecting them.
    pub fn normalize(&mut self) {
        if !self.auto_explosion_after.is_finite() || self.auto_explosion_after < 0.0 {
            self.auto_explosion_after = 300.0;
        }
        self.shower_interval = sane_interval(self.shower_interval, (45.0, 120.0));
        self.satellite_interval = sane_interval(self.satellite_interval, (60.0, 180.0));
        if !self.max_step.is_finite() || self.max_step <= 0.0 {
            self.max_step = 0.1;
        }
        match self.star_count {
            Some(0) => {
                log::warn!("starCount of 0 ignored, using tier default");
                self.star_count = None;
            }
            Some(n) if n > MAX_STAR_COUNT => {
                log::warn!("starCount {} clamped to {}", n, MAX_STAR_COUNT);
                self.star_count = Some(MAX_STAR_COUNT);
            }
            _ => {}
        }
    }
}

fn sane_interval((min, max): (f32, f32), fallback: (f32, f32)) -> (f32, f32) {
    if !min.is_finite() || !max.is_finite() || min <= 0.0 {
        return fallback;
    }
    let (min, max) = if max < min { (max, min) } else { (min, max) };
    if min < MIN_EVENT_INTERVAL {
        log::warn!("event interval minimum {} raised to {}", min, MIN_EVENT_INTERVAL);
    }
    let min = min.max(MIN_EVENT_INTERVAL);
    (min, max.max(min))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        let config = SkyConfig::from_json("{}").unwrap();
        assert_eq!(config, SkyConfig::default());
    }

    #[test]
    fn parses_camel_case_fields() {
        let json = r#"{ "fixedPosition": false, "starCount": 250, "profile": "classic" }"#;
        let config = SkyConfig::from_json(json).unwrap();
        assert!(!config.fixed_position);
        assert_eq!(config.star_count, Some(250));
        assert_eq!(config.profile, Profile::Classic);
    }

    #[test]
    fn bad_values_are_repaired() {
        let json = r#"{ "maxStep": -1.0, "showerInterval": [30.0, 10.0], "starCount": 0 }"#;
        let config = SkyConfig::from_json(json).unwrap();
        assert_eq!(config.max_step, 0.1);
        assert_eq!(config.shower_interval, (10.0, 30.0));
        assert_eq!(config.star_count, None);
    }

    #[test]
    fn huge_star_count_is_clamped() {
        let config = SkyConfig::from_json(r#"{ "starCount": 4000000000000000000 }"#).unwrap();
        assert_eq!(config.star_count, Some(MAX_STAR_COUNT));
        let sky = crate::core::sky::Sky::new(Tier::Low, config, 320.0, 240.0);
        assert_eq!(sky.scene().star_count(), MAX_STAR_COUNT);
    }

    #[test]
    fn tiny_intervals_get_a_floor() {
        let json = r#"{ "showerInterval": [0.0001, 0.0002], "satelliteInterval": [-1.0, 5.0] }"#;
        let config = SkyConfig::from_json(json).unwrap();
        assert_eq!(config.shower_interval, (MIN_EVENT_INTERVAL, MIN_EVENT_INTERVAL));
        assert_eq!(config.satellite_interval, (60.0, 180.0));

        let config = SkyConfig::from_json(r#"{ "showerInterval": [0.2, 5.0] }"#).unwrap();
        assert_eq!(config.shower_interval, (MIN_EVENT_INTERVAL, 5.0));
    }

    #[test]
    fn malformed_json_is_error() {
        assert!(SkyConfig::from_json("{ starCount: ").is_err());
    }
}
