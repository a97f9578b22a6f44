use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::api::types::{ShowerPattern, Tier};
use crate::core::sky::Sky;

/// Host-facing control handle for one sky instance.
///
/// Holds a weak reference: once the owning runner drops the sky, every call
/// becomes a no-op. Several instances can coexist, each with its own handle.
#[derive(Debug, Clone)]
pub struct SkyController {
    sky: Weak<RefCell<Sky>>,
}

impl SkyController {
    pub fn new(sky: &Rc<RefCell<Sky>>) -> Self {
        Self { sky: Rc::downgrade(sky) }
    }

    /// Run `f` against the live sky. `None` after teardown or while the sky
    /// is mid-frame.
    fn with_sky<R>(&self, f: impl FnOnce(&mut Sky) -> R) -> Option<R> {
        let sky = self.sky.upgrade()?;
        let mut sky = sky.try_borrow_mut().ok()?;
        Some(f(&mut sky))
    }

    /// Launch an egg meteor at a bright star. `false` when detached.
    pub fn trigger_explosion(&self) -> bool {
        self.with_sky(|sky| {
            sky.trigger_explosion();
        })
        .is_some()
    }

    /// Enqueue a shower. Returns the batch size, or `None` when detached.
    pub fn trigger_shower(&self, pattern: ShowerPattern) -> Option<usize> {
        self.with_sky(|sky| sky.trigger_shower(pattern))
    }

    /// Like `trigger_shower` with a host-supplied name. Unknown names fall
    /// back to a random pattern.
    pub fn trigger_shower_named(&self, name: Option<&str>) -> Option<usize> {
        let pattern = match name.map(ShowerPattern::parse) {
            None => ShowerPattern::Random,
            Some(Some(pattern)) => pattern,
            Some(None) => {
                log::warn!("unknown shower pattern {:?}, using random", name.unwrap_or_default());
                ShowerPattern::Random
            }
        };
        self.trigger_shower(pattern)
    }

    /// Selected tier, for diagnostics.
    pub fn tier(&self) -> Option<Tier> {
        let sky = self.sky.upgrade()?;
        let tier = sky.try_borrow().ok()?.tier();
        Some(tier)
    }

    pub fn is_attached(&self) -> bool {
        self.sky.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::SkyConfig;

    fn mount(tier: Tier) -> Rc<RefCell<Sky>> {
        let config = SkyConfig { seed: Some(1), ..SkyConfig::default() };
        Rc::new(RefCell::new(Sky::new(tier, config, 800.0, 600.0)))
    }

    #[test]
    fn controls_live_sky() {
        let sky = mount(Tier::High);
        let ctl = SkyController::new(&sky);
        assert_eq!(ctl.tier(), Some(Tier::High));
        assert!(ctl.trigger_explosion());
        assert_eq!(sky.borrow().meteors().len(), 1);
        let n = ctl.trigger_shower(ShowerPattern::Cluster);
        assert!(matches!(n, Some(4..=9)));
    }

    #[test]
    fn calls_after_teardown_are_noops() {
        let sky = mount(Tier::Mid);
        let ctl = SkyController::new(&sky);
        drop(sky);
        assert!(!ctl.is_attached());
        assert!(!ctl.trigger_explosion());
        assert_eq!(ctl.trigger_shower(ShowerPattern::Radial), None);
        assert_eq!(ctl.tier(), None);
    }

    #[test]
    fn named_showers() {
        let sky = mount(Tier::Mid);
        let ctl = SkyController::new(&sky);
        assert!(matches!(ctl.trigger_shower_named(Some("parallel")), Some(3..=5)));
        assert!(ctl.trigger_shower_named(Some("meteorite-storm")).is_some());
        assert!(ctl.trigger_shower_named(None).is_some());
    }

    #[test]
    fn instances_are_independent() {
        let a = mount(Tier::Low);
        let b = mount(Tier::High);
        let (ca, cb) = (SkyController::new(&a), SkyController::new(&b));
        ca.trigger_explosion();
        assert_eq!(a.borrow().meteors().len(), 1);
        assert!(b.borrow().meteors().is_empty());
        assert_eq!(cb.tier(), Some(Tier::High));
    }

    #[test]
    fn busy_sky_is_skipped_not_panicked() {
        let sky = mount(Tier::Mid);
        let ctl = SkyController::new(&sky);
        let _guard = sky.borrow_mut();
        assert!(!ctl.trigger_explosion());
    }
}
