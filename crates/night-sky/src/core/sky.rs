use glam::Vec2;

use crate::api::config::SkyConfig;
use crate::api::types::{EntityId, ShowerPattern, Tier};
use crate::core::deferred::DeferredQueue;
use crate::core::quality::TierSettings;
use crate::scene::{generate_scene, SceneData};
use crate::systems::effects::Rng;
use crate::systems::explosion::Explosion;
use crate::systems::meteor::{Meteor, MeteorFate};
use crate::systems::satellite::Satellite;
use crate::systems::shower::generate_shower;

/// Seed used when the host does not supply one.
const DEFAULT_SEED: u64 = 0x5eed_0f_5ca1;
/// Egg meteor speed range in pixels per frame.
const EGG_SPEED: (f32, f32) = (7.0, 10.0);

/// Work scheduled for a later point in session time.
#[derive(Debug, Clone)]
pub enum SkyTask {
    /// Admit a shower meteor.
    SpawnMeteor(Box<Meteor>),
    /// Automatic once-per-session explosion.
    EasterEgg,
}

/// The simulation state of one sky instance.
///
/// Owns the static scene and every live entity. List membership is the only
/// lifetime authority: removing a meteor or explosion from its list destroys it.
pub struct Sky {
    config: SkyConfig,
    settings: TierSettings,
    rng: Rng,
    scene: SceneData,
    /// Bumped on every regeneration; keys the band raster cache.
    scene_generation: u32,
    meteors: Vec<Meteor>,
    explosions: Vec<Explosion>,
    satellite: Option<Satellite>,
    deferred: DeferredQueue<SkyTask>,
    /// Simulated session seconds. Does not advance while frozen.
    clock: f64,
    next_shower: f64,
    next_sporadic: f64,
    next_satellite: Option<f64>,
    egg_done: bool,
    next_id: u32,
}

impl Sky {
    pub fn new(tier: Tier, mut config: SkyConfig, width: f32, height: f32) -> Self {
        config.normalize();
        let settings = TierSettings::resolve(tier, &config);
        let mut rng = Rng::new(config.seed.unwrap_or(DEFAULT_SEED));
        let scene = generate_scene(&settings, width, height, &mut rng);

        let next_shower = interval(&mut rng, config.shower_interval);
        let next_sporadic = interval(&mut rng, settings.sporadic_interval);
        let next_satellite = settings
            .satellites
            .then(|| interval(&mut rng, config.satellite_interval));

        let mut deferred = DeferredQueue::new();
        deferred.schedule(config.auto_explosion_after as f64, SkyTask::EasterEgg);

        log::info!(
            "night sky mounted: tier {}, {} stars, {} band stars, {}x{}",
            tier.as_str(),
            scene.star_count(),
            scene.band.stars.len(),
            scene.width,
            scene.height
        );

        Self {
            config,
            settings,
            rng,
            scene,
            scene_generation: 0,
            meteors: Vec::new(),
            explosions: Vec::new(),
            satellite: None,
            deferred,
            clock: 0.0,
            next_shower,
            next_sporadic,
            next_satellite,
            egg_done: false,
            next_id: 1,
        }
    }

    /// Regenerate the static scene for a new surface size. Live meteors,
    /// explosions and pending tasks are left untouched.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.scene = generate_scene(&self.settings, width, height, &mut self.rng);
        self.scene_generation = self.scene_generation.wrapping_add(1);
        log::info!(
            "night sky resized to {}x{} (generation {})",
            self.scene.width,
            self.scene.height,
            self.scene_generation
        );
    }

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.clamp(0.0, self.config.max_step) } else { 0.0 };
        let k = dt * 60.0;
        self.clock += dt as f64;

        for task in self.deferred.drain_due(self.clock) {
            match task {
                SkyTask::SpawnMeteor(meteor) => {
                    self.admit_meteor(*meteor);
                }
                SkyTask::EasterEgg => {
                    if !self.egg_done {
                        self.egg_done = true;
                        log::debug!("automatic explosion at {:.0}s", self.clock);
                        self.launch_egg();
                    }
                }
            }
        }
        self.advance_timers();

        let bounds = Vec2::new(self.scene.width, self.scene.height);
        let rng = &mut self.rng;
        let mut spawned = Vec::new();
        let mut impacts = Vec::new();
        self.meteors.retain_mut(|m| match m.update(k, bounds, rng, &mut spawned) {
            MeteorFate::Alive => true,
            MeteorFate::Impact(point) => {
                impacts.push(point);
                false
            }
            MeteorFate::Expired | MeteorFate::OutOfBounds => false,
        });
        for fragment in spawned {
            self.admit_meteor(fragment);
        }
        for point in impacts {
            let mut explosion = Explosion::new(point, self.settings.debris, &mut self.rng);
            explosion.id = self.alloc_id();
            self.explosions.push(explosion);
        }

        for explosion in self.explosions.iter_mut() {
            explosion.update(k);
        }
        self.explosions.retain(Explosion::is_active);

        if let Some(sat) = self.satellite.as_mut() {
            if !sat.update(k, bounds) {
                self.satellite = None;
            }
        }
    }

    fn advance_timers(&mut self) {
        if self.clock >= self.next_sporadic {
            if self.meteors.len() < self.settings.max_meteors {
                let meteor = Meteor::spawn_random(&self.settings, self.scene.width, self.scene.height, &mut self.rng);
                self.admit_meteor(meteor);
            }
            self.next_sporadic = self.clock + interval(&mut self.rng, self.settings.sporadic_interval);
        }

        if self.clock >= self.next_shower {
            self.trigger_shower(ShowerPattern::Random);
            self.next_shower = self.clock + interval(&mut self.rng, self.config.shower_interval);
        }

        if let Some(due) = self.next_satellite {
            if self.clock >= due {
                if self.satellite.is_none() {
                    self.satellite = Some(Satellite::spawn(self.scene.width, self.scene.height, &mut self.rng));
                }
                self.next_satellite = Some(self.clock + interval(&mut self.rng, self.config.satellite_interval));
            }
        }
    }

    /// Launch a meteor at a bright star; it explodes on arrival. Also
    /// retires the automatic explosion for this session.
    pub fn trigger_explosion(&mut self) -> EntityId {
        if !self.egg_done {
            self.egg_done = true;
            self.deferred.cancel_where(|t| matches!(t, SkyTask::EasterEgg));
        }
        self.launch_egg()
    }

    fn launch_egg(&mut self) -> EntityId {
        let target = self.scene.pick_target(&mut self.rng);
        let x = (target.x + self.rng.range(-0.3, 0.3) * self.scene.width).clamp(0.0, self.scene.width);
        let from = Vec2::new(x, -20.0);
        let speed = self.rng.range(EGG_SPEED.0, EGG_SPEED.1);
        let meteor = Meteor::aimed(from, target, speed, &mut self.rng);
        log::debug!("egg meteor aimed at ({:.0}, {:.0})", target.x, target.y);
        self.admit_meteor(meteor)
    }

    /// Enqueue a shower batch. Returns the number of meteors scheduled.
    pub fn trigger_shower(&mut self, pattern: ShowerPattern) -> usize {
        let batch = generate_shower(pattern, self.scene.width, self.scene.height, &self.settings, &mut self.rng);
        let count = batch.len();
        for entry in batch {
            let due = self.clock + entry.delay.max(0.0) as f64;
            self.deferred.schedule(due, SkyTask::SpawnMeteor(Box::new(entry.meteor)));
        }
        log::debug!("{} shower: {} meteors", pattern.as_str(), count);
        count
    }

    /// Add a meteor to the live list immediately.
    pub fn spawn_meteor(&mut self, meteor: Meteor) -> EntityId {
        self.admit_meteor(meteor)
    }

    fn admit_meteor(&mut self, mut meteor: Meteor) -> EntityId {
        let id = self.alloc_id();
        meteor.id = id;
        self.meteors.push(meteor);
        id
    }

    fn alloc_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub fn tier(&self) -> Tier {
        self.settings.tier
    }

    pub fn settings(&self) -> &TierSettings {
        &self.settings
    }

    pub fn config(&self) -> &SkyConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneData {
        &self.scene
    }

    pub fn scene_generation(&self) -> u32 {
        self.scene_generation
    }

    pub fn meteors(&self) -> &[Meteor] {
        &self.meteors
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    pub fn satellite(&self) -> Option<&Satellite> {
        self.satellite.as_ref()
    }

    /// Session seconds simulated so far.
    pub fn time(&self) -> f32 {
        self.clock as f32
    }

    pub fn pending_tasks(&self) -> usize {
        self.deferred.len()
    }

    /// Whether the once-per-session explosion has been used up.
    pub fn egg_done(&self) -> bool {
        self.egg_done
    }
}

fn interval(rng: &mut Rng, (min, max): (f32, f32)) -> f64 {
    rng.range(min, max.max(min)) as f64
}
