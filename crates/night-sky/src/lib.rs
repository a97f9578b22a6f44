pub mod api;
pub mod core;
pub mod extensions;
pub mod renderer;
pub mod scene;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::{Profile, SkyConfig};
pub use api::controller::SkyController;
pub use api::types::{EntityId, ShowerPattern, Tier};
pub use crate::core::deferred::DeferredQueue;
pub use crate::core::quality::TierSettings;
pub use crate::core::sky::{Sky, SkyTask};
pub use crate::core::time::{FrameDecision, FrameScheduler};
pub use renderer::{
    BlendMode, CapabilityProbe, Compositor, DrawCmd, DrawList, Fill, Gradient, HardwareHints, LayerId,
    ProbeError, ProbeOutcome, ProbeSurface, Surface,
};
pub use scene::{generate_scene, SceneData};
pub use systems::effects::{Color, MeteorPalette, Particle, Rng};
pub use systems::explosion::Explosion;
pub use systems::meteor::{Meteor, MeteorFate, MeteorPhase};
pub use systems::satellite::Satellite;
pub use systems::shower::{generate_shower, ShowerEntry};
pub use extensions::Easing;
