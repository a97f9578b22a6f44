//! Shared effect primitives: RNG, colors and the generic spark particle.
//!
//! Meteors and explosions build on these; nothing here knows about either.

mod rng;
mod color;
mod particle;

// Re-export public types
pub use rng::Rng;
pub use color::{clamp_unit, Color, MeteorPalette, SpectralClass};
pub use particle::Particle;
