//! Small math helpers shared by the simulation and the draw passes.

pub mod easing;

pub use easing::Easing;
