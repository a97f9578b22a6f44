pub mod effects;
pub mod meteor;
pub mod explosion;
pub mod shower;
pub mod satellite;
