pub mod deferred;
pub mod quality;
pub mod sky;
pub mod time;
