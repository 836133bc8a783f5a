// Re-export all public modules so they can be used from main.rs
pub mod logging;
pub mod config;
pub mod utils;

// Model / Controller split; rendering and asset loading live elsewhere
pub mod model;
pub mod controller;

pub use config::ControllerConfig;
pub use controller::{InputState, Simulation, TickReport};
pub use model::World;
