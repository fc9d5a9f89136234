//! Ball module - components, physics, and collision response systems

mod components;
mod physics;
mod visual;

pub use components::*;
pub use physics::*;
pub use visual::*;
