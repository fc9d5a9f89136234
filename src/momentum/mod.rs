//! Spring/decay momentum engine and velocity estimation.

pub mod decay;
pub mod spring;
pub mod tracker;
pub mod value;

pub use spring::SpringParams;
pub use tracker::{PointerVelocityTracker, ValueVelocityTracker};
pub use value::{Completion, MomentumValue, StepResult};
