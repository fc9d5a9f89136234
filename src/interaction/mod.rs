//! Interaction module - gesture state machine and dock transitions

mod dock;
mod drag;

pub use dock::*;
pub use drag::*;
