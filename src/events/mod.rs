//! Event bus and session logging
//!
//! Systems emit `BallEvent`s to the bus as they act; the session logger
//! writes them to a compact text file and the scenario harness asserts
//! against them.

mod bus;
mod log;
mod types;

pub use bus::{BusEvent, EventBus, update_event_bus_time};
pub use log::{SessionLog, flush_event_log, serialize_event};
pub use types::{BallEvent, Wall};
