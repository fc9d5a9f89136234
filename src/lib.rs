//! Deskball - a desktop novelty ball with spring/decay physics, built with Bevy
//!
//! This crate provides all simulation components, resources, and systems organized into modules.

// Core modules
pub mod constants;
pub mod events;
pub mod helpers;
pub mod simulation;
pub mod snapshot;
pub mod testing;
pub mod tuning;

// Simulation modules
pub mod arena;
pub mod audio;
pub mod ball;
pub mod interaction;
pub mod momentum;

// Re-export commonly used types for convenience
pub use arena::{Arena, ArenaResized, apply_arena_resizes};
pub use audio::{CollisionAudio, NullSink, SoundSink};
pub use ball::{
    Ball, BallMotion, BallPhase, BallVisual, ContactBegan, DeferredEffect, DeferredEffects,
    PutBack, WallTouch, apply_deferred_effects, ball_contact_response, ball_gravity,
    ball_integrate_and_collide, ball_visual_step,
};
pub use constants::*;
pub use events::{
    BallEvent, BusEvent, EventBus, SessionLog, Wall, flush_event_log, serialize_event,
    update_event_bus_time,
};
pub use helpers::{constrain_circle_center, constrain_rect, move_toward, remap};
pub use interaction::{
    DockCommand, DragState, PointerMessage, ScrollMessage, ScrollPhase, apply_dock_commands,
    drive_put_back, pointer_interaction,
};
pub use momentum::{
    MomentumValue, PointerVelocityTracker, SpringParams, StepResult, ValueVelocityTracker,
};
pub use simulation::{DemoReport, HeadlessAppBuilder, run_demo_session};
pub use snapshot::{BallSnapshot, FrameSnapshot, publish_snapshot};
pub use tuning::{Tuning, TuningFile, load_tuning_system};
