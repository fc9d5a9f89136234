//! Arena bounds and host resize handling
//!
//! The arena is the rectangular region the ball lives in. Edge collision
//! resolves directly against `Arena::bounds`, so replacing the bounds is
//! all a resize needs; there is no separate collider to rebuild.

use bevy::prelude::*;

use crate::constants::DEFAULT_ARENA;
use crate::events::{BallEvent, EventBus};

/// Host display region, arena-local coordinates, y-up, origin bottom-left.
#[derive(Resource, Debug, Clone)]
pub struct Arena {
    pub bounds: Rect,
}

impl Arena {
    pub fn new(bounds: Rect) -> Self {
        assert!(
            bounds.width() > 0.0 && bounds.height() > 0.0,
            "degenerate arena bounds: {bounds:?}"
        );
        Self { bounds }
    }

    pub fn floor_y(&self) -> f32 {
        self.bounds.min.y
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(DEFAULT_ARENA)
    }
}

/// Host notification that the display region changed
#[derive(Message, Debug, Clone, Copy)]
pub struct ArenaResized {
    pub bounds: Rect,
}

/// Replace the arena bounds before this frame's physics step. The ball is
/// not teleported; the next integration step resolves it against the new
/// edges.
pub fn apply_arena_resizes(
    mut resizes: MessageReader<ArenaResized>,
    mut arena: ResMut<Arena>,
    mut bus: ResMut<EventBus>,
) {
    for resize in resizes.read() {
        if resize.bounds.width() <= 0.0 || resize.bounds.height() <= 0.0 {
            warn!("Ignoring degenerate arena bounds: {:?}", resize.bounds);
            continue;
        }
        arena.bounds = resize.bounds;
        bus.emit(BallEvent::ArenaResized {
            width: resize.bounds.width(),
            height: resize.bounds.height(),
        });
    }
}
