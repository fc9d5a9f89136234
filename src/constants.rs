//! Tunable constants for deskball
//!
//! Baseline values live here; anything the tuning file can override is
//! mirrored in `tuning.rs`.

use bevy::prelude::*;

// =============================================================================
// ARENA
// =============================================================================

pub const DEFAULT_ARENA_WIDTH: f32 = 1920.0;
pub const DEFAULT_ARENA_HEIGHT: f32 = 1080.0;

/// Arena coordinates are y-up with the origin at the bottom-left corner,
/// so "distance from floor" is just `pos.y - radius`.
pub const DEFAULT_ARENA: Rect = Rect {
    min: Vec2::ZERO,
    max: Vec2::new(DEFAULT_ARENA_WIDTH, DEFAULT_ARENA_HEIGHT),
};

// =============================================================================
// BALL PHYSICS
// =============================================================================

pub const BALL_RADIUS: f32 = 100.0;
pub const BALL_GRAVITY: f32 = 1470.0; // 9.8 m/s² at 150 px per meter
pub const BALL_BOUNCE: f32 = 0.6; // Coefficient of restitution
pub const BALL_REST_SPEED: f32 = 80.0; // Rebound speed below this flattens to rest
pub const CONTACT_EPSILON: f32 = 0.5; // Skin width for wall proximity checks
pub const FRAME_DT_MIN: f32 = 1.0 / 120.0; // Native display loop ran at 120fps

// =============================================================================
// COLLISION RESPONSE
// =============================================================================

pub const MIN_COLLISION_IMPULSE: f32 = 1000.0; // Below this: no visual or audio reaction
pub const MAX_COLLISION_IMPULSE: f32 = 2000.0;
pub const MAX_COLLISION_STRENGTH: f32 = 0.5; // Impulse range remaps to [0, this]
pub const SQUISH_SCALE_FLOOR: f32 = 0.8; // Full-strength hit squishes to this
pub const SQUISH_VELOCITY_MIN: f32 = -5.0; // Entry velocity at zero strength
pub const SQUISH_VELOCITY_MAX: f32 = -10.0; // Entry velocity at full strength

// =============================================================================
// MOMENTUM ENGINE
// =============================================================================

pub const RUBBER_BAND_DIMENSION: f64 = 500.0;
pub const RUBBER_BAND_COEFFICIENT: f64 = 0.55;
pub const DECAY_CONSTANT: f64 = 0.998; // Per-millisecond velocity retention
pub const DECAY_VELOCITY_EPSILON: f64 = 0.5; // Solver-space resolution threshold
pub const POINTER_TRACKER_WINDOW: f64 = 0.1; // Seconds of pointer samples kept
pub const VALUE_TRACKER_WINDOW: f64 = 1.0 / 15.0; // Seconds of scalar samples kept

// =============================================================================
// DRAG AND DOCK
// =============================================================================

pub const DRAG_SCALE_HELD: f64 = 1.05; // Ball swells slightly while grabbed
pub const VISUAL_SCALE_UNIT: f64 = 1000.0; // Solver-space scale for squish/drag-scale
pub const ENTRY_IMPULSE_STRENGTH: f32 = 2000.0; // Release-from-dock kick
pub const EDGE_PROXIMITY: f32 = 200.0; // Spawn closer than this to an edge gets pushed away

// =============================================================================
// CONTACT SHADOW
// =============================================================================

pub const SHADOW_FADE_DISTANCE: f32 = 200.0; // Opacity ramps to zero over this height
pub const SHADOW_FADE_IN_SECS: f32 = 0.5;
pub const SHADOW_FADE_OUT_SECS: f32 = 0.25;

// =============================================================================
// COLLISION SOUNDS
// =============================================================================

pub const SOUND_POOL_SIZE: usize = 3;

// =============================================================================
// FILES
// =============================================================================

pub const TUNING_FILE: &str = "config/tuning.json";
pub const LOGS_DIR: &str = "logs";
