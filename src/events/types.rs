//! Event type definitions for the session log

use serde::{Deserialize, Serialize};

/// Which arena wall a contact happened against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wall {
    Left,
    Right,
    Floor,
    Ceiling,
}

impl Wall {
    /// Outward-pointing contact normal (from the wall into the arena)
    pub fn normal(&self) -> (f32, f32) {
        match self {
            Wall::Left => (1.0, 0.0),
            Wall::Right => (-1.0, 0.0),
            Wall::Floor => (0.0, 1.0),
            Wall::Ceiling => (0.0, -1.0),
        }
    }
}

impl std::fmt::Display for Wall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Wall::Left => write!(f, "L"),
            Wall::Right => write!(f, "R"),
            Wall::Floor => write!(f, "F"),
            Wall::Ceiling => write!(f, "C"),
        }
    }
}

/// Everything observable that the simulation reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BallEvent {
    // === Session Events ===
    /// Session started (once per launch)
    SessionStart {
        session_id: String, // UUID v4
        timestamp: String,  // ISO 8601
    },
    /// Arena bounds replaced (host resize / display change)
    ArenaResized { width: f32, height: f32 },

    // === Dock Events ===
    /// Release-from-dock animation began
    BallReleased { from: (f32, f32) },
    /// Ball entity exists and is simulating
    BallSpawned { pos: (f32, f32) },
    /// Put-back animation finished and the ball despawned
    BallDocked,

    // === Interaction Events ===
    /// Pointer or scroll gesture grabbed the ball
    DragStarted { pos: (f32, f32) },
    /// Gesture ended; velocity is the tracker estimate at release
    DragEnded { velocity: (f32, f32) },
    /// Release velocity applied to the body as an impulse
    FlickApplied { impulse: (f32, f32) },

    // === Physics Events ===
    /// Wall contact at or above the reaction threshold
    WallContact {
        wall: Wall,
        impulse: f32,
        strength: f32,
    },
    /// A contact asked the audio collaborator for a sound
    SoundRequested { sound: usize, volume: f32 },
}

impl BallEvent {
    /// Two-character code for the compact log format
    pub fn type_code(&self) -> &'static str {
        match self {
            BallEvent::SessionStart { .. } => "SS",
            BallEvent::ArenaResized { .. } => "AR",
            BallEvent::BallReleased { .. } => "BR",
            BallEvent::BallSpawned { .. } => "BS",
            BallEvent::BallDocked => "BD",
            BallEvent::DragStarted { .. } => "DS",
            BallEvent::DragEnded { .. } => "DE",
            BallEvent::FlickApplied { .. } => "FA",
            BallEvent::WallContact { .. } => "WC",
            BallEvent::SoundRequested { .. } => "SN",
        }
    }

    /// Name used by scenario expectations
    pub fn name(&self) -> &'static str {
        match self {
            BallEvent::SessionStart { .. } => "session_start",
            BallEvent::ArenaResized { .. } => "arena_resized",
            BallEvent::BallReleased { .. } => "ball_released",
            BallEvent::BallSpawned { .. } => "ball_spawned",
            BallEvent::BallDocked => "ball_docked",
            BallEvent::DragStarted { .. } => "drag_started",
            BallEvent::DragEnded { .. } => "drag_ended",
            BallEvent::FlickApplied { .. } => "flick_applied",
            BallEvent::WallContact { .. } => "wall_contact",
            BallEvent::SoundRequested { .. } => "sound_requested",
        }
    }
}
