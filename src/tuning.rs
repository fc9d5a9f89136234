//! Physics tuning (live resource + optional JSON override file)

use bevy::log::{info, warn};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::constants::*;

// Serde default functions so partial config files stay valid
fn default_gravity() -> f32 {
    BALL_GRAVITY
}
fn default_restitution() -> f32 {
    BALL_BOUNCE
}
fn default_radius() -> f32 {
    BALL_RADIUS
}
fn default_rest_speed() -> f32 {
    BALL_REST_SPEED
}
fn default_min_impulse() -> f32 {
    MIN_COLLISION_IMPULSE
}
fn default_max_impulse() -> f32 {
    MAX_COLLISION_IMPULSE
}
fn default_max_strength() -> f32 {
    MAX_COLLISION_STRENGTH
}
fn default_squish_on_collision() -> bool {
    true
}
fn default_entry_impulse() -> f32 {
    ENTRY_IMPULSE_STRENGTH
}
fn default_edge_proximity() -> f32 {
    EDGE_PROXIMITY
}
fn default_sound_pool() -> usize {
    SOUND_POOL_SIZE
}

/// Serializable tuning values stored in config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuningFile {
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    #[serde(default = "default_restitution")]
    pub restitution: f32,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_rest_speed")]
    pub rest_speed: f32,
    #[serde(default = "default_min_impulse")]
    pub min_collision_impulse: f32,
    #[serde(default = "default_max_impulse")]
    pub max_collision_impulse: f32,
    #[serde(default = "default_max_strength")]
    pub max_collision_strength: f32,
    #[serde(default = "default_squish_on_collision")]
    pub squish_on_collision: bool,
    #[serde(default = "default_entry_impulse")]
    pub entry_impulse: f32,
    #[serde(default = "default_edge_proximity")]
    pub edge_proximity: f32,
    #[serde(default = "default_sound_pool")]
    pub sound_pool_size: usize,
}

impl Default for TuningFile {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            restitution: default_restitution(),
            radius: default_radius(),
            rest_speed: default_rest_speed(),
            min_collision_impulse: default_min_impulse(),
            max_collision_impulse: default_max_impulse(),
            max_collision_strength: default_max_strength(),
            squish_on_collision: default_squish_on_collision(),
            entry_impulse: default_entry_impulse(),
            edge_proximity: default_edge_proximity(),
            sound_pool_size: default_sound_pool(),
        }
    }
}

impl TuningFile {
    pub fn apply_to(&self, tuning: &mut Tuning) {
        tuning.gravity = self.gravity;
        tuning.restitution = self.restitution;
        tuning.radius = self.radius;
        tuning.rest_speed = self.rest_speed;
        tuning.min_collision_impulse = self.min_collision_impulse;
        tuning.max_collision_impulse = self.max_collision_impulse;
        tuning.max_collision_strength = self.max_collision_strength;
        tuning.squish_on_collision = self.squish_on_collision;
        tuning.entry_impulse = self.entry_impulse;
        tuning.edge_proximity = self.edge_proximity;
        tuning.sound_pool_size = self.sound_pool_size;
    }
}

/// Live physics values consulted by the simulation systems
#[derive(Resource, Debug, Clone)]
pub struct Tuning {
    pub gravity: f32,
    pub restitution: f32,
    pub radius: f32,
    pub rest_speed: f32,
    pub min_collision_impulse: f32,
    pub max_collision_impulse: f32,
    pub max_collision_strength: f32,
    pub squish_on_collision: bool,
    pub entry_impulse: f32,
    pub edge_proximity: f32,
    pub sound_pool_size: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        let mut tuning = Self {
            gravity: 0.0,
            restitution: 0.0,
            radius: 0.0,
            rest_speed: 0.0,
            min_collision_impulse: 0.0,
            max_collision_impulse: 0.0,
            max_collision_strength: 0.0,
            squish_on_collision: true,
            entry_impulse: 0.0,
            edge_proximity: 0.0,
            sound_pool_size: 0,
        };
        TuningFile::default().apply_to(&mut tuning);
        tuning
    }
}

pub fn load_tuning_from_file(path: &str) -> Result<TuningFile, String> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
}

/// Startup system: overlay `config/tuning.json` onto the defaults when the
/// file exists; a missing file is normal, a malformed one warns.
pub fn load_tuning_system(mut tuning: bevy::prelude::ResMut<Tuning>) {
    if !std::path::Path::new(TUNING_FILE).exists() {
        info!("No tuning file at {}, using defaults", TUNING_FILE);
        return;
    }
    match load_tuning_from_file(TUNING_FILE) {
        Ok(file) => {
            file.apply_to(&mut tuning);
            info!("Loaded tuning overrides from {}", TUNING_FILE);
        }
        Err(err) => {
            warn!("{}; using defaults", err);
        }
    }
}
