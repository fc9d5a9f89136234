//! Ball-related components

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use bevy::prelude::*;

use crate::constants::{DRAG_SCALE_HELD, SHADOW_FADE_IN_SECS, VISUAL_SCALE_UNIT};
use crate::events::Wall;
use crate::momentum::{MomentumValue, SpringParams};

/// Marker + immutable geometry for the ball entity
#[derive(Component, Debug)]
pub struct Ball {
    radius: f32,
}

impl Ball {
    pub fn new(radius: f32) -> Self {
        assert!(radius > 0.0, "ball radius must be positive, got {radius}");
        Self { radius }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

/// Who drives the body this frame
#[derive(Component, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallPhase {
    /// Dynamic: gravity, impulses, wall contact
    #[default]
    Free,
    /// Position driven by the pointer, physics suspended
    Dragged,
    /// Position driven by dock springs, physics suspended
    Scripted,
}

/// Per-wall contact latch so contact-begin fires once per touch
#[derive(Default, Debug, Clone, Copy)]
pub struct WallTouch {
    left: bool,
    right: bool,
    floor: bool,
    ceiling: bool,
}

impl WallTouch {
    pub fn get(&self, wall: Wall) -> bool {
        match wall {
            Wall::Left => self.left,
            Wall::Right => self.right,
            Wall::Floor => self.floor,
            Wall::Ceiling => self.ceiling,
        }
    }

    pub fn set(&mut self, wall: Wall, touching: bool) {
        match wall {
            Wall::Left => self.left = touching,
            Wall::Right => self.right = touching,
            Wall::Floor => self.floor = touching,
            Wall::Ceiling => self.ceiling = touching,
        }
    }
}

/// Linear motion state. The ball has unit mass, so impulses are applied as
/// direct velocity deltas.
#[derive(Component, Default, Debug)]
pub struct BallMotion {
    pub velocity: Vec2,
    pub touching: WallTouch,
}

impl BallMotion {
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse;
    }
}

/// Momentum-driven cosmetic state. The squish and drag-scale springs were
/// tuned against pixel-scale magnitudes, so these 0..~1 factors run at a
/// solver scale of 1000.
#[derive(Component)]
pub struct BallVisual {
    /// Anisotropic collision squash, 1.0 at rest
    pub squish: MomentumValue,
    /// Swells to 1.05 while grabbed
    pub drag_scale: MomentumValue,
    /// Dock grow/shrink factor
    pub scripted_scale: MomentumValue,
    /// Squish axis orientation, radians, from the last contact normal
    pub squish_axis: f32,
    /// 0..1 shadow fade factor, moves linearly toward its target
    pub shadow_fade: f32,
    pub shadow_fade_target: f32,
    pub shadow_fade_secs: f32,
}

impl BallVisual {
    pub fn new(initial_scripted_scale: f64) -> Self {
        Self {
            squish: MomentumValue::new(1.0, VISUAL_SCALE_UNIT, SpringParams::new(0.3, 0.5)),
            drag_scale: MomentumValue::new(1.0, VISUAL_SCALE_UNIT, SpringParams::new(0.2, 0.8)),
            scripted_scale: MomentumValue::new(
                initial_scripted_scale,
                VISUAL_SCALE_UNIT,
                SpringParams::passive_ease(),
            ),
            squish_axis: 0.0,
            shadow_fade: 0.0,
            shadow_fade_target: 1.0,
            shadow_fade_secs: SHADOW_FADE_IN_SECS,
        }
    }

    /// Uniform render scale: dock factor and grab factor multiply.
    pub fn uniform_scale(&self) -> f32 {
        (self.scripted_scale.value() * self.drag_scale.value()) as f32
    }

    pub fn grab(&mut self) {
        let velocity = self.drag_scale.velocity();
        self.drag_scale.animate(DRAG_SCALE_HELD, velocity);
    }

    pub fn release(&mut self) {
        let velocity = self.drag_scale.velocity();
        self.drag_scale.animate(1.0, velocity);
    }
}

/// Side effects queued for the start of the next frame, so they land after
/// the physics step that follows the frame that queued them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeferredEffect {
    /// Re-pin the ball and kick it into the arena (dock release)
    SpawnKick { pos: Vec2, impulse: Vec2 },
    /// Let a collision squish spring back to round
    SquishRecover,
}

#[derive(Resource, Default)]
pub struct DeferredEffects {
    effects: Vec<DeferredEffect>,
}

impl DeferredEffects {
    pub fn push(&mut self, effect: DeferredEffect) {
        self.effects.push(effect);
    }

    pub fn take(&mut self) -> Vec<DeferredEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

/// Dock put-back driver, present only while the ball flies home. The three
/// springs report through completion flags; when all have resolved the
/// ball despawns.
#[derive(Component)]
pub struct PutBack {
    pub pos_x: MomentumValue,
    pub pos_y: MomentumValue,
    /// x spring, y spring, scale spring
    pub done: Arc<[AtomicBool; 3]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "ball radius must be positive")]
    fn test_zero_radius_rejected() {
        Ball::new(0.0);
    }

    #[test]
    fn test_wall_touch_latch() {
        let mut touch = WallTouch::default();
        assert!(!touch.get(Wall::Floor));
        touch.set(Wall::Floor, true);
        assert!(touch.get(Wall::Floor));
        assert!(!touch.get(Wall::Left));
        touch.set(Wall::Floor, false);
        assert!(!touch.get(Wall::Floor));
    }

    #[test]
    fn test_impulse_is_velocity_delta() {
        let mut motion = BallMotion::default();
        motion.apply_impulse(Vec2::new(2000.0, 0.0));
        motion.apply_impulse(Vec2::new(-500.0, 100.0));
        assert_eq!(motion.velocity, Vec2::new(1500.0, 100.0));
    }

    #[test]
    fn test_uniform_scale_multiplies_factors() {
        let mut visual = BallVisual::new(0.5);
        assert_eq!(visual.uniform_scale(), 0.5);
        visual.grab();
        // Drag scale is animated, not snapped; still 1.0 before stepping.
        assert_eq!(visual.uniform_scale(), 0.5);
    }
}
