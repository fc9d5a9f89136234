//! Ball physics systems
//!
//! Runs only while the ball is `Free`; dragged and scripted balls are
//! position-driven and skip gravity and integration entirely. Wall
//! collision sweeps the circle against the four edges and resolves the
//! earliest crossing inside the step, so a fast ball cannot tunnel
//! through a wall between frames.

use bevy::prelude::*;

use crate::arena::Arena;
use crate::ball::components::*;
use crate::constants::{CONTACT_EPSILON, FRAME_DT_MIN};
use crate::events::Wall;
use crate::helpers::constrain_circle_center;
use crate::tuning::Tuning;

/// A wall contact began this frame. Raw impulse, unfiltered; the response
/// layer decides whether it qualifies for a reaction.
#[derive(Message, Debug, Clone, Copy)]
pub struct ContactBegan {
    pub wall: Wall,
    pub impulse: f32,
}

/// Apply effects queued last frame, before anything else moves the ball.
pub fn apply_deferred_effects(
    mut deferred: ResMut<DeferredEffects>,
    mut query: Query<(&mut Transform, &mut BallMotion, &mut BallVisual), With<Ball>>,
) {
    if deferred.is_empty() {
        return;
    }
    let effects = deferred.take();
    let Ok((mut transform, mut motion, mut visual)) = query.single_mut() else {
        return;
    };
    for effect in effects {
        match effect {
            DeferredEffect::SpawnKick { pos, impulse } => {
                transform.translation.x = pos.x;
                transform.translation.y = pos.y;
                motion.apply_impulse(impulse);
            }
            DeferredEffect::SquishRecover => {
                let velocity = visual.squish.velocity();
                visual.squish.animate(1.0, velocity);
            }
        }
    }
}

/// Constant downward acceleration on dynamic balls
pub fn ball_gravity(
    tuning: Res<Tuning>,
    time: Res<Time>,
    mut query: Query<(&mut BallMotion, &BallPhase), With<Ball>>,
) {
    // Use minimum dt for headless mode compatibility
    let dt = time.delta_secs().max(FRAME_DT_MIN);

    for (mut motion, phase) in &mut query {
        if *phase == BallPhase::Free {
            motion.velocity.y -= tuning.gravity * dt;
        }
    }
}

/// Candidate wall crossing within the current sub-step
fn earliest_crossing(
    pos: Vec2,
    vel: Vec2,
    radius: f32,
    bounds: Rect,
    remaining: f32,
) -> Option<(Wall, f32)> {
    let mut best: Option<(Wall, f32)> = None;
    let mut consider = |wall: Wall, toi: f32| {
        if toi >= 0.0 && toi <= remaining && best.is_none_or(|(_, t)| toi < t) {
            best = Some((wall, toi));
        }
    };

    if vel.x < 0.0 {
        consider(Wall::Left, (pos.x - (bounds.min.x + radius)) / -vel.x);
    }
    if vel.x > 0.0 {
        consider(Wall::Right, ((bounds.max.x - radius) - pos.x) / vel.x);
    }
    if vel.y < 0.0 {
        consider(Wall::Floor, (pos.y - (bounds.min.y + radius)) / -vel.y);
    }
    if vel.y > 0.0 {
        consider(Wall::Ceiling, ((bounds.max.y - radius) - pos.y) / vel.y);
    }
    best
}

/// Integrate free motion and resolve edge contacts, emitting a
/// `ContactBegan` once per touch. Contact latches are maintained for every
/// phase so a drag to and from a wall cannot swallow the next real impact.
pub fn ball_integrate_and_collide(
    arena: Res<Arena>,
    tuning: Res<Tuning>,
    time: Res<Time>,
    mut contacts: MessageWriter<ContactBegan>,
    mut query: Query<(&mut Transform, &mut BallMotion, &Ball, &BallPhase)>,
) {
    // Use minimum dt for headless mode compatibility
    let dt = time.delta_secs().max(FRAME_DT_MIN);
    let bounds = arena.bounds;

    for (mut transform, mut motion, ball, phase) in &mut query {
        let radius = ball.radius();

        if *phase != BallPhase::Free {
            release_left_walls(&mut motion, transform.translation.truncate(), radius, bounds);
            continue;
        }

        let mut pos = transform.translation.truncate();
        let mut remaining = dt;

        // At most a handful of reflections fit in one frame; the cap only
        // matters for corner hits, which need two.
        for _ in 0..4 {
            let Some((wall, toi)) = earliest_crossing(pos, motion.velocity, radius, bounds, remaining)
            else {
                pos += motion.velocity * remaining;
                break;
            };

            pos += motion.velocity * toi;
            remaining -= toi;

            let normal = Vec2::from(wall.normal());
            let approach = -motion.velocity.dot(normal);
            let impulse = (1.0 + tuning.restitution) * approach;

            if !motion.touching.get(wall) {
                motion.touching.set(wall, true);
                contacts.write(ContactBegan { wall, impulse });
            }

            // Reflect the normal component, keep the tangential one. A
            // rebound slower than rest_speed flattens so the ball settles
            // instead of micro-bouncing.
            let mut rebound = approach * tuning.restitution;
            if rebound < tuning.rest_speed {
                rebound = 0.0;
            }
            motion.velocity -= normal * motion.velocity.dot(normal);
            motion.velocity += normal * rebound;

            if remaining <= 0.0 {
                break;
            }
        }

        // Containment backstop: a resize can strand the ball outside the
        // new bounds; pull it to the nearest edge without a bounce.
        pos = constrain_circle_center(pos, radius, bounds);
        transform.translation.x = pos.x;
        transform.translation.y = pos.y;

        release_left_walls(&mut motion, pos, radius, bounds);
    }
}

/// Clear the contact latch for every wall the ball is no longer against.
fn release_left_walls(motion: &mut BallMotion, pos: Vec2, radius: f32, bounds: Rect) {
    let at = |wall: Wall| -> bool {
        match wall {
            Wall::Left => pos.x - radius <= bounds.min.x + CONTACT_EPSILON,
            Wall::Right => pos.x + radius >= bounds.max.x - CONTACT_EPSILON,
            Wall::Floor => pos.y - radius <= bounds.min.y + CONTACT_EPSILON,
            Wall::Ceiling => pos.y + radius >= bounds.max.y - CONTACT_EPSILON,
        }
    };
    for wall in [Wall::Left, Wall::Right, Wall::Floor, Wall::Ceiling] {
        if motion.touching.get(wall) && !at(wall) {
            motion.touching.set(wall, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Rect = Rect {
        min: Vec2::ZERO,
        max: Vec2::new(1000.0, 800.0),
    };

    #[test]
    fn test_earliest_crossing_picks_first_wall() {
        // Heading down-left, much closer to the floor.
        let hit = earliest_crossing(
            Vec2::new(500.0, 120.0),
            Vec2::new(-100.0, -2400.0),
            100.0,
            BOUNDS,
            1.0 / 60.0,
        );
        let (wall, toi) = hit.expect("no crossing found");
        assert_eq!(wall, Wall::Floor);
        assert!((toi - 20.0 / 2400.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_crossing_when_moving_inward() {
        let hit = earliest_crossing(
            Vec2::new(500.0, 400.0),
            Vec2::new(50.0, 50.0),
            100.0,
            BOUNDS,
            1.0 / 60.0,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_crossing_beyond_step_ignored() {
        let hit = earliest_crossing(
            Vec2::new(500.0, 400.0),
            Vec2::new(0.0, -100.0),
            100.0,
            BOUNDS,
            1.0 / 60.0,
        );
        // 300px to the floor at 100px/s is far outside one frame.
        assert!(hit.is_none());
    }
}
