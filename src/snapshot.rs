//! Frame snapshot - render state handed to the presentation layer
//!
//! The presentation layer never reads simulation internals; it reads this
//! resource, refreshed once per frame after every simulation system has
//! run. Serializable so headless runs can dump frames as JSON.

use bevy::prelude::*;
use serde::Serialize;

use crate::arena::Arena;
use crate::ball::{Ball, BallPhase, BallVisual};
use crate::constants::SHADOW_FADE_DISTANCE;
use crate::helpers::remap;

/// Ball render state
#[derive(Debug, Clone, Serialize)]
pub struct BallSnapshot {
    pub position: (f32, f32),
    pub radius: f32,
    /// Squish axis angle in radians, from the last contact normal
    pub squish_axis: f32,
    /// Dock scale and drag swell multiplied
    pub uniform_scale: f32,
    /// Cross-axis squash factor, 1.0 when round
    pub squish: f32,
    /// Contact shadow opacity, floor proximity times fade state
    pub shadow_alpha: f32,
    pub being_dragged: bool,
}

#[derive(Resource, Debug, Clone, Serialize, Default)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub arena_min: (f32, f32),
    pub arena_max: (f32, f32),
    pub ball: Option<BallSnapshot>,
}

pub fn publish_snapshot(
    arena: Res<Arena>,
    mut snapshot: ResMut<FrameSnapshot>,
    query: Query<(&Ball, &Transform, &BallPhase, &BallVisual)>,
) {
    snapshot.frame += 1;
    snapshot.arena_min = (arena.bounds.min.x, arena.bounds.min.y);
    snapshot.arena_max = (arena.bounds.max.x, arena.bounds.max.y);
    snapshot.ball = query
        .single()
        .ok()
        .map(|(ball, transform, phase, visual)| {
            let floor_clearance = (transform.translation.y - ball.radius()) - arena.bounds.min.y;
            let proximity = remap(floor_clearance, 0.0, SHADOW_FADE_DISTANCE, 1.0, 0.0);
            BallSnapshot {
                position: (transform.translation.x, transform.translation.y),
                radius: ball.radius(),
                squish_axis: visual.squish_axis,
                uniform_scale: visual.uniform_scale(),
                squish: visual.squish.value() as f32,
                shadow_alpha: proximity * visual.shadow_fade,
                being_dragged: *phase == BallPhase::Dragged,
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::BallMotion;

    fn snapshot_app(ball_y: f32) -> App {
        let mut app = App::new();
        app.insert_resource(Arena::default());
        app.insert_resource(FrameSnapshot::default());
        app.add_systems(Update, publish_snapshot);
        let mut visual = BallVisual::new(1.0);
        visual.shadow_fade = 1.0;
        app.world_mut().spawn((
            Ball::new(100.0),
            BallPhase::Free,
            BallMotion::default(),
            visual,
            Transform::from_xyz(960.0, ball_y, 0.0),
        ));
        app
    }

    #[test]
    fn test_snapshot_reports_ball_state() {
        let mut app = snapshot_app(100.0);
        app.update();

        let snapshot = app.world().resource::<FrameSnapshot>();
        assert_eq!(snapshot.frame, 1);
        assert_eq!(snapshot.arena_max, (1920.0, 1080.0));
        let ball = snapshot.ball.as_ref().unwrap();
        assert_eq!(ball.position, (960.0, 100.0));
        assert_eq!(ball.radius, 100.0);
        assert!(!ball.being_dragged);
        // Resting on the floor: full shadow.
        assert_eq!(ball.shadow_alpha, 1.0);
        assert_eq!(ball.uniform_scale, 1.0);

        app.update();
        assert_eq!(app.world().resource::<FrameSnapshot>().frame, 2);
    }

    #[test]
    fn test_shadow_thins_with_height() {
        let mut app = snapshot_app(300.0);
        app.update();

        // Ball bottom is 100 px off the floor, halfway up the fade range.
        let snapshot = app.world().resource::<FrameSnapshot>();
        let ball = snapshot.ball.as_ref().unwrap();
        assert!((ball.shadow_alpha - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_snapshot_without_ball_is_empty() {
        let mut app = App::new();
        app.insert_resource(Arena::default());
        app.insert_resource(FrameSnapshot::default());
        app.add_systems(Update, publish_snapshot);
        app.update();

        let snapshot = app.world().resource::<FrameSnapshot>();
        assert!(snapshot.ball.is_none());
        assert_eq!(snapshot.arena_min, (0.0, 0.0));
    }
}
