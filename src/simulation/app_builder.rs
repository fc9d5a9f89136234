//! Headless App Builder
//!
//! Assembles the full simulation schedule on MinimalPlugins, for the demo
//! runner, the scenario harness, and integration tests. The Update chain
//! is the frame-order contract: deferred effects land first, input moves
//! the ball before physics, visuals and the snapshot run last.

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use crate::arena::{Arena, ArenaResized, apply_arena_resizes};
use crate::audio::{CollisionAudio, NullSink};
use crate::ball::{
    Ball, BallMotion, BallPhase, BallVisual, ContactBegan, DeferredEffects, apply_deferred_effects,
    ball_contact_response, ball_gravity, ball_integrate_and_collide, ball_visual_step,
};
use crate::constants::DEFAULT_ARENA;
use crate::events::{EventBus, SessionLog, flush_event_log, update_event_bus_time};
use crate::interaction::{
    DockCommand, DragState, PointerMessage, ScrollMessage, apply_dock_commands, drive_put_back,
    pointer_interaction,
};
use crate::snapshot::{FrameSnapshot, publish_snapshot};
use crate::tuning::{Tuning, load_tuning_system};

/// Builder for headless simulation apps
pub struct HeadlessAppBuilder {
    fps: f32,
    minimal_threads: bool,
    manual_time: bool,
    arena: Rect,
    event_log: bool,
    audio: CollisionAudio,
    spawn_ball: Option<Vec2>,
}

impl HeadlessAppBuilder {
    pub fn new() -> Self {
        Self {
            fps: 60.0,
            minimal_threads: false,
            manual_time: false,
            arena: DEFAULT_ARENA,
            event_log: false,
            audio: CollisionAudio::direct(Arc::new(NullSink)),
            spawn_ball: None,
        }
    }

    /// Set the target FPS (default: 60)
    pub fn with_fps(mut self, fps: f32) -> Self {
        self.fps = fps;
        self
    }

    /// Enable minimal thread mode (task pools = 1)
    ///
    /// Use this when running many apps in parallel to avoid hitting OS
    /// thread limits.
    pub fn with_minimal_threads(mut self) -> Self {
        self.minimal_threads = true;
        self
    }

    /// Advance time by exactly one frame interval per update, regardless
    /// of wall clock. Scenario runs need this for reproducible physics.
    pub fn with_manual_time(mut self) -> Self {
        self.manual_time = true;
        self
    }

    pub fn with_arena(mut self, bounds: Rect) -> Self {
        self.arena = bounds;
        self
    }

    /// Write a session event log under `logs/`
    pub fn with_event_log(mut self) -> Self {
        self.event_log = true;
        self
    }

    /// Replace the default direct null-sink audio dispatch
    pub fn with_audio(mut self, audio: CollisionAudio) -> Self {
        self.audio = audio;
        self
    }

    /// Spawn a full-size ball at the given position on build
    pub fn with_ball(mut self, pos: Vec2) -> Self {
        self.spawn_ball = Some(pos);
        self
    }

    /// Build the app with minimal plugins, all simulation resources, and
    /// the full Update chain. Callers feed `PointerMessage`,
    /// `ScrollMessage`, `DockCommand`, and `ArenaResized` messages and
    /// read `FrameSnapshot` and the `EventBus` back out.
    pub fn build(self) -> App {
        let mut app = App::new();

        let frame = Duration::from_secs_f32(1.0 / self.fps);
        if self.minimal_threads {
            // Reduce Bevy's internal thread pools to minimum
            app.add_plugins(
                MinimalPlugins
                    .set(ScheduleRunnerPlugin::run_loop(frame))
                    .set(TaskPoolPlugin {
                        task_pool_options: TaskPoolOptions::with_num_threads(1),
                    }),
            );
        } else {
            app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(frame)));
        }
        app.add_plugins(bevy::transform::TransformPlugin);

        if self.manual_time {
            app.insert_resource(TimeUpdateStrategy::ManualDuration(frame));
        }

        app.add_message::<PointerMessage>();
        app.add_message::<ScrollMessage>();
        app.add_message::<DockCommand>();
        app.add_message::<ArenaResized>();
        app.add_message::<ContactBegan>();

        app.insert_resource(Arena::new(self.arena));
        app.init_resource::<Tuning>();
        app.insert_resource(EventBus::new());
        app.init_resource::<DeferredEffects>();
        app.init_resource::<DragState>();
        app.init_resource::<FrameSnapshot>();
        app.insert_resource(self.audio);
        app.insert_resource(if self.event_log {
            SessionLog::new()
        } else {
            SessionLog::disabled()
        });

        app.add_systems(Startup, load_tuning_system);
        app.add_systems(
            Update,
            (
                update_event_bus_time,
                apply_deferred_effects,
                apply_arena_resizes,
                pointer_interaction,
                apply_dock_commands,
                ball_gravity,
                ball_integrate_and_collide,
                ball_contact_response,
                ball_visual_step,
                drive_put_back,
                publish_snapshot,
                flush_event_log,
            )
                .chain(),
        );

        if let Some(pos) = self.spawn_ball {
            let radius = app.world().resource::<Tuning>().radius;
            let mut visual = BallVisual::new(1.0);
            visual.shadow_fade = 1.0;
            app.world_mut().spawn((
                Ball::new(radius),
                BallPhase::Free,
                BallMotion::default(),
                visual,
                Transform::from_xyz(pos.x, pos.y, 0.0),
            ));
        }

        app
    }
}

impl Default for HeadlessAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_creates_app() {
        let app = HeadlessAppBuilder::new().build();
        assert!(app.world().contains_resource::<Arena>());
        assert!(app.world().contains_resource::<Tuning>());
        assert!(app.world().contains_resource::<EventBus>());
        assert!(app.world().contains_resource::<FrameSnapshot>());
    }

    #[test]
    fn test_builder_spawns_requested_ball() {
        let mut app = HeadlessAppBuilder::new()
            .with_minimal_threads()
            .with_ball(Vec2::new(960.0, 540.0))
            .build();
        let mut query = app.world_mut().query::<(&Ball, &Transform)>();
        let (ball, transform) = query.single(app.world()).unwrap();
        assert_eq!(ball.radius(), 100.0);
        assert_eq!(transform.translation.truncate(), Vec2::new(960.0, 540.0));
    }

    #[test]
    fn test_built_app_steps_without_panicking() {
        let mut app = HeadlessAppBuilder::new()
            .with_minimal_threads()
            .with_manual_time()
            .with_ball(Vec2::new(960.0, 540.0))
            .build();
        for _ in 0..10 {
            app.update();
        }
        let snapshot = app.world().resource::<FrameSnapshot>();
        assert_eq!(snapshot.frame, 10);
        assert!(snapshot.ball.is_some());
    }
}
