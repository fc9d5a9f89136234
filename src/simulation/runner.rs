//! Headless demo session runner
//!
//! Drives a scripted session through the full simulation: release from
//! the dock, settle, grab and flick, bounce, put back. Every message the
//! simulation accepts gets exercised once, which makes this both the demo
//! behind `deskball` and a quick end-to-end smoke run.

use bevy::prelude::*;

use crate::ball::Ball;
use crate::events::{BallEvent, EventBus, SessionLog};
use crate::interaction::{DockCommand, PointerMessage};
use crate::snapshot::FrameSnapshot;

use super::app_builder::HeadlessAppBuilder;

/// Summary of a scripted demo session
pub struct DemoReport {
    pub frames: u64,
    pub session_id: Option<String>,
    pub wall_contacts: usize,
    pub flicks: usize,
    pub docked: bool,
    pub final_snapshot: FrameSnapshot,
}

/// Run the scripted demo session. With `log_events` set, the session is
/// written to an event log under `logs/`.
pub fn run_demo_session(log_events: bool) -> DemoReport {
    let mut builder = HeadlessAppBuilder::new()
        .with_manual_time()
        .with_minimal_threads();
    if log_events {
        builder = builder.with_event_log();
    }
    let mut app = builder.build();

    let session_id = if log_events {
        let id = app.world_mut().resource_mut::<SessionLog>().start_session();
        app.world_mut()
            .resource_mut::<EventBus>()
            .emit(BallEvent::SessionStart {
                session_id: id.clone(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            });
        Some(id)
    } else {
        None
    };

    // Release out of a dock rect sitting on the floor, then let the entry
    // kick and the first bounces play out.
    let dock = Rect::new(870.0, 0.0, 1050.0, 180.0);
    write_dock(&mut app, DockCommand::Release { from: dock });
    step(&mut app, 180);

    // Grab the ball wherever it settled and flick it up and to the right.
    if let Some(grab) = ball_position(&mut app) {
        write_pointer(&mut app, PointerMessage::Down(grab));
        step(&mut app, 1);
        for i in 1..=6 {
            let pos = grab + Vec2::new(40.0, 25.0) * i as f32;
            write_pointer(&mut app, PointerMessage::Drag(pos));
            step(&mut app, 1);
        }
        write_pointer(&mut app, PointerMessage::Up);
        step(&mut app, 420);
    }

    // Put it back where it came from.
    write_dock(&mut app, DockCommand::PutBack { into: dock });
    let mut docked = false;
    for _ in 0..600 {
        app.update();
        if ball_position(&mut app).is_none() {
            docked = true;
            break;
        }
    }

    if log_events {
        app.world_mut().resource_mut::<SessionLog>().end_session();
    }

    let events = {
        let mut bus = app.world_mut().resource_mut::<EventBus>();
        bus.drain();
        bus.processed().to_vec()
    };
    let wall_contacts = events
        .iter()
        .filter(|e| matches!(e.event, BallEvent::WallContact { .. }))
        .count();
    let flicks = events
        .iter()
        .filter(|e| matches!(e.event, BallEvent::FlickApplied { .. }))
        .count();
    let final_snapshot = app.world().resource::<FrameSnapshot>().clone();

    DemoReport {
        frames: final_snapshot.frame,
        session_id,
        wall_contacts,
        flicks,
        docked,
        final_snapshot,
    }
}

fn step(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn write_pointer(app: &mut App, message: PointerMessage) {
    app.world_mut()
        .resource_mut::<Messages<PointerMessage>>()
        .write(message);
}

fn write_dock(app: &mut App, command: DockCommand) {
    app.world_mut()
        .resource_mut::<Messages<DockCommand>>()
        .write(command);
}

fn ball_position(app: &mut App) -> Option<Vec2> {
    let mut query = app.world_mut().query_filtered::<&Transform, With<Ball>>();
    query
        .single(app.world())
        .ok()
        .map(|transform| transform.translation.truncate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Arena, ArenaResized};
    use crate::ball::BallMotion;
    use crate::constants::BALL_RADIUS;

    #[test]
    fn test_demo_session_completes() {
        let report = run_demo_session(false);

        assert!(report.docked);
        assert!(report.session_id.is_none());
        assert_eq!(report.flicks, 1);
        // The entry kick alone bounces the ball off the floor hard enough
        // to register at least one contact.
        assert!(report.wall_contacts >= 1);
        assert!(report.final_snapshot.ball.is_none());
    }

    #[test]
    fn test_ball_contained_across_bounce_run_and_resize() {
        let mut app = HeadlessAppBuilder::new()
            .with_manual_time()
            .with_minimal_threads()
            .with_ball(Vec2::new(400.0, 800.0))
            .build();
        {
            let mut query = app
                .world_mut()
                .query_filtered::<&mut BallMotion, With<Ball>>();
            query.single_mut(app.world_mut()).unwrap().velocity = Vec2::new(1900.0, 600.0);
        }

        for frame in 1..=600u32 {
            if frame == 300 {
                app.world_mut()
                    .resource_mut::<Messages<ArenaResized>>()
                    .write(ArenaResized {
                        bounds: Rect::new(0.0, 0.0, 1280.0, 720.0),
                    });
            }
            app.update();

            let bounds = app.world().resource::<Arena>().bounds;
            let pos = ball_position(&mut app).unwrap();
            assert!(
                pos.x >= bounds.min.x + BALL_RADIUS - 1e-3
                    && pos.x <= bounds.max.x - BALL_RADIUS + 1e-3
                    && pos.y >= bounds.min.y + BALL_RADIUS - 1e-3
                    && pos.y <= bounds.max.y - BALL_RADIUS + 1e-3,
                "ball escaped at frame {frame}: {pos:?} outside {bounds:?}"
            );
        }
    }
}
