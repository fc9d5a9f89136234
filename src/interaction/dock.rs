//! Dock transitions
//!
//! Scripted release and put-back sequences. Both share the pattern the
//! drag gesture uses: take the ball out of free dynamics, drive position
//! and scale directly, then hand back to physics with one impulse. The
//! dock rectangle is an opaque input from the host; it gets constrained
//! into the arena before anything trusts it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy::prelude::*;

use crate::arena::Arena;
use crate::ball::{
    Ball, BallMotion, BallPhase, BallVisual, DeferredEffect, DeferredEffects, PutBack,
};
use crate::constants::{FRAME_DT_MIN, SHADOW_FADE_OUT_SECS};
use crate::events::{BallEvent, EventBus};
use crate::helpers::constrain_rect;
use crate::interaction::drag::DragState;
use crate::momentum::{MomentumValue, SpringParams};
use crate::tuning::Tuning;

/// Host dock geometry commands
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum DockCommand {
    /// Spawn the ball out of the given dock rect
    Release { from: Rect },
    /// Fly the ball back into the given dock rect and despawn it
    PutBack { into: Rect },
}

/// Spawn kick direction: push away from any edge the spawn point hugs.
/// Dock rects live along the floor or a side, so the ceiling case never
/// comes up.
fn entry_impulse(pos: Vec2, bounds: Rect, strength: f32, proximity: f32) -> Vec2 {
    if pos.y - bounds.min.y < proximity {
        Vec2::new(0.0, strength)
    } else if pos.x - bounds.min.x < proximity {
        Vec2::new(strength, 0.0)
    } else if bounds.max.x - pos.x < proximity {
        Vec2::new(-strength, 0.0)
    } else {
        Vec2::ZERO
    }
}

pub fn apply_dock_commands(
    mut commands: Commands,
    mut dock: MessageReader<DockCommand>,
    arena: Res<Arena>,
    tuning: Res<Tuning>,
    mut deferred: ResMut<DeferredEffects>,
    mut bus: ResMut<EventBus>,
    mut drag: ResMut<DragState>,
    mut query: Query<(
        Entity,
        &Ball,
        &Transform,
        &mut BallPhase,
        &mut BallMotion,
        &mut BallVisual,
    )>,
) {
    for command in dock.read() {
        match *command {
            DockCommand::Release { from } => {
                // Replace whatever ball exists; the dock owns exactly one.
                if let Ok((entity, ..)) = query.single() {
                    commands.entity(entity).despawn();
                }
                drag.abandon();

                let from = constrain_rect(from, arena.bounds);
                let center = from.center();
                let start_scale = (from.width() / (2.0 * tuning.radius)) as f64;

                let mut visual = BallVisual::new(start_scale);
                visual.scripted_scale.animate(1.0, 0.0);
                commands.spawn((
                    Ball::new(tuning.radius),
                    BallPhase::Free,
                    BallMotion::default(),
                    visual,
                    Transform::from_xyz(center.x, center.y, 0.0),
                ));

                // The kick lands next frame, after the fresh position has
                // been through one physics step.
                let impulse = entry_impulse(
                    center,
                    arena.bounds,
                    tuning.entry_impulse,
                    tuning.edge_proximity,
                );
                deferred.push(DeferredEffect::SpawnKick {
                    pos: center,
                    impulse,
                });

                bus.emit(BallEvent::BallReleased {
                    from: (center.x, center.y),
                });
                bus.emit(BallEvent::BallSpawned {
                    pos: (center.x, center.y),
                });
            }
            DockCommand::PutBack { into } => {
                let Ok((entity, ball, transform, mut phase, mut motion, mut visual)) =
                    query.single_mut()
                else {
                    continue;
                };
                drag.abandon();

                let into = constrain_rect(into, arena.bounds);
                let target = into.center();
                let target_scale = (into.width() / (2.0 * ball.radius())) as f64;

                let carry = motion.velocity;
                *phase = BallPhase::Scripted;
                motion.velocity = Vec2::ZERO;

                let done: Arc<[AtomicBool; 3]> = Arc::new([
                    AtomicBool::new(false),
                    AtomicBool::new(false),
                    AtomicBool::new(false),
                ]);

                let mut pos_x = MomentumValue::new(
                    transform.translation.x as f64,
                    1.0,
                    SpringParams::dismissal(),
                );
                let flag = done.clone();
                pos_x.animate_then(
                    target.x as f64,
                    carry.x as f64,
                    Box::new(move |completed| {
                        if completed {
                            flag[0].store(true, Ordering::SeqCst);
                        }
                    }),
                );

                let mut pos_y = MomentumValue::new(
                    transform.translation.y as f64,
                    1.0,
                    SpringParams::dismissal(),
                );
                let flag = done.clone();
                pos_y.animate_then(
                    target.y as f64,
                    carry.y as f64,
                    Box::new(move |completed| {
                        if completed {
                            flag[1].store(true, Ordering::SeqCst);
                        }
                    }),
                );

                let scale_velocity = visual.scripted_scale.velocity();
                visual.scripted_scale.set_params(SpringParams::dismissal());
                let flag = done.clone();
                visual.scripted_scale.animate_then(
                    target_scale,
                    scale_velocity,
                    Box::new(move |completed| {
                        if completed {
                            flag[2].store(true, Ordering::SeqCst);
                        }
                    }),
                );

                visual.shadow_fade_target = 0.0;
                visual.shadow_fade_secs = SHADOW_FADE_OUT_SECS;

                commands.entity(entity).insert(PutBack { pos_x, pos_y, done });
            }
        }
    }
}

/// Step the put-back position springs and despawn once every spring has
/// reported in. The scale spring is stepped with the other visuals; only
/// its flag is checked here.
pub fn drive_put_back(
    mut commands: Commands,
    time: Res<Time>,
    mut bus: ResMut<EventBus>,
    mut query: Query<(Entity, &mut PutBack, &mut Transform), With<Ball>>,
) {
    // Use minimum dt for headless mode compatibility
    let dt = time.delta_secs().max(FRAME_DT_MIN) as f64;

    let Ok((entity, mut put_back, mut transform)) = query.single_mut() else {
        return;
    };
    put_back.pos_x.step(dt);
    put_back.pos_y.step(dt);
    transform.translation.x = put_back.pos_x.value() as f32;
    transform.translation.y = put_back.pos_y.value() as f32;

    if put_back.done.iter().all(|flag| flag.load(Ordering::SeqCst)) {
        commands.entity(entity).despawn();
        bus.emit(BallEvent::BallDocked);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::ball_visual_step;
    use crate::constants::DEFAULT_ARENA;
    use std::time::Duration;

    fn dock_app() -> App {
        let mut app = App::new();
        app.add_message::<DockCommand>();
        app.init_resource::<Time>();
        app.insert_resource(Arena::default());
        app.insert_resource(Tuning::default());
        app.insert_resource(EventBus::new());
        app.insert_resource(DeferredEffects::default());
        app.insert_resource(DragState::default());
        app.add_systems(
            Update,
            (apply_dock_commands, ball_visual_step, drive_put_back).chain(),
        );
        app
    }

    fn send_command(app: &mut App, command: DockCommand) {
        app.world_mut()
            .resource_mut::<Messages<DockCommand>>()
            .write(command);
        app.update();
    }

    fn step_frames(app: &mut App, frames: usize) {
        for _ in 0..frames {
            app.world_mut()
                .resource_mut::<Time>()
                .advance_by(Duration::from_micros(16_667));
            app.update();
        }
    }

    fn drained_names(app: &mut App) -> Vec<&'static str> {
        app.world_mut()
            .resource_mut::<EventBus>()
            .drain()
            .iter()
            .map(|bus_event| bus_event.event.name())
            .collect()
    }

    #[test]
    fn test_entry_impulse_pushes_away_from_near_edges() {
        let bounds = DEFAULT_ARENA;
        assert_eq!(
            entry_impulse(Vec2::new(960.0, 60.0), bounds, 2000.0, 200.0),
            Vec2::new(0.0, 2000.0)
        );
        assert_eq!(
            entry_impulse(Vec2::new(100.0, 500.0), bounds, 2000.0, 200.0),
            Vec2::new(2000.0, 0.0)
        );
        assert_eq!(
            entry_impulse(Vec2::new(1850.0, 500.0), bounds, 2000.0, 200.0),
            Vec2::new(-2000.0, 0.0)
        );
        assert_eq!(
            entry_impulse(Vec2::new(960.0, 540.0), bounds, 2000.0, 200.0),
            Vec2::ZERO
        );
    }

    #[test]
    fn test_release_spawns_ball_from_constrained_rect() {
        let mut app = dock_app();
        // Dock rect pokes below the floor; it gets pulled up before use.
        send_command(
            &mut app,
            DockCommand::Release {
                from: Rect::new(900.0, -50.0, 1020.0, 70.0),
            },
        );

        let mut query = app.world_mut().query::<(&Ball, &Transform, &BallVisual)>();
        let (_, transform, visual) = query.single(app.world()).unwrap();
        assert_eq!(transform.translation.truncate(), Vec2::new(960.0, 60.0));
        // 120 px dock opening against a 200 px ball; the grow spring has
        // been stepped once by the time we look.
        assert!((visual.scripted_scale.value() - 0.6).abs() < 0.01);
        assert_eq!(visual.scripted_scale.to_value(), Some(1.0));

        let deferred = app.world_mut().resource_mut::<DeferredEffects>().take();
        assert_eq!(
            deferred,
            vec![DeferredEffect::SpawnKick {
                pos: Vec2::new(960.0, 60.0),
                impulse: Vec2::new(0.0, 2000.0),
            }]
        );
        assert_eq!(
            drained_names(&mut app),
            vec!["ball_released", "ball_spawned"]
        );
    }

    #[test]
    fn test_release_replaces_existing_ball() {
        let mut app = dock_app();
        app.world_mut().spawn((
            Ball::new(100.0),
            BallPhase::Free,
            BallMotion::default(),
            BallVisual::new(1.0),
            Transform::from_xyz(400.0, 400.0, 0.0),
        ));
        send_command(
            &mut app,
            DockCommand::Release {
                from: Rect::new(900.0, 0.0, 1020.0, 120.0),
            },
        );

        let mut query = app.world_mut().query::<&Ball>();
        assert_eq!(query.iter(app.world()).count(), 1);
    }

    #[test]
    fn test_put_back_flies_home_and_docks() {
        let mut app = dock_app();
        app.world_mut().spawn((
            Ball::new(100.0),
            BallPhase::Free,
            BallMotion {
                velocity: Vec2::new(300.0, 0.0),
                ..Default::default()
            },
            BallVisual::new(1.0),
            Transform::from_xyz(1500.0, 800.0, 0.0),
        ));
        send_command(
            &mut app,
            DockCommand::PutBack {
                into: Rect::new(900.0, 0.0, 1020.0, 120.0),
            },
        );

        {
            let mut query = app
                .world_mut()
                .query::<(&BallPhase, &BallMotion, &BallVisual)>();
            let (phase, motion, visual) = query.single(app.world()).unwrap();
            assert_eq!(*phase, BallPhase::Scripted);
            assert_eq!(motion.velocity, Vec2::ZERO);
            assert_eq!(visual.shadow_fade_target, 0.0);
        }

        step_frames(&mut app, 600);

        let mut query = app.world_mut().query::<&Ball>();
        assert_eq!(query.iter(app.world()).count(), 0);
        assert!(drained_names(&mut app).contains(&"ball_docked"));
    }

    #[test]
    fn test_put_back_with_no_ball_is_ignored() {
        let mut app = dock_app();
        send_command(
            &mut app,
            DockCommand::PutBack {
                into: Rect::new(900.0, 0.0, 1020.0, 120.0),
            },
        );

        assert!(drained_names(&mut app).is_empty());
    }
}
