//! Test execution engine
//!
//! Builds a headless app from a parsed scenario, delivers the scripted
//! input at the start of each frame, drains the event bus after each
//! update, then evaluates the expectations.

use bevy::prelude::*;

use super::assertions::{
    check_forbidden, check_sequence, check_state, AssertionError, BallState, CapturedEvent,
    WorldState,
};
use super::parser::{FrameInput, TestDefinition};
use crate::arena::{Arena, ArenaResized};
use crate::ball::{Ball, BallMotion, BallPhase};
use crate::constants::DEFAULT_ARENA;
use crate::events::EventBus;
use crate::interaction::{DockCommand, PointerMessage, ScrollMessage, ScrollPhase};
use crate::simulation::HeadlessAppBuilder;

/// Result of running a single test
#[derive(Debug)]
pub enum TestResult {
    Pass { frames: u64 },
    Fail { error: AssertionError },
    Error { message: String },
}

/// Run a parsed scenario to completion
pub fn run_test(test: &TestDefinition) -> TestResult {
    let arena = test
        .setup
        .arena
        .map(|[x0, y0, x1, y1]| Rect::new(x0, y0, x1, y1))
        .unwrap_or(DEFAULT_ARENA);

    let mut builder = HeadlessAppBuilder::new()
        .with_manual_time()
        .with_minimal_threads()
        .with_arena(arena);
    if let Some(ball) = &test.setup.ball {
        builder = builder.with_ball(Vec2::new(ball.x, ball.y));
    }
    let mut app = builder.build();

    if let Some(ball) = &test.setup.ball {
        let velocity = Vec2::new(ball.velocity_x, ball.velocity_y);
        if velocity != Vec2::ZERO {
            let mut query = app
                .world_mut()
                .query_filtered::<&mut BallMotion, With<Ball>>();
            match query.single_mut(app.world_mut()) {
                Ok(mut motion) => motion.velocity = velocity,
                Err(_) => {
                    return TestResult::Error {
                        message: format!("{}: setup gives a velocity but no ball", test.name),
                    };
                }
            }
        }
    }

    let max_frame = last_interesting_frame(test);
    let mut captured: Vec<CapturedEvent> = Vec::new();

    for frame in 1..=max_frame {
        for input in test.input.iter().filter(|i| i.frame == frame) {
            inject_input(&mut app, input);
        }
        app.update();

        let drained = app.world_mut().resource_mut::<EventBus>().drain();
        captured.extend(
            drained
                .iter()
                .map(|e| CapturedEvent::from_ball_event(frame, &e.event)),
        );

        for assertion in test.expect.state.iter().filter(|a| a.after_frame == frame) {
            let state = extract_world_state(&mut app);
            if let Err(error) = check_state(assertion, &state) {
                return TestResult::Fail { error };
            }
        }
    }

    if let Err(error) = check_sequence(&test.expect.sequence, &captured) {
        return TestResult::Fail { error };
    }
    if let Err(error) = check_forbidden(&test.expect.forbidden, &captured) {
        return TestResult::Fail { error };
    }

    TestResult::Pass { frames: max_frame }
}

/// Last frame the scenario cares about, with slack after the final input
fn last_interesting_frame(test: &TestDefinition) -> u64 {
    let mut max_frame: u64 = 60;
    for input in &test.input {
        max_frame = max_frame.max(input.frame + 30);
    }
    for exp in &test.expect.sequence {
        if let Some(max) = exp.frame_max {
            max_frame = max_frame.max(max);
        }
    }
    for assertion in &test.expect.state {
        max_frame = max_frame.max(assertion.after_frame);
    }
    max_frame
}

/// Write one scripted frame's actions as messages
fn inject_input(app: &mut App, input: &FrameInput) {
    let world = app.world_mut();

    if let Some([x, y]) = input.pointer_down {
        world
            .resource_mut::<Messages<PointerMessage>>()
            .write(PointerMessage::Down(Vec2::new(x, y)));
    }
    if let Some([x, y]) = input.pointer_drag {
        world
            .resource_mut::<Messages<PointerMessage>>()
            .write(PointerMessage::Drag(Vec2::new(x, y)));
    }
    if input.pointer_up {
        world
            .resource_mut::<Messages<PointerMessage>>()
            .write(PointerMessage::Up);
    }

    if input.scroll_began {
        world.resource_mut::<Messages<ScrollMessage>>().write(ScrollMessage {
            phase: ScrollPhase::Began,
            delta: Vec2::ZERO,
        });
    }
    if let Some([dx, dy]) = input.scroll_delta {
        world.resource_mut::<Messages<ScrollMessage>>().write(ScrollMessage {
            phase: ScrollPhase::Changed,
            delta: Vec2::new(dx, dy),
        });
    }
    if input.scroll_ended {
        world.resource_mut::<Messages<ScrollMessage>>().write(ScrollMessage {
            phase: ScrollPhase::Ended,
            delta: Vec2::ZERO,
        });
    }
    if input.scroll_cancelled {
        world.resource_mut::<Messages<ScrollMessage>>().write(ScrollMessage {
            phase: ScrollPhase::Cancelled,
            delta: Vec2::ZERO,
        });
    }

    if let Some([x0, y0, x1, y1]) = input.dock_release {
        world.resource_mut::<Messages<DockCommand>>().write(DockCommand::Release {
            from: Rect::new(x0, y0, x1, y1),
        });
    }
    if let Some([x0, y0, x1, y1]) = input.dock_put_back {
        world.resource_mut::<Messages<DockCommand>>().write(DockCommand::PutBack {
            into: Rect::new(x0, y0, x1, y1),
        });
    }

    if let Some([width, height]) = input.resize {
        world.resource_mut::<Messages<ArenaResized>>().write(ArenaResized {
            bounds: Rect::new(0.0, 0.0, width, height),
        });
    }
}

/// Snapshot the world for state assertions
fn extract_world_state(app: &mut App) -> WorldState {
    let bounds = app.world().resource::<Arena>().bounds;
    let mut query = app
        .world_mut()
        .query_filtered::<(&Transform, &BallPhase, &BallMotion), With<Ball>>();
    let ball = query
        .single(app.world())
        .ok()
        .map(|(transform, phase, motion)| BallState {
            x: transform.translation.x,
            y: transform.translation.y,
            velocity_x: motion.velocity.x,
            velocity_y: motion.velocity.y,
            dragged: *phase == BallPhase::Dragged,
        });

    WorldState {
        ball,
        arena_width: bounds.width(),
        arena_height: bounds.height(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_scenario(content: &str) -> TestResult {
        let test: TestDefinition = toml::from_str(content).unwrap();
        run_test(&test)
    }

    fn expect_pass(content: &str) {
        match run_scenario(content) {
            TestResult::Pass { .. } => {}
            TestResult::Fail { error } => panic!("scenario failed:\n{}", error),
            TestResult::Error { message } => panic!("scenario error: {}", message),
        }
    }

    #[test]
    fn test_flick_release_scenario() {
        expect_pass(include_str!("../../tests/scenarios/flick_release.toml"));
    }

    #[test]
    fn test_collision_silent_scenario() {
        expect_pass(include_str!("../../tests/scenarios/collision_silent.toml"));
    }

    #[test]
    fn test_collision_threshold_scenario() {
        expect_pass(include_str!("../../tests/scenarios/collision_threshold.toml"));
    }

    #[test]
    fn test_collision_strong_scenario() {
        expect_pass(include_str!("../../tests/scenarios/collision_strong.toml"));
    }

    #[test]
    fn test_dock_cycle_scenario() {
        expect_pass(include_str!("../../tests/scenarios/dock_cycle.toml"));
    }

    #[test]
    fn test_arena_resize_scenario() {
        expect_pass(include_str!("../../tests/scenarios/arena_resize.toml"));
    }

    #[test]
    fn test_failed_check_names_the_culprit() {
        let toml = r#"
name = "Impossible"
[setup.ball]
x = 960.0
y = 540.0

[[expect.state]]
after_frame = 5
checks = ["ball.x > 5000"]
"#;
        match run_scenario(toml) {
            TestResult::Fail { error } => {
                assert!(error.message.contains("ball.x"));
            }
            other => panic!("expected Fail, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_event_reports_sequence() {
        let toml = r#"
name = "NoDock"
[setup.ball]
x = 960.0
y = 540.0

[[expect.sequence]]
event = "ball_docked"
"#;
        match run_scenario(toml) {
            TestResult::Fail { error } => {
                assert!(error.message.contains("ball_docked"));
            }
            other => panic!("expected Fail, got {:?}", other),
        }
    }
}
