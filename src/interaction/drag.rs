//! Pointer and scroll gesture handling
//!
//! Turns raw input messages into a drag (direct position override) and a
//! release flick (one impulse from the tracker's velocity estimate). The
//! host delivers positions in arena coordinates and pre-filters inertial
//! scroll phases, so every sample that arrives here is a real gesture.

use bevy::prelude::*;

use crate::arena::Arena;
use crate::ball::{Ball, BallMotion, BallPhase, BallVisual};
use crate::events::{BallEvent, EventBus};
use crate::helpers::constrain_circle_center;
use crate::momentum::PointerVelocityTracker;

/// Pointer input in arena coordinates
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum PointerMessage {
    Down(Vec2),
    Drag(Vec2),
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

/// Precise-delta scroll input. Deltas are in arena coordinates
/// (y positive pushes the ball up).
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ScrollMessage {
    pub phase: ScrollPhase,
    pub delta: Vec2,
}

struct ActiveDrag {
    ball_start: Vec2,
    pointer_start: Vec2,
    current: Vec2,
    /// Scroll drags use a synthetic pointer accumulated from deltas
    from_scroll: bool,
    tracker: PointerVelocityTracker,
}

impl ActiveDrag {
    fn begin(now: f64, ball_start: Vec2, pointer_start: Vec2, from_scroll: bool) -> Self {
        let mut tracker = PointerVelocityTracker::new();
        tracker.add(now, pointer_start);
        Self {
            ball_start,
            pointer_start,
            current: pointer_start,
            from_scroll,
            tracker,
        }
    }
}

/// Gesture state. `None` while idle.
#[derive(Resource, Default)]
pub struct DragState {
    active: Option<ActiveDrag>,
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Drop any in-flight gesture without applying a release impulse.
    pub fn abandon(&mut self) {
        self.active = None;
    }
}

type BallQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static Ball,
        &'static mut Transform,
        &'static mut BallPhase,
        &'static mut BallMotion,
        &'static mut BallVisual,
    ),
>;

/// Drain pointer and scroll messages into the drag state machine. Pointer
/// and scroll drive the same machine; a scroll gesture is ignored while a
/// pointer drag holds the ball.
pub fn pointer_interaction(
    time: Res<Time>,
    arena: Res<Arena>,
    mut pointer: MessageReader<PointerMessage>,
    mut scrolls: MessageReader<ScrollMessage>,
    mut drag: ResMut<DragState>,
    mut bus: ResMut<EventBus>,
    mut query: BallQuery,
) {
    let now = time.elapsed_secs_f64();

    for message in pointer.read() {
        match *message {
            PointerMessage::Down(pos) => {
                if drag.active.is_some() {
                    continue;
                }
                let Ok((ball, transform, mut phase, mut motion, mut visual)) = query.single_mut()
                else {
                    continue;
                };
                if *phase == BallPhase::Scripted {
                    continue;
                }
                let center = transform.translation.truncate();
                if center.distance(pos) > ball.radius() {
                    continue;
                }
                drag.active = Some(ActiveDrag::begin(now, center, pos, false));
                *phase = BallPhase::Dragged;
                motion.velocity = Vec2::ZERO;
                visual.grab();
                bus.emit(BallEvent::DragStarted { pos: (pos.x, pos.y) });
            }
            PointerMessage::Drag(pos) => {
                let Some(active) = drag.active.as_mut() else {
                    continue;
                };
                if active.from_scroll {
                    continue;
                }
                active.tracker.add(now, pos);
                active.current = pos;
                drag_ball_to(active, &arena, &mut query);
            }
            PointerMessage::Up => {
                if drag.active.as_ref().is_none_or(|active| active.from_scroll) {
                    continue;
                }
                if let Some(mut active) = drag.active.take() {
                    finish_drag(&mut active, now, &mut bus, &mut query);
                }
            }
        }
    }

    for message in scrolls.read() {
        match message.phase {
            ScrollPhase::Began => {
                if drag.active.is_some() {
                    continue;
                }
                let Ok((_, transform, mut phase, mut motion, mut visual)) = query.single_mut()
                else {
                    continue;
                };
                if *phase == BallPhase::Scripted {
                    continue;
                }
                let center = transform.translation.truncate();
                drag.active = Some(ActiveDrag::begin(now, center, Vec2::ZERO, true));
                *phase = BallPhase::Dragged;
                motion.velocity = Vec2::ZERO;
                visual.grab();
                bus.emit(BallEvent::DragStarted {
                    pos: (center.x, center.y),
                });
            }
            ScrollPhase::Changed => {
                let Some(active) = drag.active.as_mut() else {
                    continue;
                };
                if !active.from_scroll {
                    continue;
                }
                active.current += message.delta;
                active.tracker.add(now, active.current);
                drag_ball_to(active, &arena, &mut query);
            }
            ScrollPhase::Ended | ScrollPhase::Cancelled => {
                if drag.active.as_ref().is_none_or(|active| !active.from_scroll) {
                    continue;
                }
                if let Some(mut active) = drag.active.take() {
                    finish_drag(&mut active, now, &mut bus, &mut query);
                }
            }
        }
    }
}

/// Move the ball to the drag target, keeping its full circle in bounds
fn drag_ball_to(active: &ActiveDrag, arena: &Arena, query: &mut BallQuery) {
    let Ok((ball, mut transform, _, _, _)) = query.single_mut() else {
        return;
    };
    let target = active.ball_start + (active.current - active.pointer_start);
    let constrained = constrain_circle_center(target, ball.radius(), arena.bounds);
    transform.translation.x = constrained.x;
    transform.translation.y = constrained.y;
}

/// Shared release path for pointer-up and scroll-ended/cancelled
fn finish_drag(active: &mut ActiveDrag, now: f64, bus: &mut EventBus, query: &mut BallQuery) {
    let velocity = active.tracker.velocity(now);
    bus.emit(BallEvent::DragEnded {
        velocity: (velocity.x, velocity.y),
    });
    let Ok((_, _, mut phase, mut motion, mut visual)) = query.single_mut() else {
        return;
    };
    if *phase != BallPhase::Dragged {
        return;
    }
    *phase = BallPhase::Free;
    visual.release();
    if velocity != Vec2::ZERO {
        motion.apply_impulse(velocity);
        bus.emit(BallEvent::FlickApplied {
            impulse: (velocity.x, velocity.y),
        });
    }
}
