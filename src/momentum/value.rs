//! Momentum-driven scalar with spring, decay, and rubber-banded bounds.
//!
//! A `MomentumValue` is the unit of secondary animation: squish, drag
//! scale, dock position and scale all run through one. At any moment it is
//! stationary, spring-animating toward a target, or decelerating along a
//! decay curve. The mode is a single enum so two drivers can never be
//! active at once, and every driver change settles the outgoing
//! completion before the incoming driver starts.
//!
//! Both solvers run in solver space (`value * scale`); readouts divide
//! back down. `scale` exists because the spring constants were tuned for
//! pixel-sized magnitudes and values like a 0..1 squish factor need to be
//! lifted into that range to feel the same.

use crate::constants::{RUBBER_BAND_COEFFICIENT, RUBBER_BAND_DIMENSION};

use super::decay::DecaySolver;
use super::spring::{SpringParams, SpringSolver};
use super::tracker::ValueVelocityTracker;

/// Invoked with `true` when a driver resolves, `false` when it is cancelled
/// by a later command.
pub type Completion = Box<dyn FnOnce(bool) + Send + Sync>;

enum MomentumMode {
    Stationary,
    Animating {
        spring: SpringSolver,
        completion: Option<Completion>,
    },
    Decelerating {
        decay: DecaySolver,
        completion: Option<Completion>,
    },
}

/// What a single frame step did, so callers can sequence side effects off
/// the return value instead of change callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// No driver active.
    Idle,
    /// A driver advanced the value.
    Moved,
    /// A driver advanced the value and resolved this frame.
    Finished,
}

pub struct MomentumValue {
    value: f64,
    scale: f64,
    params: SpringParams,
    minimum: Option<f64>,
    maximum: Option<f64>,
    mode: MomentumMode,
    tracker: ValueVelocityTracker,
    clock: f64,
}

impl MomentumValue {
    pub fn new(initial: f64, scale: f64, params: SpringParams) -> Self {
        assert!(scale > 0.0, "momentum scale must be positive, got {scale}");
        Self {
            value: initial,
            scale,
            params,
            minimum: None,
            maximum: None,
            mode: MomentumMode::Stationary,
            tracker: ValueVelocityTracker::new(),
            clock: 0.0,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Animation target, present only while spring-animating.
    pub fn to_value(&self) -> Option<f64> {
        match &self.mode {
            MomentumMode::Animating { spring, .. } => Some(spring.to_value() / self.scale),
            _ => None,
        }
    }

    pub fn minimum(&self) -> Option<f64> {
        self.minimum
    }

    pub fn maximum(&self) -> Option<f64> {
        self.maximum
    }

    pub fn is_stationary(&self) -> bool {
        matches!(self.mode, MomentumMode::Stationary)
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.mode, MomentumMode::Animating { .. })
    }

    pub fn is_decelerating(&self) -> bool {
        matches!(self.mode, MomentumMode::Decelerating { .. })
    }

    /// Direct external write (user drag). Cancels any active driver and
    /// feeds the observed-velocity tracker; no driver remains active.
    pub fn set_value(&mut self, value: f64) {
        self.cancel_driver();
        self.tracker.add(self.clock, value);
        self.value = value;
    }

    /// Spring-animate toward `to` starting from the current value with the
    /// given initial velocity (external units per second).
    pub fn animate(&mut self, to: f64, velocity: f64) {
        self.begin_animation(to, velocity, None);
    }

    pub fn animate_then(&mut self, to: f64, velocity: f64, completion: Completion) {
        self.begin_animation(to, velocity, Some(completion));
    }

    /// Coast along a decay curve from the current value. Zero velocity
    /// skips the decay and snaps into bounds instead (completing
    /// immediately when already inside them).
    pub fn decelerate(&mut self, velocity: f64) {
        self.begin_decay(velocity, None);
    }

    pub fn decelerate_then(&mut self, velocity: f64, completion: Completion) {
        self.begin_decay(velocity, Some(completion));
    }

    /// Cancel any active driver; its completion fires with `false`.
    pub fn stop(&mut self) {
        self.cancel_driver();
    }

    /// Current velocity in external units per second. While a driver is
    /// active this is the solver's velocity; while stationary it is the
    /// secant estimate over recent direct writes.
    pub fn velocity(&mut self) -> f64 {
        match &self.mode {
            MomentumMode::Animating { spring, .. } => spring.velocity / self.scale,
            MomentumMode::Decelerating { decay, .. } => decay.velocity / self.scale,
            MomentumMode::Stationary => self.tracker.velocity(self.clock),
        }
    }

    /// Replace the spring parameters. Takes effect from the next
    /// `animate`; an in-flight spring keeps the parameters it started with.
    pub fn set_params(&mut self, params: SpringParams) {
        self.params = params;
    }

    pub fn set_minimum(&mut self, minimum: Option<f64>) {
        if self.minimum != minimum {
            self.minimum = minimum;
            self.snap_into_bounds(None);
        }
    }

    pub fn set_maximum(&mut self, maximum: Option<f64>) {
        if self.maximum != maximum {
            self.maximum = maximum;
            self.snap_into_bounds(None);
        }
    }

    /// The value with out-of-bounds excess compressed sub-linearly, for
    /// display. Approaches but never reaches `bound + dimension`.
    pub fn rubber_banded_value(&self) -> f64 {
        if let Some(max) = self.maximum {
            if self.value > max {
                return max + rubber_band(self.value - max);
            }
        }
        if let Some(min) = self.minimum {
            if self.value < min {
                return min - rubber_band(min - self.value);
            }
        }
        self.value
    }

    /// Advance the active driver by one frame.
    pub fn step(&mut self, dt: f64) -> StepResult {
        self.clock += dt;
        match std::mem::replace(&mut self.mode, MomentumMode::Stationary) {
            MomentumMode::Stationary => StepResult::Idle,
            MomentumMode::Animating {
                mut spring,
                completion,
            } => {
                let resolved = spring.step(dt);
                self.value = spring.value / self.scale;
                if resolved {
                    finish(completion);
                    StepResult::Finished
                } else {
                    self.mode = MomentumMode::Animating { spring, completion };
                    StepResult::Moved
                }
            }
            MomentumMode::Decelerating {
                mut decay,
                completion,
            } => {
                let resolved = decay.step(dt);
                self.value = decay.value / self.scale;
                if let Some(bound) = self.violated_bound() {
                    // Ran out of bounds: hand the trajectory to a spring
                    // targeting the bound. Velocity carries over and the
                    // completion transfers without firing.
                    let spring = SpringSolver::new(
                        decay.value,
                        decay.velocity,
                        bound * self.scale,
                        self.params,
                    );
                    self.mode = MomentumMode::Animating { spring, completion };
                    StepResult::Moved
                } else if resolved {
                    finish(completion);
                    StepResult::Finished
                } else {
                    self.mode = MomentumMode::Decelerating { decay, completion };
                    StepResult::Moved
                }
            }
        }
    }

    fn begin_animation(&mut self, to: f64, velocity: f64, completion: Option<Completion>) {
        self.cancel_driver();
        let spring = SpringSolver::new(
            self.value * self.scale,
            velocity * self.scale,
            to * self.scale,
            self.params,
        );
        self.mode = MomentumMode::Animating { spring, completion };
    }

    fn begin_decay(&mut self, velocity: f64, completion: Option<Completion>) {
        self.cancel_driver();
        if velocity == 0.0 {
            self.snap_into_bounds(completion);
            return;
        }
        let decay = DecaySolver::new(self.value * self.scale, velocity * self.scale);
        self.mode = MomentumMode::Decelerating { decay, completion };
    }

    /// Animate back inside the bounds if the value sits outside them;
    /// otherwise the handed-in completion is already done.
    fn snap_into_bounds(&mut self, completion: Option<Completion>) {
        match self.violated_bound() {
            Some(bound) => {
                let velocity = self.velocity();
                self.begin_animation(bound, velocity, completion);
            }
            None => finish(completion),
        }
    }

    fn violated_bound(&self) -> Option<f64> {
        if let Some(max) = self.maximum {
            if self.value > max {
                return Some(max);
            }
        }
        if let Some(min) = self.minimum {
            if self.value < min {
                return Some(min);
            }
        }
        None
    }

    fn cancel_driver(&mut self) {
        match std::mem::replace(&mut self.mode, MomentumMode::Stationary) {
            MomentumMode::Stationary => {}
            MomentumMode::Animating { completion, .. } => cancel(completion),
            MomentumMode::Decelerating { completion, .. } => cancel(completion),
        }
    }
}

fn finish(completion: Option<Completion>) {
    if let Some(completion) = completion {
        completion(true);
    }
}

fn cancel(completion: Option<Completion>) {
    if let Some(completion) = completion {
        completion(false);
    }
}

fn rubber_band(excess: f64) -> f64 {
    let dim = RUBBER_BAND_DIMENSION;
    let c = RUBBER_BAND_COEFFICIENT;
    (1.0 - 1.0 / (excess * c / dim + 1.0)) * dim
}
