//! Exponential velocity-decay driver for flick/release momentum.
//!
//! Velocity loses a fixed fraction per millisecond and position advances by
//! the integral of that curve, so a single step is exact for any dt. With
//! the default constant the value travels just under `v0 / 2` before
//! stopping.

use crate::constants::{DECAY_CONSTANT, DECAY_VELOCITY_EPSILON};

/// One active decay trajectory in solver space.
#[derive(Debug, Clone)]
pub struct DecaySolver {
    pub value: f64,
    pub velocity: f64,
    decay_constant: f64,
}

impl DecaySolver {
    pub fn new(value: f64, velocity: f64) -> Self {
        Self {
            value,
            velocity,
            decay_constant: DECAY_CONSTANT,
        }
    }

    /// Where the trajectory would come to rest if left alone.
    pub fn projected_destination(&self) -> f64 {
        self.value - self.velocity / (1000.0 * self.decay_constant.ln())
    }

    /// Advance one frame. Returns true once the velocity has dropped below
    /// the resolution threshold.
    pub fn step(&mut self, dt: f64) -> bool {
        let d = self.decay_constant.powf(dt * 1000.0);
        self.value += self.velocity * (d - 1.0) / (1000.0 * self.decay_constant.ln());
        self.velocity *= d;
        self.velocity.abs() < DECAY_VELOCITY_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 1.0 / 120.0;

    #[test]
    fn test_travels_about_half_initial_velocity() {
        let mut solver = DecaySolver::new(0.0, 1000.0);
        let mut steps = 0;
        while !solver.step(FRAME) {
            steps += 1;
            assert!(steps < 2000, "decay never resolved");
        }
        assert!(solver.value > 490.0 && solver.value < 500.0, "traveled {}", solver.value);
    }

    #[test]
    fn test_projected_destination_matches_simulation() {
        let solver = DecaySolver::new(200.0, -600.0);
        let projected = solver.projected_destination();

        let mut sim = solver.clone();
        while !sim.step(FRAME) {}
        // Residual travel at the cutoff velocity is under epsilon/2.
        assert!((sim.value - projected).abs() < 0.3, "{} vs {projected}", sim.value);
    }

    #[test]
    fn test_velocity_direction_preserved() {
        let mut solver = DecaySolver::new(0.0, -1000.0);
        for _ in 0..100 {
            solver.step(FRAME);
            assert!(solver.velocity <= 0.0);
        }
        assert!(solver.value < 0.0);
    }

    #[test]
    fn test_zero_velocity_resolves_immediately() {
        let mut solver = DecaySolver::new(42.0, 0.0);
        assert!(solver.step(FRAME));
        assert_eq!(solver.value, 42.0);
    }
}
