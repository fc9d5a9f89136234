//! Damped harmonic oscillator spring driver.
//!
//! Closed-form solution (Ryan Juckett's damped-spring derivation): position
//! and velocity advance by precomputed coefficients per time step, so the
//! spring is exact for any dt rather than accumulating integrator error.
//! Parameterized the way animation code thinks about springs: a response
//! time (seconds to traverse most of the distance) and a damping ratio.

/// Spring configuration shared by every animated scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    /// Response time in seconds. Angular frequency is `2π / response`.
    pub response: f64,
    /// <1 oscillates, 1 critically damped, >1 over-damped.
    pub damping_ratio: f64,
    /// Resolution threshold, compared in solver space.
    pub epsilon: f64,
    /// Resolve as soon as the value meets or crosses the target instead of
    /// waiting for equilibrium. Used by dismissal-style animations that get
    /// cut off at the target anyway.
    pub resolves_upon_reaching_to_value: bool,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            response: 0.35,
            damping_ratio: 0.85,
            epsilon: 0.01,
            resolves_upon_reaching_to_value: false,
        }
    }
}

impl SpringParams {
    pub fn new(response: f64, damping_ratio: f64) -> Self {
        Self {
            response,
            damping_ratio,
            ..Default::default()
        }
    }

    /// Tight tracking while the user is holding the ball.
    pub fn interactive_grab() -> Self {
        Self::new(0.15, 0.95)
    }

    /// Quick move-and-vanish used by the put-back animation.
    pub fn dismissal() -> Self {
        Self {
            response: 0.15,
            damping_ratio: 0.85,
            epsilon: 3.0,
            resolves_upon_reaching_to_value: true,
        }
    }

    /// Gentle settle for ambient animations.
    pub fn passive_ease() -> Self {
        Self::new(0.35, 0.85)
    }

    pub(crate) fn angular_frequency(&self) -> f64 {
        if self.response <= f64::EPSILON {
            0.0
        } else {
            std::f64::consts::TAU / self.response
        }
    }
}

/// State-transition coefficients for one (dt, frequency, damping) triple.
#[derive(Debug, Clone, Copy, Default)]
struct Coefficients {
    pos_pos: f64,
    pos_vel: f64,
    vel_pos: f64,
    vel_vel: f64,
}

impl Coefficients {
    fn compute(dt: f64, omega: f64, zeta: f64) -> Self {
        if omega < f64::EPSILON {
            // No stiffness: identity transform, the value never moves.
            return Self {
                pos_pos: 1.0,
                pos_vel: 0.0,
                vel_pos: 0.0,
                vel_vel: 1.0,
            };
        }
        if zeta > 1.0 + f64::EPSILON {
            Self::over_damped(dt, omega, zeta)
        } else if zeta < 1.0 - f64::EPSILON {
            Self::under_damped(dt, omega, zeta)
        } else {
            Self::critically_damped(dt, omega)
        }
    }

    fn over_damped(dt: f64, omega: f64, zeta: f64) -> Self {
        let za = -omega * zeta;
        let zb = omega * (zeta * zeta - 1.0).sqrt();
        let z1 = za - zb;
        let z2 = za + zb;

        let e1 = (z1 * dt).exp();
        let e2 = (z2 * dt).exp();
        let inv_two_zb = 1.0 / (2.0 * zb);

        let e1_over = e1 * inv_two_zb;
        let e2_over = e2 * inv_two_zb;
        let z1e1_over = z1 * e1_over;
        let z2e2_over = z2 * e2_over;

        Self {
            pos_pos: e1_over * z2 - z2e2_over + e2,
            pos_vel: -e1_over + e2_over,
            vel_pos: (z1e1_over - z2e2_over + e2) * z2,
            vel_vel: -z1e1_over + z2e2_over,
        }
    }

    fn under_damped(dt: f64, omega: f64, zeta: f64) -> Self {
        let omega_zeta = omega * zeta;
        let alpha = omega * (1.0 - zeta * zeta).sqrt();

        let exp_term = (-omega_zeta * dt).exp();
        let cos_term = (alpha * dt).cos();
        let sin_term = (alpha * dt).sin();
        let inv_alpha = 1.0 / alpha;

        let exp_sin = exp_term * sin_term;
        let exp_cos = exp_term * cos_term;
        let exp_oz_sin_over_alpha = exp_term * omega_zeta * sin_term * inv_alpha;

        Self {
            pos_pos: exp_cos + exp_oz_sin_over_alpha,
            pos_vel: exp_sin * inv_alpha,
            vel_pos: -exp_sin * alpha - omega_zeta * exp_oz_sin_over_alpha,
            vel_vel: exp_cos - exp_oz_sin_over_alpha,
        }
    }

    fn critically_damped(dt: f64, omega: f64) -> Self {
        let exp_term = (-omega * dt).exp();
        let time_exp = dt * exp_term;
        let time_exp_freq = time_exp * omega;

        Self {
            pos_pos: time_exp_freq + exp_term,
            pos_vel: time_exp,
            vel_pos: -omega * time_exp_freq,
            vel_vel: -time_exp_freq + exp_term,
        }
    }
}

fn side_of(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// One active spring animation in solver space.
#[derive(Debug, Clone)]
pub struct SpringSolver {
    pub value: f64,
    pub velocity: f64,
    to_value: f64,
    params: SpringParams,
    /// Which side of the target we started on, for crossing detection.
    start_side: i8,
    coefs: Coefficients,
    coefs_dt: f64,
}

impl SpringSolver {
    pub fn new(from_value: f64, velocity: f64, to_value: f64, params: SpringParams) -> Self {
        Self {
            value: from_value,
            velocity,
            to_value,
            params,
            start_side: side_of(to_value - from_value),
            coefs: Coefficients::default(),
            coefs_dt: f64::NAN,
        }
    }

    pub fn to_value(&self) -> f64 {
        self.to_value
    }

    /// Advance one frame. Returns true when the animation has resolved; the
    /// value is snapped onto the target on resolution.
    pub fn step(&mut self, dt: f64) -> bool {
        if dt != self.coefs_dt {
            self.coefs = Coefficients::compute(
                dt,
                self.params.angular_frequency(),
                self.params.damping_ratio,
            );
            self.coefs_dt = dt;
        }

        // Advance in equilibrium-relative space.
        let rel = self.value - self.to_value;
        let new_rel = rel * self.coefs.pos_pos + self.velocity * self.coefs.pos_vel;
        self.velocity = rel * self.coefs.vel_pos + self.velocity * self.coefs.vel_vel;
        self.value = new_rel + self.to_value;

        if self.has_resolved() {
            self.value = self.to_value;
            true
        } else {
            false
        }
    }

    fn has_resolved(&self) -> bool {
        if self.params.resolves_upon_reaching_to_value
            && side_of(self.to_value - self.value) != self.start_side
        {
            return true;
        }
        (self.value - self.to_value).abs() < self.params.epsilon
            && self.velocity.abs() < self.params.epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 1.0 / 120.0;

    fn run_until_resolved(solver: &mut SpringSolver, max_steps: usize) -> Option<usize> {
        for i in 0..max_steps {
            if solver.step(FRAME) {
                return Some(i + 1);
            }
        }
        None
    }

    #[test]
    fn test_critically_damped_resolves_on_target() {
        let params = SpringParams {
            response: 0.15,
            damping_ratio: 1.0,
            ..Default::default()
        };
        let mut solver = SpringSolver::new(0.0, 0.0, 100.0, params);
        let steps = run_until_resolved(&mut solver, 600).expect("spring never resolved");
        assert!(steps < 200, "took {steps} steps");
        assert_eq!(solver.value, 100.0);
    }

    #[test]
    fn test_under_damped_overshoots() {
        let params = SpringParams::new(0.3, 0.5);
        let mut solver = SpringSolver::new(0.0, 0.0, 100.0, params);
        let mut max_value: f64 = 0.0;
        for _ in 0..600 {
            if solver.step(FRAME) {
                break;
            }
            max_value = max_value.max(solver.value);
        }
        assert!(max_value > 100.0, "max was {max_value}");
    }

    #[test]
    fn test_over_damped_never_overshoots() {
        let params = SpringParams::new(0.2, 2.0);
        let mut solver = SpringSolver::new(0.0, 0.0, 100.0, params);
        for _ in 0..2000 {
            if solver.step(FRAME) {
                break;
            }
            assert!(solver.value <= 100.0 + 1e-9, "overshot to {}", solver.value);
        }
        assert!((solver.value - 100.0).abs() < 1.0);
    }

    #[test]
    fn test_resolves_upon_reaching_target_cuts_early() {
        // Dismissal resolves at first crossing; the same motion without the
        // flag keeps ringing past it.
        let mut cut = SpringSolver::new(100.0, 0.0, 0.0, SpringParams::dismissal());
        let cut_steps = run_until_resolved(&mut cut, 600).expect("dismissal never resolved");
        assert_eq!(cut.value, 0.0);

        let mut ringing = SpringSolver::new(
            100.0,
            0.0,
            0.0,
            SpringParams {
                resolves_upon_reaching_to_value: false,
                ..SpringParams::dismissal()
            },
        );
        let ringing_steps = run_until_resolved(&mut ringing, 600).expect("spring never resolved");
        assert!(cut_steps < ringing_steps, "{cut_steps} vs {ringing_steps}");
    }

    #[test]
    fn test_zero_response_is_inert() {
        let params = SpringParams::new(0.0, 1.0);
        let mut solver = SpringSolver::new(10.0, 5.0, 100.0, params);
        solver.step(FRAME);
        assert_eq!(solver.value, 10.0);
        assert_eq!(solver.velocity, 5.0);
    }

    #[test]
    fn test_velocity_carries_into_first_steps() {
        // A spring started with outgoing velocity should keep moving away
        // from the target briefly instead of snapping back.
        let params = SpringParams::passive_ease();
        let mut solver = SpringSolver::new(50.0, 400.0, 0.0, params);
        solver.step(FRAME);
        assert!(solver.value > 50.0, "value was {}", solver.value);
    }
}
