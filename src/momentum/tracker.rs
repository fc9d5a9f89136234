//! Windowed secant-slope velocity estimators.
//!
//! Both trackers keep a short trailing window of timestamped samples and
//! report `(last - first) / elapsed` over whatever remains. This is not a
//! true derivative; it is cheap and tolerant of irregular sampling, which
//! is what pointer input needs. Samples outside the window are trimmed on
//! every read and write.

use std::collections::VecDeque;

use bevy::prelude::*;

use crate::constants::{POINTER_TRACKER_WINDOW, VALUE_TRACKER_WINDOW};

/// 2D pointer gesture tracker, 100 ms window.
#[derive(Debug, Clone, Default)]
pub struct PointerVelocityTracker {
    samples: VecDeque<(f64, Vec2)>,
}

impl PointerVelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, now: f64, position: Vec2) {
        self.samples.push_back((now, position));
        self.trim(now);
    }

    /// Estimated velocity in units per second; zero when fewer than two
    /// samples survive the window.
    pub fn velocity(&mut self, now: f64) -> Vec2 {
        self.trim(now);
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (self.samples.front(), self.samples.back())
        else {
            return Vec2::ZERO;
        };
        let elapsed = t1 - t0;
        if self.samples.len() < 2 || elapsed <= 0.0 {
            return Vec2::ZERO;
        }
        (p1 - p0) / elapsed as f32
    }

    fn trim(&mut self, now: f64) {
        while let Some(&(t, _)) = self.samples.front() {
            if now - t <= POINTER_TRACKER_WINDOW {
                break;
            }
            self.samples.pop_front();
        }
    }

    #[cfg(test)]
    fn oldest_age(&self, now: f64) -> Option<f64> {
        self.samples.front().map(|&(t, _)| now - t)
    }
}

/// Scalar variant observing direct writes to a momentum value, 1/15 s window.
#[derive(Debug, Clone, Default)]
pub struct ValueVelocityTracker {
    samples: VecDeque<(f64, f64)>,
}

impl ValueVelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, now: f64, value: f64) {
        self.samples.push_back((now, value));
        self.trim(now);
    }

    pub fn velocity(&mut self, now: f64) -> f64 {
        self.trim(now);
        let (Some(&(t0, v0)), Some(&(t1, v1))) = (self.samples.front(), self.samples.back())
        else {
            return 0.0;
        };
        let elapsed = t1 - t0;
        if self.samples.len() < 2 || elapsed <= 0.0 {
            return 0.0;
        }
        (v1 - v0) / elapsed
    }

    fn trim(&mut self, now: f64) {
        while let Some(&(t, _)) = self.samples.front() {
            if now - t <= VALUE_TRACKER_WINDOW {
                break;
            }
            self.samples.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secant_slope_over_window() {
        let mut tracker = PointerVelocityTracker::new();
        tracker.add(0.00, Vec2::new(0.0, 0.0));
        tracker.add(0.05, Vec2::new(100.0, 0.0));
        let v = tracker.velocity(0.05);
        assert!((v.x - 2000.0).abs() < 0.01, "got {v}");
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn test_fewer_than_two_samples_is_zero() {
        let mut tracker = PointerVelocityTracker::new();
        assert_eq!(tracker.velocity(0.0), Vec2::ZERO);
        tracker.add(0.0, Vec2::new(50.0, 50.0));
        assert_eq!(tracker.velocity(0.0), Vec2::ZERO);
    }

    #[test]
    fn test_window_trims_on_read() {
        let mut tracker = PointerVelocityTracker::new();
        tracker.add(0.0, Vec2::ZERO);
        tracker.add(0.02, Vec2::new(10.0, 0.0));
        tracker.add(0.25, Vec2::new(20.0, 0.0));

        // Reading at t=0.3 leaves only the t=0.25 sample in the 0.1s window.
        assert_eq!(tracker.velocity(0.3), Vec2::ZERO);
        assert!(tracker.oldest_age(0.3).unwrap() <= POINTER_TRACKER_WINDOW);
    }

    #[test]
    fn test_window_trims_on_write() {
        let mut tracker = PointerVelocityTracker::new();
        for i in 0..20 {
            let t = i as f64 * 0.016;
            tracker.add(t, Vec2::new(i as f32, 0.0));
            assert!(tracker.oldest_age(t).unwrap() <= POINTER_TRACKER_WINDOW);
        }
    }

    #[test]
    fn test_stale_cluster_returns_zero() {
        let mut tracker = PointerVelocityTracker::new();
        tracker.add(0.0, Vec2::new(0.0, 0.0));
        tracker.add(0.01, Vec2::new(500.0, 0.0));
        // A long hold before release discards the motion burst entirely.
        assert_eq!(tracker.velocity(1.0), Vec2::ZERO);
    }

    #[test]
    fn test_scalar_variant_slope() {
        let mut tracker = ValueVelocityTracker::new();
        tracker.add(0.00, 1.0);
        tracker.add(0.03, 1.3);
        let v = tracker.velocity(0.03);
        assert!((v - 10.0).abs() < 1e-9, "got {v}");
    }

    #[test]
    fn test_scalar_window_is_shorter() {
        let mut tracker = ValueVelocityTracker::new();
        tracker.add(0.0, 0.0);
        tracker.add(0.08, 5.0);
        // 80ms gap exceeds the 1/15s scalar window.
        assert_eq!(tracker.velocity(0.08), 0.0);
    }
}
