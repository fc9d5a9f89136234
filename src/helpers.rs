//! Utility functions for deskball

use bevy::prelude::*;

/// Map `value` from `[in_min, in_max]` to `[out_min, out_max]`, clamped to
/// the output range. Output bounds may be descending.
pub fn remap(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if in_max == in_min {
        return out_min;
    }
    let t = ((value - in_min) / (in_max - in_min)).clamp(0.0, 1.0);
    out_min + t * (out_max - out_min)
}

/// Move a value toward a target by a maximum delta
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Clamp `point` so a circle of `radius` around it stays inside `bounds`.
/// A circle wider than the bounds pins to the lower edge.
pub fn constrain_circle_center(point: Vec2, radius: f32, bounds: Rect) -> Vec2 {
    Vec2::new(
        clamp_lo_hi(point.x, bounds.min.x + radius, bounds.max.x - radius),
        clamp_lo_hi(point.y, bounds.min.y + radius, bounds.max.y - radius),
    )
}

/// Translate `rect` the minimum distance needed to fit inside `bounds`.
/// Oversized rects pin to the bottom-left corner.
pub fn constrain_rect(rect: Rect, bounds: Rect) -> Rect {
    let size = rect.size();
    let min = Vec2::new(
        clamp_lo_hi(rect.min.x, bounds.min.x, bounds.max.x - size.x),
        clamp_lo_hi(rect.min.y, bounds.min.y, bounds.max.y - size.y),
    );
    Rect::from_corners(min, min + size)
}

// f32::clamp panics when min > max; degenerate geometry should pin, not panic.
fn clamp_lo_hi(v: f32, lo: f32, hi: f32) -> f32 {
    if hi < lo { lo } else { v.clamp(lo, hi) }
}
