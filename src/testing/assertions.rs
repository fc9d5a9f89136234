//! Assertion checking for test expectations

use super::parser::{ExpectedEvent, StateAssertion};
use crate::events::BallEvent;

/// Error when an assertion fails
#[derive(Debug)]
pub struct AssertionError {
    pub message: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for AssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n    Expected: {}\n    Actual: {}", self.message, self.expected, self.actual)
    }
}

/// Captured event with timing info
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub frame: u64,
    pub event_type: String,
    /// Payload pair checked against `ExpectedEvent::value`:
    /// positions for spawn/drag events, (impulse, strength) for
    /// wall contacts, (volume, 0) for sound requests.
    pub value: Option<(f32, f32)>,
}

impl CapturedEvent {
    pub fn from_ball_event(frame: u64, event: &BallEvent) -> Self {
        let value = match event {
            BallEvent::SessionStart { .. } | BallEvent::BallDocked => None,
            BallEvent::ArenaResized { width, height } => Some((*width, *height)),
            BallEvent::BallReleased { from } => Some(*from),
            BallEvent::BallSpawned { pos } => Some(*pos),
            BallEvent::DragStarted { pos } => Some(*pos),
            BallEvent::DragEnded { velocity } => Some(*velocity),
            BallEvent::FlickApplied { impulse } => Some(*impulse),
            BallEvent::WallContact {
                impulse, strength, ..
            } => Some((*impulse, *strength)),
            BallEvent::SoundRequested { volume, .. } => Some((*volume, 0.0)),
        };

        CapturedEvent {
            frame,
            event_type: event.name().to_string(),
            value,
        }
    }
}

/// Check if captured events match expected sequence
pub fn check_sequence(expected: &[ExpectedEvent], captured: &[CapturedEvent]) -> Result<(), AssertionError> {
    let mut captured_idx = 0;

    for (i, exp) in expected.iter().enumerate() {
        // Find matching event starting from current position
        let found = captured[captured_idx..]
            .iter()
            .enumerate()
            .find(|(_, cap)| cap.event_type == exp.event);

        match found {
            Some((offset, cap)) => {
                // Check frame bounds if specified
                if let Some(min) = exp.frame_min {
                    if cap.frame < min {
                        return Err(AssertionError {
                            message: format!("Event #{} '{}' occurred too early", i + 1, exp.event),
                            expected: format!("frame >= {}", min),
                            actual: format!("frame {}", cap.frame),
                        });
                    }
                }
                if let Some(max) = exp.frame_max {
                    if cap.frame > max {
                        return Err(AssertionError {
                            message: format!("Event #{} '{}' occurred too late", i + 1, exp.event),
                            expected: format!("frame <= {}", max),
                            actual: format!("frame {}", cap.frame),
                        });
                    }
                }
                if let Some([ex, ey]) = exp.value {
                    let (ax, ay) = cap.value.ok_or_else(|| AssertionError {
                        message: format!("Event #{} '{}' has no payload", i + 1, exp.event),
                        expected: format!("({}, {})", ex, ey),
                        actual: "no payload".to_string(),
                    })?;
                    if (ax - ex).abs() > exp.tolerance || (ay - ey).abs() > exp.tolerance {
                        return Err(AssertionError {
                            message: format!("Event #{} '{}' payload mismatch", i + 1, exp.event),
                            expected: format!("({}, {}) within {}", ex, ey, exp.tolerance),
                            actual: format!("({}, {})", ax, ay),
                        });
                    }
                }
                captured_idx += offset + 1;
            }
            None => {
                return Err(AssertionError {
                    message: format!("Event #{} '{}' not found", i + 1, exp.event),
                    expected: format!("'{}' event in sequence", exp.event),
                    actual: format!("events after position {}: {:?}",
                        captured_idx,
                        captured[captured_idx..].iter().map(|e| &e.event_type).collect::<Vec<_>>()
                    ),
                });
            }
        }
    }

    Ok(())
}

/// Check that no forbidden event was captured
pub fn check_forbidden(forbidden: &[String], captured: &[CapturedEvent]) -> Result<(), AssertionError> {
    for name in forbidden {
        if let Some(cap) = captured.iter().find(|c| &c.event_type == name) {
            return Err(AssertionError {
                message: format!("Forbidden event '{}' occurred", name),
                expected: format!("no '{}' events", name),
                actual: format!("'{}' at frame {}", name, cap.frame),
            });
        }
    }

    Ok(())
}

/// World state for assertions
pub struct WorldState {
    pub ball: Option<BallState>,
    pub arena_width: f32,
    pub arena_height: f32,
}

pub struct BallState {
    pub x: f32,
    pub y: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub dragged: bool,
}

/// Parse a check string into (path, operator, value)
fn parse_check(check: &str) -> Option<(&str, &str, &str)> {
    // Try operators in order of specificity (>= before >, etc.)
    for op in &[">=", "<=", "!=", "=", ">", "<"] {
        if let Some(idx) = check.find(op) {
            let path = check[..idx].trim();
            let value = check[idx + op.len()..].trim();
            return Some((path, op, value));
        }
    }
    None
}

/// Check state assertions against world state
pub fn check_state(assertion: &StateAssertion, state: &WorldState) -> Result<(), AssertionError> {
    for check in &assertion.checks {
        let (path, operator, expected_value) = parse_check(check).ok_or_else(|| AssertionError {
            message: format!("Invalid check syntax: {}", check),
            expected: "format: 'ball.property = value' or 'ball.property > value'".to_string(),
            actual: check.clone(),
        })?;

        let path_parts: Vec<&str> = path.split('.').collect();

        if path_parts.is_empty() {
            continue;
        }

        if path_parts[0] == "arena" {
            match path_parts.get(1) {
                Some(&"width") => {
                    check_float_comparison(path, state.arena_width, operator, expected_value)?
                }
                Some(&"height") => {
                    check_float_comparison(path, state.arena_height, operator, expected_value)?
                }
                _ => {}
            }
            continue;
        }

        if path_parts[0] == "ball" {
            // "ball.exists" is valid whether or not a ball is alive
            if path_parts.get(1) == Some(&"exists") {
                let expected = expected_value == "true";
                if state.ball.is_some() != expected {
                    return Err(AssertionError {
                        message: format!("Check failed: {}", check),
                        expected: expected_value.to_string(),
                        actual: state.ball.is_some().to_string(),
                    });
                }
                continue;
            }

            let ball = state.ball.as_ref().ok_or_else(|| AssertionError {
                message: "Ball state check failed".to_string(),
                expected: "ball exists".to_string(),
                actual: "no ball".to_string(),
            })?;

            match path_parts.get(1) {
                Some(&"x") => check_float_comparison(path, ball.x, operator, expected_value)?,
                Some(&"y") => check_float_comparison(path, ball.y, operator, expected_value)?,
                Some(&"velocity_x") => {
                    check_float_comparison(path, ball.velocity_x, operator, expected_value)?
                }
                Some(&"velocity_y") => {
                    check_float_comparison(path, ball.velocity_y, operator, expected_value)?
                }
                Some(&"dragged") => {
                    let expected = expected_value == "true";
                    if ball.dragged != expected {
                        return Err(AssertionError {
                            message: format!("Check failed: {}", check),
                            expected: expected_value.to_string(),
                            actual: ball.dragged.to_string(),
                        });
                    }
                }
                _ => {}
            }
            continue;
        }

        return Err(AssertionError {
            message: format!("Unknown check target '{}'", path_parts[0]),
            expected: "'ball' or 'arena'".to_string(),
            actual: path.to_string(),
        });
    }

    Ok(())
}

/// Check float comparison with operator
fn check_float_comparison(path: &str, actual: f32, operator: &str, expected_str: &str) -> Result<(), AssertionError> {
    let value: f32 = expected_str.trim().parse().map_err(|_| AssertionError {
        message: format!("Invalid value for {}", path),
        expected: "number".to_string(),
        actual: expected_str.to_string(),
    })?;

    let pass = match operator {
        ">=" => actual >= value,
        "<=" => actual <= value,
        ">" => actual > value,
        "<" => actual < value,
        "=" | "==" => (actual - value).abs() < 0.1,
        "!=" => (actual - value).abs() >= 0.1,
        _ => true, // Unknown operator, pass by default
    };

    if !pass {
        return Err(AssertionError {
            message: format!("Check failed: {} {} {} (actual: {:.1})", path, operator, expected_str, actual),
            expected: format!("{} {} {}", path, operator, value),
            actual: format!("{:.1}", actual),
        });
    }

    Ok(())
}
