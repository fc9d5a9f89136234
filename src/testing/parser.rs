//! TOML scenario test definitions
//!
//! A scenario file has four parts: a `[setup]` table (arena bounds plus an
//! optional starting ball), `[[input]]` rows keyed by frame, an
//! `[[expect.sequence]]` list of events that must occur in order, and
//! `[[expect.state]]` assertions evaluated after a given frame.

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Complete test definition parsed from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TestDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub setup: TestSetup,
    #[serde(default)]
    pub input: Vec<FrameInput>,
    pub expect: TestExpectations,
}

/// Initial world state
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestSetup {
    /// Arena bounds as [min_x, min_y, max_x, max_y]. Defaults to 1920x1080.
    #[serde(default)]
    pub arena: Option<[f32; 4]>,
    #[serde(default)]
    pub ball: Option<BallSetup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BallSetup {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub velocity_x: f32,
    #[serde(default)]
    pub velocity_y: f32,
}

/// Input actions delivered at the start of the named frame
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrameInput {
    pub frame: u64,
    #[serde(default)]
    pub pointer_down: Option<[f32; 2]>,
    #[serde(default)]
    pub pointer_drag: Option<[f32; 2]>,
    #[serde(default)]
    pub pointer_up: bool,
    #[serde(default)]
    pub scroll_began: bool,
    #[serde(default)]
    pub scroll_delta: Option<[f32; 2]>,
    #[serde(default)]
    pub scroll_ended: bool,
    #[serde(default)]
    pub scroll_cancelled: bool,
    /// Dock rect as [min_x, min_y, max_x, max_y]; releases a ball from it.
    #[serde(default)]
    pub dock_release: Option<[f32; 4]>,
    #[serde(default)]
    pub dock_put_back: Option<[f32; 4]>,
    #[serde(default)]
    pub resize: Option<[f32; 2]>,
}

/// Expected outcomes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestExpectations {
    /// Events that must occur, in order (other events may interleave).
    #[serde(default)]
    pub sequence: Vec<ExpectedEvent>,
    /// Event names that must never occur.
    #[serde(default)]
    pub forbidden: Vec<String>,
    #[serde(default)]
    pub state: Vec<StateAssertion>,
}

/// A single expected event in the sequence
#[derive(Debug, Clone, Deserialize)]
pub struct ExpectedEvent {
    /// Event name as written to the session log, e.g. "wall_contact".
    pub event: String,
    #[serde(default)]
    pub frame_min: Option<u64>,
    #[serde(default)]
    pub frame_max: Option<u64>,
    /// Expected payload pair; see `CapturedEvent` for what each event records.
    #[serde(default)]
    pub value: Option<[f32; 2]>,
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,
}

fn default_tolerance() -> f32 {
    0.5
}

/// State assertion after simulation
#[derive(Debug, Clone, Deserialize)]
pub struct StateAssertion {
    pub after_frame: u64,
    #[serde(default)]
    pub checks: Vec<String>,
}

/// Parse a test file from path
pub fn parse_test_file(path: &Path) -> Result<TestDefinition, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let toml = r#"
name = "Test"
[setup.ball]
x = 960.0
y = 540.0

[[input]]
frame = 5
pointer_down = [960.0, 540.0]

[expect]
"#;
        let def: TestDefinition = toml::from_str(toml).unwrap();
        assert_eq!(def.name, "Test");
        let ball = def.setup.ball.unwrap();
        assert_eq!(ball.x, 960.0);
        assert_eq!(ball.velocity_y, 0.0);
        assert_eq!(def.input.len(), 1);
        assert_eq!(def.input[0].frame, 5);
        assert!(!def.input[0].pointer_up);
    }

    #[test]
    fn test_parse_expectations() {
        let toml = r#"
name = "Expectations"

[[expect.sequence]]
event = "wall_contact"
frame_min = 1
frame_max = 10
value = [1500.0, 0.25]
tolerance = 0.01

[[expect.state]]
after_frame = 30
checks = ["ball.exists = true", "ball.x > 100"]
"#;
        let def: TestDefinition = toml::from_str(toml).unwrap();
        assert!(def.setup.ball.is_none());
        assert_eq!(def.expect.sequence.len(), 1);
        assert_eq!(def.expect.sequence[0].event, "wall_contact");
        assert_eq!(def.expect.sequence[0].tolerance, 0.01);
        assert_eq!(def.expect.state[0].checks.len(), 2);
    }

    #[test]
    fn test_tolerance_defaults() {
        let toml = r#"
name = "Defaults"
[[expect.sequence]]
event = "ball_docked"
"#;
        let def: TestDefinition = toml::from_str(toml).unwrap();
        let expected = &def.expect.sequence[0];
        assert_eq!(expected.tolerance, 0.5);
        assert!(expected.frame_min.is_none());
        assert!(expected.value.is_none());
    }
}
