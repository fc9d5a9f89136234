//! Scenario testing system for deterministic physics testing
//!
//! Provides infrastructure for running scripted input tests against the
//! headless simulation to verify ball behavior.

pub mod assertions;
pub mod parser;
pub mod runner;

pub use assertions::{check_forbidden, check_sequence, check_state, AssertionError, CapturedEvent};
pub use parser::{
    BallSetup, ExpectedEvent, FrameInput, StateAssertion, TestDefinition, TestExpectations,
    TestSetup, parse_test_file,
};
pub use runner::{run_test, TestResult};

/// Default path for test scenarios
pub const SCENARIOS_DIR: &str = "tests/scenarios";
