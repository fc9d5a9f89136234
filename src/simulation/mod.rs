//! Simulation module - headless app assembly and the scripted demo run
//!
//! Provides tools to run the physics core without a host window, for the
//! demo binary, the scenario harness, and integration tests.

pub mod app_builder;
pub mod runner;

pub use app_builder::HeadlessAppBuilder;
pub use runner::{DemoReport, run_demo_session};
