//! GymCoach Runtime - Configuration and per-stream orchestration
//!
//! Ties the pipeline together for one or many input streams:
//! - `CoachConfig`: one TOML document for every component
//! - `Coach` / `CoachStream`: classify, count, correct and speak per frame
//! - `PoseProvider`: where landmark observations come from
//! - `telemetry`: `tracing` subscriber setup

pub mod coach;
pub mod config;
pub mod provider;
pub mod telemetry;

pub use coach::*;
pub use config::*;
pub use provider::*;
