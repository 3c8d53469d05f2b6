//! GymCoach Test Harness - Synthetic poses and end-to-end scenarios
//!
//! This crate provides:
//! - A side-on skeleton simulator driven by joint angles
//! - Detector noise injection (jitter, dropouts, occlusion)
//! - Scripted exercise scenarios
//! - End-to-end checks of the coaching pipeline

pub mod simulator;
pub mod noise;
pub mod scenario;
pub mod integration;

pub use simulator::*;
pub use noise::*;
pub use scenario::*;
pub use integration::*;
