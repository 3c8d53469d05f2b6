//! GymCoach Features
//!
//! Turns a pose observation into the numeric vocabulary the rest of the
//! pipeline speaks:
//! - a fixed, named 15-scalar feature vector for the classifier
//! - scalar and landmark smoothing for noisy pose streams
//! - visibility gating before a frame is trusted

pub mod features;
pub mod smoothing;

pub use features::*;
pub use smoothing::*;
