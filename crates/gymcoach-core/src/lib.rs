//! GymCoach Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every stage of the coaching
//! pipeline:
//! - Landmarks and pose observations (33-point body scheme)
//! - Planar geometry on landmark coordinates
//! - Exercise labels and alias normalization
//! - Frame time and bounded ring buffers
//! - The error type shared across crates

pub mod error;
pub mod geometry;
pub mod label;
pub mod landmark;
pub mod ring;
pub mod time;

pub use error::*;
pub use geometry::*;
pub use label::*;
pub use landmark::*;
pub use ring::*;
pub use time::*;
