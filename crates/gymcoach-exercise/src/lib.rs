//! GymCoach Exercise - Per-exercise session state machines
//!
//! One session per active exercise stream. Each frame a session:
//! - gates on landmark visibility (missing joints never advance state)
//! - computes its primary metric and drives a hysteresis rep counter
//! - runs independent form checks, each contributing at most one issue
//!
//! Sessions are built from an `ExerciseKind` by [`create_session`] and are
//! replaced, never mutated, when the exercise changes.

pub mod bench_press;
pub mod bicep_curl;
pub mod config;
pub mod counter;
pub mod deadlift;
pub mod factory;
pub mod idle;
pub mod lat_pulldown;
pub mod lunge;
pub mod plank;
pub mod pushup;
pub mod result;
pub mod session;
pub mod squat;

#[cfg(test)]
mod testing;

pub use bench_press::BenchPressSession;
pub use bicep_curl::BicepCurlSession;
pub use config::*;
pub use counter::*;
pub use deadlift::DeadliftSession;
pub use factory::*;
pub use idle::*;
pub use lat_pulldown::LatPulldownSession;
pub use lunge::LungeSession;
pub use plank::PlankSession;
pub use pushup::PushupSession;
pub use result::*;
pub use session::*;
pub use squat::SquatSession;
