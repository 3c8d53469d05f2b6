//! GymCoach Feedback - Which correction to surface, and when
//!
//! Sessions emit raw issue strings every frame. This crate turns them into
//! something a person can listen to:
//! - `FeedbackEngine`: persistence window, global cooldown and repeat
//!   suppression
//! - `IssueSummary`: per-issue totals for a finished recording
//! - `SpeechDispatcher`: fire-and-forget delivery to a `Speaker`

pub mod engine;
pub mod speech;
pub mod summary;

pub use engine::*;
pub use speech::*;
pub use summary::*;
