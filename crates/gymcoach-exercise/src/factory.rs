//! Session construction

use gymcoach_core::ExerciseKind;
use tracing::info;

use crate::{
    BenchPressSession, BicepCurlSession, DeadliftSession, ExerciseSession, LatPulldownSession,
    LungeSession, PlankSession, PushupSession, SessionConfig, SquatSession,
};

/// Map a free-form exercise name to its kind; `None` when unrecognized
pub fn normalize_alias(name: &str) -> Option<ExerciseKind> {
    ExerciseKind::from_alias(name)
}

/// Build a fresh session for `kind`
pub fn create_session(kind: ExerciseKind, config: &SessionConfig) -> Box<dyn ExerciseSession> {
    info!(exercise = kind.as_str(), "creating exercise session");
    match kind {
        ExerciseKind::Squat => Box::new(SquatSession::new(config)),
        ExerciseKind::Pushup => Box::new(PushupSession::new(config)),
        ExerciseKind::BicepCurl => Box::new(BicepCurlSession::new(config)),
        ExerciseKind::Deadlift => Box::new(DeadliftSession::new(config)),
        ExerciseKind::Lunge => Box::new(LungeSession::new(config)),
        ExerciseKind::Plank => Box::new(PlankSession::new(config)),
        ExerciseKind::BenchPress => Box::new(BenchPressSession::new(config)),
        ExerciseKind::LatPulldown => Box::new(LatPulldownSession::new(config)),
    }
}
