//! Idle detection
//!
//! Standing upright or sitting still is not exercise. The check runs before
//! any phase logic so an idle subject never advances a rep counter.

use serde::{Deserialize, Serialize};

use gymcoach_core::{ExerciseKind, PoseObservation};
use gymcoach_features::JointAngles;

use crate::{Diagnostics, ExerciseSession, FrameResult};

pub const IDLE_ISSUE: &str = "No exercise detected. Start exercising.";

/// Standing/sitting angle thresholds in degrees
///
/// Applied only while the session rests between reps. A session in its
/// mid-rep phase (`Phase::in_rep`) bypasses the filter, so the frame that
/// returns to a standing or seated profile can still complete the rep
/// instead of being reported as idle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleThresholds {
    pub standing_knee: f32,
    pub standing_hip: f32,
    pub sitting_knee: f32,
    pub sitting_hip: f32,
    /// Exercises never considered idle
    pub exempt: Vec<ExerciseKind>,
}

impl Default for IdleThresholds {
    fn default() -> Self {
        Self {
            standing_knee: 155.0,
            standing_hip: 155.0,
            sitting_knee: 120.0,
            sitting_hip: 150.0,
            exempt: vec![ExerciseKind::Plank],
        }
    }
}

/// Whether the subject is standing or sitting still
///
/// Exempt exercises are never idle; by default that is plank, which holds
/// a straight-body profile. Undefined angles report "not idle" so the
/// session applies its own missing-joint policy.
pub fn is_idle(
    avg_knee: Option<f32>,
    avg_hip: Option<f32>,
    exercise: ExerciseKind,
    thresholds: &IdleThresholds,
) -> bool {
    if thresholds.exempt.contains(&exercise) {
        return false;
    }
    let (Some(knee), Some(hip)) = (avg_knee, avg_hip) else {
        return false;
    };

    let standing = knee > thresholds.standing_knee && hip > thresholds.standing_hip;
    let sitting = knee < thresholds.sitting_knee && hip > thresholds.sitting_hip;
    standing || sitting
}

/// Idle short-circuit for a session: `Some(result)` when the frame is idle
///
/// Skipped while the session is mid-rep, so returning to a standing
/// position still completes the repetition.
pub fn check_idle(
    session: &dyn ExerciseSession,
    pose: &PoseObservation,
    thresholds: &IdleThresholds,
) -> Option<FrameResult> {
    if session.phase().in_rep() {
        return None;
    }

    let angles = JointAngles::from_pose(pose);
    let (knee, hip) = (angles.avg_knee(), angles.avg_hip());

    if !is_idle(knee, hip, session.kind(), thresholds) {
        return None;
    }

    Some(FrameResult::new(
        session.rep_count(),
        vec![IDLE_ISSUE.to_string()],
        Diagnostics::Idle {
            avg_knee: knee.unwrap_or(0.0),
            avg_hip: hip.unwrap_or(0.0),
        },
    ))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::PoseBuilder;
    use crate::{MissingReason, Phase};
    use gymcoach_core::{FrameTime, Point2, PoseLandmark};

    struct FixedPhase(Phase);

    impl ExerciseSession for FixedPhase {
        fn kind(&self) -> ExerciseKind {
            ExerciseKind::Squat
        }

        fn update(&mut self, _pose: Option<&PoseObservation>, _now: FrameTime) -> FrameResult {
            FrameResult::missing(0, IDLE_ISSUE, MissingReason::NoPose)
        }

        fn rep_count(&self) -> u32 {
            0
        }

        fn phase(&self) -> Phase {
            self.0
        }

        fn required_landmarks(&self) -> &[PoseLandmark] {
            &[]
        }

        fn elapsed(&self) -> Duration {
            Duration::ZERO
        }
    }

    fn standing() -> PoseObservation {
        use PoseLandmark::*;

        PoseBuilder::new()
            .pair(LeftShoulder, RightShoulder, Point2::new(0.5, 0.3), 0.05)
            .pair(LeftHip, RightHip, Point2::new(0.5, 0.5), 0.05)
            .pair(LeftKnee, RightKnee, Point2::new(0.5, 0.7), 0.05)
            .pair(LeftAnkle, RightAnkle, Point2::new(0.5, 0.9), 0.05)
            .build()
    }

    #[test]
    fn test_check_idle_skipped_mid_rep() {
        let t = IdleThresholds::default();
        let pose = standing();

        let resting = check_idle(&FixedPhase(Phase::Top), &pose, &t);
        assert_eq!(resting.map(|r| r.issues), Some(vec![IDLE_ISSUE.to_string()]));
        assert!(check_idle(&FixedPhase(Phase::Bottom), &pose, &t).is_none());
    }

    #[test]
    fn test_standing_is_idle() {
        let t = IdleThresholds::default();
        assert!(is_idle(Some(170.0), Some(170.0), ExerciseKind::Squat, &t));
        assert!(!is_idle(Some(170.0), Some(170.0), ExerciseKind::Plank, &t));
    }

    #[test]
    fn test_sitting_is_idle() {
        let t = IdleThresholds::default();
        assert!(is_idle(Some(90.0), Some(160.0), ExerciseKind::Deadlift, &t));
        // Lat pulldown is seated but keeps the generic thresholds
        assert!(is_idle(Some(90.0), Some(160.0), ExerciseKind::LatPulldown, &t));
    }

    #[test]
    fn test_mid_movement_not_idle() {
        let t = IdleThresholds::default();
        assert!(!is_idle(Some(100.0), Some(90.0), ExerciseKind::Squat, &t));
        assert!(!is_idle(Some(140.0), Some(170.0), ExerciseKind::Squat, &t));
    }

    #[test]
    fn test_configurable_exemptions() {
        let t = IdleThresholds {
            exempt: vec![ExerciseKind::BicepCurl],
            ..Default::default()
        };
        assert!(!is_idle(Some(170.0), Some(170.0), ExerciseKind::BicepCurl, &t));
        assert!(is_idle(Some(170.0), Some(170.0), ExerciseKind::Plank, &t));
    }

    #[test]
    fn test_undefined_angles_not_idle() {
        let t = IdleThresholds::default();
        assert!(!is_idle(None, Some(170.0), ExerciseKind::Squat, &t));
        assert!(!is_idle(Some(170.0), None, ExerciseKind::Squat, &t));
    }
}
