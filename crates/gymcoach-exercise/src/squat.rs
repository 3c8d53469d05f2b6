//! Squat: reps from the average knee angle

use std::time::Duration;

use gymcoach_core::{vector_angle, ExerciseKind, FrameTime, Point2, PoseLandmark, PoseObservation};
use gymcoach_features::JointAngles;

use crate::session::missing;
use crate::{
    Diagnostics, ExerciseSession, FrameResult, MissingReason, Phase, RepCounter, SessionConfig,
    SessionCore, SquatConfig, SquatDiagnostics,
};

pub const KNEES_NOT_VISIBLE: &str = "Knee joints not clearly visible.";
pub const GO_DEEPER: &str = "Go deeper, bend your knees more for a full squat.";
pub const LEANING_FORWARD: &str = "Keep your chest more upright, avoid leaning too far forward.";
pub const KNEE_ASYMMETRY: &str =
    "Keep both knees moving symmetrically, avoid letting one knee cave in.";

const REQUIRED: &[PoseLandmark] = &[
    PoseLandmark::LeftShoulder,
    PoseLandmark::RightShoulder,
    PoseLandmark::LeftHip,
    PoseLandmark::RightHip,
    PoseLandmark::LeftKnee,
    PoseLandmark::RightKnee,
    PoseLandmark::LeftAnkle,
    PoseLandmark::RightAnkle,
];

#[derive(Debug, Clone)]
pub struct SquatSession {
    core: SessionCore,
    counter: RepCounter,
    config: SquatConfig,
}

impl SquatSession {
    pub fn new(config: &SessionConfig) -> Self {
        let squat = config.squat.clone();
        Self {
            core: SessionCore::new(config),
            counter: RepCounter::falling(squat.down_angle, squat.up_angle),
            config: squat,
        }
    }

    fn evaluate(&mut self, pose: &PoseObservation) -> FrameResult {
        use PoseLandmark::*;

        let angles = JointAngles::from_pose(pose);
        let (Some(left), Some(right)) = (angles.knee_left, angles.knee_right) else {
            return missing(
                self.counter.reps(),
                KNEES_NOT_VISIBLE,
                MissingReason::UndefinedAngle,
            );
        };

        let knee_angle = self.core.track((left + right) / 2.0);
        self.counter.update(knee_angle);

        let mut issues = Vec::new();

        if knee_angle > self.config.depth_angle {
            issues.push(GO_DEEPER.to_string());
        }

        let torso = pose.center(LeftShoulder, RightShoulder) - pose.center(LeftHip, RightHip);
        let torso_angle = vector_angle(torso, Point2::UP);
        if torso_angle.is_some_and(|a| a > self.config.max_forward_lean_deg) {
            issues.push(LEANING_FORWARD.to_string());
        }

        let knee_diff = (left - right).abs();
        if knee_diff > self.config.max_knee_asymmetry_deg {
            issues.push(KNEE_ASYMMETRY.to_string());
        }

        FrameResult::new(
            self.counter.reps(),
            issues,
            Diagnostics::Squat(SquatDiagnostics {
                knee_angle,
                state: self.counter.phase(),
                torso_angle_from_vertical: torso_angle,
                knee_angle_diff: knee_diff,
            }),
        )
    }
}

impl ExerciseSession for SquatSession {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::Squat
    }

    fn update(&mut self, pose: Option<&PoseObservation>, now: FrameTime) -> FrameResult {
        self.core.tick(now);
        match self.core.gate(pose, REQUIRED) {
            Ok(pose) => self.evaluate(pose),
            Err(reason) => missing(self.counter.reps(), KNEES_NOT_VISIBLE, reason),
        }
    }

    fn rep_count(&self) -> u32 {
        self.counter.reps()
    }

    fn phase(&self) -> Phase {
        self.counter.phase()
    }

    fn required_landmarks(&self) -> &[PoseLandmark] {
        REQUIRED
    }

    fn elapsed(&self) -> Duration {
        self.core.elapsed()
    }
}
