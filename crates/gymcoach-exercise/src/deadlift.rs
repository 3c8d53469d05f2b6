//! Deadlift: reps from the average hip angle

use std::time::Duration;

use gymcoach_core::{angle_between, ExerciseKind, FrameTime, PoseLandmark, PoseObservation};
use gymcoach_features::JointAngles;

use crate::session::missing;
use crate::{
    DeadliftConfig, DeadliftDiagnostics, Diagnostics, ExerciseSession, FrameResult,
    MissingReason, Phase, RepCounter, SessionConfig, SessionCore,
};

pub const JOINTS_NOT_VISIBLE: &str = "Key joints not clearly visible.";
pub const ROUNDED_BACK: &str = "Keep a neutral spine, avoid rounding your back during the lift.";
pub const TOO_SQUATTY: &str = "Push your hips back more, avoid turning deadlifts into squats.";
pub const BAR_AWAY: &str = "Keep the bar closer to your body, slide it along your legs and shins.";
pub const KNEES_FORWARD: &str =
    "Avoid pushing your knees too far forward; focus on hinging at the hips.";

const REQUIRED: &[PoseLandmark] = &[
    PoseLandmark::LeftShoulder,
    PoseLandmark::RightShoulder,
    PoseLandmark::LeftWrist,
    PoseLandmark::RightWrist,
    PoseLandmark::LeftHip,
    PoseLandmark::RightHip,
    PoseLandmark::LeftKnee,
    PoseLandmark::RightKnee,
    PoseLandmark::LeftAnkle,
    PoseLandmark::RightAnkle,
];

#[derive(Debug, Clone)]
pub struct DeadliftSession {
    core: SessionCore,
    counter: RepCounter,
    config: DeadliftConfig,
}

impl DeadliftSession {
    pub fn new(config: &SessionConfig) -> Self {
        let deadlift = config.deadlift.clone();
        Self {
            core: SessionCore::new(config),
            counter: RepCounter::falling(deadlift.bottom_hip_angle, deadlift.top_hip_angle),
            config: deadlift,
        }
    }

    fn evaluate(&mut self, pose: &PoseObservation) -> FrameResult {
        use PoseLandmark::*;

        let angles = JointAngles::from_pose(pose);
        let (Some(hip_angle), Some(knee_angle)) = (angles.avg_hip(), angles.avg_knee()) else {
            return missing(
                self.counter.reps(),
                JOINTS_NOT_VISIBLE,
                MissingReason::UndefinedAngle,
            );
        };

        let hip_angle = self.core.track(hip_angle);
        self.counter.update(hip_angle);

        let shoulder_center = pose.center(LeftShoulder, RightShoulder);
        let hip_center = pose.center(LeftHip, RightHip);
        let knee_center = pose.center(LeftKnee, RightKnee);
        let ankle_center = pose.center(LeftAnkle, RightAnkle);
        let hand_center = pose.center(LeftWrist, RightWrist);

        let mut issues = Vec::new();

        // Torso direction against the hip-ankle body line
        let spine_angle_deg =
            angle_between(hip_center - shoulder_center, ankle_center - hip_center);
        if spine_angle_deg > self.config.max_back_round_deg {
            issues.push(ROUNDED_BACK.to_string());
        }

        if knee_angle < self.config.min_knee_angle {
            issues.push(TOO_SQUATTY.to_string());
        }

        let bar_distance = hand_center.distance(ankle_center);
        if bar_distance > self.config.max_bar_distance {
            issues.push(BAR_AWAY.to_string());
        }

        let knee_forward_offset = (knee_center.x - ankle_center.x).abs();
        if knee_forward_offset > self.config.max_knee_forward {
            issues.push(KNEES_FORWARD.to_string());
        }

        FrameResult::new(
            self.counter.reps(),
            issues,
            Diagnostics::Deadlift(DeadliftDiagnostics {
                hip_angle,
                knee_angle,
                state: self.counter.phase(),
                spine_angle_deg,
                bar_distance,
                knee_forward_offset,
            }),
        )
    }
}

impl ExerciseSession for DeadliftSession {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::Deadlift
    }

    fn update(&mut self, pose: Option<&PoseObservation>, now: FrameTime) -> FrameResult {
        self.core.tick(now);
        match self.core.gate(pose, REQUIRED) {
            Ok(pose) => self.evaluate(pose),
            Err(reason) => missing(self.counter.reps(), JOINTS_NOT_VISIBLE, reason),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at_angle, PoseBuilder};
    use gymcoach_core::Point2;

    /// Side-on hinge with straight legs; the torso pivots at the hip
    fn hinge_pose(hip_deg: f32) -> PoseObservation {
        use PoseLandmark::*;

        let hip = Point2::new(0.5, 0.5);
        let knee = Point2::new(0.5, 0.7);
        let ankle = Point2::new(0.5, 0.9);
        let shoulder = at_angle(knee, hip, hip_deg, 0.3);
        // Hands hang straight down from the shoulders, near the shins
        let hands = Point2::new(0.5, 0.82);

        PoseBuilder::new()
            .pair(LeftShoulder, RightShoulder, shoulder, 0.0)
            .pair(LeftHip, RightHip, hip, 0.0)
            .pair(LeftKnee, RightKnee, knee, 0.0)
            .pair(LeftAnkle, RightAnkle, ankle, 0.0)
            .pair(LeftWrist, RightWrist, hands, 0.0)
            .build()
    }

    #[test]
    fn test_hinge_rep() {
        let mut s = DeadliftSession::new(&SessionConfig::default());
        for deg in [175.0, 120.0, 65.0, 120.0, 175.0] {
            s.update(Some(&hinge_pose(deg)), FrameTime::ZERO);
        }
        assert_eq!(s.rep_count(), 1);
    }

    #[test]
    fn test_upright_is_clean() {
        let mut s = DeadliftSession::new(&SessionConfig::default());
        let r = s.update(Some(&hinge_pose(179.0)), FrameTime::ZERO);
        assert!(r.issues.is_empty(), "{:?}", r.issues);
    }

    #[test]
    fn test_hinged_torso_flags_spine() {
        let mut s = DeadliftSession::new(&SessionConfig::default());
        let r = s.update(Some(&hinge_pose(90.0)), FrameTime::ZERO);
        assert!(r.issues.iter().any(|i| i == ROUNDED_BACK));
        assert!(!r.issues.iter().any(|i| i == TOO_SQUATTY));
    }

    #[test]
    fn test_bar_far_from_legs() {
        let mut s = DeadliftSession::new(&SessionConfig::default());
        let mut pose = hinge_pose(179.0);
        pose.landmark_mut(PoseLandmark::LeftWrist).x = 0.8;
        pose.landmark_mut(PoseLandmark::RightWrist).x = 0.8;
        let r = s.update(Some(&pose), FrameTime::ZERO);
        assert!(r.issues.iter().any(|i| i == BAR_AWAY));
    }
}
