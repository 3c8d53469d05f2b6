//! Push-up: reps from the average elbow angle

use std::time::Duration;

use gymcoach_core::{
    vertical_offset_from_line, ExerciseKind, FrameTime, PoseLandmark, PoseObservation,
};
use gymcoach_features::JointAngles;

use crate::session::missing;
use crate::{
    Diagnostics, ExerciseSession, FrameResult, MissingReason, Phase, PushupConfig,
    PushupDiagnostics, RepCounter, RepEvent, RepScratch, SessionConfig, SessionCore,
};

pub const ELBOWS_NOT_VISIBLE: &str = "Elbows not clearly visible.";
pub const GO_LOWER: &str = "Go lower, bend your elbows more for full push-ups.";
pub const PIKING: &str = "Avoid piking, lower your hips to form a straight line.";
pub const SAGGING: &str = "Avoid sagging, tighten your core and lift your hips slightly.";
pub const HANDS_TOO_CLOSE: &str = "Hands are too close, place them slightly wider than shoulders.";
pub const HANDS_TOO_WIDE: &str = "Hands are too wide, bring them closer to shoulder-width.";

const REQUIRED: &[PoseLandmark] = &[
    PoseLandmark::LeftShoulder,
    PoseLandmark::RightShoulder,
    PoseLandmark::LeftElbow,
    PoseLandmark::RightElbow,
    PoseLandmark::LeftWrist,
    PoseLandmark::RightWrist,
    PoseLandmark::LeftHip,
    PoseLandmark::RightHip,
    PoseLandmark::LeftAnkle,
    PoseLandmark::RightAnkle,
];

#[derive(Debug, Clone)]
pub struct PushupSession {
    core: SessionCore,
    counter: RepCounter,
    /// Lowest elbow angle since entering the bottom
    scratch: RepScratch,
    config: PushupConfig,
}

impl PushupSession {
    pub fn new(config: &SessionConfig) -> Self {
        let pushup = config.pushup.clone();
        Self {
            core: SessionCore::new(config),
            counter: RepCounter::falling(pushup.bottom_angle, pushup.top_angle),
            scratch: RepScratch::default(),
            config: pushup,
        }
    }

    fn evaluate(&mut self, pose: &PoseObservation) -> FrameResult {
        use PoseLandmark::*;

        let angles = JointAngles::from_pose(pose);
        let Some(elbow_angle) = angles.avg_elbow() else {
            return missing(
                self.counter.reps(),
                ELBOWS_NOT_VISIBLE,
                MissingReason::UndefinedAngle,
            );
        };
        let elbow_angle = self.core.track(elbow_angle);

        let mut issues = Vec::new();

        if self.counter.is_active() {
            self.scratch.observe(elbow_angle);
        }
        match self.counter.update(elbow_angle) {
            RepEvent::Entered => {
                self.scratch.reset();
                self.scratch.observe(elbow_angle);
            }
            RepEvent::Completed => {
                if self.scratch.min.is_some_and(|m| m > self.config.min_depth_angle) {
                    issues.push(GO_LOWER.to_string());
                }
                self.scratch.reset();
            }
            RepEvent::Shallow(deepest) => {
                if deepest > self.config.min_depth_angle {
                    issues.push(GO_LOWER.to_string());
                }
            }
            RepEvent::Incomplete(_) | RepEvent::None => {}
        }

        let hip_offset = vertical_offset_from_line(
            pose.center(LeftHip, RightHip),
            pose.center(LeftShoulder, RightShoulder),
            pose.center(LeftAnkle, RightAnkle),
        );
        if hip_offset < self.config.hip_high_offset {
            issues.push(PIKING.to_string());
        } else if hip_offset > self.config.hip_low_offset {
            issues.push(SAGGING.to_string());
        }

        let shoulder_width = (pose.point(RightShoulder).x - pose.point(LeftShoulder).x).abs();
        let hand_width = (pose.point(RightWrist).x - pose.point(LeftWrist).x).abs();
        let hand_width_ratio = (shoulder_width > 0.0).then(|| hand_width / shoulder_width);
        match hand_width_ratio {
            Some(r) if r < self.config.min_hand_width_factor => {
                issues.push(HANDS_TOO_CLOSE.to_string())
            }
            Some(r) if r > self.config.max_hand_width_factor => {
                issues.push(HANDS_TOO_WIDE.to_string())
            }
            _ => {}
        }

        FrameResult::new(
            self.counter.reps(),
            issues,
            Diagnostics::Pushup(PushupDiagnostics {
                elbow_angle,
                state: self.counter.phase(),
                hip_offset,
                shoulder_width,
                hand_width,
                hand_width_ratio,
            }),
        )
    }
}

impl ExerciseSession for PushupSession {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::Pushup
    }

    fn update(&mut self, pose: Option<&PoseObservation>, now: FrameTime) -> FrameResult {
        self.core.tick(now);
        match self.core.gate(pose, REQUIRED) {
            Ok(pose) => self.evaluate(pose),
            Err(reason) => missing(self.counter.reps(), ELBOWS_NOT_VISIBLE, reason),
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
