//! Bicep curl: reps from one arm's elbow angle

use std::time::Duration;

use gymcoach_core::{
    angle, angle_between, ExerciseKind, FrameTime, Point2, PoseLandmark, PoseObservation, Side,
};

use crate::session::missing;
use crate::{
    BicepCurlConfig, BicepCurlDiagnostics, Diagnostics, ExerciseSession, FrameResult,
    MissingReason, Phase, RepCounter, RepEvent, RepScratch, SessionConfig, SessionCore,
};

pub const ELBOW_NOT_VISIBLE: &str = "Elbow not clearly visible.";
pub const EXTEND_FULLY: &str = "Fully extend your arm at the bottom of each rep.";
pub const CURL_HIGHER: &str = "Curl higher, bring your hand closer to your shoulder.";
pub const SHOULDER_SWING: &str = "Avoid swinging your shoulder; keep your upper arm stable.";
pub const WRIST_BENT: &str = "Keep your wrist neutral, avoid excessive bending while curling.";

const LEFT_ARM: &[PoseLandmark] = &[
    PoseLandmark::LeftShoulder,
    PoseLandmark::LeftElbow,
    PoseLandmark::LeftWrist,
];
const RIGHT_ARM: &[PoseLandmark] = &[
    PoseLandmark::RightShoulder,
    PoseLandmark::RightElbow,
    PoseLandmark::RightWrist,
];

#[derive(Debug, Clone)]
pub struct BicepCurlSession {
    core: SessionCore,
    counter: RepCounter,
    /// Elbow angle range since the last completed rep
    scratch: RepScratch,
    /// Shoulder position on the first usable frame
    ref_shoulder: Option<Point2>,
    config: BicepCurlConfig,
}

impl BicepCurlSession {
    pub fn new(config: &SessionConfig) -> Self {
        let curl = config.bicep_curl.clone();
        Self {
            core: SessionCore::new(config),
            counter: RepCounter::falling(curl.top_angle, curl.bottom_angle)
                .with_phases(Phase::Extended, Phase::Flexed),
            scratch: RepScratch::default(),
            ref_shoulder: None,
            config: curl,
        }
    }

    pub fn side(&self) -> Side {
        self.config.side
    }

    fn evaluate(&mut self, pose: &PoseObservation) -> FrameResult {
        let side = self.config.side;
        let shoulder = pose.point(side.shoulder());
        let elbow = pose.point(side.elbow());
        let wrist = pose.point(side.wrist());

        let ref_shoulder = *self.ref_shoulder.get_or_insert(shoulder);

        let Some(elbow_angle) = angle(shoulder, elbow, wrist) else {
            return missing(
                self.counter.reps(),
                ELBOW_NOT_VISIBLE,
                MissingReason::UndefinedAngle,
            );
        };
        let elbow_angle = self.core.track(elbow_angle);
        self.scratch.observe(elbow_angle);

        let mut issues = Vec::new();

        match self.counter.update(elbow_angle) {
            RepEvent::Completed => {
                if self.scratch.max.is_some_and(|m| m < self.config.min_extension_angle) {
                    issues.push(EXTEND_FULLY.to_string());
                }
                if self.scratch.min.is_some_and(|m| m > self.config.max_contraction_angle) {
                    issues.push(CURL_HIGHER.to_string());
                }
                self.scratch.reset();
            }
            RepEvent::Shallow(deepest) if deepest > self.config.max_contraction_angle => {
                issues.push(CURL_HIGHER.to_string());
            }
            RepEvent::Incomplete(highest) if highest < self.config.min_extension_angle => {
                issues.push(EXTEND_FULLY.to_string());
            }
            _ => {}
        }

        let shoulder_dx = shoulder.x - ref_shoulder.x;
        let shoulder_dy = shoulder.y - ref_shoulder.y;
        if shoulder_dy.abs() > self.config.max_shoulder_dy
            || shoulder_dx.abs() > self.config.max_shoulder_dx
        {
            issues.push(SHOULDER_SWING.to_string());
        }

        let wrist_bend_deg = angle_between(wrist - elbow, Point2::UP);
        if (wrist_bend_deg - 90.0).abs() > self.config.max_wrist_bend_deg {
            issues.push(WRIST_BENT.to_string());
        }

        FrameResult::new(
            self.counter.reps(),
            issues,
            Diagnostics::BicepCurl(BicepCurlDiagnostics {
                elbow_angle,
                state: self.counter.phase(),
                shoulder_dx,
                shoulder_dy,
                wrist_bend_deg,
            }),
        )
    }
}

impl ExerciseSession for BicepCurlSession {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::BicepCurl
    }

    fn update(&mut self, pose: Option<&PoseObservation>, now: FrameTime) -> FrameResult {
        self.core.tick(now);
        let required = self.required_landmarks();
        match self.core.gate(pose, required) {
            Ok(pose) => self.evaluate(pose),
            Err(reason) => missing(self.counter.reps(), ELBOW_NOT_VISIBLE, reason),
        }
    }

    fn rep_count(&self) -> u32 {
        self.counter.reps()
    }

    fn phase(&self) -> Phase {
        self.counter.phase()
    }

    fn required_landmarks(&self) -> &[PoseLandmark] {
        match self.config.side {
            Side::Left => LEFT_ARM,
            Side::Right => RIGHT_ARM,
        }
    }

    fn elapsed(&self) -> Duration {
        self.core.elapsed()
    }
}
