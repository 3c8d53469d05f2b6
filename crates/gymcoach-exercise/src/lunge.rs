//! Forward lunge: reps from the front knee angle

use std::time::Duration;

use gymcoach_core::{
    angle, inclination, ExerciseKind, FrameTime, Point2, PoseLandmark, PoseObservation, Side,
};

use crate::session::missing;
use crate::{
    Diagnostics, ExerciseSession, FrameResult, LungeConfig, LungeDiagnostics, MissingReason,
    Phase, RepCounter, SessionConfig, SessionCore,
};

pub const FRONT_KNEE_NOT_VISIBLE: &str = "Front knee not clearly visible.";
pub const KNEE_OVER_TOE: &str = "Keep your front knee behind your toes when lowering.";
pub const KNEE_VALGUS: &str = "Avoid knee valgus, keep your knee tracking straight.";
pub const TORSO_LEAN: &str = "Keep your torso upright; avoid leaning too far forward.";
pub const LATERAL_SWAY: &str = "Try to stay balanced, reduce side-to-side movement.";

const LEFT_FRONT: &[PoseLandmark] = &[
    PoseLandmark::LeftShoulder,
    PoseLandmark::RightShoulder,
    PoseLandmark::LeftHip,
    PoseLandmark::LeftKnee,
    PoseLandmark::LeftAnkle,
];
const RIGHT_FRONT: &[PoseLandmark] = &[
    PoseLandmark::LeftShoulder,
    PoseLandmark::RightShoulder,
    PoseLandmark::RightHip,
    PoseLandmark::RightKnee,
    PoseLandmark::RightAnkle,
];

#[derive(Debug, Clone)]
pub struct LungeSession {
    core: SessionCore,
    counter: RepCounter,
    ref_shoulder_center: Option<Point2>,
    config: LungeConfig,
}

impl LungeSession {
    pub fn new(config: &SessionConfig) -> Self {
        let lunge = config.lunge.clone();
        Self {
            core: SessionCore::new(config),
            counter: RepCounter::falling(lunge.bottom_angle, lunge.top_angle),
            ref_shoulder_center: None,
            config: lunge,
        }
    }

    /// Leg stepping forward
    pub fn front_side(&self) -> Side {
        self.config.side
    }

    fn evaluate(&mut self, pose: &PoseObservation) -> FrameResult {
        let side = self.config.side;
        let shoulder_center = pose.center(PoseLandmark::LeftShoulder, PoseLandmark::RightShoulder);
        let ref_center = *self.ref_shoulder_center.get_or_insert(shoulder_center);

        let hip = pose.point(side.hip());
        let knee = pose.point(side.knee());
        let ankle = pose.point(side.ankle());

        let Some(front_knee_angle) = angle(hip, knee, ankle) else {
            return missing(
                self.counter.reps(),
                FRONT_KNEE_NOT_VISIBLE,
                MissingReason::UndefinedAngle,
            );
        };
        let front_knee_angle = self.core.track(front_knee_angle);
        self.counter.update(front_knee_angle);

        let mut issues = Vec::new();

        let knee_over_toe_offset = (knee.x - ankle.x).abs();
        if knee_over_toe_offset > self.config.max_knee_over_toe_offset {
            issues.push(KNEE_OVER_TOE.to_string());
        }

        // Signed: negative when the knee sits right of the hip-ankle midline
        let knee_valgus_offset = (hip.x + ankle.x) / 2.0 - knee.x;
        if knee_valgus_offset.abs() > self.config.max_knee_valgus_offset {
            issues.push(KNEE_VALGUS.to_string());
        }

        let torso_angle_deg = inclination(hip - shoulder_center).unwrap_or(0.0);
        if torso_angle_deg > self.config.max_torso_lean_deg {
            issues.push(TORSO_LEAN.to_string());
        }

        let lateral_sway = (shoulder_center.x - ref_center.x).abs();
        if lateral_sway > self.config.max_lateral_sway {
            issues.push(LATERAL_SWAY.to_string());
        }

        FrameResult::new(
            self.counter.reps(),
            issues,
            Diagnostics::Lunge(LungeDiagnostics {
                front_knee_angle,
                state: self.counter.phase(),
                knee_over_toe_offset,
                knee_valgus_offset,
                torso_angle_deg,
                lateral_sway,
            }),
        )
    }
}

impl ExerciseSession for LungeSession {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::Lunge
    }

    fn update(&mut self, pose: Option<&PoseObservation>, now: FrameTime) -> FrameResult {
        self.core.tick(now);
        let required = self.required_landmarks();
        match self.core.gate(pose, required) {
            Ok(pose) => self.evaluate(pose),
            Err(reason) => missing(self.counter.reps(), FRONT_KNEE_NOT_VISIBLE, reason),
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
            Side::Left => LEFT_FRONT,
            Side::Right => RIGHT_FRONT,
        }
    }

    fn elapsed(&self) -> Duration {
        self.core.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at_angle, PoseBuilder};

    /// Vertical front shin; torso above the hip shifted by `lean_x`,
    /// shoulders shifted sideways by `sway`
    fn lunge_pose(knee_deg: f32, lean_x: f32, sway: f32) -> PoseObservation {
        use PoseLandmark::*;

        let knee = Point2::new(0.5, 0.7);
        let ankle = Point2::new(0.5, 0.9);
        let hip = at_angle(ankle, knee, knee_deg, 0.2);
        let shoulders = Point2::new(hip.x + lean_x + sway, hip.y - 0.3);

        PoseBuilder::new()
            .pair(LeftShoulder, RightShoulder, shoulders, 0.05)
            .pair(LeftHip, RightHip, hip, 0.0)
            .pair(LeftKnee, RightKnee, knee, 0.0)
            .pair(LeftAnkle, RightAnkle, ankle, 0.0)
            .build()
    }

    #[test]
    fn test_lunge_rep() {
        let mut s = LungeSession::new(&SessionConfig::default());
        for deg in [175.0, 130.0, 85.0, 130.0, 170.0] {
            s.update(Some(&lunge_pose(deg, 0.0, 0.0)), FrameTime::ZERO);
        }
        assert_eq!(s.rep_count(), 1);
        assert_eq!(s.phase(), Phase::Top);
    }

    #[test]
    fn test_standing_is_clean() {
        let mut s = LungeSession::new(&SessionConfig::default());
        let r = s.update(Some(&lunge_pose(170.0, 0.0, 0.0)), FrameTime::ZERO);
        assert!(r.issues.is_empty(), "{:?}", r.issues);
    }

    #[test]
    fn test_torso_lean() {
        let mut s = LungeSession::new(&SessionConfig::default());
        let r = s.update(Some(&lunge_pose(170.0, 0.3, 0.0)), FrameTime::ZERO);
        assert!(r.issues.iter().any(|i| i == TORSO_LEAN));
        assert!(!r.issues.iter().any(|i| i == LATERAL_SWAY));
    }

    #[test]
    fn test_sway_against_first_frame() {
        let mut s = LungeSession::new(&SessionConfig::default());
        s.update(Some(&lunge_pose(170.0, 0.0, 0.0)), FrameTime::ZERO);
        let r = s.update(Some(&lunge_pose(170.0, 0.0, 0.1)), FrameTime::ZERO);
        assert!(r.issues.iter().any(|i| i == LATERAL_SWAY));
    }

    #[test]
    fn test_knee_over_toe() {
        let mut s = LungeSession::new(&SessionConfig::default());
        let mut pose = lunge_pose(170.0, 0.0, 0.0);
        pose.landmark_mut(PoseLandmark::RightAnkle).x = 0.35;
        let r = s.update(Some(&pose), FrameTime::ZERO);
        assert!(r.issues.iter().any(|i| i == KNEE_OVER_TOE));
    }

    #[test]
    fn test_back_leg_occlusion_is_ignored() {
        let mut s = LungeSession::new(&SessionConfig::default());
        let mut pose = lunge_pose(170.0, 0.0, 0.0);
        pose.landmark_mut(PoseLandmark::LeftKnee).visibility = 0.0;
        assert!(!s.update(Some(&pose), FrameTime::ZERO).is_missing());
    }
}
