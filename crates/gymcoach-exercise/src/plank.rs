//! Plank: timed hold with a running posture score

use std::time::Duration;

use gymcoach_core::{
    angle_between, vertical_offset_from_line, ExerciseKind, FrameTime, PoseLandmark,
    PoseObservation,
};

use crate::session::missing;
use crate::{
    Diagnostics, ExerciseSession, FrameResult, Phase, PlankConfig, PlankDiagnostics,
    SessionConfig, SessionCore,
};

pub const BODY_NOT_VISIBLE: &str = "Body not clearly visible.";
pub const HIPS_TOO_HIGH: &str = "Your hips are too high, lower them to form a straight line.";
pub const HIPS_SAGGING: &str = "Your hips are sagging, lift them to keep your body straight.";
pub const SHOULDERS_OVER_ELBOWS: &str = "Align your shoulders directly above your elbows.";
pub const NECK_NEUTRAL: &str = "Keep your neck neutral, look slightly ahead or down.";

const REQUIRED: &[PoseLandmark] = &[
    PoseLandmark::Nose,
    PoseLandmark::LeftShoulder,
    PoseLandmark::RightShoulder,
    PoseLandmark::LeftElbow,
    PoseLandmark::RightElbow,
    PoseLandmark::LeftHip,
    PoseLandmark::RightHip,
    PoseLandmark::LeftAnkle,
    PoseLandmark::RightAnkle,
];

#[derive(Debug, Clone)]
pub struct PlankSession {
    core: SessionCore,
    total_penalty: f32,
    scored_frames: u32,
    posture_score: f32,
    config: PlankConfig,
}

impl PlankSession {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            core: SessionCore::new(config),
            total_penalty: 0.0,
            scored_frames: 0,
            posture_score: 100.0,
            config: config.plank.clone(),
        }
    }

    /// Score over every evaluated frame so far, `100` before the first
    pub fn posture_score(&self) -> f32 {
        self.posture_score
    }

    fn evaluate(&mut self, pose: &PoseObservation) -> FrameResult {
        use PoseLandmark::*;

        let shoulders = pose.center(LeftShoulder, RightShoulder);
        let elbows = pose.center(LeftElbow, RightElbow);
        let hips = pose.center(LeftHip, RightHip);
        let ankles = pose.center(LeftAnkle, RightAnkle);
        let nose = pose.point(Nose);

        let mut issues = Vec::new();
        let mut penalty = 0.0;

        let hip_offset = self.core.track(vertical_offset_from_line(hips, shoulders, ankles));
        if hip_offset < self.config.hip_high_offset {
            issues.push(HIPS_TOO_HIGH.to_string());
            penalty += self.config.hip_penalty;
        } else if hip_offset > self.config.hip_low_offset {
            issues.push(HIPS_SAGGING.to_string());
            penalty += self.config.hip_penalty;
        }

        let shoulder_elbow_dx = (shoulders.x - elbows.x).abs();
        if shoulder_elbow_dx > self.config.max_shoulder_elbow_dx {
            issues.push(SHOULDERS_OVER_ELBOWS.to_string());
            penalty += self.config.shoulder_penalty;
        }

        // Head direction against the hip-to-shoulder line carried past the shoulders
        let neck_angle_deg = angle_between(nose - shoulders, shoulders - hips);
        if neck_angle_deg > self.config.max_neck_angle_deg {
            issues.push(NECK_NEUTRAL.to_string());
            penalty += self.config.neck_penalty;
        }

        self.scored_frames += 1;
        self.total_penalty += penalty;
        let avg_penalty = self.total_penalty / self.scored_frames as f32;
        self.posture_score = (100.0 - avg_penalty * self.config.score_scale)
            .clamp(self.config.min_score, 100.0);

        FrameResult::new(
            0,
            issues,
            Diagnostics::Plank(PlankDiagnostics {
                elapsed_seconds: self.core.elapsed().as_secs_f64(),
                hip_offset,
                shoulder_elbow_dx,
                neck_angle_deg,
                posture_score: self.posture_score,
            }),
        )
    }
}

impl ExerciseSession for PlankSession {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::Plank
    }

    fn update(&mut self, pose: Option<&PoseObservation>, now: FrameTime) -> FrameResult {
        self.core.tick(now);
        match self.core.gate(pose, REQUIRED) {
            Ok(pose) => self.evaluate(pose),
            Err(reason) => missing(0, BODY_NOT_VISIBLE, reason),
        }
    }

    fn rep_count(&self) -> u32 {
        0
    }

    fn phase(&self) -> Phase {
        Phase::Hold
    }

    fn required_landmarks(&self) -> &[PoseLandmark] {
        REQUIRED
    }

    fn elapsed(&self) -> Duration {
        self.core.elapsed()
    }
}
