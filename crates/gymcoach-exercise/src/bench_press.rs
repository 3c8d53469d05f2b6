//! Bench press: reps from the average elbow angle, bar path from the wrists

use std::time::Duration;

use gymcoach_core::{angle_between, ExerciseKind, FrameTime, Point2, PoseLandmark, PoseObservation};
use gymcoach_features::JointAngles;

use crate::session::missing;
use crate::{
    BenchPressConfig, BenchPressDiagnostics, Diagnostics, ExerciseSession, FrameResult,
    MissingReason, Phase, RepCounter, RepEvent, RepScratch, SessionConfig, SessionCore,
};

pub const ELBOWS_NOT_VISIBLE: &str = "Elbows not clearly visible.";
pub const LOWER_THE_BAR: &str = "Lower the bar more for a full range of motion.";
pub const BAR_TO_CHEST: &str = "Bring the bar closer to your chest at the bottom of the rep.";
pub const ELBOW_FLARE: &str = "Tuck your elbows slightly, avoid excessive flaring out to the sides.";
pub const BAR_PATH: &str = "Press the bar in a more controlled, straight path over your mid-chest.";

const REQUIRED: &[PoseLandmark] = &[
    PoseLandmark::LeftShoulder,
    PoseLandmark::RightShoulder,
    PoseLandmark::LeftElbow,
    PoseLandmark::RightElbow,
    PoseLandmark::LeftWrist,
    PoseLandmark::RightWrist,
];

#[derive(Debug, Clone)]
pub struct BenchPressSession {
    core: SessionCore,
    counter: RepCounter,
    elbow_range: RepScratch,
    bar_drop_range: RepScratch,
    /// Hand midline x on the first usable frame
    ref_hand_x: Option<f32>,
    config: BenchPressConfig,
}

impl BenchPressSession {
    pub fn new(config: &SessionConfig) -> Self {
        let bench = config.bench_press.clone();
        Self {
            core: SessionCore::new(config),
            counter: RepCounter::falling(bench.bottom_angle, bench.top_angle),
            elbow_range: RepScratch::default(),
            bar_drop_range: RepScratch::default(),
            ref_hand_x: None,
            config: bench,
        }
    }

    fn evaluate(&mut self, pose: &PoseObservation) -> FrameResult {
        use PoseLandmark::*;

        let shoulder_center = pose.center(LeftShoulder, RightShoulder);
        let hand_center = pose.center(LeftWrist, RightWrist);
        let ref_hand_x = *self.ref_hand_x.get_or_insert(hand_center.x);

        let Some(elbow_angle) = JointAngles::from_pose(pose).avg_elbow() else {
            return missing(
                self.counter.reps(),
                ELBOWS_NOT_VISIBLE,
                MissingReason::UndefinedAngle,
            );
        };
        let elbow_angle = self.core.track(elbow_angle);
        self.elbow_range.observe(elbow_angle);

        let bar_drop = hand_center.y - shoulder_center.y;
        self.bar_drop_range.observe(bar_drop);

        let mut issues = Vec::new();

        let depth_limit = self.config.bottom_angle + self.config.depth_slack_deg;
        match self.counter.update(elbow_angle) {
            RepEvent::Completed => {
                if self.elbow_range.min.is_some_and(|m| m > depth_limit) {
                    issues.push(LOWER_THE_BAR.to_string());
                }
                if self.bar_drop_range.max.unwrap_or(0.0) < self.config.min_bar_drop {
                    issues.push(BAR_TO_CHEST.to_string());
                }
                self.elbow_range.reset();
                self.bar_drop_range.reset();
            }
            RepEvent::Shallow(deepest) => {
                if deepest > depth_limit {
                    issues.push(LOWER_THE_BAR.to_string());
                }
                self.elbow_range.reset();
                self.bar_drop_range.reset();
            }
            _ => {}
        }

        let axis = torso_axis(pose.point(LeftShoulder), pose.point(RightShoulder));
        let left_flare = angle_between(pose.point(LeftElbow) - pose.point(LeftShoulder), axis);
        let right_flare = angle_between(pose.point(RightElbow) - pose.point(RightShoulder), axis);
        let elbow_flare_deg = (left_flare + right_flare) / 2.0;
        if elbow_flare_deg > self.config.max_elbow_flare_deg {
            issues.push(ELBOW_FLARE.to_string());
        }

        let bar_horizontal_drift = (hand_center.x - ref_hand_x).abs();
        if bar_horizontal_drift > self.config.max_bar_drift {
            issues.push(BAR_PATH.to_string());
        }

        FrameResult::new(
            self.counter.reps(),
            issues,
            Diagnostics::BenchPress(BenchPressDiagnostics {
                elbow_angle,
                state: self.counter.phase(),
                bar_drop,
                elbow_flare_deg,
                bar_horizontal_drift,
            }),
        )
    }
}

/// Unit normal to the shoulder line, pointing down the image
///
/// Upper arms lying along this axis are fully tucked; arms along the
/// shoulder line are flared at 90 degrees.
fn torso_axis(left_shoulder: Point2, right_shoulder: Point2) -> Point2 {
    let line = right_shoulder - left_shoulder;
    let len = line.length();
    if len <= f32::EPSILON {
        return Point2::DOWN;
    }
    let normal = Point2::new(-line.y / len, line.x / len);
    if normal.y < 0.0 {
        Point2::new(-normal.x, -normal.y)
    } else {
        normal
    }
}

impl ExerciseSession for BenchPressSession {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::BenchPress
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at_angle, PoseBuilder};

    const LEFT_SHOULDER: Point2 = Point2 { x: 0.4, y: 0.4 };
    const RIGHT_SHOULDER: Point2 = Point2 { x: 0.6, y: 0.4 };

    /// Mirrored arms; `elbow_offset` places each elbow relative to its
    /// shoulder (right side, x mirrored for the left)
    fn bench_pose(elbow_deg: f32, elbow_offset: Point2, hand_shift: f32) -> PoseObservation {
        use PoseLandmark::*;

        let right_elbow = RIGHT_SHOULDER + elbow_offset;
        let left_elbow = LEFT_SHOULDER + Point2::new(-elbow_offset.x, elbow_offset.y);
        let right_wrist = at_angle(RIGHT_SHOULDER, right_elbow, elbow_deg, 0.15);
        let left_wrist = at_angle(LEFT_SHOULDER, left_elbow, -elbow_deg, 0.15);
        let shift = Point2::new(hand_shift, 0.0);

        PoseBuilder::new()
            .set(LeftShoulder, LEFT_SHOULDER)
            .set(RightShoulder, RIGHT_SHOULDER)
            .set(LeftElbow, left_elbow)
            .set(RightElbow, right_elbow)
            .set(LeftWrist, left_wrist + shift)
            .set(RightWrist, right_wrist + shift)
            .build()
    }

    fn tucked(elbow_deg: f32) -> PoseObservation {
        bench_pose(elbow_deg, Point2::new(0.0, 0.15), 0.0)
    }

    fn flared(elbow_deg: f32) -> PoseObservation {
        bench_pose(elbow_deg, Point2::new(0.15, 0.0), 0.0)
    }

    #[test]
    fn test_clean_rep() {
        let mut s = BenchPressSession::new(&SessionConfig::default());
        let mut last = None;
        for deg in [170.0, 100.0, 75.0, 100.0, 170.0] {
            last = Some(s.update(Some(&tucked(deg)), FrameTime::ZERO));
        }
        assert_eq!(s.rep_count(), 1);
        let last = last.unwrap();
        assert!(last.issues.is_empty(), "{:?}", last.issues);
    }

    #[test]
    fn test_range_of_motion_cue() {
        let mut cfg = SessionConfig::default();
        cfg.bench_press.bottom_angle = 100.0;
        cfg.bench_press.depth_slack_deg = -20.0;
        let mut s = BenchPressSession::new(&cfg);

        s.update(Some(&tucked(170.0)), FrameTime::ZERO);
        s.update(Some(&tucked(95.0)), FrameTime::ZERO);
        let r = s.update(Some(&tucked(170.0)), FrameTime::ZERO);
        assert_eq!(r.rep_count, 1);
        assert!(r.issues.iter().any(|i| i == LOWER_THE_BAR));
    }

    #[test]
    fn test_half_press_with_default_thresholds() {
        let mut s = BenchPressSession::new(&SessionConfig::default());
        let results: Vec<_> = [170.0, 130.0, 110.0, 170.0]
            .iter()
            .map(|deg| s.update(Some(&tucked(*deg)), FrameTime::ZERO))
            .collect();
        assert_eq!(s.rep_count(), 0);
        assert!(!results[2].issues.iter().any(|i| i == LOWER_THE_BAR));
        assert!(results[3].issues.iter().any(|i| i == LOWER_THE_BAR));
    }

    #[test]
    fn test_flare_and_shallow_bar() {
        let mut s = BenchPressSession::new(&SessionConfig::default());
        let r = s.update(Some(&flared(170.0)), FrameTime::ZERO);
        assert!(r.issues.iter().any(|i| i == ELBOW_FLARE));

        // Wrists never drop below the shoulders
        s.update(Some(&flared(75.0)), FrameTime::ZERO);
        let r = s.update(Some(&flared(170.0)), FrameTime::ZERO);
        assert_eq!(r.rep_count, 1);
        assert!(r.issues.iter().any(|i| i == BAR_TO_CHEST));
    }

    #[test]
    fn test_bar_drift() {
        let mut s = BenchPressSession::new(&SessionConfig::default());
        s.update(Some(&tucked(170.0)), FrameTime::ZERO);
        let shifted = bench_pose(170.0, Point2::new(0.0, 0.15), 0.1);
        let r = s.update(Some(&shifted), FrameTime::ZERO);
        assert!(r.issues.iter().any(|i| i == BAR_PATH));
    }

    #[test]
    fn test_torso_axis_points_down() {
        let axis = torso_axis(RIGHT_SHOULDER, LEFT_SHOULDER);
        assert!((axis.y - 1.0).abs() < 1e-6);
        assert_eq!(torso_axis(LEFT_SHOULDER, LEFT_SHOULDER), Point2::DOWN);
    }
}
