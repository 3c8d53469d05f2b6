//! Synthetic pose generation
//!
//! Builds a side-on skeleton from target joint angles. The knee, hip,
//! shoulder and elbow angles the pipeline measures come back exactly as
//! requested, so rep sequences can be scripted in degrees.
//!
//! Image coordinates: x grows to the subject's front, y grows downward.

use gymcoach_core::{Landmark, Point2, PoseLandmark, PoseObservation, LANDMARK_COUNT};

/// Target joint angles in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyAngles {
    /// Hip-knee-ankle
    pub knee: f32,
    /// Shoulder-hip-knee
    pub hip: f32,
    /// Elbow-shoulder-hip
    pub shoulder: f32,
    /// Shoulder-elbow-wrist
    pub elbow: f32,
    /// Whole-body rotation about the ankles; 90 lies face-down heading forward
    pub pitch: f32,
}

impl BodyAngles {
    /// Upright, arms hanging
    pub fn standing() -> Self {
        BodyAngles {
            knee: 175.0,
            hip: 175.0,
            shoulder: 10.0,
            elbow: 170.0,
            pitch: 0.0,
        }
    }

    /// Squat at `knee` degrees with an upright torso
    pub fn squat(knee: f32) -> Self {
        BodyAngles {
            knee,
            hip: knee,
            ..Self::standing()
        }
    }

    /// Standing curl at `elbow` degrees
    pub fn curl(elbow: f32) -> Self {
        BodyAngles {
            elbow,
            ..Self::standing()
        }
    }

    /// Forearm plank; `hip` above 180 lets the hips sag, below 180 pikes them
    pub fn plank(hip: f32) -> Self {
        BodyAngles {
            knee: 180.0,
            hip,
            shoulder: 90.0,
            elbow: 90.0,
            pitch: 90.0,
        }
    }

    /// Linear blend, `t` in `[0, 1]`
    pub fn lerp(&self, other: &BodyAngles, t: f32) -> BodyAngles {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        BodyAngles {
            knee: mix(self.knee, other.knee),
            hip: mix(self.hip, other.hip),
            shoulder: mix(self.shoulder, other.shoulder),
            elbow: mix(self.elbow, other.elbow),
            pitch: mix(self.pitch, other.pitch),
        }
    }
}

impl Default for BodyAngles {
    fn default() -> Self {
        Self::standing()
    }
}

/// Body segment lengths in normalized image units
#[derive(Clone, Debug)]
pub struct Segments {
    pub shin: f32,
    pub thigh: f32,
    pub torso: f32,
    pub head: f32,
    pub upper_arm: f32,
    pub forearm: f32,
    pub hand: f32,
    pub foot: f32,
}

impl Default for Segments {
    fn default() -> Self {
        Segments {
            shin: 0.2,
            thigh: 0.2,
            torso: 0.3,
            head: 0.1,
            upper_arm: 0.15,
            forearm: 0.13,
            hand: 0.04,
            foot: 0.06,
        }
    }
}

/// Skeleton builder
#[derive(Clone, Debug)]
pub struct PoseSimulator {
    /// Ankle position
    pub origin: Point2,
    pub segments: Segments,
    /// Left/right separation along x; 0 puts both sides on top of each other
    pub half_width: f32,
}

impl PoseSimulator {
    pub fn new() -> Self {
        PoseSimulator {
            origin: Point2::new(0.5, 0.9),
            segments: Segments::default(),
            half_width: 0.0,
        }
    }

    /// Ankle placement suited to lying exercises
    pub fn lying() -> Self {
        PoseSimulator {
            origin: Point2::new(0.1, 0.6),
            ..Self::new()
        }
    }

    pub fn with_half_width(mut self, half_width: f32) -> Self {
        self.half_width = half_width;
        self
    }

    /// Build a fully visible observation
    pub fn pose(&self, a: &BodyAngles) -> PoseObservation {
        let s = &self.segments;

        // Upright chain relative to the ankle
        let ankle = Point2::new(0.0, 0.0);
        let knee = ankle + scale(Point2::UP, s.shin);
        let thigh = rotate(Point2::DOWN, a.knee);
        let hip = knee + scale(thigh, s.thigh);
        let torso = rotate(scale(thigh, -1.0), -a.hip);
        let shoulder = hip + scale(torso, s.torso);
        let nose = shoulder + scale(torso, s.head);
        let upper_arm = rotate(scale(torso, -1.0), -a.shoulder);
        let elbow = shoulder + scale(upper_arm, s.upper_arm);
        let forearm = rotate(scale(upper_arm, -1.0), a.elbow);
        let wrist = elbow + scale(forearm, s.forearm);
        let hand = wrist + scale(forearm, s.hand);
        let heel = ankle + Point2::new(-s.foot * 0.3, 0.0);
        let toe = ankle + Point2::new(s.foot, 0.0);

        let place = |p: Point2, side: f32| {
            let p = rotate(p, a.pitch) + self.origin;
            Landmark::at(p.x + side * self.half_width, p.y)
        };

        use PoseLandmark::*;
        let mut lms = [Landmark::at(0.0, 0.0); LANDMARK_COUNT];
        let mut set = |id: PoseLandmark, p: Point2, side: f32| lms[id.index()] = place(p, side);

        set(Nose, nose, 0.0);
        for (id, side) in [
            (LeftEyeInner, -0.2),
            (LeftEye, -0.3),
            (LeftEyeOuter, -0.4),
            (RightEyeInner, 0.2),
            (RightEye, 0.3),
            (RightEyeOuter, 0.4),
            (LeftEar, -0.6),
            (RightEar, 0.6),
            (MouthLeft, -0.2),
            (MouthRight, 0.2),
        ] {
            set(id, nose, side);
        }

        for (side, sign) in [(gymcoach_core::Side::Left, -1.0), (gymcoach_core::Side::Right, 1.0)] {
            set(side.shoulder(), shoulder, sign);
            set(side.elbow(), elbow, sign);
            set(side.wrist(), wrist, sign);
            set(side.hip(), hip, sign);
            set(side.knee(), knee, sign);
            set(side.ankle(), ankle, sign);
        }
        for (id, p, side) in [
            (LeftPinky, hand, -1.0),
            (RightPinky, hand, 1.0),
            (LeftIndex, hand, -1.0),
            (RightIndex, hand, 1.0),
            (LeftThumb, hand, -1.0),
            (RightThumb, hand, 1.0),
            (LeftHeel, heel, -1.0),
            (RightHeel, heel, 1.0),
            (LeftFootIndex, toe, -1.0),
            (RightFootIndex, toe, 1.0),
        ] {
            set(id, p, side);
        }

        PoseObservation::from_array(lms)
    }
}

impl Default for PoseSimulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop the visibility of `ids`
pub fn occlude(pose: &mut PoseObservation, ids: &[PoseLandmark], visibility: f32) {
    for id in ids {
        pose.landmark_mut(*id).visibility = visibility;
    }
}

fn scale(p: Point2, k: f32) -> Point2 {
    Point2::new(p.x * k, p.y * k)
}

/// Rotate by `deg`; positive turns +y towards -x in image coordinates
fn rotate(p: Point2, deg: f32) -> Point2 {
    let (sin, cos) = deg.to_radians().sin_cos();
    Point2::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymcoach_features::JointAngles;
    use proptest::prelude::*;

    fn close(a: Option<f32>, b: f32) -> bool {
        a.is_some_and(|a| (a - b).abs() < 0.05)
    }

    #[test]
    fn test_angles_come_back() {
        let sim = PoseSimulator::new();
        for target in [
            BodyAngles::standing(),
            BodyAngles::squat(70.0),
            BodyAngles::curl(45.0),
            BodyAngles {
                knee: 120.0,
                hip: 80.0,
                shoulder: 60.0,
                elbow: 100.0,
                pitch: 30.0,
            },
        ] {
            let angles = JointAngles::from_pose(&sim.pose(&target));
            assert!(close(angles.avg_knee(), target.knee), "knee {target:?}");
            assert!(close(angles.avg_hip(), target.hip), "hip {target:?}");
            assert!(close(angles.avg_elbow(), target.elbow), "elbow {target:?}");
            assert!(close(angles.shoulder_left, target.shoulder), "shoulder {target:?}");
        }
    }

    #[test]
    fn test_standing_is_upright() {
        let pose = PoseSimulator::new().pose(&BodyAngles::standing());
        let nose = pose.point(PoseLandmark::Nose);
        let ankle = pose.point(PoseLandmark::LeftAnkle);
        assert!(nose.y < ankle.y - 0.7);
        assert!((pose.point(PoseLandmark::LeftAnkle).x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_squat_torso_stays_vertical() {
        let pose = PoseSimulator::new().pose(&BodyAngles::squat(80.0));
        let shoulder = pose.point(PoseLandmark::LeftShoulder);
        let hip = pose.point(PoseLandmark::LeftHip);
        assert!((shoulder.x - hip.x).abs() < 1e-5);
        assert!(shoulder.y < hip.y);
    }

    #[test]
    fn test_plank_is_horizontal() {
        let pose = PoseSimulator::lying().pose(&BodyAngles::plank(180.0));
        let shoulder = pose.point(PoseLandmark::LeftShoulder);
        let hip = pose.point(PoseLandmark::LeftHip);
        let ankle = pose.point(PoseLandmark::LeftAnkle);
        let elbow = pose.point(PoseLandmark::LeftElbow);

        assert!((shoulder.y - ankle.y).abs() < 1e-5);
        assert!((hip.y - ankle.y).abs() < 1e-5);
        assert!(shoulder.x > hip.x && hip.x > ankle.x);
        assert!((elbow.x - shoulder.x).abs() < 1e-5);
        assert!(elbow.y > shoulder.y);
    }

    #[test]
    fn test_half_width_separates_sides() {
        let pose = PoseSimulator::new()
            .with_half_width(0.1)
            .pose(&BodyAngles::standing());
        let l = pose.point(PoseLandmark::LeftShoulder);
        let r = pose.point(PoseLandmark::RightShoulder);
        assert!((r.x - l.x - 0.2).abs() < 1e-5);
        assert!((l.y - r.y).abs() < 1e-6);
    }

    #[test]
    fn test_occlude() {
        let mut pose = PoseSimulator::new().pose(&BodyAngles::standing());
        occlude(&mut pose, &[PoseLandmark::LeftKnee], 0.1);
        assert_eq!(pose.landmark(PoseLandmark::LeftKnee).visibility, 0.1);
        assert_eq!(pose.landmark(PoseLandmark::RightKnee).visibility, 1.0);
    }

    proptest! {
        #[test]
        fn prop_any_target_angles_come_back(
            knee in 20.0f32..170.0,
            hip in 20.0f32..170.0,
            shoulder in 20.0f32..170.0,
            elbow in 20.0f32..170.0,
            pitch in 0.0f32..90.0,
        ) {
            let target = BodyAngles { knee, hip, shoulder, elbow, pitch };
            let angles = JointAngles::from_pose(&PoseSimulator::new().pose(&target));
            let near = |a: Option<f32>, b: f32| a.is_some_and(|a| (a - b).abs() < 0.1);
            prop_assert!(near(angles.avg_knee(), knee));
            prop_assert!(near(angles.avg_hip(), hip));
            prop_assert!(near(angles.avg_elbow(), elbow));
            prop_assert!(near(angles.shoulder_right, shoulder));
        }
    }
}
