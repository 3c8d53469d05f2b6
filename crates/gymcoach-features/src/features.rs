//! Feature extraction for exercise classification
//!
//! Builds 15 named scalars per frame: eight joint angles in degrees and
//! seven position ratios normalized by approximate body height. The order
//! is fixed, but consumers should address features by [`FeatureName`].

use std::fmt;

use serde::{Deserialize, Serialize};

use gymcoach_core::{angle, CoachError, CoachResult, Point2, PoseLandmark, PoseObservation};

/// Number of features per frame
pub const FEATURE_COUNT: usize = 15;

/// Added to body height so a collapsed pose never divides by zero
const BODY_HEIGHT_EPSILON: f32 = 1e-6;

/// Named feature slots, in vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    ElbowLeft,
    ElbowRight,
    KneeLeft,
    KneeRight,
    HipLeft,
    HipRight,
    ShoulderLeft,
    ShoulderRight,
    YShoulder,
    YHip,
    YKnee,
    YAnkle,
    YWrist,
    XWristRelHip,
    XShoulderRelHip,
}

impl FeatureName {
    pub const ALL: [FeatureName; FEATURE_COUNT] = [
        FeatureName::ElbowLeft,
        FeatureName::ElbowRight,
        FeatureName::KneeLeft,
        FeatureName::KneeRight,
        FeatureName::HipLeft,
        FeatureName::HipRight,
        FeatureName::ShoulderLeft,
        FeatureName::ShoulderRight,
        FeatureName::YShoulder,
        FeatureName::YHip,
        FeatureName::YKnee,
        FeatureName::YAnkle,
        FeatureName::YWrist,
        FeatureName::XWristRelHip,
        FeatureName::XShoulderRelHip,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name used by datasets
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureName::ElbowLeft => "elbow_left",
            FeatureName::ElbowRight => "elbow_right",
            FeatureName::KneeLeft => "knee_left",
            FeatureName::KneeRight => "knee_right",
            FeatureName::HipLeft => "hip_left",
            FeatureName::HipRight => "hip_right",
            FeatureName::ShoulderLeft => "shoulder_left",
            FeatureName::ShoulderRight => "shoulder_right",
            FeatureName::YShoulder => "y_shoulder",
            FeatureName::YHip => "y_hip",
            FeatureName::YKnee => "y_knee",
            FeatureName::YAnkle => "y_ankle",
            FeatureName::YWrist => "y_wrist",
            FeatureName::XWristRelHip => "x_wrist_rel_hip",
            FeatureName::XShoulderRelHip => "x_shoulder_rel_hip",
        }
    }

    pub fn from_column(name: &str) -> Option<FeatureName> {
        FeatureName::ALL.iter().copied().find(|f| f.as_str() == name)
    }

    pub fn is_angle(self) -> bool {
        self.index() < 8
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-length feature vector for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    /// Build from raw column values (e.g. a dataset row)
    pub fn from_values(values: &[f32]) -> CoachResult<Self> {
        let values: [f32; FEATURE_COUNT] =
            values.try_into().map_err(|_| CoachError::FeatureShape {
                expected: FEATURE_COUNT,
                actual: values.len(),
            })?;
        Ok(Self { values })
    }

    #[inline]
    pub fn get(&self, name: FeatureName) -> f32 {
        self.values[name.index()]
    }

    #[inline]
    pub fn set(&mut self, name: FeatureName, value: f32) {
        self.values[name.index()] = value;
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// `(name, value)` pairs in vector order
    pub fn named(&self) -> impl Iterator<Item = (FeatureName, f32)> + '_ {
        FeatureName::ALL.iter().map(move |n| (*n, self.get(*n)))
    }
}

/// Joint angles of one frame; `None` where a ray is degenerate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JointAngles {
    pub elbow_left: Option<f32>,
    pub elbow_right: Option<f32>,
    pub knee_left: Option<f32>,
    pub knee_right: Option<f32>,
    pub hip_left: Option<f32>,
    pub hip_right: Option<f32>,
    pub shoulder_left: Option<f32>,
    pub shoulder_right: Option<f32>,
}

impl JointAngles {
    pub fn from_pose(pose: &PoseObservation) -> Self {
        use PoseLandmark::*;

        let at = |a, b, c| joint_angle(pose, a, b, c);

        Self {
            elbow_left: at(LeftShoulder, LeftElbow, LeftWrist),
            elbow_right: at(RightShoulder, RightElbow, RightWrist),
            knee_left: at(LeftHip, LeftKnee, LeftAnkle),
            knee_right: at(RightHip, RightKnee, RightAnkle),
            hip_left: at(LeftShoulder, LeftHip, LeftKnee),
            hip_right: at(RightShoulder, RightHip, RightKnee),
            shoulder_left: at(LeftElbow, LeftShoulder, LeftHip),
            shoulder_right: at(RightElbow, RightShoulder, RightHip),
        }
    }

    /// Mean knee angle, `None` if either knee is undefined
    pub fn avg_knee(&self) -> Option<f32> {
        mean2(self.knee_left, self.knee_right)
    }

    /// Mean hip angle, `None` if either hip is undefined
    pub fn avg_hip(&self) -> Option<f32> {
        mean2(self.hip_left, self.hip_right)
    }

    pub fn avg_elbow(&self) -> Option<f32> {
        mean2(self.elbow_left, self.elbow_right)
    }
}

fn mean2(a: Option<f32>, b: Option<f32>) -> Option<f32> {
    Some((a? + b?) / 2.0)
}

/// Angle at landmark `b` formed by `a` and `c`
#[inline]
pub fn joint_angle(
    pose: &PoseObservation,
    a: PoseLandmark,
    b: PoseLandmark,
    c: PoseLandmark,
) -> Option<f32> {
    angle(pose.point(a), pose.point(b), pose.point(c))
}

/// Extract the feature vector for one frame
///
/// Pure and deterministic. Undefined angles become `0.0`.
pub fn extract(pose: &PoseObservation) -> FeatureVector {
    use PoseLandmark::*;

    let angles = JointAngles::from_pose(pose);

    let nose = pose.point(Nose);
    let shoulder_center = pose.center(LeftShoulder, RightShoulder);
    let hip_center = pose.center(LeftHip, RightHip);
    let knee_center = pose.center(LeftKnee, RightKnee);
    let ankle_center = pose.center(LeftAnkle, RightAnkle);
    let wrist_center = pose.center(LeftWrist, RightWrist);

    // Approximate body height: nose to ankle midpoint
    let body_height = nose.distance(ankle_center) + BODY_HEIGHT_EPSILON;

    // 0 at the nose, ~1 at the ankles
    let norm_y = |p: Point2| (p.y - nose.y) / body_height;
    let rel_x = |p: Point2| p.x - hip_center.x;

    let nz = |v: Option<f32>| v.unwrap_or(0.0);

    FeatureVector {
        values: [
            nz(angles.elbow_left),
            nz(angles.elbow_right),
            nz(angles.knee_left),
            nz(angles.knee_right),
            nz(angles.hip_left),
            nz(angles.hip_right),
            nz(angles.shoulder_left),
            nz(angles.shoulder_right),
            norm_y(shoulder_center),
            norm_y(hip_center),
            norm_y(knee_center),
            norm_y(ankle_center),
            norm_y(wrist_center),
            rel_x(wrist_center),
            rel_x(shoulder_center),
        ],
    }
}
