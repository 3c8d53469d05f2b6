//! Pose landmarks - the 33-point body scheme
//!
//! A pose observation is all-or-nothing: either every indexed landmark is
//! present, or the frame yields no observation at all (`None`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CoachError, CoachResult, Point2};

/// Number of landmarks in a pose observation
pub const LANDMARK_COUNT: usize = 33;

/// Body landmark identifier (BlazePose full-body index order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The major joints most exercises depend on
    pub fn torso_and_limbs() -> &'static [PoseLandmark] {
        &[
            PoseLandmark::LeftShoulder,
            PoseLandmark::RightShoulder,
            PoseLandmark::LeftHip,
            PoseLandmark::RightHip,
            PoseLandmark::LeftKnee,
            PoseLandmark::RightKnee,
            PoseLandmark::LeftAnkle,
            PoseLandmark::RightAnkle,
        ]
    }
}

/// Which side of the body a unilateral exercise tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    #[default]
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn shoulder(self) -> PoseLandmark {
        match self {
            Side::Left => PoseLandmark::LeftShoulder,
            Side::Right => PoseLandmark::RightShoulder,
        }
    }

    pub fn elbow(self) -> PoseLandmark {
        match self {
            Side::Left => PoseLandmark::LeftElbow,
            Side::Right => PoseLandmark::RightElbow,
        }
    }

    pub fn wrist(self) -> PoseLandmark {
        match self {
            Side::Left => PoseLandmark::LeftWrist,
            Side::Right => PoseLandmark::RightWrist,
        }
    }

    pub fn hip(self) -> PoseLandmark {
        match self {
            Side::Left => PoseLandmark::LeftHip,
            Side::Right => PoseLandmark::RightHip,
        }
    }

    pub fn knee(self) -> PoseLandmark {
        match self {
            Side::Left => PoseLandmark::LeftKnee,
            Side::Right => PoseLandmark::RightKnee,
        }
    }

    pub fn ankle(self) -> PoseLandmark {
        match self {
            Side::Left => PoseLandmark::LeftAnkle,
            Side::Right => PoseLandmark::RightAnkle,
        }
    }
}

/// One tracked body point
///
/// `x`, `y` are normalized image coordinates (y grows downward),
/// `z` is a relative depth, `visibility` a detection confidence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default = "full_visibility")]
    pub visibility: f32,
}

fn full_visibility() -> f32 {
    1.0
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }

    /// Fully visible landmark at an image position
    pub fn at(x: f32, y: f32) -> Self {
        Self::new(x, y, 0.0, 1.0)
    }

    #[inline]
    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// Complete set of 33 landmarks for one frame
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct PoseObservation {
    landmarks: Vec<Landmark>,
}

impl PoseObservation {
    /// Build an observation, rejecting partial landmark sets
    pub fn from_landmarks(landmarks: Vec<Landmark>) -> CoachResult<Self> {
        if landmarks.len() != LANDMARK_COUNT {
            return Err(CoachError::InvalidLandmarkCount {
                expected: LANDMARK_COUNT,
                actual: landmarks.len(),
            });
        }
        Ok(Self { landmarks })
    }

    pub fn from_slice(landmarks: &[Landmark]) -> CoachResult<Self> {
        Self::from_landmarks(landmarks.to_vec())
    }

    /// Infallible constructor for a complete set
    pub fn from_array(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self {
            landmarks: landmarks.to_vec(),
        }
    }

    #[inline]
    pub fn landmark(&self, id: PoseLandmark) -> &Landmark {
        &self.landmarks[id.index()]
    }

    #[inline]
    pub fn landmark_mut(&mut self, id: PoseLandmark) -> &mut Landmark {
        &mut self.landmarks[id.index()]
    }

    #[inline]
    pub fn point(&self, id: PoseLandmark) -> Point2 {
        self.landmark(id).point()
    }

    /// Midpoint of two landmarks (e.g. shoulder center)
    pub fn center(&self, a: PoseLandmark, b: PoseLandmark) -> Point2 {
        self.point(a).midpoint(self.point(b))
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Mutable view; the slice length stays fixed
    pub fn landmarks_mut(&mut self) -> &mut [Landmark] {
        &mut self.landmarks
    }

    pub fn mean_visibility(&self) -> f32 {
        self.landmarks.iter().map(|l| l.visibility).sum::<f32>() / LANDMARK_COUNT as f32
    }

    /// First landmark in `required` below `min_visibility`, if any
    pub fn first_occluded(
        &self,
        required: &[PoseLandmark],
        min_visibility: f32,
    ) -> Option<PoseLandmark> {
        required
            .iter()
            .copied()
            .find(|id| self.landmark(*id).visibility < min_visibility)
    }

    pub fn all_visible(&self, required: &[PoseLandmark], min_visibility: f32) -> bool {
        self.first_occluded(required, min_visibility).is_none()
    }
}

impl TryFrom<Vec<Landmark>> for PoseObservation {
    type Error = CoachError;

    fn try_from(value: Vec<Landmark>) -> Result<Self, Self::Error> {
        Self::from_landmarks(value)
    }
}

impl From<PoseObservation> for Vec<Landmark> {
    fn from(value: PoseObservation) -> Self {
        value.landmarks
    }
}

impl fmt::Debug for PoseObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PoseObservation(vis={:.2}, nose=({:.3},{:.3}))",
            self.mean_visibility(),
            self.landmarks[0].x,
            self.landmarks[0].y
        )
    }
}
