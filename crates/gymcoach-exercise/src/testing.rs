//! Pose fixtures for session tests

use gymcoach_core::{Landmark, Point2, PoseLandmark, PoseObservation, LANDMARK_COUNT};

pub(crate) struct PoseBuilder {
    lms: Vec<Landmark>,
}

impl PoseBuilder {
    pub fn new() -> Self {
        Self {
            lms: vec![Landmark::at(0.5, 0.5); LANDMARK_COUNT],
        }
    }

    pub fn set(mut self, id: PoseLandmark, p: Point2) -> Self {
        self.lms[id.index()] = Landmark::at(p.x, p.y);
        self
    }

    /// Left at `p.x - half_width`, right at `p.x + half_width`
    pub fn pair(self, left: PoseLandmark, right: PoseLandmark, p: Point2, half_width: f32) -> Self {
        self.set(left, Point2::new(p.x - half_width, p.y))
            .set(right, Point2::new(p.x + half_width, p.y))
    }

    pub fn build(self) -> PoseObservation {
        PoseObservation::from_landmarks(self.lms).unwrap()
    }
}

/// Point `len` away from `vertex`, making `deg` with the ray towards `from`
pub(crate) fn at_angle(from: Point2, vertex: Point2, deg: f32, len: f32) -> Point2 {
    let d = from - vertex;
    let n = d.length();
    let (ux, uy) = (d.x / n, d.y / n);
    let (s, c) = deg.to_radians().sin_cos();
    Point2::new(vertex.x + len * (ux * c - uy * s), vertex.y + len * (ux * s + uy * c))
}
