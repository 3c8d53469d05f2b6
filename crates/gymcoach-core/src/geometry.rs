//! Planar geometry on normalized image coordinates
//!
//! Image space has y growing downward, so "up" is `(0, -1)`.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Rays shorter than this are treated as degenerate
const DEGENERATE_LEN: f32 = 1e-9;

/// 2D point or vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const UP: Point2 = Point2 { x: 0.0, y: -1.0 };
    pub const DOWN: Point2 = Point2 { x: 0.0, y: 1.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, other: Point2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn distance(self, other: Point2) -> f32 {
        (self - other).length()
    }

    #[inline]
    pub fn midpoint(self, other: Point2) -> Point2 {
        Point2::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Linear interpolation
    #[inline]
    pub fn lerp(self, other: Point2, t: f32) -> Point2 {
        Point2::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl Add for Point2 {
    type Output = Point2;

    #[inline]
    fn add(self, rhs: Point2) -> Self::Output {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;

    #[inline]
    fn sub(self, rhs: Point2) -> Self::Output {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Angle between two vectors in degrees, `None` if either is zero-length
pub fn vector_angle(v1: Point2, v2: Point2) -> Option<f32> {
    let mag1 = v1.length();
    let mag2 = v2.length();

    if mag1 < DEGENERATE_LEN || mag2 < DEGENERATE_LEN {
        return None;
    }

    // Clamp before acos: rounding can push the ratio just outside [-1, 1]
    let cos_angle = (v1.dot(v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
    Some(cos_angle.acos().to_degrees())
}

/// Angle at vertex `b` formed by rays `b→a` and `b→c`, in degrees
///
/// Returns `None` when either ray has zero length. Callers treat that as a
/// neutral value, never as a failure.
pub fn angle(a: Point2, b: Point2, c: Point2) -> Option<f32> {
    vector_angle(a - b, c - b)
}

/// Like [`vector_angle`] but degenerate input yields `0.0`
pub fn angle_between(v1: Point2, v2: Point2) -> f32 {
    vector_angle(v1, v2).unwrap_or(0.0)
}

/// Tilt of a segment away from the vertical axis, in `[0, 90]` degrees
///
/// Direction is ignored: a segment pointing straight up or straight down
/// both have zero tilt.
pub fn inclination(v: Point2) -> Option<f32> {
    let len = v.length();
    if len < DEGENERATE_LEN {
        return None;
    }
    let cos_angle = (v.dot(Point2::DOWN) / len).clamp(-1.0, 1.0).abs();
    Some(cos_angle.acos().to_degrees())
}

/// Signed vertical offset of `p` from the line through `a` and `b`
///
/// `p` is projected onto the line; the result is `p.y - projected.y`, so a
/// positive value means `p` sits below the line in image space. Returns
/// `0.0` when `a` and `b` coincide.
pub fn vertical_offset_from_line(p: Point2, a: Point2, b: Point2) -> f32 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq <= 0.0 {
        return 0.0;
    }
    let t = (p - a).dot(ab) / len_sq;
    let projected = a + Point2::new(ab.x * t, ab.y * t);
    p.y - projected.y
}
