//! Temporal smoothing for noisy pose streams
//!
//! - `EmaSmoother`: exponential moving average of one scalar
//! - `RollingAverage`: windowed mean of a 2D point
//! - `VisibilityFilter`: require stable visibility before trusting frames
//! - `PoseSmoother`: all of the above applied to a full observation

use gymcoach_core::{Point2, PoseObservation, RingBuffer, LANDMARK_COUNT};

/// Exponential moving average of a scalar
///
/// `alpha = 1.0` passes values through unchanged; smaller values smooth
/// more heavily.
#[derive(Debug, Clone)]
pub struct EmaSmoother {
    alpha: f32,
    value: Option<f32>,
}

impl EmaSmoother {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            value: None,
        }
    }

    /// Feed a sample; `None` keeps and returns the previous estimate
    pub fn update(&mut self, sample: Option<f32>) -> Option<f32> {
        let Some(sample) = sample else {
            return self.value;
        };
        let next = match self.value {
            Some(prev) => self.alpha * sample + (1.0 - self.alpha) * prev,
            None => sample,
        };
        self.value = Some(next);
        self.value
    }

    pub fn value(&self) -> Option<f32> {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

impl Default for EmaSmoother {
    fn default() -> Self {
        Self::new(0.18)
    }
}

/// Rolling mean of a 2D point
#[derive(Debug, Clone)]
pub struct RollingAverage {
    points: RingBuffer<Point2>,
}

impl RollingAverage {
    pub fn new(window: usize) -> Self {
        Self {
            points: RingBuffer::new(window),
        }
    }

    pub fn update(&mut self, p: Point2) -> Point2 {
        self.points.push(p);
        let n = self.points.len() as f32;
        let sum = self
            .points
            .iter()
            .fold(Point2::default(), |acc, q| acc + *q);
        Point2::new(sum.x / n, sum.y / n)
    }

    pub fn reset(&mut self) {
        self.points.clear();
    }
}

/// Accept frames only while visibility has been good for the whole window
#[derive(Debug, Clone)]
pub struct VisibilityFilter {
    min_visibility: f32,
    window: RingBuffer<bool>,
}

impl VisibilityFilter {
    pub fn new(min_visibility: f32, stable_frames: usize) -> Self {
        Self {
            min_visibility,
            window: RingBuffer::new(stable_frames),
        }
    }

    /// Record this frame's visibility and report whether the stream is stable
    pub fn update(&mut self, visibility: f32) -> bool {
        self.window.push(visibility >= self.min_visibility);
        self.window.iter().all(|ok| *ok)
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}

/// Coordinate smoothing + visibility gating for whole observations
#[derive(Debug, Clone)]
pub struct PoseSmoother {
    smoothers: Vec<RollingAverage>,
    visibility: VisibilityFilter,
}

impl PoseSmoother {
    pub fn new(window: usize, min_visibility: f32, stable_frames: usize) -> Self {
        Self {
            smoothers: (0..LANDMARK_COUNT)
                .map(|_| RollingAverage::new(window))
                .collect(),
            visibility: VisibilityFilter::new(min_visibility, stable_frames),
        }
    }

    /// Smooth an observation, or drop it while visibility is unstable
    pub fn apply(&mut self, pose: PoseObservation) -> Option<PoseObservation> {
        if !self.visibility.update(pose.mean_visibility()) {
            return None;
        }

        let mut pose = pose;
        for (lm, smoother) in pose.landmarks_mut().iter_mut().zip(&mut self.smoothers) {
            let smoothed = smoother.update(lm.point());
            lm.x = smoothed.x;
            lm.y = smoothed.y;
        }
        Some(pose)
    }

    pub fn reset(&mut self) {
        self.smoothers.iter_mut().for_each(RollingAverage::reset);
        self.visibility.reset();
    }
}

impl Default for PoseSmoother {
    fn default() -> Self {
        Self::new(5, 0.5, 2)
    }
}
