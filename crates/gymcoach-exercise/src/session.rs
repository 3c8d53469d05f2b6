//! Session interface and the state every variant shares

use std::time::Duration;

use gymcoach_core::{ExerciseKind, FrameTime, PoseLandmark, PoseObservation, RingBuffer};
use gymcoach_features::EmaSmoother;

use crate::{FrameResult, MissingReason, Phase, SessionConfig};

/// One exercise's per-stream state machine
///
/// Updates for one session must be applied in frame order; distinct
/// sessions share nothing.
pub trait ExerciseSession: Send {
    fn kind(&self) -> ExerciseKind;

    /// Process one frame. An absent pose leaves rep count and phase intact.
    fn update(&mut self, pose: Option<&PoseObservation>, now: FrameTime) -> FrameResult;

    fn rep_count(&self) -> u32;

    fn phase(&self) -> Phase;

    /// Landmarks that must pass the visibility gate
    fn required_landmarks(&self) -> &[PoseLandmark];

    /// Time since the first frame this session saw
    fn elapsed(&self) -> Duration;
}

/// Bookkeeping shared by all variants
#[derive(Debug, Clone)]
pub struct SessionCore {
    history: RingBuffer<f32>,
    smoother: EmaSmoother,
    started_at: Option<FrameTime>,
    last_seen: Option<FrameTime>,
    min_visibility: f32,
}

impl SessionCore {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            history: RingBuffer::new(config.history),
            smoother: EmaSmoother::new(config.metric_alpha),
            started_at: None,
            last_seen: None,
            min_visibility: config.min_visibility,
        }
    }

    /// Record the frame time; the first call starts the session clock
    pub fn tick(&mut self, now: FrameTime) {
        self.started_at.get_or_insert(now);
        self.last_seen = Some(now);
    }

    pub fn elapsed(&self) -> Duration {
        match (self.started_at, self.last_seen) {
            (Some(start), Some(last)) => last - start,
            _ => Duration::ZERO,
        }
    }

    /// Pass the pose through only if every required landmark is visible
    pub fn gate<'a>(
        &self,
        pose: Option<&'a PoseObservation>,
        required: &[PoseLandmark],
    ) -> Result<&'a PoseObservation, MissingReason> {
        let pose = pose.ok_or(MissingReason::NoPose)?;
        if pose.all_visible(required, self.min_visibility) {
            Ok(pose)
        } else {
            Err(MissingReason::Occluded)
        }
    }

    /// Smooth and record the primary metric, returning the smoothed value
    pub fn track(&mut self, metric: f32) -> f32 {
        let value = self.smoother.update(Some(metric)).unwrap_or(metric);
        self.history.push(value);
        value
    }

    /// Recent primary-metric values, oldest first
    pub fn history(&self) -> &RingBuffer<f32> {
        &self.history
    }
}

/// Missing-joint result for a gate or angle failure
pub(crate) fn missing(rep_count: u32, issue: &str, reason: MissingReason) -> FrameResult {
    FrameResult::missing(rep_count, issue, reason)
}
