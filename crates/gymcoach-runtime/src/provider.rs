//! Pose providers
//!
//! A provider turns whatever a capture source produces into landmark
//! observations. Inference engines live outside this crate; recorded
//! landmarks go through [`RecordedPoses`].

use gymcoach_core::PoseObservation;
use gymcoach_features::PoseSmoother;

use crate::PoseSmoothingConfig;

/// Source of pose observations, one call per frame
pub trait PoseProvider {
    type Frame;

    /// `None` when no person was found in `frame`
    fn infer(&mut self, frame: Self::Frame) -> Option<PoseObservation>;
}

/// Provider for landmarks that were already extracted
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordedPoses;

impl PoseProvider for RecordedPoses {
    type Frame = Option<PoseObservation>;

    fn infer(&mut self, frame: Self::Frame) -> Option<PoseObservation> {
        frame
    }
}

/// Rolling-average smoothing and visibility gating over another provider
#[derive(Debug, Clone)]
pub struct SmoothedPoseProvider<P> {
    inner: P,
    smoother: Option<PoseSmoother>,
}

impl<P: PoseProvider> SmoothedPoseProvider<P> {
    pub fn new(inner: P, config: &PoseSmoothingConfig) -> Self {
        let smoother = config.enabled.then(|| {
            PoseSmoother::new(config.window, config.min_visibility, config.stable_frames)
        });
        Self { inner, smoother }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: PoseProvider> PoseProvider for SmoothedPoseProvider<P> {
    type Frame = P::Frame;

    fn infer(&mut self, frame: Self::Frame) -> Option<PoseObservation> {
        let pose = self.inner.infer(frame);
        let Some(smoother) = self.smoother.as_mut() else {
            return pose;
        };
        match pose {
            Some(pose) => smoother.apply(pose),
            None => {
                // A gap restarts both the average and the stability count
                smoother.reset();
                None
            }
        }
    }
}
