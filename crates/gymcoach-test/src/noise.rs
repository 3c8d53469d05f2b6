//! Detector noise injection
//!
//! Simulates what a real landmark detector does to a clean pose:
//! - Coordinate jitter
//! - Dropped frames (no person found)
//! - Briefly occluded joints

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use gymcoach_core::{PoseObservation, LANDMARK_COUNT};

/// Noise parameters
#[derive(Clone, Debug)]
pub struct NoiseConfig {
    /// Standard deviation of coordinate jitter
    pub jitter: f32,
    /// Probability a frame has no pose at all
    pub dropout_prob: f64,
    /// Probability a single landmark is occluded
    pub occlusion_prob: f64,
    /// Visibility assigned to occluded landmarks
    pub occluded_visibility: f32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        NoiseConfig {
            jitter: 0.003,
            dropout_prob: 0.01,
            occlusion_prob: 0.002,
            occluded_visibility: 0.1,
        }
    }
}

impl NoiseConfig {
    /// Clean signal
    pub fn none() -> Self {
        NoiseConfig {
            jitter: 0.0,
            dropout_prob: 0.0,
            occlusion_prob: 0.0,
            occluded_visibility: 0.1,
        }
    }

    /// Consumer webcam in a gym
    pub fn webcam() -> Self {
        NoiseConfig {
            jitter: 0.006,
            dropout_prob: 0.03,
            occlusion_prob: 0.01,
            occluded_visibility: 0.2,
        }
    }
}

/// Seeded noise source
pub struct NoiseModel {
    config: NoiseConfig,
    rng: StdRng,
    stats: NoiseStats,
}

#[derive(Clone, Debug, Default)]
pub struct NoiseStats {
    pub frames: u64,
    pub dropped: u64,
    pub occluded_landmarks: u64,
}

impl NoiseModel {
    pub fn new(config: NoiseConfig, seed: u64) -> Self {
        NoiseModel {
            config,
            rng: StdRng::seed_from_u64(seed),
            stats: NoiseStats::default(),
        }
    }

    /// Corrupt one frame; `None` when the frame is dropped
    pub fn apply(&mut self, pose: PoseObservation) -> Option<PoseObservation> {
        self.stats.frames += 1;
        if self.rng.gen::<f64>() < self.config.dropout_prob {
            self.stats.dropped += 1;
            return None;
        }

        let mut pose = pose;
        for lm in pose.landmarks_mut() {
            lm.x += self.gaussian() * self.config.jitter;
            lm.y += self.gaussian() * self.config.jitter;
            if self.rng.gen::<f64>() < self.config.occlusion_prob {
                lm.visibility = self.config.occluded_visibility;
                self.stats.occluded_landmarks += 1;
            }
        }
        Some(pose)
    }

    pub fn stats(&self) -> &NoiseStats {
        &self.stats
    }

    /// Standard normal sample (Box-Muller)
    fn gaussian(&mut self) -> f32 {
        let u1: f64 = self.rng.gen_range(f64::EPSILON..1.0);
        let u2: f64 = self.rng.gen();
        ((-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()) as f32
    }
}

/// Expected number of occluded landmarks over `frames` frames
pub fn expected_occlusions(config: &NoiseConfig, frames: u64) -> f64 {
    frames as f64 * LANDMARK_COUNT as f64 * config.occlusion_prob
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BodyAngles, PoseSimulator};
    use gymcoach_core::PoseLandmark;

    #[test]
    fn test_clean_config_is_identity() {
        let pose = PoseSimulator::new().pose(&BodyAngles::standing());
        let mut noise = NoiseModel::new(NoiseConfig::none(), 7);
        let out = noise.apply(pose.clone()).unwrap();
        assert_eq!(out, pose);
    }

    #[test]
    fn test_same_seed_same_noise() {
        let pose = PoseSimulator::new().pose(&BodyAngles::squat(90.0));
        let mut a = NoiseModel::new(NoiseConfig::webcam(), 42);
        let mut b = NoiseModel::new(NoiseConfig::webcam(), 42);
        for _ in 0..20 {
            assert_eq!(a.apply(pose.clone()), b.apply(pose.clone()));
        }
    }

    #[test]
    fn test_jitter_is_small() {
        let pose = PoseSimulator::new().pose(&BodyAngles::standing());
        let config = NoiseConfig {
            dropout_prob: 0.0,
            ..NoiseConfig::webcam()
        };
        let mut noise = NoiseModel::new(config, 3);
        let out = noise.apply(pose.clone()).unwrap();
        let dx = out.point(PoseLandmark::Nose).x - pose.point(PoseLandmark::Nose).x;
        assert!(dx.abs() < 0.05);
    }

    #[test]
    fn test_dropout_rate() {
        let pose = PoseSimulator::new().pose(&BodyAngles::standing());
        let config = NoiseConfig {
            dropout_prob: 0.5,
            ..NoiseConfig::none()
        };
        let mut noise = NoiseModel::new(config, 11);
        for _ in 0..1000 {
            noise.apply(pose.clone());
        }
        let dropped = noise.stats().dropped;
        assert!((400..600).contains(&dropped), "dropped {dropped}");
    }

    #[test]
    fn test_expected_occlusions() {
        let config = NoiseConfig {
            occlusion_prob: 0.01,
            ..NoiseConfig::none()
        };
        assert!((expected_occlusions(&config, 100) - 33.0).abs() < 1e-9);
    }
}
