//! Scripted exercise recordings
//!
//! A scenario is a list of frames built from holds, transitions and gaps,
//! rendered through the simulator (and optionally a noise model) into the
//! `(time, pose)` sequence a coach consumes.

use gymcoach_core::{FrameTime, PoseObservation};
use gymcoach_runtime::{Coach, TimelineReport};

use crate::{BodyAngles, NoiseModel, PoseSimulator};

/// Frame script
#[derive(Clone, Debug)]
pub struct Scenario {
    pub name: String,
    pub fps: f64,
    pub simulator: PoseSimulator,
    frames: Vec<Option<BodyAngles>>,
    last: BodyAngles,
}

impl Scenario {
    pub fn new(name: impl Into<String>, fps: f64) -> Self {
        Scenario {
            name: name.into(),
            fps,
            simulator: PoseSimulator::new(),
            frames: Vec::new(),
            last: BodyAngles::standing(),
        }
    }

    pub fn with_simulator(mut self, simulator: PoseSimulator) -> Self {
        self.simulator = simulator;
        self
    }

    fn frame_count(&self, secs: f64) -> usize {
        (secs * self.fps).round().max(0.0) as usize
    }

    /// Keep `angles` for `secs`
    pub fn hold(mut self, angles: BodyAngles, secs: f64) -> Self {
        let n = self.frame_count(secs);
        self.frames.extend(std::iter::repeat(Some(angles)).take(n));
        self.last = angles;
        self
    }

    /// Move linearly from the previous pose to `to` over `secs`
    pub fn transition(mut self, to: BodyAngles, secs: f64) -> Self {
        let n = self.frame_count(secs).max(1);
        let from = self.last;
        for i in 1..=n {
            let t = i as f32 / n as f32;
            self.frames.push(Some(from.lerp(&to, t)));
        }
        self.last = to;
        self
    }

    /// Frames with no detected person
    pub fn gap(mut self, secs: f64) -> Self {
        let n = self.frame_count(secs);
        self.frames.extend(std::iter::repeat(None).take(n));
        self
    }

    /// `count` cycles of `rest -> peak -> rest`
    pub fn reps(mut self, rest: BodyAngles, peak: BodyAngles, count: usize, secs_per_rep: f64) -> Self {
        for _ in 0..count {
            self = self
                .transition(peak, secs_per_rep / 2.0)
                .transition(rest, secs_per_rep / 2.0);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Timestamped observations, noise applied when given
    pub fn render(&self, mut noise: Option<&mut NoiseModel>) -> Vec<(FrameTime, Option<PoseObservation>)> {
        self.frames
            .iter()
            .enumerate()
            .map(|(i, angles)| {
                let time = FrameTime::from_frame_index(i as u64, self.fps);
                let pose = angles.map(|a| self.simulator.pose(&a));
                let pose = match (pose, noise.as_deref_mut()) {
                    (Some(p), Some(n)) => n.apply(p),
                    (pose, _) => pose,
                };
                (time, pose)
            })
            .collect()
    }

    /// Render and feed through a fresh coach stream
    pub fn run(&self, coach: &Coach, noise: Option<&mut NoiseModel>) -> TimelineReport {
        coach.process_timeline(self.render(noise))
    }

    /// Stand, then `count` squats to `depth` degrees of knee flexion
    pub fn squats(count: usize, depth: f32) -> Self {
        let standing = BodyAngles::squat(175.0);
        Scenario::new(format!("{count} squats"), 30.0)
            .hold(standing, 1.0)
            .reps(standing, BodyAngles::squat(depth), count, 2.0)
            .hold(standing, 1.0)
    }

    /// Standing curls from full extension to `peak` degrees
    pub fn curls(count: usize, peak: f32) -> Self {
        let down = BodyAngles::curl(170.0);
        Scenario::new(format!("{count} curls"), 30.0)
            .hold(down, 0.5)
            .reps(down, BodyAngles::curl(peak), count, 1.6)
            .hold(down, 0.5)
    }

    /// Forearm plank held for `secs`
    pub fn plank(secs: f64, hip: f32) -> Self {
        Scenario::new("plank", 30.0)
            .with_simulator(PoseSimulator::lying())
            .hold(BodyAngles::plank(hip), secs)
    }

    /// Someone standing around
    pub fn standing(secs: f64) -> Self {
        Scenario::new("standing", 30.0).hold(BodyAngles::standing(), secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoiseConfig;

    #[test]
    fn test_frame_counts() {
        let s = Scenario::new("s", 30.0)
            .hold(BodyAngles::standing(), 1.0)
            .transition(BodyAngles::squat(90.0), 0.5)
            .gap(0.1);
        assert_eq!(s.len(), 30 + 15 + 3);
    }

    #[test]
    fn test_transition_ends_on_target() {
        let s = Scenario::new("s", 10.0).transition(BodyAngles::squat(90.0), 1.0);
        let frames = s.render(None);
        let last = frames.last().unwrap().1.as_ref().unwrap();
        let knee = gymcoach_features::JointAngles::from_pose(last).avg_knee().unwrap();
        assert!((knee - 90.0).abs() < 0.1);
    }

    #[test]
    fn test_render_timestamps() {
        let frames = Scenario::standing(1.0).render(None);
        assert_eq!(frames.len(), 30);
        assert_eq!(frames[0].0, FrameTime::ZERO);
        assert_eq!(frames[15].0, FrameTime::from_millis(500));
    }

    #[test]
    fn test_gap_renders_none() {
        let frames = Scenario::new("g", 30.0).gap(0.2).render(None);
        assert!(frames.iter().all(|(_, p)| p.is_none()));
    }

    #[test]
    fn test_noise_is_applied() {
        let s = Scenario::squats(1, 70.0);
        let mut noise = NoiseModel::new(NoiseConfig::webcam(), 5);
        let noisy = s.render(Some(&mut noise));
        assert_eq!(noisy.len(), s.len());
        assert_ne!(noisy, s.render(None));
    }
}
