//! Feedback persistence and rate limiting
//!
//! An issue is worth surfacing once it shows up in enough of the recent
//! frames. Surfacing is then rate limited twice: a global cooldown between
//! any two utterances, and a longer interval before the same issue may be
//! repeated.

use std::time::Duration;

use gymcoach_core::{FrameTime, RingBuffer};
use serde::{Deserialize, Serialize};

/// Feedback engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Frames of issue history kept
    pub window: usize,
    /// Occurrences in the window before an issue is reported
    pub min_persistence: usize,
    /// Minimum gap between any two spoken issues, seconds
    pub cooldown_secs: f64,
    /// Minimum gap before the same issue is spoken again, seconds
    pub repeat_after_secs: f64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            window: 15,
            min_persistence: 5,
            cooldown_secs: 3.0,
            repeat_after_secs: 10.0,
        }
    }
}

impl FeedbackConfig {
    /// Preset for live camera streams: reacts one frame sooner
    pub fn live() -> Self {
        Self {
            min_persistence: 4,
            ..Default::default()
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.cooldown_secs.max(0.0))
    }

    pub fn repeat_after(&self) -> Duration {
        Duration::from_secs_f64(self.repeat_after_secs.max(0.0))
    }
}

/// Per-stream feedback state
#[derive(Debug, Clone)]
pub struct FeedbackEngine {
    history: RingBuffer<Vec<String>>,
    min_persistence: usize,
    cooldown: Duration,
    repeat_after: Duration,
    last_spoken: Option<(String, FrameTime)>,
}

impl FeedbackEngine {
    pub fn new(config: &FeedbackConfig) -> Self {
        Self {
            history: RingBuffer::new(config.window),
            min_persistence: config.min_persistence,
            cooldown: config.cooldown(),
            repeat_after: config.repeat_after(),
            last_spoken: None,
        }
    }

    /// Record one frame's issues
    pub fn add_frame(&mut self, issues: &[String]) {
        self.history.push(issues.to_vec());
    }

    /// Most frequent issue in the window, if it meets the persistence bar
    ///
    /// Every occurrence counts, including repeats within one frame. Ties go
    /// to the issue seen first, scanning from the oldest frame.
    pub fn get_top_issue(&self) -> Option<&str> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for issue in self.history.iter().flatten() {
            match counts.iter_mut().find(|(seen, _)| *seen == issue.as_str()) {
                Some((_, count)) => *count += 1,
                None => counts.push((issue.as_str(), 1)),
            }
        }

        let mut top: Option<(&str, usize)> = None;
        for (issue, count) in counts {
            if top.map_or(true, |(_, best)| count > best) {
                top = Some((issue, count));
            }
        }

        top.filter(|(_, count)| *count >= self.min_persistence)
            .map(|(issue, _)| issue)
    }

    /// Whether `issue` may be surfaced at `now`
    pub fn should_speak(&self, issue: Option<&str>, now: FrameTime) -> bool {
        let Some(issue) = issue else {
            return false;
        };
        let Some((last_issue, last_time)) = &self.last_spoken else {
            return true;
        };

        let since = now - *last_time;
        if since < self.cooldown {
            return false;
        }
        !(last_issue == issue && since < self.repeat_after)
    }

    /// Record an accepted speak decision
    pub fn mark_spoken(&mut self, issue: &str, now: FrameTime) {
        self.last_spoken = Some((issue.to_string(), now));
    }

    pub fn last_spoken(&self) -> Option<(&str, FrameTime)> {
        self.last_spoken
            .as_ref()
            .map(|(issue, time)| (issue.as_str(), *time))
    }

    /// Drop the issue history; speech bookkeeping is kept
    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn frames(&self) -> usize {
        self.history.len()
    }
}

impl Default for FeedbackEngine {
    fn default() -> Self {
        Self::new(&FeedbackConfig::default())
    }
}
