//! Hysteresis rep counter
//!
//! Two thresholds with a gap between them. Crossing `enter` moves the
//! counter from its rest phase into the rep; crossing `exit` returns it to
//! rest and counts exactly one rep. Noise inside the band never toggles the
//! phase.
//!
//! An excursion that passes the middle of the band and turns back without
//! reaching the far threshold is reported as a half rep: `Shallow` from the
//! rest phase, `Incomplete` from inside the rep.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Exercise phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Top,
    Bottom,
    Extended,
    Flexed,
    Hold,
}

impl Phase {
    /// Mid-rep phases, between entering and completing a repetition
    pub fn in_rep(self) -> bool {
        matches!(self, Phase::Bottom | Phase::Flexed)
    }
}

/// Which way the metric moves into a rep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Metric drops into the rep (joint angles): enter on `< enter`,
    /// exit on `> exit`
    Falling,
    /// Metric climbs into the rep (image-space y of a pulled bar): enter on
    /// `> enter`, exit on `<= exit`
    Rising,
}

/// What an update did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RepEvent {
    None,
    Entered,
    Completed,
    /// Turned back towards rest without entering; carries the deepest metric
    Shallow(f32),
    /// Turned back into the rep without completing; carries the metric
    /// closest to rest
    Incomplete(f32),
}

/// Two-phase rep state machine
#[derive(Debug, Clone)]
pub struct RepCounter {
    direction: Direction,
    enter: f32,
    exit: f32,
    rest: Phase,
    active: Phase,
    phase: Phase,
    reps: u32,
    /// Furthest point since leaving the current phase's side of the band
    excursion: Option<f32>,
}

impl RepCounter {
    pub fn new(direction: Direction, enter: f32, exit: f32) -> Self {
        Self {
            direction,
            enter,
            exit,
            rest: Phase::Top,
            active: Phase::Bottom,
            phase: Phase::Top,
            reps: 0,
            excursion: None,
        }
    }

    /// Angle-driven counter with `Top`/`Bottom` phases
    pub fn falling(enter: f32, exit: f32) -> Self {
        Self::new(Direction::Falling, enter, exit)
    }

    /// Rename the rest and active phases (e.g. `Extended`/`Flexed`)
    pub fn with_phases(mut self, rest: Phase, active: Phase) -> Self {
        self.rest = rest;
        self.active = active;
        self.phase = rest;
        self
    }

    /// Move the thresholds; used when they depend on a lazily captured baseline
    pub fn set_thresholds(&mut self, enter: f32, exit: f32) {
        self.enter = enter;
        self.exit = exit;
    }

    pub fn update(&mut self, metric: f32) -> RepEvent {
        let mid = (self.enter + self.exit) / 2.0;
        if self.phase == self.rest {
            if self.past_enter(metric) {
                self.phase = self.active;
                self.excursion = None;
                debug!(phase = ?self.phase, metric, "entered rep");
                return RepEvent::Entered;
            }
            if self.past_exit(metric) {
                if let Some(deepest) = self.excursion.take() {
                    if self.deeper(deepest, mid) {
                        debug!(deepest, "shallow rep");
                        return RepEvent::Shallow(deepest);
                    }
                }
            } else {
                let deepest = match self.excursion {
                    Some(e) if self.deeper(e, metric) => e,
                    _ => metric,
                };
                self.excursion = Some(deepest);
            }
        } else {
            if self.past_exit(metric) {
                self.phase = self.rest;
                self.reps += 1;
                self.excursion = None;
                debug!(reps = self.reps, metric, "rep completed");
                return RepEvent::Completed;
            }
            if self.past_enter(metric) {
                if let Some(highest) = self.excursion.take() {
                    if self.deeper(mid, highest) {
                        debug!(highest, "incomplete rep");
                        return RepEvent::Incomplete(highest);
                    }
                }
            } else {
                let highest = match self.excursion {
                    Some(e) if self.deeper(metric, e) => e,
                    _ => metric,
                };
                self.excursion = Some(highest);
            }
        }
        RepEvent::None
    }

    fn past_enter(&self, metric: f32) -> bool {
        match self.direction {
            Direction::Falling => metric < self.enter,
            Direction::Rising => metric > self.enter,
        }
    }

    fn past_exit(&self, metric: f32) -> bool {
        match self.direction {
            Direction::Falling => metric > self.exit,
            Direction::Rising => metric <= self.exit,
        }
    }

    /// `a` lies further into the rep than `b`
    fn deeper(&self, a: f32, b: f32) -> bool {
        match self.direction {
            Direction::Falling => a < b,
            Direction::Rising => a > b,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn is_active(&self) -> bool {
        self.phase == self.active
    }

    pub fn enter(&self) -> f32 {
        self.enter
    }
}

/// Min/max of the tracked metric during the current rep
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RepScratch {
    pub min: Option<f32>,
    pub max: Option<f32>,
}

impl RepScratch {
    pub fn observe(&mut self, value: f32) {
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_full_sweep_counts_once() {
        let mut c = RepCounter::falling(70.0, 150.0);
        let events: Vec<_> = [170.0, 170.0, 60.0, 60.0, 170.0]
            .iter()
            .map(|m| c.update(*m))
            .collect();
        assert_eq!(events[2], RepEvent::Entered);
        assert_eq!(events[4], RepEvent::Completed);
        assert_eq!(c.reps(), 1);
        assert_eq!(c.phase(), Phase::Top);
    }

    #[test]
    fn test_noise_in_band_ignored() {
        let mut c = RepCounter::falling(70.0, 150.0);
        for m in [100.0, 69.0, 80.0, 140.0, 65.0, 149.0, 75.0] {
            c.update(m);
        }
        assert_eq!(c.reps(), 0);
        assert!(c.is_active());
        c.update(151.0);
        assert_eq!(c.reps(), 1);
    }

    #[test]
    fn test_rising_direction() {
        let mut c = RepCounter::new(Direction::Rising, 0.3, 0.22);
        assert_eq!(c.update(0.35), RepEvent::Entered);
        assert_eq!(c.update(0.25), RepEvent::None);
        assert_eq!(c.update(0.22), RepEvent::Completed);
    }

    #[test]
    fn test_custom_phases() {
        let c = RepCounter::falling(50.0, 160.0).with_phases(Phase::Extended, Phase::Flexed);
        assert_eq!(c.phase(), Phase::Extended);
    }

    #[test]
    fn test_shallow_dip_reports_deepest_point() {
        let mut c = RepCounter::falling(90.0, 160.0);
        let events: Vec<_> = [170.0, 140.0, 120.0, 130.0, 170.0]
            .iter()
            .map(|m| c.update(*m))
            .collect();
        assert_eq!(events[4], RepEvent::Shallow(120.0));
        assert_eq!(c.reps(), 0);
        assert_eq!(c.phase(), Phase::Top);

        // A wobble that stays on the rest side of the midpoint is ignored
        assert_eq!(c.update(150.0), RepEvent::None);
        assert_eq!(c.update(170.0), RepEvent::None);
    }

    #[test]
    fn test_incomplete_return_inside_rep() {
        let mut c = RepCounter::falling(50.0, 160.0).with_phases(Phase::Extended, Phase::Flexed);
        assert_eq!(c.update(40.0), RepEvent::Entered);
        assert_eq!(c.update(130.0), RepEvent::None);
        assert_eq!(c.update(45.0), RepEvent::Incomplete(130.0));
        assert!(c.is_active());
        assert_eq!(c.update(170.0), RepEvent::Completed);
        assert_eq!(c.reps(), 1);
    }

    #[test]
    fn test_rising_shallow() {
        let mut c = RepCounter::new(Direction::Rising, 0.3, 0.2);
        assert_eq!(c.update(0.28), RepEvent::None);
        assert_eq!(c.update(0.19), RepEvent::Shallow(0.28));
    }

    #[test]
    fn test_scratch() {
        let mut s = RepScratch::default();
        s.observe(120.0);
        s.observe(80.0);
        s.observe(100.0);
        assert_eq!(s.min, Some(80.0));
        assert_eq!(s.max, Some(120.0));
        s.reset();
        assert_eq!(s.min, None);
    }

    proptest! {
        #[test]
        fn prop_reps_monotonic(metrics in proptest::collection::vec(0.0f32..180.0, 0..200)) {
            let mut c = RepCounter::falling(90.0, 160.0);
            let mut last = 0;
            for m in metrics {
                c.update(m);
                prop_assert!(c.reps() >= last);
                prop_assert!(c.reps() <= last + 1);
                last = c.reps();
            }
        }

        #[test]
        fn prop_sweep_with_band_noise_is_one_rep(
            noise in proptest::collection::vec(71.0f32..149.0, 0..20),
        ) {
            let mut c = RepCounter::falling(70.0, 150.0);
            c.update(170.0);
            for n in &noise {
                c.update(*n);
            }
            c.update(60.0);
            for n in &noise {
                c.update(*n);
            }
            c.update(170.0);
            prop_assert_eq!(c.reps(), 1);
        }
    }
}
