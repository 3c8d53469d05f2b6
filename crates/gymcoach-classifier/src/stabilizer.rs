//! Temporal majority voting over classifier output
//!
//! A single confident frame is not enough to switch exercises: the label has
//! to dominate a short window. Any `Unknown` (low confidence, idle, no pose)
//! resets the vote.

use gymcoach_core::{ExerciseKind, ExerciseLabel, RingBuffer};

pub const DEFAULT_STABILIZER_WINDOW: usize = 7;
pub const DEFAULT_MIN_AGREEMENT: f32 = 0.6;

/// Windowed label stabilizer
#[derive(Debug, Clone)]
pub struct LabelStabilizer {
    window: RingBuffer<ExerciseKind>,
    min_agreement: f32,
}

impl LabelStabilizer {
    pub fn new(window: usize, min_agreement: f32) -> Self {
        Self {
            window: RingBuffer::new(window),
            min_agreement,
        }
    }

    /// Feed one raw label, get the stable label (or `Unknown`)
    pub fn update(&mut self, label: ExerciseLabel) -> ExerciseLabel {
        let Some(kind) = label.kind() else {
            self.window.clear();
            return ExerciseLabel::Unknown;
        };
        self.window.push(kind);

        let (winner, count) = self.majority();
        if count as f32 / self.window.len() as f32 >= self.min_agreement {
            ExerciseLabel::Known(winner)
        } else {
            ExerciseLabel::Unknown
        }
    }

    /// Most frequent label; ties go to the label that reached the top count
    /// first, scanning oldest to newest
    fn majority(&self) -> (ExerciseKind, usize) {
        let mut totals: Vec<(ExerciseKind, usize)> = Vec::with_capacity(ExerciseKind::ALL.len());
        for kind in self.window.iter() {
            match totals.iter_mut().find(|(k, _)| k == kind) {
                Some((_, n)) => *n += 1,
                None => totals.push((*kind, 1)),
            }
        }
        let top = totals.iter().map(|(_, n)| *n).max().unwrap_or(0);

        let mut running: Vec<(ExerciseKind, usize)> = Vec::with_capacity(totals.len());
        for kind in self.window.iter() {
            let n = match running.iter_mut().find(|(k, _)| k == kind) {
                Some((_, n)) => {
                    *n += 1;
                    *n
                }
                None => {
                    running.push((*kind, 1));
                    1
                }
            };
            if n == top {
                return (*kind, top);
            }
        }

        // Unreachable for a non-empty window
        (ExerciseKind::Squat, 0)
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

impl Default for LabelStabilizer {
    fn default() -> Self {
        Self::new(DEFAULT_STABILIZER_WINDOW, DEFAULT_MIN_AGREEMENT)
    }
}
