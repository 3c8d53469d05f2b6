//! Hot-swappable shared classifier

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use gymcoach_core::ExerciseLabel;
use gymcoach_features::FeatureVector;

use crate::ExerciseClassifier;

/// Shared classifier handle
///
/// Readers clone the inner `Arc` under a short read lock and predict outside
/// it, so `swap` never blocks on or interrupts an in-flight prediction.
#[derive(Debug)]
pub struct ClassifierSlot {
    current: RwLock<Arc<ExerciseClassifier>>,
    generation: AtomicU64,
}

impl ClassifierSlot {
    pub fn new(classifier: ExerciseClassifier) -> Self {
        Self {
            current: RwLock::new(Arc::new(classifier)),
            generation: AtomicU64::new(0),
        }
    }

    /// Snapshot of the serving classifier
    pub fn current(&self) -> Arc<ExerciseClassifier> {
        Arc::clone(&self.current.read())
    }

    pub fn predict(&self, features: &FeatureVector) -> ExerciseLabel {
        self.current().predict(features)
    }

    /// Install a new classifier, returning the previous one
    ///
    /// Visible to the next `predict` call on any thread.
    pub fn swap(&self, classifier: ExerciseClassifier) -> Arc<ExerciseClassifier> {
        let next = Arc::new(classifier);
        let previous = std::mem::replace(&mut *self.current.write(), next);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        info!(generation, "classifier swapped");
        previous
    }

    /// Number of swaps so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
