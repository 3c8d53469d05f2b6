//! Debounced, single-slot background retraining
//!
//! New labeled rows trickle in while the coach is serving. A retrain request
//! schedules one job: wait out a short debounce so bursts of rows share a
//! single run, fit on a blocking thread, then swap the serving classifier.
//! Requests that arrive while a job is scheduled or running are absorbed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use gymcoach_core::{CoachError, CoachResult};

use crate::{ClassifierSlot, DatasetSink, ExerciseClassifier, Trainer};

/// Retraining configuration
#[derive(Debug, Clone)]
pub struct RetrainConfig {
    /// Delay before reading the dataset
    pub debounce: Duration,
    /// Threshold applied to the freshly trained classifier
    pub confidence_threshold: f32,
}

impl Default for RetrainConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_secs(2),
            confidence_threshold: crate::DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Clears the in-flight flag when the job ends, however it ends
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Background retrainer bound to one classifier slot
#[derive(Clone)]
pub struct Retrainer {
    slot: Arc<ClassifierSlot>,
    dataset: Arc<dyn DatasetSink>,
    trainer: Arc<dyn Trainer>,
    config: RetrainConfig,
    in_flight: Arc<AtomicBool>,
}

impl Retrainer {
    pub fn new(
        slot: Arc<ClassifierSlot>,
        dataset: Arc<dyn DatasetSink>,
        trainer: Arc<dyn Trainer>,
        config: RetrainConfig,
    ) -> Self {
        Self {
            slot,
            dataset,
            trainer,
            config,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Schedule a retrain on the current tokio runtime
    ///
    /// Returns `RetrainInFlight` if a job is already scheduled or running;
    /// that request is absorbed by the pending job.
    pub fn schedule(&self) -> CoachResult<JoinHandle<()>> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CoachError::TrainingFailed(format!("no async runtime: {e}")))?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CoachError::RetrainInFlight);
        }

        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        let job = self.clone();

        Ok(runtime.spawn(async move {
            let _guard = guard;
            tokio::time::sleep(job.config.debounce).await;

            info!("retraining classifier");
            match tokio::task::spawn_blocking(move || job.retrain_now()).await {
                Ok(Ok(rows)) => info!(rows, "classifier retrained"),
                Ok(Err(e)) => warn!("retrain failed, keeping current classifier: {}", e),
                Err(e) => warn!("retrain task aborted: {}", e),
            }
        }))
    }

    /// Fit on the current dataset and swap on success
    ///
    /// Runs synchronously. On failure the serving classifier is untouched.
    pub fn retrain_now(&self) -> CoachResult<usize> {
        let rows = self.dataset.rows()?;
        let model = self.trainer.train(&rows)?;
        let classifier = ExerciseClassifier::new(model, self.config.confidence_threshold)?;
        self.slot.swap(classifier);
        Ok(rows.len())
    }
}
