//! GymCoach Classifier - Which exercise is the subject doing?
//!
//! Pipeline per frame: features → probabilistic model → confidence gate →
//! temporal majority vote.
//!
//! - `ExerciseClassifier`: wraps any `ProbabilisticModel` behind a
//!   confidence threshold
//! - `LabelStabilizer`: windowed majority vote, reset on `Unknown`
//! - `ClassifierSlot`: hot-swappable shared classifier
//! - `Retrainer`: debounced, single-slot background retraining
//! - `NearestCentroidModel`: baseline model + trainer

pub mod adapter;
pub mod centroid;
pub mod dataset;
pub mod retrain;
pub mod slot;
pub mod stabilizer;

pub use adapter::*;
pub use centroid::*;
pub use dataset::*;
pub use retrain::*;
pub use slot::*;
pub use stabilizer::*;
