//! Labeled feature rows collected for retraining

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use gymcoach_core::{CoachResult, ExerciseKind};
use gymcoach_features::FeatureVector;

/// One training row
///
/// Rows are stored raw; shape is validated at training time so a bad row
/// only fails the attempt that reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRow {
    pub features: Vec<f32>,
    pub label: String,
}

impl LabeledRow {
    pub fn new(features: &FeatureVector, kind: ExerciseKind) -> Self {
        Self {
            features: features.as_slice().to_vec(),
            label: kind.as_str().to_string(),
        }
    }

    pub fn from_raw(features: Vec<f32>, label: impl Into<String>) -> Self {
        Self {
            features,
            label: label.into(),
        }
    }
}

/// Storage collaborator for training rows
pub trait DatasetSink: Send + Sync {
    fn append(&self, row: LabeledRow) -> CoachResult<()>;

    /// Snapshot of every stored row
    fn rows(&self) -> CoachResult<Vec<LabeledRow>>;

    fn len(&self) -> CoachResult<usize> {
        Ok(self.rows()?.len())
    }
}

/// In-memory dataset
#[derive(Debug, Default)]
pub struct MemoryDataset {
    rows: RwLock<Vec<LabeledRow>>,
}

impl MemoryDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<LabeledRow>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }
}

impl DatasetSink for MemoryDataset {
    fn append(&self, row: LabeledRow) -> CoachResult<()> {
        self.rows.write().push(row);
        Ok(())
    }

    fn rows(&self) -> CoachResult<Vec<LabeledRow>> {
        Ok(self.rows.read().clone())
    }

    fn len(&self) -> CoachResult<usize> {
        Ok(self.rows.read().len())
    }
}
