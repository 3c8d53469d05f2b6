//! Baseline nearest-centroid model and its trainer
//!
//! Features are z-scaled per column (angles span degrees, ratios span
//! roughly one unit), then each class is summarized by its mean row.
//! Probabilities are a softmax over negative scaled distances.

use std::collections::BTreeMap;

use gymcoach_core::{CoachError, CoachResult, ExerciseKind};
use gymcoach_features::FEATURE_COUNT;

use crate::{LabeledRow, ProbabilisticModel};

/// Lower bound on a column's spread so constant columns do not explode
const MIN_SCALE: f32 = 1e-3;

/// Nearest-centroid classifier with softmax confidences
#[derive(Debug, Clone)]
pub struct NearestCentroidModel {
    classes: Vec<String>,
    centroids: Vec<[f32; FEATURE_COUNT]>,
    mean: [f32; FEATURE_COUNT],
    scale: [f32; FEATURE_COUNT],
    temperature: f32,
}

impl NearestCentroidModel {
    fn scaled(&self, row: &[f32]) -> [f32; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for (i, v) in out.iter_mut().enumerate() {
            let x = row.get(i).copied().unwrap_or(0.0);
            *v = (x - self.mean[i]) / self.scale[i];
        }
        out
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

impl ProbabilisticModel for NearestCentroidModel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, features: &[f32]) -> Vec<f32> {
        let x = self.scaled(features);
        let logits: Vec<f32> = self
            .centroids
            .iter()
            .map(|c| {
                let d2: f32 = c.iter().zip(&x).map(|(a, b)| (a - b) * (a - b)).sum();
                -d2.sqrt() / self.temperature
            })
            .collect();

        let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exp: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f32 = exp.iter().sum();
        exp.into_iter().map(|e| e / total).collect()
    }
}

/// Something that fits a model from labeled rows
pub trait Trainer: Send + Sync {
    fn train(&self, rows: &[LabeledRow]) -> CoachResult<Box<dyn ProbabilisticModel>>;
}

/// Trainer for [`NearestCentroidModel`]
#[derive(Debug, Clone)]
pub struct CentroidTrainer {
    /// Softmax temperature in scaled-distance units
    pub temperature: f32,
}

impl CentroidTrainer {
    pub fn new(temperature: f32) -> Self {
        Self {
            temperature: temperature.max(1e-3),
        }
    }

    /// Fit, returning the concrete model type
    pub fn fit(&self, rows: &[LabeledRow]) -> CoachResult<NearestCentroidModel> {
        if rows.is_empty() {
            return Err(CoachError::EmptyDataset);
        }

        let mut parsed: Vec<(ExerciseKind, &[f32])> = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            if row.features.len() != FEATURE_COUNT {
                return Err(CoachError::FeatureShape {
                    expected: FEATURE_COUNT,
                    actual: row.features.len(),
                });
            }
            if row.features.iter().any(|v| !v.is_finite()) {
                return Err(CoachError::TrainingFailed(format!(
                    "row {idx} has non-finite features"
                )));
            }
            let kind = ExerciseKind::from_alias(&row.label).ok_or_else(|| {
                CoachError::TrainingFailed(format!("row {idx} has unknown label {:?}", row.label))
            })?;
            parsed.push((kind, row.features.as_slice()));
        }

        let n = parsed.len() as f32;
        let mut mean = [0.0f32; FEATURE_COUNT];
        for (_, f) in &parsed {
            for (m, v) in mean.iter_mut().zip(f.iter()) {
                *m += v / n;
            }
        }
        let mut scale = [0.0f32; FEATURE_COUNT];
        for (_, f) in &parsed {
            for i in 0..FEATURE_COUNT {
                scale[i] += (f[i] - mean[i]).powi(2) / n;
            }
        }
        for s in scale.iter_mut() {
            *s = s.sqrt().max(MIN_SCALE);
        }

        // BTreeMap keeps classes in ExerciseKind order
        let mut sums: BTreeMap<ExerciseKind, ([f32; FEATURE_COUNT], usize)> = BTreeMap::new();
        for (kind, f) in &parsed {
            let entry = sums.entry(*kind).or_insert(([0.0; FEATURE_COUNT], 0));
            for i in 0..FEATURE_COUNT {
                entry.0[i] += (f[i] - mean[i]) / scale[i];
            }
            entry.1 += 1;
        }

        let mut classes = Vec::with_capacity(sums.len());
        let mut centroids = Vec::with_capacity(sums.len());
        for (kind, (sum, count)) in sums {
            classes.push(kind.as_str().to_string());
            centroids.push(sum.map(|v| v / count as f32));
        }

        Ok(NearestCentroidModel {
            classes,
            centroids,
            mean,
            scale,
            temperature: self.temperature,
        })
    }
}

impl Default for CentroidTrainer {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Trainer for CentroidTrainer {
    fn train(&self, rows: &[LabeledRow]) -> CoachResult<Box<dyn ProbabilisticModel>> {
        Ok(Box::new(self.fit(rows)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fill: f32, label: &str) -> LabeledRow {
        LabeledRow::from_raw(vec![fill; FEATURE_COUNT], label)
    }

    #[test]
    fn test_fit_and_predict() {
        let rows = vec![
            row(170.0, "squat"),
            row(172.0, "squats"),
            row(60.0, "pushup"),
            row(62.0, "push-up"),
        ];
        let model = CentroidTrainer::default().fit(&rows).unwrap();
        assert_eq!(model.classes(), &["squat".to_string(), "pushup".to_string()]);

        let p = model.predict_proba(&[171.0; FEATURE_COUNT]);
        assert_eq!(p.len(), 2);
        assert!(p[0] > 0.9);
        assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_dataset() {
        assert!(matches!(
            CentroidTrainer::default().fit(&[]),
            Err(CoachError::EmptyDataset)
        ));
    }

    #[test]
    fn test_malformed_rows_fail() {
        let short = vec![LabeledRow::from_raw(vec![1.0; 4], "squat")];
        assert!(matches!(
            CentroidTrainer::default().fit(&short),
            Err(CoachError::FeatureShape { .. })
        ));

        let unknown = vec![row(1.0, "jumping_jack")];
        assert!(matches!(
            CentroidTrainer::default().fit(&unknown),
            Err(CoachError::TrainingFailed(_))
        ));

        let nan = vec![row(f32::NAN, "squat")];
        assert!(CentroidTrainer::default().fit(&nan).is_err());
    }

    #[test]
    fn test_single_class_is_certain() {
        let model = CentroidTrainer::default().fit(&[row(1.0, "plank")]).unwrap();
        assert_eq!(model.predict_proba(&[5.0; FEATURE_COUNT]), vec![1.0]);
    }
}
