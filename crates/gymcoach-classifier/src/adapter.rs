//! Confidence-gated classifier over an opaque probabilistic model

use std::fmt;

use tracing::debug;

use gymcoach_core::{CoachError, CoachResult, ExerciseLabel};
use gymcoach_features::FeatureVector;

/// Default minimum arg-max probability for a confident prediction
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.6;

/// Any trained model producing one probability per class
pub trait ProbabilisticModel: Send + Sync {
    /// Class names, index-aligned with `predict_proba` output
    fn classes(&self) -> &[String];

    /// Per-class probabilities for one feature row
    fn predict_proba(&self, features: &[f32]) -> Vec<f32>;

    /// Models that can only emit hard labels must return `false`
    fn supports_probabilities(&self) -> bool {
        true
    }
}

/// One confident or rejected prediction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: ExerciseLabel,
    /// Arg-max probability
    pub confidence: f32,
    pub class_index: usize,
}

/// Classifier adapter with confidence-based rejection
pub struct ExerciseClassifier {
    model: Box<dyn ProbabilisticModel>,
    labels: Vec<ExerciseLabel>,
    threshold: f32,
}

impl ExerciseClassifier {
    /// Wrap a model; fails fast if it cannot emit probabilities
    pub fn new(model: Box<dyn ProbabilisticModel>, threshold: f32) -> CoachResult<Self> {
        if !model.supports_probabilities() {
            return Err(CoachError::ProbabilitiesUnsupported);
        }
        if model.classes().is_empty() {
            return Err(CoachError::EmptyClassSet);
        }

        let labels = model
            .classes()
            .iter()
            .map(|name| ExerciseLabel::from_class_name(name))
            .collect();

        Ok(Self {
            model,
            labels,
            threshold,
        })
    }

    pub fn with_default_threshold(model: Box<dyn ProbabilisticModel>) -> CoachResult<Self> {
        Self::new(model, DEFAULT_CONFIDENCE_THRESHOLD)
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn labels(&self) -> &[ExerciseLabel] {
        &self.labels
    }

    /// Full prediction, or an error if the model output is malformed
    pub fn try_predict(&self, features: &FeatureVector) -> CoachResult<Prediction> {
        let probs = self.model.predict_proba(features.as_slice());
        if probs.len() != self.labels.len() {
            return Err(CoachError::ProbabilityShape {
                expected: self.labels.len(),
                actual: probs.len(),
            });
        }

        // Strict comparison keeps the lowest index on ties
        let (class_index, confidence) = probs.iter().copied().enumerate().fold(
            (0, f32::NEG_INFINITY),
            |best, (idx, p)| if p > best.1 { (idx, p) } else { best },
        );

        let label = if confidence < self.threshold {
            ExerciseLabel::Unknown
        } else {
            self.labels[class_index]
        };

        Ok(Prediction {
            label,
            confidence,
            class_index,
        })
    }

    /// Arg-max label, or `Unknown` below the confidence threshold
    pub fn predict(&self, features: &FeatureVector) -> ExerciseLabel {
        match self.try_predict(features) {
            Ok(prediction) => prediction.label,
            Err(e) => {
                debug!("classifier rejected frame: {}", e);
                ExerciseLabel::Unknown
            }
        }
    }
}

impl fmt::Debug for ExerciseClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExerciseClassifier")
            .field("labels", &self.labels)
            .field("threshold", &self.threshold)
            .finish()
    }
}

/// Fixed-output model, handy as a placeholder before training
#[derive(Debug, Clone)]
pub struct ConstantModel {
    classes: Vec<String>,
    probs: Vec<f32>,
}

impl ConstantModel {
    pub fn new(classes: Vec<String>, probs: Vec<f32>) -> Self {
        Self { classes, probs }
    }

    /// Always reports the given class with certainty
    pub fn certain(class: &str) -> Self {
        Self::new(vec![class.to_string()], vec![1.0])
    }
}

impl ProbabilisticModel for ConstantModel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, _features: &[f32]) -> Vec<f32> {
        self.probs.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymcoach_core::ExerciseKind;
    use gymcoach_features::FEATURE_COUNT;

    struct HardLabelModel(Vec<String>);

    impl ProbabilisticModel for HardLabelModel {
        fn classes(&self) -> &[String] {
            &self.0
        }

        fn predict_proba(&self, _features: &[f32]) -> Vec<f32> {
            Vec::new()
        }

        fn supports_probabilities(&self) -> bool {
            false
        }
    }

    fn classes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn features() -> FeatureVector {
        FeatureVector::from_values(&[0.0; FEATURE_COUNT]).unwrap()
    }

    #[test]
    fn test_rejects_hard_label_model() {
        let model = HardLabelModel(classes(&["squat"]));
        assert!(matches!(
            ExerciseClassifier::new(Box::new(model), 0.6),
            Err(CoachError::ProbabilitiesUnsupported)
        ));
    }

    #[test]
    fn test_rejects_empty_classes() {
        let model = ConstantModel::new(Vec::new(), Vec::new());
        assert!(matches!(
            ExerciseClassifier::new(Box::new(model), 0.6),
            Err(CoachError::EmptyClassSet)
        ));
    }

    #[test]
    fn test_confident_prediction() {
        let model = ConstantModel::new(classes(&["squat", "pushup"]), vec![0.2, 0.8]);
        let clf = ExerciseClassifier::new(Box::new(model), 0.6).unwrap();
        assert_eq!(clf.predict(&features()), ExerciseKind::Pushup.into());
    }

    #[test]
    fn test_below_threshold_is_unknown() {
        let model = ConstantModel::new(classes(&["squat", "pushup"]), vec![0.45, 0.55]);
        let clf = ExerciseClassifier::new(Box::new(model), 0.6).unwrap();
        let p = clf.try_predict(&features()).unwrap();
        assert!(p.label.is_unknown());
        assert_eq!(p.class_index, 1);
    }

    #[test]
    fn test_tie_resolves_to_lowest_index() {
        let model = ConstantModel::new(classes(&["lunge", "squat"]), vec![0.5, 0.5]);
        let clf = ExerciseClassifier::new(Box::new(model), 0.5).unwrap();
        assert_eq!(clf.predict(&features()), ExerciseKind::Lunge.into());
    }

    #[test]
    fn test_unmapped_class_is_unknown() {
        let model = ConstantModel::certain("jumping_jack");
        let clf = ExerciseClassifier::with_default_threshold(Box::new(model)).unwrap();
        assert!(clf.predict(&features()).is_unknown());
    }

    #[test]
    fn test_shape_mismatch() {
        let model = ConstantModel::new(classes(&["squat", "pushup"]), vec![1.0]);
        let clf = ExerciseClassifier::new(Box::new(model), 0.6).unwrap();
        assert!(matches!(
            clf.try_predict(&features()),
            Err(CoachError::ProbabilityShape { expected: 2, actual: 1 })
        ));
        assert!(clf.predict(&features()).is_unknown());
    }
}
