//! Coach configuration
//!
//! One TOML document covers the whole pipeline. Every section and field has
//! a default, so a file only needs the values it changes:
//!
//! ```toml
//! mode = "squat"
//!
//! [feedback]
//! min_persistence = 4
//!
//! [session.squat]
//! down_angle = 95.0
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use gymcoach_classifier::{
    RetrainConfig, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_MIN_AGREEMENT, DEFAULT_STABILIZER_WINDOW,
};
use gymcoach_core::{CoachError, CoachResult, ExerciseKind};
use gymcoach_exercise::SessionConfig;
use gymcoach_feedback::FeedbackConfig;
use serde::{Deserialize, Serialize};

/// How a stream decides which exercise is being performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExerciseMode {
    /// Classify every frame
    #[default]
    Auto,
    /// The user picked the exercise
    Explicit(ExerciseKind),
}

impl ExerciseMode {
    /// `"auto"` or any exercise alias
    pub fn parse(value: &str) -> CoachResult<Self> {
        if value.trim().eq_ignore_ascii_case("auto") {
            return Ok(ExerciseMode::Auto);
        }
        ExerciseKind::from_alias(value)
            .map(ExerciseMode::Explicit)
            .ok_or_else(|| CoachError::Config(format!("unknown exercise mode `{value}`")))
    }
}

impl TryFrom<String> for ExerciseMode {
    type Error = CoachError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ExerciseMode::parse(&value)
    }
}

impl From<ExerciseMode> for String {
    fn from(mode: ExerciseMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for ExerciseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseMode::Auto => f.write_str("auto"),
            ExerciseMode::Explicit(kind) => f.write_str(kind.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub confidence_threshold: f32,
    pub stabilizer_window: usize,
    /// Share of the window the majority label must hold
    pub min_agreement: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            stabilizer_window: DEFAULT_STABILIZER_WINDOW,
            min_agreement: DEFAULT_MIN_AGREEMENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrainSettings {
    pub debounce_secs: f64,
}

impl Default for RetrainSettings {
    fn default() -> Self {
        Self { debounce_secs: 2.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Landmark smoothing applied by [`crate::SmoothedPoseProvider`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseSmoothingConfig {
    pub enabled: bool,
    pub window: usize,
    pub min_visibility: f32,
    pub stable_frames: usize,
}

impl Default for PoseSmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window: 5,
            min_visibility: 0.5,
            stable_frames: 2,
        }
    }
}

/// Whole-pipeline configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    pub mode: ExerciseMode,
    pub classifier: ClassifierConfig,
    pub feedback: FeedbackConfig,
    pub session: SessionConfig,
    pub retrain: RetrainSettings,
    pub telemetry: TelemetryConfig,
    pub pose_smoothing: PoseSmoothingConfig,
}

impl CoachConfig {
    /// Preset for live camera streams
    pub fn live() -> Self {
        Self {
            feedback: FeedbackConfig::live(),
            session: SessionConfig::smoothed(),
            ..Default::default()
        }
    }

    pub fn from_toml_str(content: &str) -> CoachResult<Self> {
        let config: CoachConfig =
            toml::from_str(content).map_err(|e| CoachError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> CoachResult<String> {
        toml::to_string_pretty(self).map_err(|e| CoachError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> CoachResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> CoachResult<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Reject values no component can work with
    pub fn validate(&self) -> CoachResult<()> {
        let unit = |name: &str, v: f32| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(CoachError::Config(format!("{name} must be within [0, 1], got {v}")))
            }
        };
        let non_negative = |name: &str, v: f64| {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(CoachError::Config(format!("{name} must be non-negative, got {v}")))
            }
        };

        unit("classifier.confidence_threshold", self.classifier.confidence_threshold)?;
        unit("classifier.min_agreement", self.classifier.min_agreement)?;
        unit("session.min_visibility", self.session.min_visibility)?;
        unit("session.metric_alpha", self.session.metric_alpha)?;
        unit("pose_smoothing.min_visibility", self.pose_smoothing.min_visibility)?;
        non_negative("feedback.cooldown_secs", self.feedback.cooldown_secs)?;
        non_negative("feedback.repeat_after_secs", self.feedback.repeat_after_secs)?;
        non_negative("retrain.debounce_secs", self.retrain.debounce_secs)?;

        if self.classifier.stabilizer_window == 0 {
            return Err(CoachError::Config("classifier.stabilizer_window must be > 0".into()));
        }
        if self.feedback.window == 0 {
            return Err(CoachError::Config("feedback.window must be > 0".into()));
        }
        if self.pose_smoothing.window == 0 {
            return Err(CoachError::Config("pose_smoothing.window must be > 0".into()));
        }
        Ok(())
    }

    pub fn retrain_config(&self) -> RetrainConfig {
        RetrainConfig {
            debounce: Duration::from_secs_f64(self.retrain.debounce_secs.max(0.0)),
            confidence_threshold: self.classifier.confidence_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = CoachConfig::default();
        assert_eq!(cfg.mode, ExerciseMode::Auto);
        assert_eq!(cfg.classifier.stabilizer_window, 7);
        assert_eq!(cfg.feedback.window, 15);
        assert_eq!(cfg.feedback.min_persistence, 5);
        assert_eq!(cfg.retrain_config().debounce, Duration::from_secs(2));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_live_preset() {
        let cfg = CoachConfig::live();
        assert_eq!(cfg.feedback.min_persistence, 4);
        assert_eq!(cfg.session.metric_alpha, 0.18);
    }

    #[test]
    fn test_partial_toml() {
        let cfg = CoachConfig::from_toml_str(
            r#"
            mode = "Push-Up"

            [feedback]
            min_persistence = 3

            [session.squat]
            down_angle = 95.0
            "#,
        )
        .unwrap();

        assert_eq!(cfg.mode, ExerciseMode::Explicit(ExerciseKind::Pushup));
        assert_eq!(cfg.feedback.min_persistence, 3);
        assert_eq!(cfg.feedback.window, 15);
        assert_eq!(cfg.session.squat.down_angle, 95.0);
        assert_eq!(cfg.session.squat.up_angle, 160.0);
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let err = CoachConfig::from_toml_str("mode = \"yoga\"").unwrap_err();
        assert!(matches!(err, CoachError::Config(_)));
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = CoachConfig::from_toml_str("[classifier]\nconfidence_threshold = 1.5").unwrap_err();
        assert!(err.to_string().contains("confidence_threshold"));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("gymcoach-config-{}.toml", std::process::id()));
        let mut cfg = CoachConfig::live();
        cfg.mode = ExerciseMode::Explicit(ExerciseKind::LatPulldown);
        cfg.telemetry.json = true;

        cfg.save(&path).unwrap();
        let loaded = CoachConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_missing_file() {
        let err = CoachConfig::load("/nonexistent/gymcoach.toml").unwrap_err();
        assert!(matches!(err, CoachError::Io(_)));
    }
}
