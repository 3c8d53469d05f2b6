//! Exercise identity
//!
//! `ExerciseKind` is the closed set of supported exercises. `ExerciseLabel`
//! adds the `Unknown` sentinel produced by low-confidence classification or
//! an unstable label stream.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Supported exercise kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Squat,
    Pushup,
    BicepCurl,
    Deadlift,
    Lunge,
    Plank,
    BenchPress,
    LatPulldown,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 8] = [
        ExerciseKind::Squat,
        ExerciseKind::Pushup,
        ExerciseKind::BicepCurl,
        ExerciseKind::Deadlift,
        ExerciseKind::Lunge,
        ExerciseKind::Plank,
        ExerciseKind::BenchPress,
        ExerciseKind::LatPulldown,
    ];

    /// Canonical identifier
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseKind::Squat => "squat",
            ExerciseKind::Pushup => "pushup",
            ExerciseKind::BicepCurl => "bicep_curl",
            ExerciseKind::Deadlift => "deadlift",
            ExerciseKind::Lunge => "lunge",
            ExerciseKind::Plank => "plank",
            ExerciseKind::BenchPress => "bench_press",
            ExerciseKind::LatPulldown => "lat_pulldown",
        }
    }

    /// Human-readable name
    pub fn display_name(self) -> &'static str {
        match self {
            ExerciseKind::Squat => "Squat",
            ExerciseKind::Pushup => "Push-up",
            ExerciseKind::BicepCurl => "Bicep curl",
            ExerciseKind::Deadlift => "Deadlift",
            ExerciseKind::Lunge => "Lunge",
            ExerciseKind::Plank => "Plank",
            ExerciseKind::BenchPress => "Bench press",
            ExerciseKind::LatPulldown => "Lat pull-down",
        }
    }

    /// Holds have no rep logic
    pub fn counts_reps(self) -> bool {
        self != ExerciseKind::Plank
    }

    /// Normalize a free-form exercise name to its canonical kind
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Unrecognized names return `None`.
    pub fn from_alias(name: &str) -> Option<ExerciseKind> {
        let name = name.trim().to_ascii_lowercase();
        let kind = match name.as_str() {
            "squat" | "squats" => ExerciseKind::Squat,
            "pushup" | "pushups" | "push-up" | "push_up" => ExerciseKind::Pushup,
            "bicep_curl" | "bicep-curl" | "curl" | "bicep" | "hammer_curl" => {
                ExerciseKind::BicepCurl
            }
            "deadlift" | "deadlifts" => ExerciseKind::Deadlift,
            "lunge" | "lunges" => ExerciseKind::Lunge,
            "plank" => ExerciseKind::Plank,
            "bench" | "bench_press" | "benchpress" | "bench-press" => ExerciseKind::BenchPress,
            "lat" | "lat_pulldown" | "lat-pulldown" | "pulldown" => ExerciseKind::LatPulldown,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier / stabilizer output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExerciseLabel {
    Known(ExerciseKind),
    #[default]
    Unknown,
}

impl ExerciseLabel {
    pub fn kind(self) -> Option<ExerciseKind> {
        match self {
            ExerciseLabel::Known(kind) => Some(kind),
            ExerciseLabel::Unknown => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        self == ExerciseLabel::Unknown
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseLabel::Known(kind) => kind.as_str(),
            ExerciseLabel::Unknown => "unknown",
        }
    }

    /// Map a class name to a label; unrecognized names become `Unknown`
    pub fn from_class_name(name: &str) -> ExerciseLabel {
        ExerciseKind::from_alias(name)
            .map(ExerciseLabel::Known)
            .unwrap_or(ExerciseLabel::Unknown)
    }
}

impl From<ExerciseKind> for ExerciseLabel {
    fn from(kind: ExerciseKind) -> Self {
        ExerciseLabel::Known(kind)
    }
}

impl From<Option<ExerciseKind>> for ExerciseLabel {
    fn from(kind: Option<ExerciseKind>) -> Self {
        kind.map(ExerciseLabel::Known).unwrap_or_default()
    }
}

impl FromStr for ExerciseLabel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ExerciseLabel::from_class_name(s))
    }
}

impl fmt::Display for ExerciseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ExerciseLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ExerciseLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(ExerciseLabel::from_class_name(&name))
    }
}
