//! Per-frame session output
//!
//! `FrameResult` is the stable contract transports serialize. Diagnostics
//! are named, per-exercise scalars rather than an untyped map.

use serde::{Deserialize, Serialize};

use crate::Phase;

/// Result of one session update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    pub rep_count: u32,
    /// Form issues in check order; not deduplicated
    pub issues: Vec<String>,
    pub diagnostics: Diagnostics,
}

impl FrameResult {
    pub fn new(rep_count: u32, issues: Vec<String>, diagnostics: Diagnostics) -> Self {
        Self {
            rep_count,
            issues,
            diagnostics,
        }
    }

    /// Frame where required joints could not be resolved
    pub fn missing(rep_count: u32, issue: &str, reason: MissingReason) -> Self {
        Self::new(
            rep_count,
            vec![issue.to_string()],
            Diagnostics::Missing { reason },
        )
    }

    /// Frame the orchestrator could not attribute to any exercise
    pub fn detecting(rep_count: u32) -> Self {
        Self::new(rep_count, Vec::new(), Diagnostics::Detecting)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.diagnostics, Diagnostics::Missing { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.diagnostics, Diagnostics::Idle { .. })
    }
}

/// Why a frame produced no measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReason {
    NoPose,
    Occluded,
    UndefinedAngle,
}

/// Exercise-specific diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostics {
    Squat(SquatDiagnostics),
    Pushup(PushupDiagnostics),
    BicepCurl(BicepCurlDiagnostics),
    Deadlift(DeadliftDiagnostics),
    Lunge(LungeDiagnostics),
    Plank(PlankDiagnostics),
    BenchPress(BenchPressDiagnostics),
    LatPulldown(LatPulldownDiagnostics),
    Idle { avg_knee: f32, avg_hip: f32 },
    Missing { reason: MissingReason },
    /// No exercise recognized yet; no session ran
    Detecting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquatDiagnostics {
    pub knee_angle: f32,
    pub state: Phase,
    /// `None` when shoulders and hips coincide
    pub torso_angle_from_vertical: Option<f32>,
    pub knee_angle_diff: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushupDiagnostics {
    pub elbow_angle: f32,
    pub state: Phase,
    /// Positive when hips sit below the shoulder-ankle line
    pub hip_offset: f32,
    pub shoulder_width: f32,
    pub hand_width: f32,
    pub hand_width_ratio: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BicepCurlDiagnostics {
    pub elbow_angle: f32,
    pub state: Phase,
    pub shoulder_dx: f32,
    pub shoulder_dy: f32,
    pub wrist_bend_deg: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadliftDiagnostics {
    pub hip_angle: f32,
    pub knee_angle: f32,
    pub state: Phase,
    pub spine_angle_deg: f32,
    pub bar_distance: f32,
    pub knee_forward_offset: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LungeDiagnostics {
    pub front_knee_angle: f32,
    pub state: Phase,
    pub knee_over_toe_offset: f32,
    pub knee_valgus_offset: f32,
    pub torso_angle_deg: f32,
    pub lateral_sway: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlankDiagnostics {
    pub elapsed_seconds: f64,
    pub hip_offset: f32,
    pub shoulder_elbow_dx: f32,
    pub neck_angle_deg: f32,
    /// Running score in `[40, 100]`
    pub posture_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchPressDiagnostics {
    pub elbow_angle: f32,
    pub state: Phase,
    pub bar_drop: f32,
    pub elbow_flare_deg: f32,
    pub bar_horizontal_drift: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatPulldownDiagnostics {
    pub hand_top_y: f32,
    pub current_wrist_y: f32,
    pub bottom_threshold_y: f32,
    pub state: Phase,
    pub lean_deg: f32,
    pub elbow_drift_x: f32,
    pub shoulder_elevation: f32,
}
