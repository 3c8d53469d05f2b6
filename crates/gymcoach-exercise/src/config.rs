//! Session thresholds
//!
//! Angles are in degrees, offsets in normalized image units. Every field
//! has a default so partial TOML sections deserialize.

use serde::{Deserialize, Serialize};

use gymcoach_core::Side;

use crate::IdleThresholds;

/// Default visibility below which a required landmark counts as missing
pub const DEFAULT_MIN_VISIBILITY: f32 = 0.4;

/// Shared session configuration plus per-exercise thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub min_visibility: f32,
    /// Capacity of the recent-metric ring buffer
    pub history: usize,
    /// EMA factor applied to the primary metric; 1.0 disables smoothing
    pub metric_alpha: f32,
    pub idle: IdleThresholds,
    pub squat: SquatConfig,
    pub pushup: PushupConfig,
    pub bicep_curl: BicepCurlConfig,
    pub deadlift: DeadliftConfig,
    pub lunge: LungeConfig,
    pub plank: PlankConfig,
    pub bench_press: BenchPressConfig,
    pub lat_pulldown: LatPulldownConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_visibility: DEFAULT_MIN_VISIBILITY,
            history: 5,
            metric_alpha: 1.0,
            idle: IdleThresholds::default(),
            squat: SquatConfig::default(),
            pushup: PushupConfig::default(),
            bicep_curl: BicepCurlConfig::default(),
            deadlift: DeadliftConfig::default(),
            lunge: LungeConfig::default(),
            plank: PlankConfig::default(),
            bench_press: BenchPressConfig::default(),
            lat_pulldown: LatPulldownConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Smoothed primary metric for noisy live input
    pub fn smoothed() -> Self {
        Self {
            metric_alpha: 0.18,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquatConfig {
    /// Knee angle entering the bottom
    pub down_angle: f32,
    /// Knee angle completing the rep
    pub up_angle: f32,
    /// Above this knee angle the squat is too shallow
    pub depth_angle: f32,
    pub max_forward_lean_deg: f32,
    pub max_knee_asymmetry_deg: f32,
}

impl Default for SquatConfig {
    fn default() -> Self {
        Self {
            down_angle: 100.0,
            up_angle: 160.0,
            depth_angle: 130.0,
            max_forward_lean_deg: 45.0,
            max_knee_asymmetry_deg: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushupConfig {
    pub bottom_angle: f32,
    pub top_angle: f32,
    /// A rep whose lowest elbow angle stays above this was too shallow
    pub min_depth_angle: f32,
    pub hip_high_offset: f32,
    pub hip_low_offset: f32,
    pub min_hand_width_factor: f32,
    pub max_hand_width_factor: f32,
}

impl Default for PushupConfig {
    fn default() -> Self {
        Self {
            bottom_angle: 90.0,
            top_angle: 160.0,
            min_depth_angle: 110.0,
            hip_high_offset: -0.05,
            hip_low_offset: 0.05,
            min_hand_width_factor: 0.8,
            max_hand_width_factor: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BicepCurlConfig {
    pub side: Side,
    /// Elbow angle of full contraction
    pub top_angle: f32,
    /// Elbow angle of full extension
    pub bottom_angle: f32,
    /// A rep that never opened past this lacked extension
    pub min_extension_angle: f32,
    /// A rep that never closed below this lacked contraction
    pub max_contraction_angle: f32,
    pub max_shoulder_dx: f32,
    pub max_shoulder_dy: f32,
    pub max_wrist_bend_deg: f32,
}

impl Default for BicepCurlConfig {
    fn default() -> Self {
        Self {
            side: Side::Right,
            top_angle: 50.0,
            bottom_angle: 160.0,
            min_extension_angle: 150.0,
            max_contraction_angle: 60.0,
            max_shoulder_dx: 0.05,
            max_shoulder_dy: 0.05,
            max_wrist_bend_deg: 25.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadliftConfig {
    pub bottom_hip_angle: f32,
    pub top_hip_angle: f32,
    pub max_back_round_deg: f32,
    /// Knee angles below this look like a squat
    pub min_knee_angle: f32,
    pub max_bar_distance: f32,
    pub max_knee_forward: f32,
}

impl Default for DeadliftConfig {
    fn default() -> Self {
        Self {
            bottom_hip_angle: 70.0,
            top_hip_angle: 160.0,
            max_back_round_deg: 45.0,
            min_knee_angle: 120.0,
            max_bar_distance: 0.12,
            max_knee_forward: 0.08,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LungeConfig {
    /// Leg stepping forward
    pub side: Side,
    pub bottom_angle: f32,
    pub top_angle: f32,
    pub max_knee_valgus_offset: f32,
    pub max_knee_over_toe_offset: f32,
    pub max_torso_lean_deg: f32,
    pub max_lateral_sway: f32,
}

impl Default for LungeConfig {
    fn default() -> Self {
        Self {
            side: Side::Right,
            bottom_angle: 90.0,
            top_angle: 165.0,
            max_knee_valgus_offset: 0.05,
            max_knee_over_toe_offset: 0.1,
            max_torso_lean_deg: 35.0,
            max_lateral_sway: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlankConfig {
    pub hip_high_offset: f32,
    pub hip_low_offset: f32,
    pub max_neck_angle_deg: f32,
    pub max_shoulder_elbow_dx: f32,
    pub hip_penalty: f32,
    pub shoulder_penalty: f32,
    pub neck_penalty: f32,
    /// Score lost per unit of average penalty
    pub score_scale: f32,
    pub min_score: f32,
}

impl Default for PlankConfig {
    fn default() -> Self {
        Self {
            hip_high_offset: -0.05,
            hip_low_offset: 0.05,
            max_neck_angle_deg: 20.0,
            max_shoulder_elbow_dx: 0.08,
            hip_penalty: 0.8,
            shoulder_penalty: 0.5,
            neck_penalty: 0.4,
            score_scale: 15.0,
            min_score: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchPressConfig {
    pub bottom_angle: f32,
    pub top_angle: f32,
    /// Slack above `bottom_angle` still accepted as full range
    pub depth_slack_deg: f32,
    pub min_bar_drop: f32,
    pub max_elbow_flare_deg: f32,
    pub max_bar_drift: f32,
}

impl Default for BenchPressConfig {
    fn default() -> Self {
        Self {
            bottom_angle: 80.0,
            top_angle: 160.0,
            depth_slack_deg: 10.0,
            min_bar_drop: 0.06,
            max_elbow_flare_deg: 70.0,
            max_bar_drift: 0.08,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatPulldownConfig {
    /// Fraction of the observed travel the wrists must drop to enter a rep
    pub bottom_fraction: f32,
    /// Travel assumed until the first rep completes
    pub default_range: f32,
    /// How close to the top the wrists must return to complete a rep
    pub top_tolerance: f32,
    pub max_lean_deg: f32,
    /// Rise of the shoulders towards the nose, relative to the start
    /// position, read as a shrug
    pub max_shoulder_lift: f32,
    pub max_elbow_drift_x: f32,
    /// Wrists below `nose + margin` while pulling have passed the chin
    pub chin_margin: f32,
}

impl Default for LatPulldownConfig {
    fn default() -> Self {
        Self {
            bottom_fraction: 0.25,
            default_range: 0.25,
            top_tolerance: 0.02,
            max_lean_deg: 25.0,
            max_shoulder_lift: 0.05,
            max_elbow_drift_x: 0.08,
            chin_margin: 0.06,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.squat.down_angle, 100.0);
        assert_eq!(cfg.squat.up_angle, 160.0);
        assert_eq!(cfg.bicep_curl.side, Side::Right);
        assert_eq!(cfg.min_visibility, 0.4);
        assert_eq!(SessionConfig::smoothed().metric_alpha, 0.18);
    }

    #[test]
    fn test_partial_json() {
        let cfg: SessionConfig =
            serde_json::from_str(r#"{"squat": {"down_angle": 70.0}, "history": 8}"#).unwrap();
        assert_eq!(cfg.squat.down_angle, 70.0);
        assert_eq!(cfg.squat.up_angle, 160.0);
        assert_eq!(cfg.history, 8);
    }
}
