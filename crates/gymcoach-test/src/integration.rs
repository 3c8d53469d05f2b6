//! End-to-end Integration Test Suite
//!
//! Runs scripted scenarios through the full coaching pipeline:
//! - Rep counting per exercise, clean and under detector noise
//! - Idle filtering and missing-pose handling
//! - Spoken feedback pacing
//! - Auto-detection with a classifier trained on simulated rows

use std::sync::Arc;

use gymcoach_classifier::{CentroidTrainer, ConstantModel, LabeledRow, ProbabilisticModel, Trainer};
use gymcoach_core::{CoachResult, ExerciseKind};
use gymcoach_features::extract;
use gymcoach_runtime::{Coach, CoachConfig, ExerciseMode, FrameStatus, TimelineReport};

use crate::{NoiseConfig, NoiseModel, Scenario};

// ============================================================================
// COACH BUILDERS
// ============================================================================

/// Coach locked onto `kind`
pub fn explicit_coach(kind: ExerciseKind, mut config: CoachConfig) -> CoachResult<Coach> {
    config.mode = ExerciseMode::Explicit(kind);
    Coach::from_model(config, Box::new(ConstantModel::certain(kind.as_str())))
}

/// Coach in auto mode serving `model`
pub fn auto_coach(model: Box<dyn ProbabilisticModel>, mut config: CoachConfig) -> CoachResult<Coach> {
    config.mode = ExerciseMode::Auto;
    Coach::from_model(config, model)
}

// ============================================================================
// TRAINING DATA
// ============================================================================

/// One labeled feature row per rendered pose of `scenario`
pub fn labeled_rows(scenario: &Scenario, kind: ExerciseKind) -> Vec<LabeledRow> {
    scenario
        .render(None)
        .into_iter()
        .filter_map(|(_, pose)| pose)
        .map(|pose| LabeledRow::new(&extract(&pose), kind))
        .collect()
}

/// Squat and plank rows, enough to tell the two apart
pub fn reference_rows() -> Vec<LabeledRow> {
    let mut rows = labeled_rows(&Scenario::squats(3, 70.0), ExerciseKind::Squat);
    rows.extend(labeled_rows(&Scenario::plank(3.0, 180.0), ExerciseKind::Plank));
    rows
}

/// Centroid model fitted on [`reference_rows`]
pub fn reference_model() -> CoachResult<Box<dyn ProbabilisticModel>> {
    CentroidTrainer::default().train(&reference_rows())
}

// ============================================================================
// SCENARIO RUNS
// ============================================================================

/// Result of one scenario run
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub name: String,
    pub expected_reps: u32,
    pub report: TimelineReport,
}

impl ScenarioOutcome {
    pub fn reps_match(&self) -> bool {
        self.report.total_reps == self.expected_reps
    }

    pub fn frames_with(&self, status: FrameStatus) -> usize {
        self.report
            .timeline
            .iter()
            .filter(|f| f.status == status)
            .count()
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} reps (expected {}), {} frames, {} utterances",
            self.name,
            self.report.total_reps,
            self.expected_reps,
            self.report.frames_analyzed,
            self.report.stats.utterances,
        )
    }
}

/// Run `scenario` on `coach`, with seeded noise when `noise` is given
pub fn run_scenario(
    scenario: &Scenario,
    coach: &Coach,
    expected_reps: u32,
    noise: Option<(NoiseConfig, u64)>,
) -> ScenarioOutcome {
    let mut model = noise.map(|(config, seed)| NoiseModel::new(config, seed));
    let report = scenario.run(coach, model.as_mut());
    ScenarioOutcome {
        name: scenario.name.clone(),
        expected_reps,
        report,
    }
}

/// Squats, curls and a plank, each on its own explicit coach
pub fn run_exercise_suite(noise: Option<(NoiseConfig, u64)>) -> CoachResult<Vec<ScenarioOutcome>> {
    let mut curl_config = CoachConfig::default();
    curl_config.session.idle.exempt.push(ExerciseKind::BicepCurl);

    let runs = [
        (Scenario::squats(5, 70.0), ExerciseKind::Squat, CoachConfig::default(), 5),
        (Scenario::curls(4, 40.0), ExerciseKind::BicepCurl, curl_config, 4),
        (Scenario::plank(5.0, 180.0), ExerciseKind::Plank, CoachConfig::default(), 0),
    ];

    runs.into_iter()
        .map(|(scenario, kind, config, expected)| {
            let coach = explicit_coach(kind, config)?;
            Ok(run_scenario(&scenario, &coach, expected, noise.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BodyAngles;
    use gymcoach_classifier::{ClassifierSlot, DatasetSink, MemoryDataset};
    use gymcoach_core::ExerciseLabel;
    use gymcoach_exercise::plank::HIPS_SAGGING;
    use gymcoach_exercise::{Diagnostics, IDLE_ISSUE};
    use gymcoach_feedback::{RecordingSpeaker, SpeechDispatcher};
    use gymcoach_runtime::POSE_NOT_DETECTED;
    use std::time::Duration;

    /// Speech runs off-thread; wait for `n` utterances
    fn spoken_after(speaker: &RecordingSpeaker, n: usize) -> Vec<String> {
        for _ in 0..200 {
            if speaker.spoken().len() >= n {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        speaker.spoken()
    }

    #[test]
    fn test_squats_counted() {
        let coach = explicit_coach(ExerciseKind::Squat, CoachConfig::default()).unwrap();
        let outcome = run_scenario(&Scenario::squats(3, 70.0), &coach, 3, None);

        assert!(outcome.reps_match(), "{}", outcome.summary());
        assert_eq!(outcome.report.exercise, ExerciseLabel::Known(ExerciseKind::Squat));
        assert_eq!(outcome.report.frames_analyzed, Scenario::squats(3, 70.0).len());
        assert_eq!(outcome.frames_with(FrameStatus::NoPose), 0);
        assert!(outcome.frames_with(FrameStatus::Idle) > 0);
    }

    #[test]
    fn test_squats_counted_under_noise() {
        let coach = explicit_coach(ExerciseKind::Squat, CoachConfig::default()).unwrap();
        let outcome = run_scenario(
            &Scenario::squats(3, 70.0),
            &coach,
            3,
            Some((NoiseConfig::webcam(), 42)),
        );
        assert!(outcome.reps_match(), "{}", outcome.summary());
    }

    #[test]
    fn test_shallow_squats_not_counted() {
        let coach = explicit_coach(ExerciseKind::Squat, CoachConfig::default()).unwrap();
        let outcome = run_scenario(&Scenario::squats(3, 130.0), &coach, 0, None);
        assert!(outcome.reps_match(), "{}", outcome.summary());
    }

    #[test]
    fn test_curls_counted_with_exemption() {
        let mut config = CoachConfig::default();
        config.session.idle.exempt.push(ExerciseKind::BicepCurl);
        let coach = explicit_coach(ExerciseKind::BicepCurl, config).unwrap();
        let outcome = run_scenario(&Scenario::curls(4, 40.0), &coach, 4, None);

        assert!(outcome.reps_match(), "{}", outcome.summary());
        assert_eq!(outcome.frames_with(FrameStatus::Idle), 0);
    }

    #[test]
    fn test_standing_curls_idle_by_default() {
        let coach = explicit_coach(ExerciseKind::BicepCurl, CoachConfig::default()).unwrap();
        let outcome = run_scenario(&Scenario::curls(2, 40.0), &coach, 0, None);

        assert!(outcome.reps_match(), "{}", outcome.summary());
        assert_eq!(outcome.frames_with(FrameStatus::Active), 0);
    }

    #[test]
    fn test_standing_is_idle() {
        let speaker = Arc::new(RecordingSpeaker::new());
        let coach = explicit_coach(ExerciseKind::Squat, CoachConfig::default())
            .unwrap()
            .with_speech(SpeechDispatcher::new(speaker.clone()));
        let outcome = run_scenario(&Scenario::standing(3.0), &coach, 0, None);

        assert!(outcome.reps_match());
        assert_eq!(outcome.frames_with(FrameStatus::Idle), 90);
        assert_eq!(outcome.report.issue_summary.most_common(), Some(IDLE_ISSUE));
        assert_eq!(outcome.report.stats.utterances, 1);
        assert_eq!(spoken_after(&speaker, 1), vec![IDLE_ISSUE.to_string()]);
    }

    #[test]
    fn test_good_plank() {
        let coach = explicit_coach(ExerciseKind::Plank, CoachConfig::default()).unwrap();
        let outcome = run_scenario(&Scenario::plank(5.0, 180.0), &coach, 0, None);

        assert!(outcome.reps_match());
        assert!(outcome.report.issue_summary.is_empty());
        assert_eq!(outcome.frames_with(FrameStatus::Active), 150);
        match &outcome.report.timeline.last().unwrap().result.diagnostics {
            Diagnostics::Plank(d) => {
                assert_eq!(d.posture_score, 100.0);
                assert!(d.elapsed_seconds > 4.9);
            }
            other => panic!("unexpected diagnostics {other:?}"),
        }
    }

    #[test]
    fn test_sagging_plank_is_spoken() {
        let speaker = Arc::new(RecordingSpeaker::new());
        let coach = explicit_coach(ExerciseKind::Plank, CoachConfig::default())
            .unwrap()
            .with_speech(SpeechDispatcher::new(speaker.clone()));
        let outcome = run_scenario(&Scenario::plank(2.0, 200.0), &coach, 0, None);

        assert_eq!(outcome.report.issue_summary.most_common(), Some(HIPS_SAGGING));
        assert_eq!(outcome.report.stats.utterances, 1);
        assert_eq!(spoken_after(&speaker, 1), vec![HIPS_SAGGING.to_string()]);
    }

    #[test]
    fn test_gap_mid_rep_keeps_session() {
        let standing = BodyAngles::squat(175.0);
        let scenario = Scenario::new("gap", 30.0)
            .hold(standing, 0.5)
            .transition(BodyAngles::squat(70.0), 1.0)
            .gap(0.5)
            .hold(BodyAngles::squat(70.0), 0.2)
            .transition(standing, 1.0)
            .hold(standing, 0.5);
        let coach = explicit_coach(ExerciseKind::Squat, CoachConfig::default()).unwrap();
        let outcome = run_scenario(&scenario, &coach, 1, None);

        assert!(outcome.reps_match(), "{}", outcome.summary());
        assert_eq!(outcome.frames_with(FrameStatus::NoPose), 15);
        assert_eq!(outcome.report.stats.session_switches, 1);
        assert!(outcome
            .report
            .issue_summary
            .issues
            .iter()
            .any(|c| c.issue == POSE_NOT_DETECTED && c.count == 15));
    }

    #[test]
    fn test_auto_mode_detects_exercises() {
        let coach = auto_coach(reference_model().unwrap(), CoachConfig::default()).unwrap();

        let squats = run_scenario(&Scenario::squats(2, 70.0), &coach, 2, None);
        assert_eq!(squats.report.exercise, ExerciseLabel::Known(ExerciseKind::Squat));
        assert!(squats.reps_match(), "{}", squats.summary());

        let plank = run_scenario(&Scenario::plank(3.0, 180.0), &coach, 0, None);
        assert_eq!(plank.report.exercise, ExerciseLabel::Known(ExerciseKind::Plank));
        assert!(plank.frames_with(FrameStatus::Active) > 60);
    }

    #[test]
    fn test_exercise_suite() {
        for outcome in run_exercise_suite(None).unwrap() {
            assert!(outcome.reps_match(), "{}", outcome.summary());
        }
    }

    #[tokio::test]
    async fn test_captured_samples_teach_classifier() {
        let mut config = CoachConfig::default();
        config.session.idle.exempt.push(ExerciseKind::BicepCurl);
        config.retrain.debounce_secs = 0.01;

        let dataset = Arc::new(MemoryDataset::with_rows(labeled_rows(
            &Scenario::plank(1.0, 180.0),
            ExerciseKind::Plank,
        )));
        let coach = explicit_coach(ExerciseKind::BicepCurl, config)
            .unwrap()
            .with_sample_capture(dataset.clone(), Arc::new(CentroidTrainer::default()));
        let slot: &Arc<ClassifierSlot> = coach.classifier();

        let outcome = run_scenario(&Scenario::curls(2, 40.0), &coach, 2, None);
        assert!(outcome.reps_match(), "{}", outcome.summary());
        assert!(outcome.report.stats.samples_captured > 0);
        assert!(dataset.len().unwrap() > 30);

        for _ in 0..400 {
            if slot.generation() > 0 && !coach.sample_capture().unwrap().retrainer.is_in_flight() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(slot.generation() >= 1);

        let curl = crate::PoseSimulator::new().pose(&BodyAngles::curl(60.0));
        assert_eq!(
            slot.predict(&extract(&curl)),
            ExerciseLabel::Known(ExerciseKind::BicepCurl)
        );
    }
}
