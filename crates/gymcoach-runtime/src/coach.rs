//! Per-stream coaching pipeline
//!
//! `Coach` holds what every stream shares: configuration, the serving
//! classifier and the speech output. Each camera or recording gets its own
//! `CoachStream`, which runs one frame at a time:
//!
//! 1. No pose: reset the label vote, start a fresh issue window when the
//!    subject is lost, and record "Pose not detected"
//! 2. Classify (or take the selected exercise) and stabilize the label
//! 3. No stable label: keep detecting
//! 4. Replace the session when the stable exercise changes
//! 5. Idle filter, then the session update
//! 6. Feed issues to the feedback engine and speak the top one when allowed

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use gymcoach_classifier::{
    ClassifierSlot, DatasetSink, ExerciseClassifier, LabelStabilizer, LabeledRow,
    ProbabilisticModel, Retrainer, Trainer,
};
use gymcoach_core::{CoachError, CoachResult, ExerciseKind, ExerciseLabel, FrameTime, PoseObservation};
use gymcoach_exercise::{check_idle, create_session, ExerciseSession, FrameResult, MissingReason};
use gymcoach_feedback::{FeedbackEngine, IssueSummary, SpeechDispatcher};
use gymcoach_features::{extract, FeatureVector};

use crate::{CoachConfig, ExerciseMode};

pub const POSE_NOT_DETECTED: &str = "Pose not detected";

/// What the pipeline did with a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    NoPose,
    Detecting,
    Idle,
    Active,
}

/// Output for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachFrame {
    /// Zero-based index within the stream
    pub frame: u64,
    pub exercise: ExerciseLabel,
    pub status: FrameStatus,
    pub result: FrameResult,
    /// Persistent issue in the feedback window, if any
    pub top_issue: Option<String>,
    /// Set on the frame an utterance was dispatched
    pub spoken: Option<String>,
}

/// Counters for one stream
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStats {
    pub frames: u64,
    pub no_pose: u64,
    pub detecting: u64,
    pub idle: u64,
    pub active: u64,
    pub utterances: u64,
    pub session_switches: u64,
    pub samples_captured: u64,
}

/// Whole-recording result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineReport {
    /// Exercise of the last active frame
    pub exercise: ExerciseLabel,
    pub total_reps: u32,
    pub frames_analyzed: usize,
    pub issue_summary: IssueSummary,
    pub stats: StreamStats,
    pub timeline: Vec<CoachFrame>,
}

/// Labeled-sample collection for explicit-mode streams
///
/// Every active frame becomes a training row for the selected exercise and
/// triggers a debounced retrain of the coach's classifier.
pub struct SampleCapture {
    pub dataset: Arc<dyn DatasetSink>,
    pub retrainer: Retrainer,
}

impl SampleCapture {
    fn record(&self, features: &FeatureVector, kind: ExerciseKind) -> bool {
        if let Err(e) = self.dataset.append(LabeledRow::new(features, kind)) {
            warn!(error = %e, exercise = kind.as_str(), "could not store sample");
            return false;
        }
        match self.retrainer.schedule() {
            Ok(_) | Err(CoachError::RetrainInFlight) => {}
            Err(e) => debug!(error = %e, "retrain not scheduled"),
        }
        true
    }
}

impl std::fmt::Debug for SampleCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleCapture")
            .field("retrain_in_flight", &self.retrainer.is_in_flight())
            .finish_non_exhaustive()
    }
}

/// Shared coaching dependencies
#[derive(Debug, Clone)]
pub struct Coach {
    config: Arc<CoachConfig>,
    classifier: Arc<ClassifierSlot>,
    speech: SpeechDispatcher,
    capture: Option<Arc<SampleCapture>>,
}

impl Coach {
    pub fn new(config: CoachConfig, classifier: Arc<ClassifierSlot>) -> Self {
        Self {
            config: Arc::new(config),
            classifier,
            speech: SpeechDispatcher::default(),
            capture: None,
        }
    }

    /// Wrap `model` with the configured confidence threshold
    pub fn from_model(config: CoachConfig, model: Box<dyn ProbabilisticModel>) -> CoachResult<Self> {
        config.validate()?;
        let classifier = ExerciseClassifier::new(model, config.classifier.confidence_threshold)?;
        Ok(Self::new(config, Arc::new(ClassifierSlot::new(classifier))))
    }

    pub fn with_speech(mut self, speech: SpeechDispatcher) -> Self {
        self.speech = speech;
        self
    }

    /// Collect explicit-mode samples into `dataset` and retrain with `trainer`
    pub fn with_sample_capture(
        mut self,
        dataset: Arc<dyn DatasetSink>,
        trainer: Arc<dyn Trainer>,
    ) -> Self {
        let retrainer = Retrainer::new(
            Arc::clone(&self.classifier),
            Arc::clone(&dataset),
            trainer,
            self.config.retrain_config(),
        );
        self.capture = Some(Arc::new(SampleCapture { dataset, retrainer }));
        self
    }

    pub fn config(&self) -> &CoachConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Arc<ClassifierSlot> {
        &self.classifier
    }

    pub fn sample_capture(&self) -> Option<&SampleCapture> {
        self.capture.as_deref()
    }

    /// New stream in the configured mode
    pub fn stream(&self) -> CoachStream {
        self.stream_with_mode(self.config.mode)
    }

    pub fn stream_with_mode(&self, mode: ExerciseMode) -> CoachStream {
        let cfg = &self.config.classifier;
        CoachStream {
            config: Arc::clone(&self.config),
            classifier: Arc::clone(&self.classifier),
            speech: self.speech.clone(),
            capture: self.capture.clone(),
            mode,
            stabilizer: LabelStabilizer::new(cfg.stabilizer_window, cfg.min_agreement),
            feedback: FeedbackEngine::new(&self.config.feedback),
            session: None,
            subject_present: false,
            stats: StreamStats::default(),
        }
    }

    /// Run a recorded sequence through a fresh stream
    pub fn process_timeline<I>(&self, frames: I) -> TimelineReport
    where
        I: IntoIterator<Item = (FrameTime, Option<PoseObservation>)>,
    {
        let mut stream = self.stream();
        let mut timeline = Vec::new();
        let mut exercise = ExerciseLabel::Unknown;

        for (now, pose) in frames {
            let frame = stream.process(pose.as_ref(), now);
            if frame.status == FrameStatus::Active {
                exercise = frame.exercise;
            }
            timeline.push(frame);
        }

        let issue_summary = IssueSummary::from_frames(timeline.iter().map(|f| &f.result.issues));
        info!(
            frames = timeline.len(),
            reps = stream.rep_count(),
            exercise = exercise.as_str(),
            "timeline processed"
        );

        TimelineReport {
            exercise,
            total_reps: stream.rep_count(),
            frames_analyzed: timeline.len(),
            issue_summary,
            stats: stream.stats().clone(),
            timeline,
        }
    }
}

/// Per-stream state; frames must arrive in order
pub struct CoachStream {
    config: Arc<CoachConfig>,
    classifier: Arc<ClassifierSlot>,
    speech: SpeechDispatcher,
    capture: Option<Arc<SampleCapture>>,
    mode: ExerciseMode,
    stabilizer: LabelStabilizer,
    feedback: FeedbackEngine,
    session: Option<Box<dyn ExerciseSession>>,
    /// Last frame carried a pose
    subject_present: bool,
    stats: StreamStats,
}

impl CoachStream {
    pub fn process(&mut self, pose: Option<&PoseObservation>, now: FrameTime) -> CoachFrame {
        let index = self.stats.frames;
        self.stats.frames += 1;

        let Some(pose) = pose else {
            self.stabilizer.clear();
            if self.subject_present {
                debug!(frame = index, "subject lost");
                self.feedback.clear();
                self.subject_present = false;
            }
            self.stats.no_pose += 1;
            let result =
                FrameResult::missing(self.rep_count(), POSE_NOT_DETECTED, MissingReason::NoPose);
            let (top_issue, spoken) = self.feed(&result.issues, now);
            return CoachFrame {
                frame: index,
                exercise: self.active_exercise(),
                status: FrameStatus::NoPose,
                result,
                top_issue,
                spoken,
            };
        };
        self.subject_present = true;

        let features = extract(pose);
        let raw = match self.mode {
            ExerciseMode::Auto => self.classifier.predict(&features),
            ExerciseMode::Explicit(kind) => ExerciseLabel::Known(kind),
        };

        let Some(kind) = self.stabilizer.update(raw).kind() else {
            self.stats.detecting += 1;
            return CoachFrame {
                frame: index,
                exercise: ExerciseLabel::Unknown,
                status: FrameStatus::Detecting,
                result: FrameResult::detecting(self.rep_count()),
                top_issue: None,
                spoken: None,
            };
        };

        if let Some(previous) = self.session.as_ref().map(|s| s.kind()) {
            if previous != kind {
                info!(
                    from = previous.as_str(),
                    to = kind.as_str(),
                    "exercise changed, replacing session"
                );
                self.session = None;
            }
        }
        let session_config = &self.config.session;
        let switches = &mut self.stats.session_switches;
        let session = self.session.get_or_insert_with(|| {
            *switches += 1;
            create_session(kind, session_config)
        });

        let (status, result) = match check_idle(&**session, pose, &session_config.idle) {
            Some(idle) => (FrameStatus::Idle, idle),
            None => (FrameStatus::Active, session.update(Some(pose), now)),
        };

        match status {
            FrameStatus::Idle => self.stats.idle += 1,
            _ => {
                self.stats.active += 1;
                if let (ExerciseMode::Explicit(_), Some(capture)) = (self.mode, &self.capture) {
                    if capture.record(&features, kind) {
                        self.stats.samples_captured += 1;
                    }
                }
            }
        }

        let (top_issue, spoken) = self.feed(&result.issues, now);

        CoachFrame {
            frame: index,
            exercise: ExerciseLabel::Known(kind),
            status,
            result,
            top_issue,
            spoken,
        }
    }

    /// Push one frame of issues; returns the top issue and what was spoken
    fn feed(&mut self, issues: &[String], now: FrameTime) -> (Option<String>, Option<String>) {
        self.feedback.add_frame(issues);
        let top_issue = self.feedback.get_top_issue().map(str::to_owned);
        let spoken = match top_issue.as_deref() {
            Some(issue) if self.feedback.should_speak(Some(issue), now) => {
                self.feedback.mark_spoken(issue, now);
                self.speech.dispatch(issue);
                self.stats.utterances += 1;
                Some(issue.to_string())
            }
            _ => None,
        };
        (top_issue, spoken)
    }

    pub fn mode(&self) -> ExerciseMode {
        self.mode
    }

    /// Switch mode; the label vote starts over
    pub fn set_mode(&mut self, mode: ExerciseMode) {
        if self.mode != mode {
            debug!(from = %self.mode, to = %mode, "stream mode changed");
            self.mode = mode;
            self.stabilizer.clear();
        }
    }

    /// Exercise of the current session
    pub fn active_exercise(&self) -> ExerciseLabel {
        self.session.as_ref().map(|s| s.kind()).into()
    }

    /// Reps of the current session; a session switch starts from zero
    pub fn rep_count(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.rep_count())
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Drop the session and all per-stream history
    pub fn reset(&mut self) {
        self.stabilizer.clear();
        self.feedback = FeedbackEngine::new(&self.config.feedback);
        self.session = None;
        self.subject_present = false;
    }
}

impl std::fmt::Debug for CoachStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoachStream")
            .field("mode", &self.mode)
            .field("exercise", &self.active_exercise())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
