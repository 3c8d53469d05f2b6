//! GymCoach Replay CLI
//!
//! Runs a recording of extracted landmarks through the coaching pipeline
//! and prints the report as JSON.
//!
//! Input is JSON lines: each line holds the 33 landmarks of one frame
//! (`[{"x":..,"y":..,"z":..,"visibility":..}, ...]`) or `null` when no
//! person was detected.
//!
//! # Usage
//!
//! ```bash
//! # Selected exercise
//! cargo run -p gymcoach-runtime --bin gymcoach-replay -- poses.jsonl --mode squat
//!
//! # Auto-detect with a centroid model trained from labeled rows
//! cargo run -p gymcoach-runtime --bin gymcoach-replay -- poses.jsonl \
//!     --mode auto --dataset rows.jsonl --timeline
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;

use gymcoach_classifier::{CentroidTrainer, ConstantModel, LabeledRow, Trainer};
use gymcoach_core::{FrameTime, PoseObservation};
use gymcoach_runtime::{
    telemetry, Coach, CoachConfig, ExerciseMode, PoseProvider, RecordedPoses, SmoothedPoseProvider,
};

#[derive(Parser, Debug)]
#[command(name = "gymcoach-replay")]
#[command(about = "Replay recorded pose landmarks through the coaching pipeline")]
struct Args {
    /// JSON-lines landmark recording
    input: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// `auto` or an exercise name; overrides the configured mode
    #[arg(short, long)]
    mode: Option<String>,

    /// JSON-lines labeled feature rows used to train the auto-mode classifier
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Recording frame rate
    #[arg(long, default_value = "30")]
    fps: f64,

    /// Include the per-frame timeline in the report
    #[arg(long)]
    timeline: bool,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON log lines
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => CoachConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CoachConfig::default(),
    };
    if let Some(mode) = &args.mode {
        config.mode = ExerciseMode::parse(mode)?;
    }
    if args.verbose {
        config.telemetry.filter = "debug".to_string();
    }
    config.telemetry.json |= args.json_logs;
    telemetry::init(&config.telemetry);

    let coach = build_coach(config, args.dataset.as_deref())?;
    let frames = read_recording(&args.input)?;
    tracing::info!(frames = frames.len(), mode = %coach.config().mode, "replaying recording");

    let mut provider = SmoothedPoseProvider::new(RecordedPoses, &coach.config().pose_smoothing);
    let fps = args.fps;
    let mut report = coach.process_timeline(
        frames
            .into_iter()
            .enumerate()
            .map(|(i, frame)| (FrameTime::from_frame_index(i as u64, fps), provider.infer(frame))),
    );
    if !args.timeline {
        report.timeline.clear();
    }

    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("writing report {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

fn build_coach(config: CoachConfig, dataset: Option<&Path>) -> anyhow::Result<Coach> {
    let coach = match (config.mode, dataset) {
        (_, Some(path)) => {
            let rows = read_jsonl::<LabeledRow>(path)?;
            tracing::info!(rows = rows.len(), "training classifier");
            let model = CentroidTrainer::default().train(&rows)?;
            Coach::from_model(config, model)?
        }
        (ExerciseMode::Explicit(kind), None) => {
            Coach::from_model(config, Box::new(ConstantModel::certain(kind.as_str())))?
        }
        (ExerciseMode::Auto, None) => bail!("auto mode needs --dataset to train a classifier"),
    };
    Ok(coach)
}

fn read_recording(path: &Path) -> anyhow::Result<Vec<Option<PoseObservation>>> {
    read_jsonl(path)
}

fn read_jsonl<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}:{}: invalid record", path.display(), i + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["gymcoach-replay", "in.jsonl", "--mode", "pushup", "--timeline"]);
        assert_eq!(args.input, PathBuf::from("in.jsonl"));
        assert_eq!(args.mode.as_deref(), Some("pushup"));
        assert!(args.timeline);
        assert_eq!(args.fps, 30.0);
    }

    #[test]
    fn test_auto_mode_requires_dataset() {
        assert!(build_coach(CoachConfig::default(), None).is_err());
    }
}
