//! Speech output
//!
//! Utterances never block the frame loop. Each one runs on tokio's blocking
//! pool when a runtime is available, otherwise on a detached thread. Order
//! between overlapping utterances is not guaranteed.

use std::sync::Arc;

use gymcoach_core::CoachResult;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{info, warn};

/// Text-to-speech collaborator
pub trait Speaker: Send + Sync + 'static {
    /// Speak `text`, blocking until playback finishes
    fn speak(&self, text: &str) -> CoachResult<()>;
}

/// Logs utterances instead of playing them
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSpeaker;

impl Speaker for TracingSpeaker {
    fn speak(&self, text: &str) -> CoachResult<()> {
        info!(utterance = text, "speaking");
        Ok(())
    }
}

/// Keeps every utterance in memory
#[derive(Debug, Default)]
pub struct RecordingSpeaker {
    spoken: Mutex<Vec<String>>,
}

impl RecordingSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Utterances so far, in completion order
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }
}

impl Speaker for RecordingSpeaker {
    fn speak(&self, text: &str) -> CoachResult<()> {
        self.spoken.lock().push(text.to_string());
        Ok(())
    }
}

/// Fire-and-forget front end for a [`Speaker`]
#[derive(Clone)]
pub struct SpeechDispatcher {
    speaker: Arc<dyn Speaker>,
}

impl SpeechDispatcher {
    pub fn new(speaker: Arc<dyn Speaker>) -> Self {
        Self { speaker }
    }

    /// Queue `text` for playback and return immediately
    pub fn dispatch(&self, text: impl Into<String>) {
        let speaker = Arc::clone(&self.speaker);
        let text = text.into();
        let job = move || {
            if let Err(e) = speaker.speak(&text) {
                warn!(error = %e, utterance = %text, "speech failed");
            }
        };

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(job);
            }
            Err(_) => {
                let spawned = std::thread::Builder::new()
                    .name("gymcoach-speech".into())
                    .spawn(job);
                if let Err(e) = spawned {
                    warn!(error = %e, "could not start speech thread");
                }
            }
        }
    }
}

impl Default for SpeechDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(TracingSpeaker))
    }
}

impl std::fmt::Debug for SpeechDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechDispatcher").finish_non_exhaustive()
    }
}
