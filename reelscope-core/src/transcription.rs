//! Speech-to-text collaborator.
//!
//! Transcription engines live outside this crate and plug in through the
//! [`Transcriber`] trait. A failed or disabled transcription is still a
//! complete [`Transcript`] with empty text and an `error`.

use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    pub text: String,
    pub segments: Vec<TranscriptSegment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Transcript {
    /// Degraded transcript carrying only the failure reason.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            segments: Vec::new(),
            language: None,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.error.is_none()
    }

    #[must_use]
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

pub trait Transcriber: Send + Sync {
    /// Transcribes the spoken content of a video. Never fails; errors are
    /// reported through [`Transcript::failed`].
    fn transcribe(&self, video_path: &Path) -> Transcript;
}

/// Transcriber used when no speech-to-text engine is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTranscriber;

impl Transcriber for DisabledTranscriber {
    fn transcribe(&self, video_path: &Path) -> Transcript {
        log::debug!("Transcription disabled for {}", video_path.display());
        Transcript::failed("transcription is not configured")
    }
}
