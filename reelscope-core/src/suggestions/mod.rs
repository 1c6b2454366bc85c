// ============================================================================
// reelscope-core/src/suggestions/mod.rs
// ============================================================================
//
// SUGGESTIONS: Turning Metrics into Recommendations
//
// A `SuggestionGenerator` receives the merged visual, audio and transcript
// records for one reel and returns a `SuggestionBundle`. The crate ships a
// deterministic rule-based generator; model-backed generators plug in
// through the same trait.
//
// KEY COMPONENTS:
// - SuggestionInput: borrowed view of everything a generator may use
// - SuggestionBundle / MusicRecommendation / Pacing: generator output
// - SuggestionGenerator: the collaborator seam
// - RuleBasedSuggestions: default implementation (rule_based.rs)

mod rule_based;

pub use rule_based::RuleBasedSuggestions;

use crate::platform::Platform;
use crate::processing::audio::AudioMetrics;
use crate::processing::visual::VisualMetrics;
use crate::transcription::Transcript;
use crate::utils::safe_div;
use serde::Serialize;

/// Everything a generator may look at.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionInput<'a> {
    pub visual: &'a VisualMetrics,
    pub audio: &'a AudioMetrics,
    pub transcript: &'a Transcript,
    pub platform: Platform,
}

impl SuggestionInput<'_> {
    /// Scene changes per second of video, 0 when the duration is unknown.
    #[must_use]
    pub fn scene_change_rate(&self) -> f64 {
        safe_div(f64::from(self.visual.scene_changes), self.visual.duration)
    }
}

/// How quickly the picture changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Pacing {
    Fast,
    Medium,
    Slow,
}

impl Pacing {
    /// Classifies a scene-change rate: above 0.5/s is fast, above 0.2/s medium.
    #[must_use]
    pub fn from_rate(rate: f64) -> Self {
        if rate > 0.5 {
            Pacing::Fast
        } else if rate > 0.2 {
            Pacing::Medium
        } else {
            Pacing::Slow
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MusicRecommendation {
    pub genre: String,
    pub mood: String,
    pub bpm_range: String,
    pub vocals_preference: String,
    pub energy_level: String,
    pub reasoning: String,
    pub search_keywords: Vec<String>,
    pub best_for: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionBundle {
    /// Name of the generator that produced the bundle.
    pub generator: String,
    pub pacing: Pacing,
    pub scene_change_rate: f64,
    pub brightness: String,
    pub has_audio: bool,
    pub issues: Vec<String>,
    pub music_recommendation: MusicRecommendation,
    pub hashtag_suggestions: Vec<String>,
    pub title_suggestions: Vec<String>,
}

pub trait SuggestionGenerator: Send + Sync {
    fn generate(&self, input: &SuggestionInput<'_>) -> SuggestionBundle;
}
