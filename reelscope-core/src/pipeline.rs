// ============================================================================
// reelscope-core/src/pipeline.rs
// ============================================================================
//
// PIPELINE: Per-Reel Analysis Orchestration
//
// Entry points for analyzing one video file. The single-stage functions
// (`analyze_visual`, `analyze_audio`, `suggest_thumbnails`) back the CLI's
// focused subcommands; `analyze_reel` runs every stage and merges the results
// into one `OptimizationReport`.
//
// WORKFLOW:
// 1. Validate the configuration and open the video (the only hard failure)
// 2. Run visual metrics, thumbnail ranking, audio metrics and transcription
//    concurrently; each frame stage spawns its own decoder
// 3. Hand the merged records to the suggestion generator
//
// KEY COMPONENTS:
// - OptimizationReport: the complete per-reel result
// - StageOutputs / run_stages: the concurrent stage fan-out
// - assemble_report: suggestion generation and report assembly

use crate::config::AnalysisConfig;
use crate::error::CoreResult;
use crate::platform::{Platform, PlatformRules};
use crate::processing::audio::{AudioMetrics, analyze_audio_file};
use crate::processing::face::{FaceDetector, load_face_detector};
use crate::processing::sampler::{FfmpegFrameSource, FrameSource};
use crate::processing::thumbnails::{ThumbnailSuggestion, suggest_thumbnails_from};
use crate::processing::visual::{self, VisualMetrics};
use crate::suggestions::{SuggestionBundle, SuggestionGenerator, SuggestionInput};
use crate::transcription::{Transcriber, Transcript};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

/// Everything learned about one reel.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationReport {
    pub platform: Platform,
    pub platform_rules: PlatformRules,
    pub visual: VisualMetrics,
    pub audio: AudioMetrics,
    pub transcript: Transcript,
    pub thumbnails: Vec<ThumbnailSuggestion>,
    pub suggestions: SuggestionBundle,
}

/// Raw results of the analysis stages, before suggestions are generated.
#[derive(Debug, Clone)]
pub struct StageOutputs {
    pub visual: VisualMetrics,
    pub thumbnails: Vec<ThumbnailSuggestion>,
    pub audio: AudioMetrics,
    pub transcript: Transcript,
}

/// Computes visual metrics for a video file.
pub fn analyze_visual(video_path: &Path, config: &AnalysisConfig) -> CoreResult<VisualMetrics> {
    config.validate()?;
    let source = FfmpegFrameSource::open(video_path)?;
    Ok(visual::analyze_visual(&source, config))
}

/// Computes audio metrics for a video file.
///
/// A missing file or audio track yields the `Unavailable` variant.
pub fn analyze_audio(video_path: &Path, config: &AnalysisConfig) -> AudioMetrics {
    analyze_audio_file(video_path, config)
}

/// Ranks up to `count` thumbnail frames of a video file for `platform`.
pub fn suggest_thumbnails(
    video_path: &Path,
    platform: Platform,
    count: usize,
    config: &AnalysisConfig,
) -> CoreResult<Vec<ThumbnailSuggestion>> {
    config.validate()?;
    let source = FfmpegFrameSource::open(video_path)?;
    let detector = load_face_detector(config);
    Ok(suggest_thumbnails_from(
        &source,
        platform,
        count,
        detector.as_ref(),
        config,
    ))
}

/// Runs the full analysis of one reel.
///
/// Fails only when the configuration is invalid or the video cannot be
/// opened. Every other problem degrades the affected record.
pub fn analyze_reel(
    video_path: &Path,
    platform: Platform,
    config: &AnalysisConfig,
    transcriber: &dyn Transcriber,
    generator: &dyn SuggestionGenerator,
) -> CoreResult<OptimizationReport> {
    config.validate()?;
    let start = Instant::now();
    log::info!("Analyzing {} for {}", video_path.display(), platform);

    let source = FfmpegFrameSource::open(video_path)?;
    let detector = load_face_detector(config);

    let outputs = run_stages(
        &source,
        platform,
        config,
        detector.as_ref(),
        || analyze_audio_file(video_path, config),
        || transcriber.transcribe(video_path),
    );
    let report = assemble_report(platform, outputs, generator);

    log::info!(
        "Analysis of {} finished in {:.1}s",
        video_path.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(report)
}

/// Runs the frame stages over `source` alongside the audio and transcript
/// stages.
pub fn run_stages<S, A, T>(
    source: &S,
    platform: Platform,
    config: &AnalysisConfig,
    detector: &dyn FaceDetector,
    audio_stage: A,
    transcript_stage: T,
) -> StageOutputs
where
    S: FrameSource + Sync + ?Sized,
    A: FnOnce() -> AudioMetrics + Send,
    T: FnOnce() -> Transcript + Send,
{
    let ((visual, thumbnails), (audio, transcript)) = rayon::join(
        || {
            rayon::join(
                || visual::analyze_visual(source, config),
                || {
                    suggest_thumbnails_from(
                        source,
                        platform,
                        config.thumbnail_count,
                        detector,
                        config,
                    )
                },
            )
        },
        || rayon::join(audio_stage, transcript_stage),
    );

    if let Some(error) = &transcript.error {
        log::warn!("Transcript unavailable: {}", error);
    }

    StageOutputs {
        visual,
        thumbnails,
        audio,
        transcript,
    }
}

/// Asks `generator` for suggestions and assembles the final report.
pub fn assemble_report(
    platform: Platform,
    outputs: StageOutputs,
    generator: &dyn SuggestionGenerator,
) -> OptimizationReport {
    let StageOutputs {
        visual,
        thumbnails,
        audio,
        transcript,
    } = outputs;

    let suggestions = generator.generate(&SuggestionInput {
        visual: &visual,
        audio: &audio,
        transcript: &transcript,
        platform,
    });

    OptimizationReport {
        platform,
        platform_rules: platform.rules(),
        visual,
        audio,
        transcript,
        thumbnails,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::suggestions::RuleBasedSuggestions;
    use crate::transcription::DisabledTranscriber;

    #[test]
    fn test_missing_video_is_a_hard_failure() {
        let config = AnalysisConfig::default();
        let path = Path::new("/nonexistent/reel.mp4");

        let result = analyze_reel(
            path,
            Platform::Instagram,
            &config,
            &DisabledTranscriber,
            &RuleBasedSuggestions,
        );
        assert!(matches!(result, Err(CoreError::VideoOpen(_))));
        assert!(matches!(
            analyze_visual(path, &config),
            Err(CoreError::VideoOpen(_))
        ));
        assert!(matches!(
            suggest_thumbnails(path, Platform::Other, 5, &config),
            Err(CoreError::VideoOpen(_))
        ));
    }

    #[test]
    fn test_missing_video_audio_is_degraded() {
        let audio = analyze_audio(Path::new("/nonexistent/reel.mp4"), &AnalysisConfig::default());
        assert!(!audio.has_audio());
        assert!(audio.report().is_none());
    }

    #[test]
    fn test_invalid_config_rejected_before_open() {
        let config = AnalysisConfig {
            thumbnail_interval_secs: 0.0,
            ..AnalysisConfig::default()
        };
        let result = analyze_visual(Path::new("/nonexistent/reel.mp4"), &config);
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
