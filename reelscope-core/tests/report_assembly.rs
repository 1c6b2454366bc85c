// reelscope-core/tests/report_assembly.rs

mod common;

use common::{SyntheticVideo, sine};
use reelscope_core::pipeline::{assemble_report, run_stages};
use reelscope_core::processing::audio::compute_audio_metrics;
use reelscope_core::suggestions::Pacing;
use reelscope_core::{
    AnalysisConfig, AudioMetrics, DisabledTranscriber, NoFaceDetector, Platform,
    RuleBasedSuggestions, Transcriber, Waveform,
};
use std::path::Path;

#[test]
fn test_black_silent_reel_report() -> Result<(), Box<dyn std::error::Error>> {
    let video = SyntheticVideo::solid(30.0, 300, 64, 48, [0, 0, 0]);
    let config = AnalysisConfig::default();
    let path = Path::new("black.mp4");

    let outputs = run_stages(
        &video,
        Platform::Instagram,
        &config,
        &NoFaceDetector,
        || AudioMetrics::unavailable("black.mp4 has no audio track"),
        || DisabledTranscriber.transcribe(path),
    );
    let report = assemble_report(Platform::Instagram, outputs, &RuleBasedSuggestions);

    assert!(report.visual.brightness.is_dark);
    assert_eq!(report.visual.scene_changes, 0);
    assert!(!report.audio.has_audio());
    assert_eq!(report.thumbnails.len(), config.thumbnail_count);
    assert!(!report.transcript.is_available());
    assert_eq!(report.suggestions.pacing, Pacing::Slow);
    assert!(!report.suggestions.has_audio);
    assert_eq!(report.platform_rules, Platform::Instagram.rules());

    let json = serde_json::to_value(&report)?;
    for key in [
        "platform",
        "platform_rules",
        "visual",
        "audio",
        "transcript",
        "thumbnails",
        "suggestions",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["platform"], "instagram");
    assert_eq!(json["platform_rules"]["hook_time"], "First 3 seconds critical");
    assert_eq!(json["visual"]["first_frame_quality"]["quality"], "needs_improvement");
    assert_eq!(json["audio"]["has_audio"], false);
    assert_eq!(json["transcript"]["text"], "");
    assert_eq!(json["suggestions"]["pacing"], "Slow");
    Ok(())
}

#[test]
fn test_measured_audio_flows_into_suggestions() -> Result<(), Box<dyn std::error::Error>> {
    let video = SyntheticVideo::solid(30.0, 600, 32, 32, [128, 128, 128]);
    let config = AnalysisConfig::default();
    let waveform = Waveform {
        samples: sine(440.0, 0.2, 16_000, 20.0),
        sample_rate: 16_000,
    };

    let outputs = run_stages(
        &video,
        Platform::Other,
        &config,
        &NoFaceDetector,
        || compute_audio_metrics(&waveform, &config),
        || DisabledTranscriber.transcribe(Path::new("gray.mp4")),
    );
    let report = assemble_report(Platform::Other, outputs, &RuleBasedSuggestions);

    assert!((report.visual.duration - 20.0).abs() < 1e-9);
    assert!(report.audio.has_audio());
    assert!(report.suggestions.has_audio);
    assert_eq!(report.suggestions.brightness, "Normal");
    assert_eq!(report.suggestions.hashtag_suggestions.len(), 5);
    assert_eq!(report.suggestions.title_suggestions.len(), 3);
    assert!(report.suggestions.issues.iter().all(|issue| !issue.contains("Duration")));

    let json = serde_json::to_value(&report)?;
    assert!(json["audio"]["loudness"]["average_db"].is_number());
    assert!(json["audio"].get("error").is_none());
    Ok(())
}
