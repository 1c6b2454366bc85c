// reelscope-core/tests/ffmpeg_decode.rs
//
// End-to-end runs through the real ffmpeg tools on clips generated with lavfi.
// Skipped when the tools are not installed.

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use reelscope_core::{
    AnalysisConfig, DisabledTranscriber, FfmpegFrameSource, FrameSource, Platform,
    RuleBasedSuggestions, analyze_audio, analyze_reel, analyze_visual, check_required_tools,
    suggest_thumbnails,
};
use std::error::Error;
use std::path::Path;

fn tools_available() -> bool {
    match check_required_tools() {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Skipping ffmpeg test: {e}");
            false
        }
    }
}

/// Writes a 10 s black 64x48 clip at 30 fps, optionally with a silent mono
/// track at 22050 Hz.
fn make_black_clip(path: &Path, with_audio: bool) -> Result<(), Box<dyn Error>> {
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner();
    cmd.args(["-f", "lavfi", "-i", "color=black:s=64x48:r=30:d=10"]);
    if with_audio {
        cmd.args(["-f", "lavfi", "-i", "anullsrc=r=22050:cl=mono"]);
        cmd.args(["-c:a", "pcm_s16le"]);
    }
    cmd.args(["-c:v", "ffv1", "-t", "10"]);
    cmd.overwrite();
    cmd.output(path.to_string_lossy().into_owned());

    let mut child = cmd.spawn()?;
    let mut errors = Vec::new();
    for event in child.iter()? {
        if let FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) = event {
            errors.push(line);
        }
    }
    let status = child.wait()?;
    if !status.success() {
        return Err(format!("ffmpeg could not generate {}: {}", path.display(), errors.join("\n")).into());
    }
    Ok(())
}

#[test]
fn test_black_silent_clip_end_to_end() -> Result<(), Box<dyn Error>> {
    if !tools_available() {
        return Ok(());
    }
    let dir = tempfile::tempdir()?;
    let clip = dir.path().join("black.mkv");
    make_black_clip(&clip, true)?;
    let config = AnalysisConfig {
        temp_dir: Some(dir.path().to_path_buf()),
        ..AnalysisConfig::default()
    };

    let source = FfmpegFrameSource::open(&clip)?;
    let info = source.info();
    assert_eq!((info.width, info.height), (64, 48));
    assert!((info.fps - 30.0).abs() < 1e-6);
    assert!(source.sample_at(45).is_some());

    let visual = analyze_visual(&clip, &config)?;
    assert!((visual.duration - 10.0).abs() < 0.1, "duration {}", visual.duration);
    assert!(visual.brightness.is_dark);
    assert!(visual.brightness.average < 5.0);
    assert_eq!(visual.scene_changes, 0);

    let thumbnails = suggest_thumbnails(&clip, Platform::Instagram, 5, &config)?;
    assert!(!thumbnails.is_empty() && thumbnails.len() <= 5);
    assert_eq!(thumbnails.iter().filter(|t| t.is_recommended).count(), 1);
    let preview = image::load_from_memory(&thumbnails[0].preview_jpeg()?)?;
    assert_eq!((preview.width(), preview.height()), (320, 180));

    let audio = analyze_audio(&clip, &config);
    let report = audio.report().ok_or("expected measured audio")?;
    assert!(audio.has_audio());
    assert_eq!(report.sample_rate, 22050);
    assert!((report.duration - 10.0).abs() < 0.1, "audio duration {}", report.duration);
    assert!(report.loudness.average_db <= -90.0);
    assert!(report.is_silent_or_low);
    assert!(!report.silence_gaps.is_empty());
    assert_eq!(report.silence_gaps[0].start, 0.0);

    // The scratch audio file is gone once the analysis returns.
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("reelscope_audio"))
        .collect();
    assert!(leftovers.is_empty());
    Ok(())
}

#[test]
fn test_clip_without_audio_track_degrades() -> Result<(), Box<dyn Error>> {
    if !tools_available() {
        return Ok(());
    }
    let dir = tempfile::tempdir()?;
    let clip = dir.path().join("mute.mkv");
    make_black_clip(&clip, false)?;
    let config = AnalysisConfig::default();

    let audio = analyze_audio(&clip, &config);
    assert!(!audio.has_audio());
    assert!(audio.report().is_none());

    let report = analyze_reel(
        &clip,
        Platform::YoutubeShorts,
        &config,
        &DisabledTranscriber,
        &RuleBasedSuggestions,
    )?;
    assert!(!report.audio.has_audio());
    assert!(report.visual.brightness.is_dark);
    assert!(!report.thumbnails.is_empty());

    let json = serde_json::to_value(&report)?;
    assert_eq!(json["audio"]["has_audio"], false);
    assert!(json["audio"]["error"].as_str().is_some_and(|e| e.contains("no audio track")));
    Ok(())
}
